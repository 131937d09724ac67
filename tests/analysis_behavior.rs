//! Behavior tests for analysis and quality reporting over fetched
//! series, including the adjusted-close price resolution rule.

use papervest_tests::*;

// =============================================================================
// Price resolution feeding analysis
// =============================================================================

#[tokio::test]
async fn when_adjusted_closes_exist_performance_math_uses_them() {
    // Given: closes and adjusted closes that tell different stories
    let payload = chart_payload_with_adjusted(
        "AAPL",
        &[
            ("2024-03-01", 102.0, 100.0, 1_000_000),
            ("2024-03-04", 108.0, 105.0, 1_000_000),
            ("2024-03-05", 112.0, 110.0, 1_000_000),
        ],
    );
    let client = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse::ok_json(
        payload,
    ))));
    let pipeline = scripted_pipeline(client);
    let outcome = pipeline
        .fetch_ticker("AAPL", range("2024-03-01", "2024-03-06"))
        .await
        .expect("fetch should succeed");

    // When: a $1,000 position is analyzed
    let summary = PerformanceSummary::from_series(&outcome.series, 1_000.0)
        .expect("summary should build");

    // Then: the math runs on adjusted closes (100 -> 110), not raw closes
    assert!((summary.shares - 10.0).abs() < 1e-9);
    assert!((summary.final_value - 1_100.0).abs() < 1e-9);
    assert!((summary.percent_return - 10.0).abs() < 1e-9);
    assert_eq!(summary.days_invested, 3);
}

#[tokio::test]
async fn when_sample_data_feeds_analysis_results_are_reproducible() {
    // Given: two independent offline pipelines
    let pipeline_a = scripted_pipeline(Arc::new(NoopHttpClient));
    let pipeline_b = scripted_pipeline(Arc::new(NoopHttpClient));
    let span = range("2024-01-01", "2024-06-28");

    // When: the same ticker is fetched and analyzed on both
    let first = pipeline_a
        .fetch_ticker("ZZZZ", span)
        .await
        .expect("sample fallback should succeed");
    let second = pipeline_b
        .fetch_ticker("ZZZZ", span)
        .await
        .expect("sample fallback should succeed");
    let summary_a =
        PerformanceSummary::from_series(&first.series, 10_000.0).expect("summary should build");
    let summary_b =
        PerformanceSummary::from_series(&second.series, 10_000.0).expect("summary should build");

    // Then: identical inputs produce identical reports
    assert_eq!(summary_a, summary_b);
    assert!(summary_a.volatility > 0.0);
    assert!(summary_a.max_drawdown <= 0.0);
}

#[tokio::test]
async fn when_the_series_is_long_enough_indicators_fill_in() {
    // Given: roughly six months of sample data
    let pipeline = scripted_pipeline(Arc::new(NoopHttpClient));
    let outcome = pipeline
        .fetch_ticker("AAPL", range("2024-01-01", "2024-06-28"))
        .await
        .expect("sample fallback should succeed");

    // When: a technical snapshot is taken
    let snapshot = TechnicalSnapshot::from_series(&outcome.series);

    // Then: 20- and 50-day indicators exist, 200-day does not yet
    assert!(snapshot.ma_20.is_some());
    assert!(snapshot.ma_50.is_some());
    assert_eq!(snapshot.ma_200, None);
    let rsi = snapshot.rsi_14.expect("enough rows for rsi");
    assert!((0.0..=100.0).contains(&rsi));
    let upper = snapshot.bollinger_upper.expect("enough rows for bands");
    let lower = snapshot.bollinger_lower.expect("enough rows for bands");
    assert!(upper >= lower);
    assert!(snapshot.volume_ratio.expect("sample rows carry volume") > 0.0);
}

// =============================================================================
// Quality grading
// =============================================================================

#[tokio::test]
async fn when_sample_history_is_long_and_complete_it_grades_full() {
    // Given: six months of sample data (full adjusted-close coverage)
    let pipeline = scripted_pipeline(Arc::new(NoopHttpClient));
    let outcome = pipeline
        .fetch_ticker("AAPL", range("2024-01-01", "2024-06-28"))
        .await
        .expect("sample fallback should succeed");

    // When: quality is assessed
    let report = QualityReport::for_series(&outcome.series, outcome.origin);

    // Then: over 100 fully-adjusted rows grade Full, provenance stays Sample
    assert!(report.data_points > 100);
    assert!((report.completeness_pct - 100.0).abs() < f64::EPSILON);
    assert_eq!(report.grade, QualityGrade::Full);
    assert_eq!(report.origin, DataOrigin::Sample);
}

#[tokio::test]
async fn when_history_is_short_it_grades_sparse() {
    // Given: one month of sample data
    let pipeline = scripted_pipeline(Arc::new(NoopHttpClient));
    let outcome = pipeline
        .fetch_ticker("AAPL", range("2024-03-01", "2024-03-31"))
        .await
        .expect("sample fallback should succeed");

    // When: quality is assessed
    let report = QualityReport::for_series(&outcome.series, outcome.origin);

    // Then: 21 weekday rows are not enough for anything better
    assert_eq!(report.data_points, 21);
    assert_eq!(report.grade, QualityGrade::Sparse);
}

#[tokio::test]
async fn when_adjusted_closes_are_missing_quality_warns() {
    // Given: live data without an adjusted-close column
    let rows: Vec<(String, f64, u64)> = (0..60)
        .map(|i| {
            let day = date("2024-01-01")
                .shift_days(i)
                .expect("date should stay in range");
            (day.format_iso(), 100.0 + i as f64, 1_000_000)
        })
        .collect();
    let borrowed: Vec<(&str, f64, u64)> = rows
        .iter()
        .map(|(day, close, volume)| (day.as_str(), *close, *volume))
        .collect();
    let payload = chart_payload("AAPL", &borrowed);
    let client = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse::ok_json(
        payload,
    ))));
    let pipeline = scripted_pipeline(client);
    let outcome = pipeline
        .fetch_ticker("AAPL", range("2024-01-01", "2024-03-01"))
        .await
        .expect("fetch should succeed");

    // When: quality is assessed
    let report = QualityReport::for_series(&outcome.series, outcome.origin);

    // Then: zero coverage earns a warning and caps the grade
    assert!((report.completeness_pct - 0.0).abs() < f64::EPSILON);
    assert_eq!(report.grade, QualityGrade::Partial);
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.contains("adjusted close")));
}
