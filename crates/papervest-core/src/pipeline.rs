//! Fetch pipeline: the resilience ladder between a request and a
//! validated series.
//!
//! One fetch walks the ladder in order:
//!
//! 1. the exact requested range, with in-place retries when the source
//!    reports rate limiting (1s, 2s, 4s backoff, 3 attempts total)
//! 2. lookback-window escalation (`5y` down to `3mo`), widest first,
//!    each window getting the same in-place retry treatment
//! 3. deterministic sample data, when the policy allows it
//!
//! No success leaves the pipeline unless the series clears the
//! validation gate: at least [`MIN_VIABLE_ROWS`] rows in chronological
//! order. The pipeline is a single logical task; it awaits its own
//! backoff and pacing delays and never races windows in parallel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::profile::sample_profile;
use crate::provider::{FetchError, HistoryQuery, MarketDataSource};
use crate::retry::RetryPolicy;
use crate::sample::sample_series;
use crate::throttle::RequestPacer;
use crate::{CompanyProfile, LookbackWindow, PriceSeries, Ticker, TradingDate, ValidationError};

/// Fewest rows a series may have before any success is returned. A
/// sorted, duplicate-free series of this size always has its first date
/// before its last, so the gate reduces to a row count.
pub const MIN_VIABLE_ROWS: usize = 2;

/// Provenance tag carried by every successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Sample,
}

impl DataOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Sample => "sample",
        }
    }
}

impl std::fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated date range: `start` strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    pub start: TradingDate,
    pub end: TradingDate,
}

impl FetchRange {
    /// `end` defaults to today in UTC.
    pub fn new(start: TradingDate, end: Option<TradingDate>) -> Result<Self, ValidationError> {
        let end = end.unwrap_or_else(TradingDate::today);
        if start >= end {
            return Err(ValidationError::InvalidDateRange {
                start: start.format_iso(),
                end: end.format_iso(),
            });
        }
        Ok(Self { start, end })
    }
}

/// One fetch request: a validated ticker over a validated range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticker: Ticker,
    pub range: FetchRange,
}

impl FetchRequest {
    pub fn new(ticker: Ticker, range: FetchRange) -> Self {
        Self { ticker, range }
    }
}

/// Policy knobs for one pipeline instance.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub retry: RetryPolicy,
    /// Escalation order tried after the exact range fails.
    pub windows: Vec<LookbackWindow>,
    /// Pause before each window attempt.
    pub window_pacing: Duration,
    /// Serve deterministic synthetic data when every live strategy
    /// fails. A deliberate, caller-visible choice: disabling it turns
    /// exhaustion into a `NetworkUnavailable` failure.
    pub sample_fallback: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            windows: LookbackWindow::FALLBACK.to_vec(),
            window_pacing: Duration::from_secs(1),
            sample_fallback: true,
        }
    }
}

impl FetchPolicy {
    /// Full ladder, zero delays. Used by tests and offline runs.
    pub fn without_delays() -> Self {
        Self {
            retry: RetryPolicy::without_delays(),
            window_pacing: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn live_only() -> Self {
        Self {
            sample_fallback: false,
            ..Self::default()
        }
    }
}

/// Successful fetch with its provenance trail.
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    pub series: PriceSeries,
    pub origin: DataOrigin,
    /// Window actually served when the requested range was abandoned.
    pub served_window: Option<LookbackWindow>,
    pub warnings: Vec<String>,
    /// Upstream errors absorbed on the way to this success.
    pub errors: Vec<FetchError>,
    pub latency_ms: u64,
}

pub type FetchResult = Result<FetchSuccess, FetchError>;

/// The fetch orchestrator. Holds one source, one policy, one pacer.
pub struct FetchPipeline {
    source: Arc<dyn MarketDataSource>,
    policy: FetchPolicy,
    pacer: RequestPacer,
}

impl FetchPipeline {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self::with_policy(source, FetchPolicy::default())
    }

    pub fn with_policy(source: Arc<dyn MarketDataSource>, policy: FetchPolicy) -> Self {
        Self {
            source,
            policy,
            pacer: RequestPacer::default(),
        }
    }

    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Raw-ticker entry point. Validation failures short-circuit here,
    /// before any source call.
    pub async fn fetch_ticker(&self, raw_ticker: &str, range: FetchRange) -> FetchResult {
        let ticker = Ticker::parse(raw_ticker)
            .map_err(|e| FetchError::invalid_ticker(e.to_string()))?;
        self.fetch(&FetchRequest::new(ticker, range)).await
    }

    /// Walk the ladder for one validated request.
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        let started = Instant::now();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let FetchRange { start, end } = request.range;

        let range_query = HistoryQuery::range(request.ticker.clone(), start, end);
        if let Some(series) = self.attempt_query(&range_query, &mut errors).await {
            return Ok(FetchSuccess {
                series,
                origin: DataOrigin::Live,
                served_window: None,
                warnings,
                errors,
                latency_ms: elapsed_ms(started),
            });
        }

        for window in &self.policy.windows {
            self.pause(self.policy.window_pacing).await;

            let query = HistoryQuery::window(request.ticker.clone(), *window);
            if let Some(series) = self.attempt_query(&query, &mut errors).await {
                log::warn!(
                    "serving lookback window {window} for {} after the requested range failed",
                    request.ticker
                );
                warnings.push(format!(
                    "requested range unavailable; serving lookback window {window}"
                ));
                return Ok(FetchSuccess {
                    series,
                    origin: DataOrigin::Live,
                    served_window: Some(*window),
                    warnings,
                    errors,
                    latency_ms: elapsed_ms(started),
                });
            }
        }

        if self.policy.sample_fallback {
            match sample_series(&request.ticker, start, end) {
                // The generator only emits series above the viability
                // gate, so no further check is needed here.
                Ok(series) => {
                    log::warn!("serving sample data for {}", request.ticker);
                    warnings.push(String::from(
                        "live data unavailable; serving deterministic sample data",
                    ));
                    return Ok(FetchSuccess {
                        series,
                        origin: DataOrigin::Sample,
                        served_window: None,
                        warnings,
                        errors,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    errors.push(FetchError::unavailable(format!(
                        "sample generation failed: {error}"
                    )));
                }
            }
        }

        let detail = errors
            .last()
            .map(|error| format!("; last error: {error}"))
            .unwrap_or_default();
        Err(FetchError::unavailable(format!(
            "no data for {} after {} failed attempt(s){detail}",
            request.ticker,
            errors.len()
        )))
    }

    /// Company profile with the same sample-fallback policy as history.
    pub async fn profile(
        &self,
        ticker: &Ticker,
    ) -> Result<(CompanyProfile, DataOrigin), FetchError> {
        if let Err(wait) = self.pacer.acquire() {
            self.pause(wait).await;
        }

        match self.source.profile(ticker.clone()).await {
            Ok(profile) => Ok((profile, DataOrigin::Live)),
            Err(error) if self.policy.sample_fallback => {
                log::warn!("profile fetch failed for {ticker}: {error}; serving sample profile");
                Ok((sample_profile(ticker), DataOrigin::Sample))
            }
            Err(error) => Err(error),
        }
    }

    /// One query span with in-place retries. A gated series comes back;
    /// everything that failed lands on the error trail.
    async fn attempt_query(
        &self,
        query: &HistoryQuery,
        errors: &mut Vec<FetchError>,
    ) -> Option<PriceSeries> {
        for attempt in 0..self.policy.retry.max_attempts {
            if let Err(wait) = self.pacer.acquire() {
                log::debug!("request pacer engaged, waiting {wait:?}");
                self.pause(wait).await;
            }

            match self.source.history(query.clone()).await {
                Ok(series) => {
                    if series.len() >= MIN_VIABLE_ROWS {
                        return Some(series);
                    }
                    // Undersized data escalates; retrying the same span
                    // would return the same rows.
                    errors.push(FetchError::empty_or_malformed(format!(
                        "series for {} has {} row(s), at least {} required",
                        query.span,
                        series.len(),
                        MIN_VIABLE_ROWS
                    )));
                    return None;
                }
                Err(error) => {
                    let retryable = error.retryable();
                    errors.push(error);
                    if !retryable {
                        return None;
                    }
                    if attempt + 1 >= self.policy.retry.max_attempts {
                        return None;
                    }
                    let delay = self.policy.retry.delay_for_attempt(attempt);
                    log::warn!(
                        "rate limited on {} (attempt {} of {}), retrying in {delay:?}",
                        query.span,
                        attempt + 1,
                        self.policy.retry.max_attempts
                    );
                    self.pause(delay).await;
                }
            }
        }
        None
    }

    /// Zero-duration pauses skip the timer entirely, so policies built
    /// by [`FetchPolicy::without_delays`] never touch the runtime clock.
    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    use super::*;
    use crate::provider::{FetchErrorKind, QuerySpan};
    use crate::PriceRecord;

    /// Source double that replays a scripted queue of responses, then
    /// keeps repeating the final default.
    struct ScriptedSource {
        queue: Mutex<VecDeque<Result<PriceSeries, FetchError>>>,
        default: FetchError,
        calls: Mutex<Vec<HistoryQuery>>,
    }

    impl ScriptedSource {
        fn always(error: FetchError) -> Self {
            Self {
                queue: Mutex::new(VecDeque::new()),
                default: error,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn sequence(responses: Vec<Result<PriceSeries, FetchError>>, default: FetchError) -> Self {
            Self {
                queue: Mutex::new(responses.into()),
                default,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<HistoryQuery> {
            self.calls
                .lock()
                .expect("call store should not be poisoned")
                .clone()
        }
    }

    impl MarketDataSource for ScriptedSource {
        fn id(&self) -> &'static str {
            "scripted"
        }

        fn history<'a>(
            &'a self,
            query: HistoryQuery,
        ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>> {
            self.calls
                .lock()
                .expect("call store should not be poisoned")
                .push(query);
            let response = self
                .queue
                .lock()
                .expect("response queue should not be poisoned")
                .pop_front()
                .unwrap_or(Err(self.default.clone()));
            Box::pin(async move { response })
        }

        fn profile<'a>(
            &'a self,
            _ticker: Ticker,
        ) -> Pin<Box<dyn Future<Output = Result<CompanyProfile, FetchError>> + Send + 'a>> {
            Box::pin(async move { Err(FetchError::unavailable("no profile endpoint")) })
        }
    }

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).expect("ticker should parse")
    }

    fn range() -> FetchRange {
        let start = TradingDate::parse("2024-01-02").expect("date should parse");
        let end = TradingDate::parse("2024-03-29").expect("date should parse");
        FetchRange::new(start, Some(end)).expect("range should be valid")
    }

    fn live_series(symbol: &str, rows: usize) -> PriceSeries {
        let records = (0..rows)
            .map(|i| {
                let date = TradingDate::parse(&format!("2024-03-{:02}", i + 1))
                    .expect("date should parse");
                PriceRecord::new(date, None, None, None, 100.0 + i as f64, None, None)
                    .expect("record should be valid")
            })
            .collect();
        PriceSeries::new(ticker(symbol), records).expect("series should build")
    }

    fn pipeline(source: Arc<dyn MarketDataSource>) -> FetchPipeline {
        FetchPipeline::with_policy(source, FetchPolicy::without_delays())
    }

    #[test]
    fn invalid_ticker_never_reaches_the_source() {
        let source = Arc::new(ScriptedSource::always(FetchError::unavailable("down")));
        let result = block_on(pipeline(source.clone()).fetch_ticker("appl!", range()));

        let error = result.expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::InvalidTicker);
        assert!(source.calls().is_empty());
    }

    #[test]
    fn exact_range_success_is_live_with_no_warnings() {
        let source = Arc::new(ScriptedSource::sequence(
            vec![Ok(live_series("AAPL", 5))],
            FetchError::unavailable("down"),
        ));
        let result = block_on(pipeline(source.clone()).fetch_ticker("AAPL", range()));

        let success = result.expect("must succeed");
        assert_eq!(success.origin, DataOrigin::Live);
        assert_eq!(success.served_window, None);
        assert!(success.warnings.is_empty());
        assert!(success.errors.is_empty());
        assert_eq!(source.calls().len(), 1);
        assert!(matches!(source.calls()[0].span, QuerySpan::Range { .. }));
    }

    #[test]
    fn rate_limiting_gets_exactly_three_attempts_per_span() {
        let source = Arc::new(ScriptedSource::always(FetchError::rate_limited("throttled")));
        let result = block_on(pipeline(source.clone()).fetch_ticker("ZZZZ", range()));

        let success = result.expect("sample fallback must succeed");
        assert_eq!(success.origin, DataOrigin::Sample);

        // 3 attempts at the range, then 3 at each of the 5 windows.
        let calls = source.calls();
        assert_eq!(calls.len(), 18);
        assert!(calls[..3]
            .iter()
            .all(|call| matches!(call.span, QuerySpan::Range { .. })));
        assert!(matches!(
            calls[3].span,
            QuerySpan::Window(LookbackWindow::FiveYears)
        ));
        assert!(matches!(
            calls[17].span,
            QuerySpan::Window(LookbackWindow::ThreeMonths)
        ));
    }

    #[test]
    fn empty_responses_escalate_without_in_place_retries() {
        let source = Arc::new(ScriptedSource::sequence(
            vec![
                Err(FetchError::empty_or_malformed("empty table")),
                Err(FetchError::empty_or_malformed("empty table")),
                Ok(live_series("AAPL", 4)),
            ],
            FetchError::unavailable("down"),
        ));
        let result = block_on(pipeline(source.clone()).fetch_ticker("AAPL", range()));

        let success = result.expect("must succeed");
        assert_eq!(success.origin, DataOrigin::Live);
        assert_eq!(success.served_window, Some(LookbackWindow::TwoYears));
        assert_eq!(success.errors.len(), 2);
        assert_eq!(
            success.warnings,
            vec![String::from(
                "requested range unavailable; serving lookback window 2y"
            )]
        );

        // One call per span: range, 5y, then the winning 2y.
        assert_eq!(source.calls().len(), 3);
    }

    #[test]
    fn undersized_series_fails_the_gate_and_escalates() {
        let source = Arc::new(ScriptedSource::sequence(
            vec![Ok(live_series("AAPL", 1)), Ok(live_series("AAPL", 3))],
            FetchError::unavailable("down"),
        ));
        let result = block_on(pipeline(source.clone()).fetch_ticker("AAPL", range()));

        let success = result.expect("must succeed");
        assert_eq!(success.served_window, Some(LookbackWindow::FiveYears));
        assert_eq!(success.series.len(), 3);
        assert_eq!(source.calls().len(), 2);
    }

    #[test]
    fn disabled_sample_fallback_surfaces_unavailable() {
        let source = Arc::new(ScriptedSource::always(FetchError::unavailable("down")));
        let mut policy = FetchPolicy::without_delays();
        policy.sample_fallback = false;
        let pipeline = FetchPipeline::with_policy(source, policy);

        let error = block_on(pipeline.fetch_ticker("AAPL", range())).expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::NetworkUnavailable);
    }

    #[test]
    fn profile_falls_back_to_the_sample_catalog() {
        let source = Arc::new(ScriptedSource::always(FetchError::unavailable("down")));
        let (profile, origin) =
            block_on(pipeline(source).profile(&ticker("AAPL"))).expect("must fall back");

        assert_eq!(origin, DataOrigin::Sample);
        assert_eq!(profile.name, "Apple Inc.");
    }

    fn block_on<F>(future: F) -> F::Output
    where
        F: Future,
    {
        let waker = noop_waker();
        let mut context = Context::from_waker(&waker);
        let mut future = std::pin::pin!(future);

        loop {
            match future.as_mut().poll(&mut context) {
                Poll::Ready(output) => return output,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn noop_waker() -> Waker {
        // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
        unsafe { Waker::from_raw(noop_raw_waker()) }
    }

    fn noop_raw_waker() -> RawWaker {
        RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
    }

    unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
        noop_raw_waker()
    }

    unsafe fn noop_raw_waker_wake(_: *const ()) {}

    unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

    unsafe fn noop_raw_waker_drop(_: *const ()) {}

    const NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
        noop_raw_waker_clone,
        noop_raw_waker_wake,
        noop_raw_waker_wake_by_ref,
        noop_raw_waker_drop,
    );
}
