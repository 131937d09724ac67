//! Live adapter for the chart data API.
//!
//! Maps transport and payload conditions onto the fetch error taxonomy:
//! HTTP 429 becomes `RateLimited`, unusable payloads become
//! `EmptyOrMalformedResponse`, connectivity failures become
//! `NetworkUnavailable`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::decode::decode_history;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider::{FetchError, HistoryQuery, MarketDataSource, QuerySpan};
use crate::{CompanyProfile, PriceSeries, Ticker};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// HTTP source for daily history and company profiles.
pub struct ChartApiSource {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl ChartApiSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(base_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            http_client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn history_url(&self, query: &HistoryQuery) -> String {
        let symbol = urlencoding::encode(query.ticker.as_str());
        match query.span {
            QuerySpan::Range { start, end } => format!(
                "{}/v1/history?symbol={}&start={}&end={}",
                self.base_url, symbol, start, end
            ),
            QuerySpan::Window(window) => format!(
                "{}/v1/history?symbol={}&range={}",
                self.base_url,
                symbol,
                window.as_str()
            ),
        }
    }

    fn profile_url(&self, ticker: &Ticker) -> String {
        format!(
            "{}/v1/profile?symbol={}",
            self.base_url,
            urlencoding::encode(ticker.as_str())
        )
    }

    async fn execute(&self, url: String) -> Result<String, FetchError> {
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| FetchError::unavailable(format!("transport error: {}", e.message())))?;

        if response.is_rate_limited() {
            return Err(FetchError::rate_limited("upstream returned status 429"));
        }
        if !response.is_success() {
            return Err(FetchError::unavailable(format!(
                "upstream returned status {}",
                response.status
            )));
        }
        if response.body.trim().is_empty() {
            return Err(FetchError::empty_or_malformed(
                "upstream returned an empty body",
            ));
        }

        Ok(response.body)
    }

    async fn fetch_history(&self, query: HistoryQuery) -> Result<PriceSeries, FetchError> {
        let body = self.execute(self.history_url(&query)).await?;
        decode_history(&query.ticker, &body)
            .map_err(|e| FetchError::empty_or_malformed(e.to_string()))
    }

    async fn fetch_profile(&self, ticker: Ticker) -> Result<CompanyProfile, FetchError> {
        let body = self.execute(self.profile_url(&ticker)).await?;

        let payload: ProfilePayload = serde_json::from_str(&body)
            .map_err(|e| FetchError::empty_or_malformed(format!("profile payload: {e}")))?;

        let name = payload
            .long_name
            .unwrap_or_else(|| ticker.as_str().to_owned());

        CompanyProfile::new(
            ticker,
            name,
            payload.sector,
            payload.industry,
            payload.market_cap,
            payload.dividend_yield,
            payload.beta,
            payload.pe_ratio,
            payload.website,
            payload.country,
            payload.currency,
        )
        .map_err(|e| FetchError::empty_or_malformed(format!("profile payload: {e}")))
    }
}

impl MarketDataSource for ChartApiSource {
    fn id(&self) -> &'static str {
        "chart_api"
    }

    fn history<'a>(
        &'a self,
        query: HistoryQuery,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_history(query).await })
    }

    fn profile<'a>(
        &'a self,
        ticker: Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<CompanyProfile, FetchError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_profile(ticker).await })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ProfilePayload {
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<f64>,
    #[serde(rename = "dividendYield", default)]
    dividend_yield: Option<f64>,
    #[serde(default)]
    beta: Option<f64>,
    #[serde(rename = "peRatio", default)]
    pe_ratio: Option<f64>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}
