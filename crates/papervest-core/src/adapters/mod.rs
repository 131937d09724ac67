//! Source adapters implementing [`MarketDataSource`](crate::MarketDataSource).

mod chart_api;

pub use chart_api::ChartApiSource;
