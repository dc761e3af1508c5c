//! TradeStation v3 bar-chart endpoint.

pub mod provider;

pub use provider::{
    MARKET_DATA_BASE_URL, TradeStationConnector, TradeStationProvider, bar_chart_url, parse_chunk,
};
