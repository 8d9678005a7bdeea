use serde::{Deserialize, Serialize};

/// Public v1 ticker listing every coin (`limit=0`).
pub const DEFAULT_TICKER_URL: &str = "https://api.coinmarketcap.com/v1/ticker/?limit=0";

/// Configuration for CoinMarketCapClient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarketCapClientConfig {
    /// Full URL of the ticker endpoint
    pub ticker_url: String,
}

impl Default for CoinMarketCapClientConfig {
    fn default() -> Self {
        Self {
            ticker_url: DEFAULT_TICKER_URL.to_string(),
        }
    }
}
