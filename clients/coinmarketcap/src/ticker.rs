use std::sync::Arc;

use tracing::debug;

use crate::config::CoinMarketCapClientConfig;
use crate::types::Ticker;

/// Client for the coinmarketcap ticker API.
pub struct CoinMarketCapClient {
    client: Arc<reqwest::Client>,
    ticker_url: String,
}

impl CoinMarketCapClient {
    /// Creates a new client. Request timeouts are whatever `client` was built with.
    pub fn new(client: Arc<reqwest::Client>, config: CoinMarketCapClientConfig) -> Self {
        Self {
            client,
            ticker_url: config.ticker_url,
        }
    }

    pub fn ticker_url(&self) -> &str {
        &self.ticker_url
    }

    /// Fetches the full ticker listing. Non-2xx responses are returned as errors.
    pub async fn get_ticker(&self) -> Result<Vec<Ticker>, reqwest::Error> {
        let tickers: Vec<Ticker> = self
            .client
            .get(&self.ticker_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(url = %self.ticker_url, count = tickers.len(), "fetched ticker");
        Ok(tickers)
    }
}
