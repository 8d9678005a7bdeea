mod config;
mod ticker;
mod types;

pub use config::{CoinMarketCapClientConfig, DEFAULT_TICKER_URL};
pub use ticker::CoinMarketCapClient;
pub use types::Ticker;
