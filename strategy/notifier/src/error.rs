use std::path::PathBuf;

use crate::types::Metric;

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("ticker fetch failed: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("malformed snapshot record at {}:{line}: {source}", .path.display())]
    MalformedSnapshot {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("coin with id {0} does not exist")]
    CoinNotFound(String),

    #[error("coin {id} has no usable {field}")]
    InvalidReading { id: String, field: &'static str },

    #[error("percent change of {metric} for {id} is undefined against a zero or missing baseline")]
    UndefinedPercentChange { id: String, metric: Metric },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NotifierError>;
