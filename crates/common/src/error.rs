use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{series} series is empty")]
    EmptySeries { series: &'static str },

    #[error(
        "{series} timestamps must be strictly ascending: index {index} has {current} after {previous}"
    )]
    NonMonotonicTimestamp {
        series: &'static str,
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("{series} value at index {index} is not a finite number: {value}")]
    NonFiniteValue {
        series: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Invalid backtest configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown strategy: '{0}'")]
    UnknownStrategy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy task failed: {0}")]
    Task(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
