pub mod config;
pub mod error;
pub mod series;
pub mod types;

pub use config::{BacktestConfig, DirectionFilter};
pub use error::{Error, Result};
pub use series::{MarketChart, PricePoint, PriceSeries, VolumePoint, VolumeSeries};
pub use types::*;
