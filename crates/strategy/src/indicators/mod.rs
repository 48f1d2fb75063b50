//! Pure indicator functions over ordered close (or volume) sequences.
//!
//! Nothing here keeps state between calls: the same input always yields
//! bit-identical output. Insufficient data is reported through a documented
//! sentinel (`None`, an empty vector, or a zero-valued series), never a
//! partially computed value.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod volume;

pub use atr::AtrIndicator;
pub use ema::{ema, ema_series};
pub use macd::{MacdIndicator, MacdSeries, MacdSignal, MacdValue};
pub use rsi::RsiIndicator;
pub use sma::{sma, sma_series};
pub use snapshot::IndicatorSnapshot;
pub use volume::{average_volume, std_dev, volatility};
