use serde::Serialize;

use super::{
    ema, sma, volatility, AtrIndicator, MacdIndicator, MacdValue, RsiIndicator,
};

pub const SNAPSHOT_MA_PERIOD: usize = 20;

/// Read-only indicator values at one bar, computed from the closes up to and
/// including that bar only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub index: usize,
    pub price: f64,
    pub sma: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: MacdValue,
    pub atr: Option<f64>,
    pub volatility: f64,
}

impl IndicatorSnapshot {
    /// `None` when `index` is outside `closes`.
    pub fn at(closes: &[f64], index: usize) -> Option<Self> {
        let history = closes.get(..=index)?;
        let macd = MacdIndicator::default().compute(history).latest();
        Self::with_macd(closes, index, macd)
    }

    /// Like [`at`](Self::at), with the default MACD triple at `index` already
    /// known. MACD is causal, so a value read off a series computed over all
    /// of `closes` is the one `at` would compute.
    pub fn with_macd(closes: &[f64], index: usize, macd: MacdValue) -> Option<Self> {
        let history = closes.get(..=index)?;
        Some(Self {
            index,
            price: history[index],
            sma: sma(history, SNAPSHOT_MA_PERIOD),
            ema: ema(history, SNAPSHOT_MA_PERIOD),
            rsi: RsiIndicator::default().compute(history),
            macd,
            atr: AtrIndicator::default().compute_closes(history).last().copied(),
            volatility: volatility(history),
        })
    }
}
