use std::borrow::Cow;
use std::sync::OnceLock;

use common::{PriceSeries, VolumeSeries};

use crate::indicators::{IndicatorSnapshot, MacdIndicator, MacdSeries, MacdValue};

/// Read-only view of one market that every strategy in a run shares.
///
/// Volumes are aligned to price bars once, up front. The default MACD(12,26,9)
/// series is memoized on first use; any other parameter set is computed on
/// demand. Memoization never changes values, and the cell is `Sync`, so one
/// instance can be read from several threads at once.
#[derive(Debug)]
pub struct MarketData {
    prices: PriceSeries,
    closes: Vec<f64>,
    volumes: Vec<f64>,
    default_macd: OnceLock<MacdSeries>,
}

impl MarketData {
    pub fn new(prices: PriceSeries, volumes: Option<&VolumeSeries>) -> Self {
        let volumes = volumes.map(|v| v.align_to(&prices)).unwrap_or_default();
        Self {
            closes: prices.closes(),
            prices,
            volumes,
            default_macd: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn prices(&self) -> &PriceSeries {
        &self.prices
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Volume per price bar, or `None` when the run has no volume series.
    pub fn volumes(&self) -> Option<&[f64]> {
        (!self.volumes.is_empty()).then_some(self.volumes.as_slice())
    }

    pub fn timestamp(&self, index: usize) -> i64 {
        self.prices.get(index).map(|p| p.timestamp).unwrap_or_default()
    }

    pub fn macd(&self, indicator: MacdIndicator) -> Cow<'_, MacdSeries> {
        if indicator == MacdIndicator::default() {
            Cow::Borrowed(
                self.default_macd
                    .get_or_init(|| indicator.compute(&self.closes)),
            )
        } else {
            Cow::Owned(indicator.compute(&self.closes))
        }
    }

    /// Indicator values at `index` from the bars up to it. Reads MACD off the
    /// memoized default series instead of recomputing it per call.
    pub fn snapshot(&self, index: usize) -> Option<IndicatorSnapshot> {
        let indicator = MacdIndicator::default();
        // A prefix shorter than the slow period has an all-zero MACD.
        let macd = if index + 1 < indicator.slow {
            MacdValue::default()
        } else {
            self.macd(indicator).value(index)?
        };
        IndicatorSnapshot::with_macd(&self.closes, index, macd)
    }
}
