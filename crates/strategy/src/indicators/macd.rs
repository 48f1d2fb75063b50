use serde::Serialize;

use super::ema::ema_series;

/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// Computes: MACD line = EMA(fast) − EMA(slow), Signal = EMA(macd_line, signal_period),
/// Histogram = MACD − Signal, all pointwise over the full series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdIndicator {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

/// Crossover of the MACD line against the signal line on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdSignal {
    Bullish, // MACD crossed above signal line
    Bearish, // MACD crossed below signal line
    Neutral, // No crossover on this bar
}

/// One bar's MACD triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Full MACD output, aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(
            fast < slow,
            "MACD fast period must be less than slow period"
        );
        Self { fast, slow, signal }
    }

    /// Compute the MACD series from close prices (oldest first).
    ///
    /// With fewer than `slow` closes every value is zero; callers get a
    /// well-formed series of the right length instead of an error.
    pub fn compute(&self, closes: &[f64]) -> MacdSeries {
        if closes.len() < self.slow {
            return MacdSeries::zeros(closes.len());
        }

        let fast = ema_series(closes, self.fast);
        let slow = ema_series(closes, self.slow);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_series(&macd, self.signal);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdSeries { macd, signal, histogram }
    }
}

impl MacdSeries {
    pub fn zeros(len: usize) -> Self {
        Self {
            macd: vec![0.0; len],
            signal: vec![0.0; len],
            histogram: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.macd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<MacdValue> {
        Some(MacdValue {
            macd: *self.macd.get(index)?,
            signal: *self.signal.get(index)?,
            histogram: *self.histogram.get(index)?,
        })
    }

    /// Latest triple; zero-valued for an empty series.
    pub fn latest(&self) -> MacdValue {
        self.len()
            .checked_sub(1)
            .and_then(|i| self.value(i))
            .unwrap_or_default()
    }

    /// Crossover between bar `index - 1` and bar `index`.
    pub fn crossover(&self, index: usize) -> MacdSignal {
        if index == 0 || index >= self.len() {
            return MacdSignal::Neutral;
        }
        let prev_macd = self.macd[index - 1];
        let curr_macd = self.macd[index];
        let prev_sig = self.signal[index - 1];
        let curr_sig = self.signal[index];

        if prev_macd <= prev_sig && curr_macd > curr_sig {
            MacdSignal::Bullish
        } else if prev_macd >= prev_sig && curr_macd < curr_sig {
            MacdSignal::Bearish
        } else {
            MacdSignal::Neutral
        }
    }

    /// MACD − signal gap at `index`.
    pub fn gap(&self, index: usize) -> f64 {
        self.macd[index] - self.signal[index]
    }
}
