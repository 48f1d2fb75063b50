/// Average True Range with Wilder smoothing.
///
/// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`,
/// with `high - low` for the first bar. The first ATR is the mean of the
/// first `period` true ranges; after that
/// `atr[i] = (atr[i-1] * (period - 1) + tr[i]) / period`.
/// The output is padded at the head with the first ATR so it has the same
/// length as the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtrIndicator {
    pub period: usize,
}

impl Default for AtrIndicator {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl AtrIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self { period }
    }

    /// Returns an empty vector when fewer than `period` bars are supplied.
    /// Slices of unequal length are truncated to the shortest.
    pub fn compute(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let n = high.len().min(low.len()).min(close.len());
        if n < self.period {
            return Vec::new();
        }

        let tr: Vec<f64> = (0..n)
            .map(|i| {
                let range = high[i] - low[i];
                if i == 0 {
                    return range;
                }
                let prev_close = close[i - 1];
                range
                    .max((high[i] - prev_close).abs())
                    .max((low[i] - prev_close).abs())
            })
            .collect();

        let period = self.period as f64;
        let first = tr[..self.period].iter().sum::<f64>() / period;
        let mut result = vec![first; self.period];
        let mut prev = first;
        for &range in &tr[self.period..] {
            prev = (prev * (period - 1.0) + range) / period;
            result.push(prev);
        }
        result
    }

    /// ATR for a close-only series, where each bar's high and low equal its close.
    pub fn compute_closes(&self, close: &[f64]) -> Vec<f64> {
        self.compute(close, close, close)
    }
}
