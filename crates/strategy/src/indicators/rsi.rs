/// RSI (Relative Strength Index) indicator.
///
/// Average gain and average loss are plain means over the most recent
/// `period` price changes (a fixed window of `period + 1` closes); they are
/// not smoothed across the rest of the history.
/// Returns `None` until at least `period + 1` closes are available.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiIndicator {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(14, 70.0, 30.0)
    }
}

impl RsiIndicator {
    pub fn new(period: usize, overbought: f64, oversold: f64) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period, overbought, oversold }
    }

    /// Compute RSI from a slice of close prices (oldest first).
    /// Returns `None` if there are fewer than `period + 1` values.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.period + 1 {
            return None;
        }
        Some(window_rsi(&closes[closes.len() - self.period - 1..]))
    }

    /// RSI at every bar, each computed over the window ending at that bar.
    /// Bars before index `period` are `None`.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        (0..closes.len())
            .map(|i| {
                (i >= self.period).then(|| window_rsi(&closes[i - self.period..=i]))
            })
            .collect()
    }
}

fn window_rsi(window: &[f64]) -> f64 {
    let period = (window.len() - 1) as f64;
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    let avg_gain = gains / period;
    let avg_loss = losses / period;
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_returns_none_when_insufficient_data() {
        let rsi = RsiIndicator::new(14, 70.0, 30.0);
        // Need at least period+1 = 15 values
        let prices = vec![100.0; 14];
        assert!(rsi.compute(&prices).is_none());
    }

    #[test]
    fn rsi_returns_some_with_sufficient_data() {
        let rsi = RsiIndicator::new(14, 70.0, 30.0);
        // 15 values: exactly period+1
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert!(rsi.compute(&prices).is_some());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let rsi = RsiIndicator::new(3, 70.0, 30.0);
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let value = rsi.compute(&prices).unwrap();
        assert!((value - 100.0).abs() < 1e-6, "Expected ~100, got {value}");
    }

    #[test]
    fn rsi_flat_prices_returns_100() {
        // No losses at all, so the zero-loss sentinel applies.
        let rsi = RsiIndicator::new(3, 70.0, 30.0);
        assert_eq!(rsi.compute(&[5.0, 5.0, 5.0, 5.0]), Some(100.0));
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = RsiIndicator::new(3, 70.0, 30.0);
        let prices = vec![14.0, 13.0, 12.0, 11.0, 10.0];
        let value = rsi.compute(&prices).unwrap();
        assert!((value - 0.0).abs() < 1e-6, "Expected ~0, got {value}");
    }

    #[test]
    fn rsi_uses_only_the_latest_window() {
        // An old crash outside the window must not affect the value.
        let rsi = RsiIndicator::new(2, 70.0, 30.0);
        let value = rsi.compute(&[100.0, 10.0, 11.0, 10.0]).unwrap();
        // changes in window: +1, -1 → RS = 1 → RSI 50
        assert!((value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn series_matches_point_computation() {
        let rsi = RsiIndicator::new(3, 70.0, 30.0);
        let prices = vec![10.0, 11.0, 10.5, 12.0, 11.0, 11.5];
        let series = rsi.series(&prices);
        assert_eq!(series.len(), prices.len());
        assert!(series[..3].iter().all(Option::is_none));
        for i in 3..prices.len() {
            assert_eq!(series[i], rsi.compute(&prices[..=i]));
        }
    }
}
