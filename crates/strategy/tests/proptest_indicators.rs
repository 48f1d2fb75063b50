use proptest::prelude::*;
use strategy::indicators::{ema_series, MacdIndicator, RsiIndicator};

fn closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..100_000.0f64, 1..max_len)
}

proptest! {
    /// The EMA series starts at the first input value for any period.
    #[test]
    fn ema_is_seeded_with_first_value(values in closes(200), period in 1usize..60) {
        let series = ema_series(&values, period);
        prop_assert_eq!(series.len(), values.len());
        prop_assert_eq!(series[0], values[0]);
    }

    /// RSI stays within [0, 100] whenever it is defined.
    #[test]
    fn rsi_is_bounded(values in closes(200), period in 2usize..30) {
        let rsi = RsiIndicator::new(period, 70.0, 30.0);
        if let Some(value) = rsi.compute(&values) {
            prop_assert!((0.0..=100.0).contains(&value), "rsi {value}");
        }
        for value in rsi.series(&values).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    /// MACD series always match the input length and are finite.
    #[test]
    fn macd_series_are_aligned_and_finite(values in closes(150)) {
        let macd = MacdIndicator::default().compute(&values);
        prop_assert_eq!(macd.len(), values.len());
        prop_assert!(macd.macd.iter().chain(&macd.signal).chain(&macd.histogram).all(|v| v.is_finite()));
    }
}
