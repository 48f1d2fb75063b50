/// Arithmetic mean of the last `period` values.
/// Returns `None` if `period` is zero or there are fewer than `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Rolling SMA aligned with `values`; the first `period - 1` slots are NaN.
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }
    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;
    for i in period..values.len() {
        sum = sum - values[i - period] + values[i];
        result[i] = sum / period as f64;
    }
    result
}
