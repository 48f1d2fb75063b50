/// Arithmetic mean of every volume in the supplied window; 0 when empty.
pub fn average_volume(volumes: &[f64]) -> f64 {
    if volumes.is_empty() {
        return 0.0;
    }
    volumes.iter().sum::<f64>() / volumes.len() as f64
}

/// Population standard deviation; 0 when empty.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Standard deviation of bar-to-bar percent returns.
/// Returns 0 with fewer than two closes or a non-positive close.
pub fn volatility(closes: &[f64]) -> f64 {
    if closes.len() < 2 || closes.iter().any(|&c| c <= 0.0) {
        return 0.0;
    }
    let returns: Vec<f64> = closes
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect();
    std_dev(&returns)
}
