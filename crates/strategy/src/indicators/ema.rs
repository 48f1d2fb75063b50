/// Exponential moving average over the whole sequence.
///
/// Seeded with the first input (`ema[0] == values[0]`), not with an SMA, so
/// the recurrence `ema[i] = v[i] * k + ema[i-1] * (1 - k)`, `k = 2 / (period + 1)`,
/// is defined from index 0. Reference outputs depend on this seeding.
/// A zero period is treated as 1.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period.max(1) as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev = first;
    result.push(prev);
    for &value in &values[1..] {
        prev = value * k + prev * (1.0 - k);
        result.push(prev);
    }
    result
}

/// Latest EMA value, or `None` for an empty sequence.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}
