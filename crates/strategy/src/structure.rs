//! Support/resistance detection and breakout retest zones.
//!
//! A level is a local extreme of the close series over a symmetric window of
//! `±lookback` bars, kept only if volume on that bar spikes above the series
//! average. Levels closer than `dedup_pct` to an already kept level are
//! dropped. Everything here is read-only over [`MarketData`].

use serde::{Deserialize, Serialize};

use crate::indicators::{average_volume, std_dev};
use crate::market::MarketData;

/// Number of trailing closes inspected for range compression.
pub const COMPRESSION_WINDOW: usize = 6;
/// Compression threshold as a fraction of the latest close.
pub const COMPRESSION_RATIO: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Level {
    pub price: f64,
    pub timestamp: i64,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureSnapshot {
    pub lookback: usize,
    /// Highest price first.
    pub resistance: Vec<Level>,
    /// Highest price first.
    pub support: Vec<Level>,
}

/// Band of broken resistance levels that price may come back to retest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetestZone {
    pub zone_low: f64,
    pub zone_high: f64,
    /// The level with the most recent breakout.
    pub breakout_level: Level,
    pub breakout_index: usize,
    /// Bars between the breakout and the last bar.
    pub breakout_age: usize,
    /// Percent move from the close before the breakout up to the level.
    pub breakout_volatility_pct: f64,
    /// Price has since fallen back below the breakout level.
    pub false_breakout: bool,
    /// Distance from the last close down to the nearest support below it, in percent.
    pub nearest_support_distance_pct: Option<f64>,
    /// Trailing closes are tightening into a narrow range.
    pub compressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureDetector {
    pub lookback: usize,
    pub volume_multiplier: f64,
    /// Relative distance, in percent, under which two levels are duplicates.
    pub dedup_pct: f64,
}

impl Default for StructureDetector {
    fn default() -> Self {
        Self {
            lookback: 5,
            volume_multiplier: 1.5,
            dedup_pct: 2.0,
        }
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    High,
    Low,
}

impl StructureDetector {
    pub fn snapshot(&self, data: &MarketData) -> StructureSnapshot {
        StructureSnapshot {
            lookback: self.lookback,
            resistance: self.levels(data, Extreme::High),
            support: self.levels(data, Extreme::Low),
        }
    }

    /// Scan for resistance that price has closed above since it formed.
    /// Returns `None` when no confirmed resistance has been broken.
    pub fn retest_zone(&self, data: &MarketData) -> Option<RetestZone> {
        let closes = data.closes();
        let &current = closes.last()?;
        let snapshot = self.snapshot(data);

        let broken: Vec<(Level, usize)> = snapshot
            .resistance
            .iter()
            .filter_map(|level| {
                (level.index + 1..closes.len())
                    .find(|&j| closes[j] > level.price)
                    .map(|j| (*level, j))
            })
            .collect();

        let zone_low = broken.iter().map(|(l, _)| l.price).reduce(f64::min)?;
        let zone_high = broken.iter().map(|(l, _)| l.price).reduce(f64::max)?;
        // Latest breakout wins; among equal bars the higher level, which sorts first.
        let (level, breakout_index) = broken
            .iter()
            .copied()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })?;

        let pre_breakout = closes[breakout_index - 1];
        let breakout_volatility_pct = if pre_breakout > 0.0 {
            (level.price - pre_breakout) / pre_breakout * 100.0
        } else {
            0.0
        };

        let nearest_support_distance_pct = snapshot
            .support
            .iter()
            .filter(|s| s.price < current)
            .map(|s| (current - s.price) / current * 100.0)
            .reduce(f64::min);

        Some(RetestZone {
            zone_low,
            zone_high,
            breakout_level: level,
            breakout_index,
            breakout_age: closes.len() - 1 - breakout_index,
            breakout_volatility_pct,
            false_breakout: current < level.price,
            nearest_support_distance_pct,
            compressed: is_compressed(closes),
        })
    }

    fn levels(&self, data: &MarketData, extreme: Extreme) -> Vec<Level> {
        let closes = data.closes();
        let volumes = data.volumes();
        let threshold = volumes.map(|v| average_volume(v) * self.volume_multiplier);

        let candidates = local_extremes(closes, self.lookback, extreme)
            .into_iter()
            .filter(|&i| match (volumes, threshold) {
                // No volume data, or an all-zero average: confirmation is skipped.
                (Some(v), Some(t)) if t > 0.0 => v[i] > t,
                _ => true,
            })
            .map(|i| Level {
                price: closes[i],
                timestamp: data.timestamp(i),
                index: i,
            })
            .collect();

        dedupe_levels(candidates, self.dedup_pct)
    }
}

/// Sort levels by price, highest first, and drop any level within
/// `tolerance_pct` percent of a level already kept.
pub fn dedupe_levels(mut levels: Vec<Level>, tolerance_pct: f64) -> Vec<Level> {
    levels.sort_by(|a, b| b.price.total_cmp(&a.price));
    let mut kept: Vec<Level> = Vec::with_capacity(levels.len());
    for level in levels {
        let duplicate = kept
            .iter()
            .any(|k| (k.price - level.price).abs() / k.price * 100.0 < tolerance_pct);
        if !duplicate {
            kept.push(level);
        }
    }
    kept
}

fn local_extremes(closes: &[f64], lookback: usize, extreme: Extreme) -> Vec<usize> {
    if closes.len() < 2 * lookback + 1 {
        return Vec::new();
    }
    (lookback..closes.len() - lookback)
        .filter(|&i| {
            let window = &closes[i - lookback..=i + lookback];
            match extreme {
                Extreme::High => window.iter().all(|&c| c <= closes[i]),
                Extreme::Low => window.iter().all(|&c| c >= closes[i]),
            }
        })
        .collect()
}

fn is_compressed(closes: &[f64]) -> bool {
    let Some(&last) = closes.last() else {
        return false;
    };
    if closes.len() < COMPRESSION_WINDOW {
        return false;
    }
    std_dev(&closes[closes.len() - COMPRESSION_WINDOW..]) < COMPRESSION_RATIO * last
}
