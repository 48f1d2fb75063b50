use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// One bar of a price series: epoch-millisecond timestamp and close price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

impl From<(i64, f64)> for PricePoint {
    fn from((timestamp, price): (i64, f64)) -> Self {
        Self { timestamp, price }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub timestamp: i64,
    pub volume: f64,
}

impl From<(i64, f64)> for VolumePoint {
    fn from((timestamp, volume): (i64, f64)) -> Self {
        Self { timestamp, volume }
    }
}

/// An immutable, validated price series.
///
/// Construction enforces the caller contract: timestamps strictly ascending
/// and every price finite. Violations fail fast rather than letting a
/// strategy simulate against corrupt data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        validate("price", points.iter().map(|p| (p.timestamp, p.price)))?;
        Ok(Self { points })
    }

    /// Build a series from consecutive closes with a fixed bar spacing.
    pub fn from_closes(start_ms: i64, step_ms: i64, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint::new(start_ms + step_ms * i as i64, price))
            .collect();
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSeries {
    points: Vec<VolumePoint>,
}

impl VolumeSeries {
    pub fn new(points: Vec<VolumePoint>) -> Result<Self> {
        validate("volume", points.iter().map(|p| (p.timestamp, p.volume)))?;
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[VolumePoint] {
        &self.points
    }

    /// Map every price bar to the volume whose timestamp is nearest to it.
    ///
    /// Both series are sorted, so a single forward-moving cursor suffices.
    /// Equidistant neighbours resolve to the earlier volume point. Returns an
    /// empty vector when there are no volumes to align.
    pub fn align_to(&self, prices: &PriceSeries) -> Vec<f64> {
        if self.points.is_empty() {
            return Vec::new();
        }
        let mut cursor = 0;
        prices
            .points()
            .iter()
            .map(|bar| {
                while cursor + 1 < self.points.len()
                    && self.points[cursor + 1].timestamp.abs_diff(bar.timestamp)
                        < self.points[cursor].timestamp.abs_diff(bar.timestamp)
                {
                    cursor += 1;
                }
                self.points[cursor].volume
            })
            .collect()
    }
}

/// Historical market chart as delivered by the data provider:
/// `{ "prices": [[ms, price], ...], "total_volumes": [[ms, volume], ...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<(i64, f64)>,
    #[serde(default)]
    pub total_volumes: Vec<(i64, f64)>,
}

impl MarketChart {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate and split into a price series and an optional volume series.
    pub fn into_series(self) -> Result<(PriceSeries, Option<VolumeSeries>)> {
        if self.prices.is_empty() {
            return Err(Error::EmptySeries { series: "price" });
        }
        let prices = PriceSeries::new(self.prices.into_iter().map(PricePoint::from).collect())?;
        let volumes = if self.total_volumes.is_empty() {
            debug!(bars = prices.len(), "Market chart has no volumes");
            None
        } else {
            Some(VolumeSeries::new(
                self.total_volumes.into_iter().map(VolumePoint::from).collect(),
            )?)
        };
        Ok((prices, volumes))
    }
}

fn validate(series: &'static str, points: impl Iterator<Item = (i64, f64)>) -> Result<()> {
    let mut previous: Option<i64> = None;
    for (index, (timestamp, value)) in points.enumerate() {
        if !value.is_finite() {
            return Err(Error::NonFiniteValue { series, index, value });
        }
        if let Some(previous) = previous {
            if timestamp <= previous {
                return Err(Error::NonMonotonicTimestamp {
                    series,
                    index,
                    previous,
                    current: timestamp,
                });
            }
        }
        previous = Some(timestamp);
    }
    Ok(())
}
