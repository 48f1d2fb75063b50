use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Direction, Error, Result};

/// Which trade directions a run simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectionFilter {
    Long,
    Short,
    #[default]
    Both,
}

impl DirectionFilter {
    pub fn allows(self, direction: Direction) -> bool {
        match self {
            DirectionFilter::Both => true,
            DirectionFilter::Long => direction == Direction::Long,
            DirectionFilter::Short => direction == Direction::Short,
        }
    }

    pub fn directions(self) -> &'static [Direction] {
        match self {
            DirectionFilter::Long => &[Direction::Long],
            DirectionFilter::Short => &[Direction::Short],
            DirectionFilter::Both => &Direction::BOTH,
        }
    }

    /// The single requested direction, if the filter names one.
    pub fn single(self) -> Option<Direction> {
        match self {
            DirectionFilter::Long => Some(Direction::Long),
            DirectionFilter::Short => Some(Direction::Short),
            DirectionFilter::Both => None,
        }
    }
}

impl FromStr for DirectionFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(DirectionFilter::Long),
            "short" => Ok(DirectionFilter::Short),
            "both" => Ok(DirectionFilter::Both),
            other => Err(Error::InvalidConfig(format!(
                "direction must be 'long', 'short' or 'both', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for DirectionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectionFilter::Long => write!(f, "long"),
            DirectionFilter::Short => write!(f, "short"),
            DirectionFilter::Both => write!(f, "both"),
        }
    }
}

/// Settings shared by every strategy in one backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub direction: DirectionFilter,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    /// Starting capital. When present, trades carry position sizing fields.
    #[serde(default)]
    pub amount: Option<f64>,
}

fn default_leverage() -> f64 {
    1.0
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            direction: DirectionFilter::Both,
            leverage: default_leverage(),
            amount: None,
        }
    }
}

impl BacktestConfig {
    pub fn new(direction: DirectionFilter, leverage: f64) -> Self {
        Self {
            direction,
            leverage,
            amount: None,
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.leverage.is_finite() && self.leverage > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "leverage must be a positive number, got {}",
                self.leverage
            )));
        }
        if let Some(amount) = self.amount {
            if !(amount.is_finite() && amount > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "amount must be a positive number, got {amount}"
                )));
            }
        }
        Ok(())
    }
}
