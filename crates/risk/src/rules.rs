use serde::{Deserialize, Serialize};

use common::Direction;

/// Unleveraged price move in percent, signed so that a gain for the
/// position's direction is positive.
pub fn spot_move_pct(direction: Direction, entry_price: f64, price: f64) -> f64 {
    if entry_price <= 0.0 {
        return 0.0;
    }
    match direction {
        Direction::Long => (price - entry_price) / entry_price * 100.0,
        Direction::Short => (entry_price - price) / entry_price * 100.0,
    }
}

/// Leverage-adjusted percent return. Leverage scales linearly; margin calls
/// and liquidation are not modelled.
pub fn profit_percent(direction: Direction, entry_price: f64, exit_price: f64, leverage: f64) -> f64 {
    spot_move_pct(direction, entry_price, exit_price) * leverage
}

/// Which protective rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    StopLoss,
    TakeProfit,
}

/// Price-move thresholds that close a position, both in percent of the
/// entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitRules {
    /// Maximum adverse spot move before the position is closed (e.g. 10.0 = 10%).
    pub stop_loss_pct: f64,
    /// Favourable spot move that closes the position, if any.
    #[serde(default)]
    pub take_profit_pct: Option<f64>,
}

impl ExitRules {
    pub fn stop_loss(stop_loss_pct: f64) -> Self {
        Self {
            stop_loss_pct,
            take_profit_pct: None,
        }
    }

    pub fn with_take_profit(mut self, take_profit_pct: f64) -> Self {
        self.take_profit_pct = Some(take_profit_pct);
        self
    }

    /// Evaluate the rules against the current price. Stop-loss wins when
    /// both thresholds are somehow crossed.
    pub fn check(&self, direction: Direction, entry_price: f64, price: f64) -> Option<ExitTrigger> {
        let pnl_pct = spot_move_pct(direction, entry_price, price);
        if pnl_pct <= -self.stop_loss_pct {
            return Some(ExitTrigger::StopLoss);
        }
        match self.take_profit_pct {
            Some(target) if pnl_pct >= target => Some(ExitTrigger::TakeProfit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_moves_are_mirrored() {
        assert!((spot_move_pct(Direction::Long, 100.0, 110.0) - 10.0).abs() < 1e-12);
        assert!((spot_move_pct(Direction::Short, 100.0, 110.0) + 10.0).abs() < 1e-12);
    }

    #[test]
    fn leverage_scales_profit() {
        let spot = profit_percent(Direction::Long, 100.0, 105.0, 1.0);
        let levered = profit_percent(Direction::Long, 100.0, 105.0, 5.0);
        assert!((levered - spot * 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_entry_price_yields_zero_move() {
        assert_eq!(spot_move_pct(Direction::Long, 0.0, 10.0), 0.0);
    }

    #[test]
    fn stop_loss_triggers_at_threshold() {
        let rules = ExitRules::stop_loss(10.0);
        assert_eq!(rules.check(Direction::Long, 100.0, 90.0), Some(ExitTrigger::StopLoss));
        assert_eq!(rules.check(Direction::Long, 100.0, 90.5), None);
        assert_eq!(rules.check(Direction::Short, 100.0, 110.0), Some(ExitTrigger::StopLoss));
    }

    #[test]
    fn take_profit_is_optional() {
        let rules = ExitRules::stop_loss(10.0);
        assert_eq!(rules.check(Direction::Long, 100.0, 200.0), None);

        let rules = rules.with_take_profit(25.0);
        assert_eq!(rules.check(Direction::Long, 100.0, 125.0), Some(ExitTrigger::TakeProfit));
        assert_eq!(rules.check(Direction::Short, 100.0, 75.0), Some(ExitTrigger::TakeProfit));
    }
}
