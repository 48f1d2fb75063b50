use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Side of a simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Long, Direction::Short];

    pub fn entry_action(self) -> TradeAction {
        match self {
            Direction::Long => TradeAction::BuyToOpen,
            Direction::Short => TradeAction::SellToOpen,
        }
    }

    pub fn exit_action(self) -> TradeAction {
        match self {
            Direction::Long => TradeAction::SellToClose,
            Direction::Short => TradeAction::BuyToClose,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Order action implied by a trade's direction; never chosen independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeAction {
    BuyToOpen,
    SellToOpen,
    SellToClose,
    BuyToClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitReason {
    MacdCross,
    TrendFade,
    StopLossHit,
    RsiTarget,
    RsiExit,
    TimeExpiry,
    Fakeout,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExitReason::MacdCross => "macd-cross",
            ExitReason::TrendFade => "trend-fade",
            ExitReason::StopLossHit => "stop-loss-hit",
            ExitReason::RsiTarget => "rsi-target",
            ExitReason::RsiExit => "rsi-exit",
            ExitReason::TimeExpiry => "time-expiry",
            ExitReason::Fakeout => "fakeout",
        };
        write!(f, "{s}")
    }
}

/// The closed set of strategy families the engine knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    MacdCross,
    RsiReversal,
    Breakout,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::MacdCross,
        StrategyKind::RsiReversal,
        StrategyKind::Breakout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::MacdCross => "macd-cross",
            StrategyKind::RsiReversal => "rsi-reversal",
            StrategyKind::Breakout => "breakout",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macd" | "macd-cross" | "trend-cross" => Ok(StrategyKind::MacdCross),
            "rsi" | "rsi-reversal" | "oscillator-reversal" => Ok(StrategyKind::RsiReversal),
            "breakout" => Ok(StrategyKind::Breakout),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A closed simulated trade. All fields are fixed when the exit fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub strategy: StrategyKind,
    pub direction: Direction,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_timestamp: i64,
    pub exit_timestamp: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_action: TradeAction,
    pub exit_action: TradeAction,
    pub exit_reason: ExitReason,
    /// Leverage-adjusted return in percent.
    pub profit_percent: f64,
    pub spot_profit_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_profit_amount: Option<f64>,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_percent > 0.0
    }
}

/// How a result's `total_return` was accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnAccounting {
    /// Sum of per-trade percent returns.
    Simple,
    /// Growth of an account that reinvests every trade's outcome.
    Compounded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub strategy: StrategyKind,
    pub strategy_name: String,
    pub trades: Vec<Trade>,
    pub total_return: f64,
    pub win_rate: f64,
    pub accounting: ReturnAccounting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_balance: Option<f64>,
}

impl BacktestResult {
    pub fn empty(strategy: StrategyKind, accounting: ReturnAccounting) -> Self {
        Self {
            strategy,
            strategy_name: strategy.name().to_string(),
            trades: Vec::new(),
            total_return: 0.0,
            win_rate: 0.0,
            accounting,
            final_balance: None,
        }
    }

    pub fn simple(strategy: StrategyKind, trades: Vec<Trade>) -> Self {
        Self {
            total_return: sum_returns(&trades),
            win_rate: win_rate(&trades),
            trades,
            ..Self::empty(strategy, ReturnAccounting::Simple)
        }
    }

    pub fn compounded(
        strategy: StrategyKind,
        trades: Vec<Trade>,
        initial_balance: f64,
        final_balance: f64,
    ) -> Self {
        let total_return = if initial_balance > 0.0 {
            (final_balance - initial_balance) / initial_balance * 100.0
        } else {
            0.0
        };
        Self {
            total_return,
            win_rate: win_rate(&trades),
            final_balance: Some(final_balance),
            trades,
            ..Self::empty(strategy, ReturnAccounting::Compounded)
        }
    }
}

/// Percentage of trades with a positive return; 0 for no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.is_win()).count();
    100.0 * wins as f64 / trades.len() as f64
}

pub fn sum_returns(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.profit_percent).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub rank: usize,
    pub strategy: StrategyKind,
    pub total_return: f64,
    pub win_rate: f64,
    pub trade_count: usize,
}

/// Per-strategy totals over the capital-tagged trade list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyCapitalSummary {
    pub strategy: StrategyKind,
    /// Sum of percent returns, never compounded.
    pub total_return: f64,
    pub win_rate: f64,
    pub trade_count: usize,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalSummary {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub trades: Vec<Trade>,
    pub strategies: Vec<StrategyCapitalSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestSummary {
    /// Ranked by total return, best first.
    pub results: Vec<BacktestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<BacktestResult>,
    pub ranking: Vec<RankingEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<CapitalSummary>,
}

impl BacktestSummary {
    pub fn ranking_text(&self) -> String {
        self.ranking
            .iter()
            .map(|e| {
                format!(
                    "{}. {}: {:+.2}% ({} trades, {:.1}% win)",
                    e.rank, e.strategy, e.total_return, e.trade_count, e.win_rate
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(profit_percent: f64) -> Trade {
        Trade {
            strategy: StrategyKind::MacdCross,
            direction: Direction::Long,
            entry_index: 0,
            exit_index: 1,
            entry_timestamp: 0,
            exit_timestamp: 1,
            entry_price: 100.0,
            exit_price: 100.0 + profit_percent,
            entry_action: TradeAction::BuyToOpen,
            exit_action: TradeAction::SellToClose,
            exit_reason: ExitReason::TrendFade,
            profit_percent,
            spot_profit_percent: profit_percent,
            position_size: None,
            profit_amount: None,
            spot_profit_amount: None,
        }
    }

    #[test]
    fn actions_follow_direction() {
        assert_eq!(Direction::Long.entry_action(), TradeAction::BuyToOpen);
        assert_eq!(Direction::Long.exit_action(), TradeAction::SellToClose);
        assert_eq!(Direction::Short.entry_action(), TradeAction::SellToOpen);
        assert_eq!(Direction::Short.exit_action(), TradeAction::BuyToClose);
    }

    #[test]
    fn win_rate_counts_strictly_positive_returns() {
        let trades = vec![trade(5.0), trade(0.0), trade(-2.0), trade(1.0)];
        assert_eq!(win_rate(&trades), 50.0);
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn simple_result_sums_percent_returns() {
        let result = BacktestResult::simple(StrategyKind::MacdCross, vec![trade(5.0), trade(-2.0)]);
        assert_eq!(result.total_return, 3.0);
        assert_eq!(result.win_rate, 50.0);
        assert_eq!(result.accounting, ReturnAccounting::Simple);
        assert_eq!(result.strategy_name, "macd-cross");
    }

    #[test]
    fn compounded_result_reports_account_growth() {
        let result =
            BacktestResult::compounded(StrategyKind::Breakout, vec![trade(10.0)], 1000.0, 1050.0);
        assert!((result.total_return - 5.0).abs() < 1e-12);
        assert_eq!(result.final_balance, Some(1050.0));
    }

    #[test]
    fn strategy_names_parse_with_aliases() {
        assert_eq!("MACD".parse::<StrategyKind>().unwrap(), StrategyKind::MacdCross);
        assert_eq!(" rsi ".parse::<StrategyKind>().unwrap(), StrategyKind::RsiReversal);
        assert_eq!("breakout".parse::<StrategyKind>().unwrap(), StrategyKind::Breakout);
        assert!(matches!(
            "martingale".parse::<StrategyKind>(),
            Err(Error::UnknownStrategy(name)) if name == "martingale"
        ));
    }

    #[test]
    fn trade_serializes_kebab_case_enums() {
        let json = serde_json::to_value(trade(1.0)).unwrap();
        assert_eq!(json["exitReason"], "trend-fade");
        assert_eq!(json["entryAction"], "buy-to-open");
        assert_eq!(json["strategy"], "macd-cross");
        assert!(json.get("positionSize").is_none());
    }
}
