use common::{BacktestConfig, BacktestResult, Direction, ExitReason, ReturnAccounting, StrategyKind};
use paper::PaperAccount;
use risk::{ExitRules, ExitTrigger};
use tracing::debug;

use super::{apply_settlement, build_trades};
use crate::config::BreakoutParams;
use crate::indicators::{MacdIndicator, MacdSeries};
use crate::market::MarketData;
use crate::position::{simulate, Entry, OpenPosition, TradeRules};
use crate::Strategy;

/// Range-breakout strategy.
///
/// Goes long when the close clears the rolling high of the previous
/// `lookback` bars by `threshold_pct` with MACD rising, short on the mirror
/// condition. Exits on stop-loss, take-profit, or a close back inside the
/// broken level (fakeout). Trades are sized from a compounding paper account,
/// and the total return is that account's growth.
#[derive(Debug, Clone, Default)]
pub struct BreakoutStrategy {
    params: BreakoutParams,
}

impl BreakoutStrategy {
    pub fn new(params: BreakoutParams) -> Self {
        Self { params }
    }
}

struct BreakoutRules<'a> {
    macd: &'a MacdSeries,
    closes: &'a [f64],
    params: &'a BreakoutParams,
    exits: ExitRules,
}

impl TradeRules for BreakoutRules<'_> {
    fn first_bar(&self) -> usize {
        self.params.lookback
    }

    fn entry(&self, direction: Direction, index: usize) -> Option<Entry> {
        let window = &self.closes[index - self.params.lookback..index];
        let price = self.closes[index];
        let margin = self.params.threshold_pct / 100.0;
        let macd = &self.macd.macd;

        match direction {
            Direction::Long => {
                let high = window.iter().copied().reduce(f64::max)?;
                (price > high * (1.0 + margin) && macd[index] > macd[index - 1])
                    .then(|| Entry::against(high))
            }
            Direction::Short => {
                let low = window.iter().copied().reduce(f64::min)?;
                (price < low * (1.0 - margin) && macd[index] < macd[index - 1])
                    .then(|| Entry::against(low))
            }
        }
    }

    fn exit(&self, position: &OpenPosition, index: usize) -> Option<ExitReason> {
        let price = self.closes[index];
        match self.exits.check(position.direction, position.entry_price, price) {
            Some(ExitTrigger::StopLoss) => return Some(ExitReason::StopLossHit),
            Some(ExitTrigger::TakeProfit) => return Some(ExitReason::TrendFade),
            None => {}
        }

        let level = position.reference_level?;
        let back_inside = match position.direction {
            Direction::Long => price < level,
            Direction::Short => price > level,
        };
        back_inside.then_some(ExitReason::Fakeout)
    }
}

impl Strategy for BreakoutStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Breakout
    }

    fn min_bars(&self) -> usize {
        (self.params.lookback + 1).max(MacdIndicator::default().slow)
    }

    fn backtest(&self, data: &MarketData, config: &BacktestConfig) -> BacktestResult {
        if data.len() < self.min_bars() {
            return BacktestResult::empty(self.kind(), ReturnAccounting::Compounded);
        }

        let macd = data.macd(MacdIndicator::default());
        let rules = BreakoutRules {
            macd: &macd,
            closes: data.closes(),
            params: &self.params,
            exits: ExitRules::stop_loss(self.params.stop_loss_pct)
                .with_take_profit(self.params.take_profit_pct),
        };
        let closed = simulate(&rules, data.closes(), config.direction.directions());
        let mut trades = build_trades(self.kind(), data, &closed, config.leverage);

        // Settle in closing order so each position is sized off the balance
        // left by every earlier exit.
        let initial = config.amount.unwrap_or(self.params.notional_balance);
        let mut account = PaperAccount::compounding(initial, self.params.allocation);
        for trade in trades.iter_mut() {
            let settlement = account.settle(trade.profit_percent, trade.spot_profit_percent);
            if config.amount.is_some() {
                apply_settlement(trade, &settlement);
            }
        }

        debug!(
            trades = trades.len(),
            initial,
            balance = account.balance(),
            "Breakout account settled"
        );
        BacktestResult::compounded(self.kind(), trades, account.initial_balance(), account.balance())
    }
}
