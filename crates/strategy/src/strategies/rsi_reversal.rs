use common::{BacktestConfig, BacktestResult, Direction, ExitReason, ReturnAccounting, StrategyKind};
use risk::ExitRules;

use super::{build_trades, size_fixed};
use crate::config::RsiReversalParams;
use crate::indicators::RsiIndicator;
use crate::market::MarketData;
use crate::position::{simulate, Cooldown, Entry, OpenPosition, TradeRules};
use crate::Strategy;

/// Oscillator-reversal strategy on RSI.
///
/// Long when RSI crosses below the oversold line, short when it crosses above
/// the overbought line. A position closes on its stop-loss, on reaching the
/// opposite extreme (`rsi-target`), or when RSI crosses back through the
/// midline against it (`rsi-exit`). Returns are summed, not compounded.
#[derive(Debug, Clone, Default)]
pub struct RsiReversalStrategy {
    params: RsiReversalParams,
}

impl RsiReversalStrategy {
    pub fn new(params: RsiReversalParams) -> Self {
        Self { params }
    }
}

struct RsiRules<'a> {
    rsi: Vec<Option<f64>>,
    closes: &'a [f64],
    params: &'a RsiReversalParams,
    stop: ExitRules,
}

impl RsiRules<'_> {
    fn pair(&self, index: usize) -> Option<(f64, f64)> {
        Some((self.rsi[index - 1]?, self.rsi[index]?))
    }
}

impl TradeRules for RsiRules<'_> {
    fn first_bar(&self) -> usize {
        self.params.period + 1
    }

    fn cooldown(&self) -> Cooldown {
        Cooldown::SameDirection(self.params.cooldown_bars)
    }

    fn entry(&self, direction: Direction, index: usize) -> Option<Entry> {
        let (prev, curr) = self.pair(index)?;
        let p = self.params;
        let fired = match direction {
            Direction::Long => prev >= p.oversold && curr < p.oversold,
            Direction::Short => prev <= p.overbought && curr > p.overbought,
        };
        fired.then(Entry::at_market)
    }

    fn exit(&self, position: &OpenPosition, index: usize) -> Option<ExitReason> {
        let price = self.closes[index];
        if self
            .stop
            .check(position.direction, position.entry_price, price)
            .is_some()
        {
            return Some(ExitReason::StopLossHit);
        }

        let (prev, curr) = self.pair(index)?;
        let p = self.params;
        match position.direction {
            Direction::Long if curr >= p.overbought => Some(ExitReason::RsiTarget),
            Direction::Short if curr <= p.oversold => Some(ExitReason::RsiTarget),
            Direction::Long if prev >= p.midline && curr < p.midline => Some(ExitReason::RsiExit),
            Direction::Short if prev <= p.midline && curr > p.midline => Some(ExitReason::RsiExit),
            _ => None,
        }
    }
}

impl Strategy for RsiReversalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RsiReversal
    }

    fn min_bars(&self) -> usize {
        self.params.period + 2
    }

    fn backtest(&self, data: &MarketData, config: &BacktestConfig) -> BacktestResult {
        if data.len() < self.min_bars() {
            return BacktestResult::empty(self.kind(), ReturnAccounting::Simple);
        }

        let indicator =
            RsiIndicator::new(self.params.period, self.params.overbought, self.params.oversold);
        let rules = RsiRules {
            rsi: indicator.series(data.closes()),
            closes: data.closes(),
            params: &self.params,
            stop: ExitRules::stop_loss(self.params.stop_loss_pct),
        };
        let closed = simulate(&rules, data.closes(), config.direction.directions());

        let mut trades = build_trades(self.kind(), data, &closed, config.leverage);
        size_fixed(&mut trades, config);
        BacktestResult::simple(self.kind(), trades)
    }
}
