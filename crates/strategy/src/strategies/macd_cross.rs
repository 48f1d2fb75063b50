use common::{BacktestConfig, BacktestResult, Direction, ExitReason, ReturnAccounting, StrategyKind};
use risk::ExitRules;

use super::{build_trades, size_fixed};
use crate::config::MacdCrossParams;
use crate::indicators::{MacdIndicator, MacdSeries, MacdSignal};
use crate::market::MarketData;
use crate::position::{simulate, Cooldown, Entry, OpenPosition, TradeRules};
use crate::Strategy;

/// Trend-cross strategy: trade MACD/signal crossovers.
///
/// Enters on a cross in the trade's favour. Exits, in priority order, on a
/// stop-loss, an opposing cross, or a fading MACD−signal gap, but only once
/// the minimum hold has passed. Any exit starts a cooldown for both
/// directions. Returns are summed, not compounded.
#[derive(Debug, Clone, Default)]
pub struct MacdCrossStrategy {
    params: MacdCrossParams,
}

impl MacdCrossStrategy {
    pub fn new(params: MacdCrossParams) -> Self {
        Self { params }
    }

    fn indicator(&self) -> MacdIndicator {
        MacdIndicator::new(self.params.fast, self.params.slow, self.params.signal)
    }
}

struct MacdRules<'a> {
    macd: &'a MacdSeries,
    closes: &'a [f64],
    params: &'a MacdCrossParams,
    stop: ExitRules,
}

impl TradeRules for MacdRules<'_> {
    fn first_bar(&self) -> usize {
        1
    }

    fn min_hold(&self) -> usize {
        self.params.min_hold_bars
    }

    fn cooldown(&self) -> Cooldown {
        Cooldown::AnyDirection(self.params.cooldown_bars)
    }

    fn entry(&self, direction: Direction, index: usize) -> Option<Entry> {
        match (direction, self.macd.crossover(index)) {
            (Direction::Long, MacdSignal::Bullish) | (Direction::Short, MacdSignal::Bearish) => {
                Some(Entry::at_market())
            }
            _ => None,
        }
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
        let opposing = match position.direction {
            Direction::Long => MacdSignal::Bearish,
            Direction::Short => MacdSignal::Bullish,
        };
        if self.macd.crossover(index) == opposing {
            return Some(ExitReason::MacdCross);
        }
        if self.macd.gap(index).abs() < self.macd.gap(index - 1).abs() {
            return Some(ExitReason::TrendFade);
        }
        None
    }
}

impl Strategy for MacdCrossStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MacdCross
    }

    fn min_bars(&self) -> usize {
        self.params.min_bars.max(self.params.slow)
    }

    fn backtest(&self, data: &MarketData, config: &BacktestConfig) -> BacktestResult {
        if data.len() < self.min_bars() {
            return BacktestResult::empty(self.kind(), ReturnAccounting::Simple);
        }

        let macd = data.macd(self.indicator());
        let rules = MacdRules {
            macd: &macd,
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

#[cfg(test)]
mod tests {
    use super::*;
    use common::{DirectionFilter, PriceSeries};

    fn rise_then_fall() -> MarketData {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        closes.extend((1..=20).map(|i| 119.0 - i as f64));
        MarketData::new(PriceSeries::from_closes(0, 3_600_000, &closes).unwrap(), None)
    }

    fn run(direction: DirectionFilter, leverage: f64) -> BacktestResult {
        MacdCrossStrategy::default().backtest(&rise_then_fall(), &BacktestConfig::new(direction, leverage))
    }

    #[test]
    fn rise_then_fall_yields_one_long_and_one_short() {
        let result = run(DirectionFilter::Both, 1.0);
        let longs: Vec<_> = result.trades.iter().filter(|t| t.direction == Direction::Long).collect();
        let shorts: Vec<_> = result.trades.iter().filter(|t| t.direction == Direction::Short).collect();

        assert_eq!(longs.len(), 1);
        let long = longs[0];
        assert_eq!(long.entry_index, 1);
        // The MACD down-cross happens on bar 23.
        assert_eq!(long.exit_index, 15);
        assert!(long.profit_percent > 0.0);
        assert_eq!(long.exit_reason, ExitReason::TrendFade);

        assert_eq!(shorts.len(), 1);
        let short = shorts[0];
        assert_eq!((short.entry_index, short.exit_index), (23, 35));
        assert!(short.profit_percent > 0.0);
    }

    #[test]
    fn trades_carry_direction_actions_and_timestamps() {
        let result = run(DirectionFilter::Long, 1.0);
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_action, common::TradeAction::BuyToOpen);
        assert_eq!(trade.exit_action, common::TradeAction::SellToClose);
        assert_eq!(trade.entry_timestamp, 3_600_000);
        assert_eq!(trade.exit_timestamp, trade.exit_index as i64 * 3_600_000);
        assert!(trade.position_size.is_none());
    }

    #[test]
    fn leverage_scales_percent_but_not_spot() {
        let base = run(DirectionFilter::Both, 1.0);
        let levered = run(DirectionFilter::Both, 3.0);
        assert_eq!(base.trades.len(), levered.trades.len());
        for (a, b) in base.trades.iter().zip(&levered.trades) {
            assert_eq!(a.spot_profit_percent, b.spot_profit_percent);
            assert!((b.profit_percent - 3.0 * a.profit_percent).abs() < 1e-9);
        }
    }

    #[test]
    fn amount_attaches_fixed_sizing() {
        let config = BacktestConfig::new(DirectionFilter::Long, 2.0).with_amount(500.0);
        let result = MacdCrossStrategy::default().backtest(&rise_then_fall(), &config);
        let trade = &result.trades[0];
        assert_eq!(trade.position_size, Some(500.0));
        let expected = 500.0 * trade.profit_percent / 100.0;
        assert!((trade.profit_amount.unwrap() - expected).abs() < 1e-9);
        assert!((trade.spot_profit_amount.unwrap() * 2.0 - expected).abs() < 1e-9);
    }

    /// Flat at 100 for 40 bars, two bars up by `step`, then a drop of `drop`
    /// from the peak that holds to the end.
    fn pop_then_drop(step: f64, drop: f64) -> MarketData {
        let mut closes = vec![100.0; 40];
        closes.extend([100.0 + step, 100.0 + 2.0 * step]);
        closes.extend([100.0 + 2.0 * step - drop; 9]);
        MarketData::new(PriceSeries::from_closes(0, 1, &closes).unwrap(), None)
    }

    fn long_only(strategy: &MacdCrossStrategy, data: &MarketData) -> Vec<(usize, usize, ExitReason)> {
        strategy
            .backtest(data, &BacktestConfig::new(DirectionFilter::Long, 1.0))
            .trades
            .iter()
            .map(|t| (t.entry_index, t.exit_index, t.exit_reason))
            .collect()
    }

    #[test]
    fn opposing_cross_after_min_hold_exits_with_macd_cross() {
        let trades = long_only(&MacdCrossStrategy::default(), &pop_then_drop(3.0, 10.0));
        assert_eq!(trades, vec![(40, 43, ExitReason::MacdCross)]);
    }

    #[test]
    fn drop_past_stop_exits_with_stop_loss() {
        let data = pop_then_drop(3.0, 15.0);
        let result = MacdCrossStrategy::default()
            .backtest(&data, &BacktestConfig::new(DirectionFilter::Long, 1.0));
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!((trade.entry_index, trade.exit_index), (40, 43));
        assert_eq!(trade.exit_reason, ExitReason::StopLossHit);
        assert!(trade.spot_profit_percent <= -10.0);
    }

    #[test]
    fn min_hold_defers_rule_exits() {
        let data = pop_then_drop(3.0, 10.0);
        let eager = MacdCrossStrategy::new(MacdCrossParams {
            min_hold_bars: 0,
            ..Default::default()
        });
        assert_eq!(long_only(&eager, &data), vec![(40, 42, ExitReason::TrendFade)]);

        // Default hold of 3: nothing may close on bars 41 and 42.
        let held = long_only(&MacdCrossStrategy::default(), &data);
        assert_eq!(held[0].1, 43);
    }

    #[test]
    fn short_series_returns_empty_result() {
        let closes: Vec<f64> = (0..34).map(|i| 100.0 + i as f64).collect();
        let data = MarketData::new(PriceSeries::from_closes(0, 1, &closes).unwrap(), None);
        let result = MacdCrossStrategy::default().backtest(&data, &BacktestConfig::default());
        assert!(result.trades.is_empty());
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.win_rate, 0.0);
    }
}
