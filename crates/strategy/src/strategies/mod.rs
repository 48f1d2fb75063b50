pub mod breakout;
pub mod macd_cross;
pub mod rsi_reversal;

pub use breakout::BreakoutStrategy;
pub use macd_cross::MacdCrossStrategy;
pub use rsi_reversal::RsiReversalStrategy;

use tracing::debug;

use common::{BacktestConfig, StrategyKind, Trade};
use paper::{PaperAccount, Settlement};
use risk::{profit_percent, spot_move_pct};

use crate::market::MarketData;
use crate::position::ClosedPosition;

/// Turn closed positions into trade records, in closing order.
pub(crate) fn build_trades(
    kind: StrategyKind,
    data: &MarketData,
    closed: &[ClosedPosition],
    leverage: f64,
) -> Vec<Trade> {
    closed
        .iter()
        .map(|c| {
            let direction = c.position.direction;
            let entry_price = c.position.entry_price;
            let trade = Trade {
                strategy: kind,
                direction,
                entry_index: c.position.entry_index,
                exit_index: c.exit_index,
                entry_timestamp: data.timestamp(c.position.entry_index),
                exit_timestamp: data.timestamp(c.exit_index),
                entry_price,
                exit_price: c.exit_price,
                entry_action: direction.entry_action(),
                exit_action: direction.exit_action(),
                exit_reason: c.exit_reason,
                profit_percent: profit_percent(direction, entry_price, c.exit_price, leverage),
                spot_profit_percent: spot_move_pct(direction, entry_price, c.exit_price),
                position_size: None,
                profit_amount: None,
                spot_profit_amount: None,
            };
            debug!(
                strategy = %kind,
                direction = %direction,
                entry = trade.entry_index,
                exit = trade.exit_index,
                reason = %trade.exit_reason,
                profit_pct = trade.profit_percent,
                "Trade closed"
            );
            trade
        })
        .collect()
}

/// Attach fixed-size money figures when the run supplies a starting amount.
pub(crate) fn size_fixed(trades: &mut [Trade], config: &BacktestConfig) {
    let Some(amount) = config.amount else {
        return;
    };
    let mut account = PaperAccount::fixed(amount);
    for trade in trades.iter_mut() {
        let settlement = account.settle(trade.profit_percent, trade.spot_profit_percent);
        apply_settlement(trade, &settlement);
    }
}

pub(crate) fn apply_settlement(trade: &mut Trade, settlement: &Settlement) {
    trade.position_size = Some(settlement.position_size);
    trade.profit_amount = Some(settlement.profit_amount);
    trade.spot_profit_amount = Some(settlement.spot_profit_amount);
}
