//! Ranking and capital aggregation over finished strategy results.

use common::{
    sum_returns, win_rate, BacktestConfig, BacktestResult, CapitalSummary, RankingEntry,
    StrategyCapitalSummary, Trade,
};

/// Sort results by total return, best first. Equal returns keep their
/// original order.
pub fn rank(mut results: Vec<BacktestResult>) -> (Vec<BacktestResult>, Vec<RankingEntry>) {
    results.sort_by(|a, b| b.total_return.total_cmp(&a.total_return));
    let ranking = results
        .iter()
        .enumerate()
        .map(|(i, r)| RankingEntry {
            rank: i + 1,
            strategy: r.strategy,
            total_return: r.total_return,
            win_rate: r.win_rate,
            trade_count: r.trades.len(),
        })
        .collect();
    (results, ranking)
}

/// Flatten every strategy's trades and total them per strategy against the
/// run's starting amount. `None` when the run has no amount.
///
/// Totals here are plain sums of percent returns for every strategy,
/// including those whose own result is compounded.
pub fn capital_summary(results: &[BacktestResult], config: &BacktestConfig) -> Option<CapitalSummary> {
    let amount = config.amount?;
    let direction = config.direction.single();

    let trades: Vec<Trade> = results
        .iter()
        .flat_map(|r| r.trades.iter())
        .filter(|t| direction.map_or(true, |d| t.direction == d))
        .cloned()
        .collect();

    let strategies = results
        .iter()
        .map(|r| {
            let own: Vec<Trade> = trades
                .iter()
                .filter(|t| t.strategy == r.strategy)
                .cloned()
                .collect();
            let total_return = sum_returns(&own);
            StrategyCapitalSummary {
                strategy: r.strategy,
                total_return,
                win_rate: win_rate(&own),
                trade_count: own.len(),
                profit: total_return / 100.0 * amount,
            }
        })
        .collect();

    Some(CapitalSummary {
        amount,
        direction,
        trades,
        strategies,
    })
}
