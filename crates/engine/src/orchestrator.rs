use std::sync::Arc;

use tracing::{debug, info};

use common::{BacktestConfig, BacktestResult, BacktestSummary, Error, Result, StrategyKind};
use strategy::{MarketData, StrategyParams, StrategyRegistry};

use crate::summary::{capital_summary, rank};

/// Runs named strategies over one market and assembles the ranked summary.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    registry: Arc<StrategyRegistry>,
}

impl Orchestrator {
    /// Fails when `params` do not validate, before any strategy runs.
    pub fn new(params: StrategyParams) -> Result<Self> {
        Ok(Self {
            registry: Arc::new(StrategyRegistry::new(params)?),
        })
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Run every requested strategy in turn on the calling thread.
    ///
    /// Unknown names are logged, listed in `skipped`, and otherwise ignored.
    /// Fails only when `config` is invalid.
    pub fn run<S: AsRef<str>>(
        &self,
        data: &MarketData,
        names: &[S],
        config: &BacktestConfig,
    ) -> Result<BacktestSummary> {
        config.validate()?;
        let (kinds, skipped) = StrategyRegistry::resolve(names);
        let results = kinds
            .iter()
            .map(|&kind| self.registry.run(kind, data, config))
            .collect();
        Ok(self.summarize(results, skipped, config))
    }

    /// Same as [`run`](Self::run), with one blocking task per strategy.
    ///
    /// Results are collected in request order before ranking, so the summary
    /// equals the sequential one.
    pub async fn run_parallel<S: AsRef<str>>(
        &self,
        data: Arc<MarketData>,
        names: &[S],
        config: &BacktestConfig,
    ) -> Result<BacktestSummary> {
        config.validate()?;
        let (kinds, skipped) = StrategyRegistry::resolve(names);

        let handles: Vec<_> = kinds
            .into_iter()
            .map(|kind| {
                let registry = Arc::clone(&self.registry);
                let data = Arc::clone(&data);
                let config = *config;
                tokio::task::spawn_blocking(move || registry.run(kind, &data, &config))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle.await.map_err(|e| Error::Task(e.to_string()))?;
            results.push(result);
        }
        Ok(self.summarize(results, skipped, config))
    }

    fn summarize(
        &self,
        results: Vec<BacktestResult>,
        skipped: Vec<String>,
        config: &BacktestConfig,
    ) -> BacktestSummary {
        for r in &results {
            debug!(
                strategy = %r.strategy,
                trades = r.trades.len(),
                total_return = r.total_return,
                win_rate = r.win_rate,
                "Strategy finished"
            );
        }

        let capital = capital_summary(&results, config);
        let (results, ranking) = rank(results);
        let best = results.first().cloned();

        info!(
            strategies = results.len(),
            skipped = skipped.len(),
            best = ?best.as_ref().map(|b| b.strategy.name()),
            direction = %config.direction,
            leverage = config.leverage,
            "Backtest complete"
        );

        BacktestSummary {
            results,
            best,
            ranking,
            skipped,
            capital,
        }
    }
}

/// Kinds the orchestrator runs when the caller names none.
pub fn default_strategies() -> Vec<String> {
    StrategyKind::ALL.iter().map(|k| k.name().to_string()).collect()
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

    fn choppy_walk() -> MarketData {
        let closes: Vec<f64> = (0..300)
            .map(|i| {
                let t = i as f64;
                100.0 + 8.0 * (t / 9.0).sin() + 3.0 * (t / 2.5).cos() + t * 0.05
            })
            .collect();
        MarketData::new(PriceSeries::from_closes(0, 60_000, &closes).unwrap(), None)
    }

    #[test]
    fn unknown_names_are_skipped_not_fatal() {
        let summary = Orchestrator::default()
            .run(&rise_then_fall(), &["macd", "ichimoku"], &BacktestConfig::default())
            .unwrap();
        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.skipped, vec!["ichimoku".to_string()]);
        assert_eq!(summary.best.unwrap().strategy, StrategyKind::MacdCross);
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = BacktestConfig::new(DirectionFilter::Both, -1.0);
        let err = Orchestrator::default()
            .run(&rise_then_fall(), &["macd"], &config)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn invalid_params_fail_at_construction() {
        let mut params = StrategyParams::default();
        params.rsi.period = 1;
        assert!(matches!(Orchestrator::new(params), Err(Error::Config(_))));

        let mut params = StrategyParams::default();
        params.breakout.notional_balance = -1.0;
        assert!(Orchestrator::new(params).is_err());
    }

    #[test]
    fn duplicate_aliases_run_once() {
        let orchestrator = Orchestrator::default();
        let config = BacktestConfig::default().with_amount(1000.0);
        let single = orchestrator.run(&rise_then_fall(), &["macd"], &config).unwrap();
        let doubled = orchestrator
            .run(&rise_then_fall(), &["macd", "trend-cross"], &config)
            .unwrap();

        assert_eq!(doubled.results.len(), 1);
        assert_eq!(doubled.ranking.len(), 1);
        assert!(doubled.skipped.is_empty());
        assert_eq!(doubled, single);
        let capital = doubled.capital.unwrap();
        assert_eq!(capital.strategies.len(), 1);
        assert_eq!(capital.trades.len(), single.results[0].trades.len());
    }

    #[test]
    fn no_known_strategies_yields_empty_summary() {
        let summary = Orchestrator::default()
            .run(&rise_then_fall(), &["nope"], &BacktestConfig::default())
            .unwrap();
        assert!(summary.results.is_empty());
        assert!(summary.best.is_none());
        assert!(summary.ranking.is_empty());
    }

    #[test]
    fn results_are_ranked_by_total_return() {
        let summary = Orchestrator::default()
            .run(&choppy_walk(), &default_strategies(), &BacktestConfig::default())
            .unwrap();
        assert_eq!(summary.results.len(), 3);
        for pair in summary.results.windows(2) {
            assert!(pair[0].total_return >= pair[1].total_return);
        }
        assert_eq!(summary.best.as_ref(), summary.results.first());
        assert_eq!(summary.ranking_text().lines().count(), 3);
    }

    #[test]
    fn amount_produces_capital_summary() {
        let config = BacktestConfig::new(DirectionFilter::Long, 1.0).with_amount(1000.0);
        let summary = Orchestrator::default()
            .run(&rise_then_fall(), &["macd"], &config)
            .unwrap();
        let capital = summary.capital.unwrap();
        assert_eq!(capital.trades.len(), 1);
        let macd = &capital.strategies[0];
        assert!((macd.profit - macd.total_return * 10.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let orchestrator = Orchestrator::default();
        let data = choppy_walk();
        let config = BacktestConfig::default().with_amount(500.0);
        let first = orchestrator.run(&data, &default_strategies(), &config).unwrap();
        let second = orchestrator.run(&data, &default_strategies(), &config).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn parallel_run_matches_sequential() {
        let orchestrator = Orchestrator::default();
        let data = Arc::new(choppy_walk());
        let names = ["breakout", "rsi", "bogus", "macd"];
        let config = BacktestConfig::new(DirectionFilter::Both, 2.0).with_amount(1000.0);

        let sequential = orchestrator.run(&data, &names, &config).unwrap();
        let parallel = orchestrator
            .run_parallel(Arc::clone(&data), &names, &config)
            .await
            .unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.skipped, vec!["bogus".to_string()]);
    }
}
