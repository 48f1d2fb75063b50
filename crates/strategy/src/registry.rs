use tracing::{info, warn};

use common::{BacktestConfig, BacktestResult, Result, StrategyKind};

use crate::config::StrategyParams;
use crate::market::MarketData;
use crate::strategies::{BreakoutStrategy, MacdCrossStrategy, RsiReversalStrategy};
use crate::Strategy;

/// Maps each [`StrategyKind`] to its implementation, configured from one
/// parameter set. Dispatch is a plain `match`; there is no runtime registration.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    macd: MacdCrossStrategy,
    rsi: RsiReversalStrategy,
    breakout: BreakoutStrategy,
}

impl StrategyRegistry {
    /// Fails with [`common::Error::Config`] when `params` do not validate.
    pub fn new(params: StrategyParams) -> Result<Self> {
        params.validate()?;
        info!(
            macd_stop = params.macd.stop_loss_pct,
            rsi_period = params.rsi.period,
            breakout_lookback = params.breakout.lookback,
            "Strategy registry configured"
        );
        Ok(Self {
            macd: MacdCrossStrategy::new(params.macd),
            rsi: RsiReversalStrategy::new(params.rsi),
            breakout: BreakoutStrategy::new(params.breakout),
        })
    }

    pub fn get(&self, kind: StrategyKind) -> &dyn Strategy {
        match kind {
            StrategyKind::MacdCross => &self.macd,
            StrategyKind::RsiReversal => &self.rsi,
            StrategyKind::Breakout => &self.breakout,
        }
    }

    pub fn run(&self, kind: StrategyKind, data: &MarketData, config: &BacktestConfig) -> BacktestResult {
        self.get(kind).backtest(data, config)
    }

    /// Split requested names into known kinds, in request order, and the
    /// names that matched nothing. Each unknown name is logged and skipped.
    /// A kind named twice, under any alias, runs once at its first position.
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> (Vec<StrategyKind>, Vec<String>) {
        let mut kinds: Vec<StrategyKind> = Vec::with_capacity(names.len());
        let mut skipped = Vec::new();
        for name in names {
            let name = name.as_ref();
            match name.parse::<StrategyKind>() {
                Ok(kind) if kinds.contains(&kind) => {
                    warn!(strategy = %name, kind = %kind, "Ignoring duplicate strategy");
                }
                Ok(kind) => kinds.push(kind),
                Err(e) => {
                    warn!(strategy = %name, error = %e, "Skipping unknown strategy");
                    skipped.push(name.to_string());
                }
            }
        }
        (kinds, skipped)
    }
}
