pub mod config;
pub mod indicators;
pub mod market;
pub mod position;
pub mod registry;
pub mod strategies;
pub mod structure;

pub use config::{BreakoutParams, MacdCrossParams, RsiReversalParams, StrategyParams};
pub use market::MarketData;
pub use registry::StrategyRegistry;
pub use strategies::{BreakoutStrategy, MacdCrossStrategy, RsiReversalStrategy};
pub use structure::{Level, RetestZone, StructureDetector, StructureSnapshot};

use common::{BacktestConfig, BacktestResult, StrategyKind};

/// All strategy implementations must satisfy this trait.
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Shortest series the strategy trades on. Anything shorter yields an
    /// empty result rather than an error.
    fn min_bars(&self) -> usize;

    /// Replay the whole series and return every closed trade.
    ///
    /// Pure over `data` and `config`: repeated calls return identical results.
    fn backtest(&self, data: &MarketData, config: &BacktestConfig) -> BacktestResult;
}
