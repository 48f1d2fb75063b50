pub mod orchestrator;
pub mod summary;

pub use orchestrator::{default_strategies, Orchestrator};
pub use summary::{capital_summary, rank};
