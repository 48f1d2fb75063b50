pub mod rules;

pub use rules::{profit_percent, spot_move_pct, ExitRules, ExitTrigger};
