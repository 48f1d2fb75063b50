use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the paper account sizes each position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum Sizing {
    /// Every trade commits the full starting amount; outcomes are never reinvested.
    Fixed,
    /// Every trade commits `allocation` of the current balance, so gains and
    /// losses carry into the next position.
    Compounding { allocation: f64 },
}

/// Outcome of settling one closed trade against the account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub position_size: f64,
    pub profit_amount: f64,
    pub spot_profit_amount: f64,
    pub balance_after: f64,
}

/// Simulated account used to attach money figures to percent returns.
///
/// Nothing here touches an exchange; the ledger only converts a trade's
/// percent return into an amount and updates the balance. A trade never
/// loses more than the capital committed to it, so a compounding balance
/// cannot drop below zero.
#[derive(Debug, Clone)]
pub struct PaperAccount {
    initial_balance: f64,
    balance: f64,
    sizing: Sizing,
}

impl PaperAccount {
    pub fn fixed(amount: f64) -> Self {
        Self::new(amount, Sizing::Fixed)
    }

    pub fn compounding(initial_balance: f64, allocation: f64) -> Self {
        Self::new(initial_balance, Sizing::Compounding { allocation })
    }

    pub fn new(initial_balance: f64, sizing: Sizing) -> Self {
        debug!(balance = initial_balance, ?sizing, "PaperAccount initialized");
        Self {
            initial_balance,
            balance: initial_balance,
            sizing,
        }
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Capital committed to the next trade.
    pub fn position_size(&self) -> f64 {
        match self.sizing {
            Sizing::Fixed => self.initial_balance,
            Sizing::Compounding { allocation } => self.balance.max(0.0) * allocation,
        }
    }

    /// Book a closed trade given its leveraged and spot percent returns.
    /// Losses are capped at the position size.
    pub fn settle(&mut self, profit_percent: f64, spot_profit_percent: f64) -> Settlement {
        let position_size = self.position_size();
        let profit_amount = (position_size * profit_percent / 100.0).max(-position_size);
        let spot_profit_amount = (position_size * spot_profit_percent / 100.0).max(-position_size);
        self.balance += profit_amount;

        debug!(
            size = position_size,
            profit = profit_amount,
            balance = self.balance,
            "Paper trade settled"
        );

        Settlement {
            position_size,
            profit_amount,
            spot_profit_amount,
            balance_after: self.balance,
        }
    }

    /// Account growth since inception, in percent.
    pub fn return_pct(&self) -> f64 {
        if self.initial_balance <= 0.0 {
            return 0.0;
        }
        (self.balance - self.initial_balance) / self.initial_balance * 100.0
    }
}
