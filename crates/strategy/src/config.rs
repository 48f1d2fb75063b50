use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Tunable parameters for every strategy family, loadable from TOML.
/// Missing tables or keys fall back to the defaults.
///
/// Example `config/strategies.toml`:
/// ```toml
/// [macd]
/// stop_loss_pct = 8.0
/// cooldown_bars = 3
///
/// [rsi]
/// period = 10
/// oversold = 25.0
///
/// [breakout]
/// lookback = 30
/// allocation = 0.25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategyParams {
    pub macd: MacdCrossParams,
    pub rsi: RsiReversalParams,
    pub breakout: BreakoutParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MacdCrossParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub stop_loss_pct: f64,
    /// Bars a position is held before any rule-based exit is honored.
    pub min_hold_bars: usize,
    /// Bars after any exit during which neither direction may enter.
    pub cooldown_bars: usize,
    pub min_bars: usize,
}

impl Default for MacdCrossParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
            stop_loss_pct: 10.0,
            min_hold_bars: 3,
            cooldown_bars: 5,
            min_bars: 35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RsiReversalParams {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub midline: f64,
    pub stop_loss_pct: f64,
    /// Bars after an exit before the same direction may enter again.
    pub cooldown_bars: usize,
}

impl Default for RsiReversalParams {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            midline: 50.0,
            stop_loss_pct: 5.0,
            cooldown_bars: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakoutParams {
    pub lookback: usize,
    /// Margin beyond the rolling high/low, in percent.
    pub threshold_pct: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    /// Fraction of the current account committed per trade.
    pub allocation: f64,
    /// Starting balance for compounding when the run supplies no amount.
    pub notional_balance: f64,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            threshold_pct: 0.2,
            stop_loss_pct: 10.0,
            take_profit_pct: 25.0,
            allocation: 0.5,
            notional_balance: 1000.0,
        }
    }
}

impl StrategyParams {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let params: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid strategy parameters: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("strategy config at '{path}': {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        let macd = &self.macd;
        if macd.fast == 0 || macd.fast >= macd.slow || macd.signal == 0 {
            return Err(Error::Config(format!(
                "macd periods must satisfy 0 < fast < slow and signal > 0, got {}/{}/{}",
                macd.fast, macd.slow, macd.signal
            )));
        }
        positive("macd stop_loss_pct", macd.stop_loss_pct)?;

        let rsi = &self.rsi;
        if rsi.period < 2 {
            return Err(Error::Config(format!(
                "rsi period must be >= 2, got {}",
                rsi.period
            )));
        }
        if !(rsi.oversold < rsi.midline && rsi.midline < rsi.overbought) {
            return Err(Error::Config(format!(
                "rsi levels must satisfy oversold < midline < overbought, got {}/{}/{}",
                rsi.oversold, rsi.midline, rsi.overbought
            )));
        }
        positive("rsi stop_loss_pct", rsi.stop_loss_pct)?;

        let breakout = &self.breakout;
        if breakout.lookback == 0 {
            return Err(Error::Config("breakout lookback must be >= 1".into()));
        }
        if !(breakout.threshold_pct.is_finite() && breakout.threshold_pct >= 0.0) {
            return Err(Error::Config(format!(
                "breakout threshold_pct must be >= 0, got {}",
                breakout.threshold_pct
            )));
        }
        positive("breakout stop_loss_pct", breakout.stop_loss_pct)?;
        positive("breakout take_profit_pct", breakout.take_profit_pct)?;
        positive("breakout notional_balance", breakout.notional_balance)?;
        let allocation = breakout.allocation;
        if !(allocation > 0.0 && allocation <= 1.0) {
            return Err(Error::Config(format!(
                "breakout allocation must be in (0, 1], got {allocation}"
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be a positive number, got {value}")))
    }
}
