use anyhow::{bail, Context, Result};

use common::{BacktestConfig, DirectionFilter};

/// Run settings loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Market-chart JSON file: `{ "prices": [[ms, price]...], "total_volumes": [...] }`.
    pub market_data_path: String,
    pub strategies: Vec<String>,
    pub backtest: BacktestConfig,
    pub strategy_config_path: Option<String>,
    /// Print support/resistance levels, the retest zone and the last bar's
    /// indicators next to the summary.
    pub include_structure: bool,
}

impl Settings {
    /// Load `.env` if present, then read every setting from the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let market_data_path = env("MARKET_DATA_PATH")
            .context("Required environment variable 'MARKET_DATA_PATH' is not set")?;

        let strategies = match env("STRATEGIES") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => engine::default_strategies(),
        };
        if strategies.is_empty() {
            bail!("STRATEGIES names no strategies");
        }

        let direction = match env("DIRECTION") {
            Some(v) => v.parse::<DirectionFilter>()?,
            None => DirectionFilter::Both,
        };
        let leverage = match env("LEVERAGE") {
            Some(v) => v
                .parse::<f64>()
                .with_context(|| format!("LEVERAGE must be a number, got '{v}'"))?,
            None => 1.0,
        };
        let amount = env("AMOUNT")
            .map(|v| {
                v.parse::<f64>()
                    .with_context(|| format!("AMOUNT must be a number, got '{v}'"))
            })
            .transpose()?;

        let backtest = BacktestConfig {
            direction,
            leverage,
            amount,
        };
        backtest.validate()?;

        let include_structure = match env("INCLUDE_STRUCTURE") {
            Some(v) => parse_flag(&v)
                .with_context(|| format!("INCLUDE_STRUCTURE must be true or false, got '{v}'"))?,
            None => false,
        };

        Ok(Settings {
            market_data_path,
            strategies,
            backtest,
            strategy_config_path: env("STRATEGY_CONFIG_PATH"),
            include_structure,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_path_is_set() {
        let settings = load(&[("MARKET_DATA_PATH", "btc.json")]).unwrap();
        assert_eq!(settings.strategies, vec!["macd-cross", "rsi-reversal", "breakout"]);
        assert_eq!(settings.backtest, BacktestConfig::default());
        assert!(settings.strategy_config_path.is_none());
        assert!(!settings.include_structure);
    }

    #[test]
    fn parses_every_variable() {
        let settings = load(&[
            ("MARKET_DATA_PATH", "eth.json"),
            ("STRATEGIES", "rsi, breakout"),
            ("DIRECTION", "short"),
            ("LEVERAGE", "3"),
            ("AMOUNT", "250"),
            ("STRATEGY_CONFIG_PATH", "config/strategies.toml"),
        ])
        .unwrap();
        assert_eq!(settings.strategies, vec!["rsi", "breakout"]);
        assert_eq!(settings.backtest.direction, DirectionFilter::Short);
        assert_eq!(settings.backtest.leverage, 3.0);
        assert_eq!(settings.backtest.amount, Some(250.0));
    }

    #[test]
    fn structure_flag_accepts_common_spellings() {
        for (value, expected) in [("true", true), ("1", true), ("ON", true), ("false", false), ("0", false)] {
            let settings =
                load(&[("MARKET_DATA_PATH", "x"), ("INCLUDE_STRUCTURE", value)]).unwrap();
            assert_eq!(settings.include_structure, expected, "{value}");
        }
        assert!(load(&[("MARKET_DATA_PATH", "x"), ("INCLUDE_STRUCTURE", "maybe")]).is_err());
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("MARKET_DATA_PATH", "x"), ("LEVERAGE", "lots")]).is_err());
        assert!(load(&[("MARKET_DATA_PATH", "x"), ("AMOUNT", "-1")]).is_err());
        assert!(load(&[("MARKET_DATA_PATH", "x"), ("DIRECTION", "sideways")]).is_err());
    }
}
