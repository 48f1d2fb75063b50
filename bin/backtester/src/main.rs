mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::MarketChart;
use engine::Orchestrator;
use strategy::{MarketData, StrategyParams, StructureDetector};

use crate::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    // stderr only: stdout carries the JSON summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let settings = Settings::from_env()?;
    info!(
        data = %settings.market_data_path,
        strategies = ?settings.strategies,
        direction = %settings.backtest.direction,
        leverage = settings.backtest.leverage,
        amount = ?settings.backtest.amount,
        "Backtester starting"
    );

    let params = match &settings.strategy_config_path {
        Some(path) => StrategyParams::load(path)?,
        None => StrategyParams::default(),
    };

    // ── Market data ───────────────────────────────────────────────────────────
    let raw = std::fs::read_to_string(&settings.market_data_path)
        .with_context(|| format!("reading market data from '{}'", settings.market_data_path))?;
    let (prices, volumes) = MarketChart::from_json(&raw)?.into_series()?;
    let first = prices.points().first().and_then(|p| p.datetime());
    let last = prices.points().last().and_then(|p| p.datetime());
    info!(
        bars = prices.len(),
        volumes = volumes.as_ref().map_or(0, |v| v.len()),
        from = ?first,
        to = ?last,
        "Market data loaded"
    );
    let data = Arc::new(MarketData::new(prices, volumes.as_ref()));

    // ── Backtest ──────────────────────────────────────────────────────────────
    let orchestrator = Orchestrator::new(params)?;
    let summary = orchestrator
        .run_parallel(Arc::clone(&data), &settings.strategies, &settings.backtest)
        .await?;

    for line in summary.ranking_text().lines() {
        info!("{line}");
    }

    // ── Output ────────────────────────────────────────────────────────────────
    let output = if settings.include_structure {
        serde_json::json!({
            "summary": summary,
            "structure": structure_report(&data),
        })
    } else {
        serde_json::to_value(&summary)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Levels, retest zone and last-bar indicators for the whole market.
fn structure_report(data: &MarketData) -> serde_json::Value {
    let detector = StructureDetector::default();
    let levels = detector.snapshot(data);
    let retest_zone = detector.retest_zone(data);
    info!(
        resistance = levels.resistance.len(),
        support = levels.support.len(),
        retest_zone = retest_zone.is_some(),
        "Market structure detected"
    );
    serde_json::json!({
        "levels": levels,
        "retestZone": retest_zone,
        "indicators": data.len().checked_sub(1).and_then(|i| data.snapshot(i)),
    })
}
