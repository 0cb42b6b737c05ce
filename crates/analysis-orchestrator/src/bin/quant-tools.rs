//! Runs analytics tools against a market snapshot.
//!
//! ```text
//! echo '{"tool": "get_risk_metrics", "args": {"ticker": "AAPL"}}' \
//!     | quant-tools --snapshot market.json
//! ```
//!
//! stdin holds one tool call or an array of them; the responses are printed as JSON.

use std::io::Read;
use std::sync::Arc;

use analysis_core::{InMemoryProvider, MarketSnapshot};
use analysis_orchestrator::{AnalyticsConfig, AnalyticsToolkit, CachedProvider};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Request {
    Batch(Vec<ToolCall>),
    Single(ToolCall),
}

fn snapshot_path() -> Result<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--snapshot" {
            return args.next().context("--snapshot requires a path");
        }
        if let Some(path) = arg.strip_prefix("--snapshot=") {
            return Ok(path.to_string());
        }
    }
    match std::env::var("QUANT_SNAPSHOT") {
        Ok(path) if !path.trim().is_empty() => Ok(path),
        _ => bail!("no market snapshot given: pass --snapshot <path> or set QUANT_SNAPSHOT"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the tool output, logs go to stderr
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let config = AnalyticsConfig::from_env().context("invalid analytics configuration")?;

    let path = snapshot_path()?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read snapshot {}", path))?;
    let snapshot: MarketSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path))?;
    info!(
        "Loaded snapshot {} ({} price histories, {} companies)",
        path,
        snapshot.price_history.len(),
        snapshot.companies.len()
    );

    let provider = CachedProvider::new(
        InMemoryProvider::from_snapshot(snapshot),
        config.data_cache_ttl_secs,
    );
    let toolkit = AnalyticsToolkit::new(Arc::new(provider), config)?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read tool call from stdin")?;
    let request: Request =
        serde_json::from_str(&input).context("stdin must hold {\"tool\", \"args\"} or an array of them")?;

    let output = match request {
        Request::Single(call) => toolkit.invoke(&call.tool, &call.args).await,
        Request::Batch(calls) => {
            let mut responses = Vec::with_capacity(calls.len());
            for call in &calls {
                responses.push(toolkit.invoke(&call.tool, &call.args).await);
            }
            Value::Array(responses)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
