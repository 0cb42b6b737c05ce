//! JSON tool boundary over the registry and the analytics engines.
//!
//! Every tool returns a `serde_json::Value`. Failures never cross the boundary
//! as errors: they come back as `{"error": "<message>"}`.

use analysis_core::{AnalysisError, MarketDataProvider, PortfolioPosition};
use fundamental_analysis::FundamentalAnalysisEngine;
use portfolio_analytics::PortfolioAnalyzer;
use quant_analysis::QuantAnalysisEngine;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use technical_analysis::TechnicalAnalysisEngine;
use tracing::{info, warn};
use valuation_models::{builtin_registry, ModelRegistry};

use crate::config::AnalyticsConfig;

/// Tool names accepted by [`AnalyticsToolkit::invoke`].
pub const TOOL_NAMES: [&str; 9] = [
    "list_concepts",
    "get_concept",
    "list_models",
    "get_model_metadata",
    "run_calculation",
    "get_advanced_financial_metrics",
    "get_risk_metrics",
    "get_portfolio_analysis",
    "get_technical_indicators",
];

pub struct AnalyticsToolkit {
    registry: ModelRegistry,
    config: AnalyticsConfig,
    provider: Arc<dyn MarketDataProvider>,
    fundamentals: FundamentalAnalysisEngine,
    quant: QuantAnalysisEngine,
    technical: TechnicalAnalysisEngine,
    portfolio: PortfolioAnalyzer,
}

fn error_value(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

fn respond<T: Serialize>(tool: &str, result: Result<T, AnalysisError>) -> Value {
    match result {
        Ok(value) => serde_json::to_value(value)
            .unwrap_or_else(|e| error_value(format!("failed to serialize {} result: {}", tool, e))),
        Err(e) => {
            warn!("{} failed: {}", tool, e);
            error_value(e.to_string())
        }
    }
}

fn string_arg<'a>(args: &'a Value, name: &str) -> Result<&'a str, Value> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| error_value(format!("missing string argument '{}'", name)))
}

impl AnalyticsToolkit {
    /// Toolkit over the built-in model registry.
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        config: AnalyticsConfig,
    ) -> Result<Self, AnalysisError> {
        Ok(Self::with_registry(provider, config, builtin_registry()?))
    }

    pub fn with_registry(
        provider: Arc<dyn MarketDataProvider>,
        config: AnalyticsConfig,
        registry: ModelRegistry,
    ) -> Self {
        Self {
            quant: QuantAnalysisEngine::with_settings(config.risk_settings()),
            portfolio: PortfolioAnalyzer::with_settings(config.portfolio_settings()),
            fundamentals: FundamentalAnalysisEngine::new(),
            technical: TechnicalAnalysisEngine::new(),
            registry,
            config,
            provider,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn list_concepts(&self) -> Value {
        info!("Tool call: list_concepts");
        json!(self.registry.list_concepts())
    }

    pub fn get_concept(&self, code: &str) -> Value {
        info!("Tool call: get_concept({})", code);
        respond("get_concept", self.registry.get_concept(code))
    }

    pub fn list_models(&self, concept: Option<&str>) -> Value {
        info!("Tool call: list_models({:?})", concept);
        json!(self.registry.list_models(concept))
    }

    pub fn get_model_metadata(&self, model_name: &str) -> Value {
        info!("Tool call: get_model_metadata({})", model_name);
        respond("get_model_metadata", self.registry.get_model_metadata(model_name))
    }

    /// `{"model": name, "result": value}` on success.
    pub fn run_calculation(&self, model_name: &str, inputs: &Map<String, Value>) -> Value {
        info!("Tool call: run_calculation({})", model_name);
        let result = self
            .registry
            .run_calculation_json(model_name, inputs)
            .map(|value| json!({ "model": model_name, "result": value }));
        respond("run_calculation", result)
    }

    pub async fn get_advanced_financial_metrics(&self, ticker: &str) -> Value {
        info!("Tool call: get_advanced_financial_metrics({})", ticker);
        let result = self.fundamentals.analyze(self.provider.as_ref(), ticker).await;
        respond("get_advanced_financial_metrics", result)
    }

    pub async fn get_risk_metrics(&self, ticker: &str) -> Value {
        info!("Tool call: get_risk_metrics({})", ticker);
        let result = self.quant.analyze(self.provider.as_ref(), ticker).await;
        respond("get_risk_metrics", result)
    }

    pub async fn get_portfolio_analysis(&self, positions: &[PortfolioPosition]) -> Value {
        info!("Tool call: get_portfolio_analysis({} positions)", positions.len());
        if positions.is_empty() {
            return error_value("Portfolio is empty.");
        }
        let result = self.portfolio.analyze(self.provider.as_ref(), positions).await;
        respond("get_portfolio_analysis", result)
    }

    pub async fn get_technical_indicators(&self, ticker: &str) -> Value {
        info!("Tool call: get_technical_indicators({})", ticker);
        let days = self.config.risk_lookback_days;
        let result = self.technical.analyze(self.provider.as_ref(), ticker, days).await;
        respond("get_technical_indicators", result)
    }

    /// Dispatches a tool by name with JSON arguments.
    pub async fn invoke(&self, tool: &str, args: &Value) -> Value {
        match self.dispatch(tool, args).await {
            Ok(value) | Err(value) => value,
        }
    }

    async fn dispatch(&self, tool: &str, args: &Value) -> Result<Value, Value> {
        let value = match tool {
            "list_concepts" => self.list_concepts(),
            "get_concept" => self.get_concept(string_arg(args, "concept")?),
            "list_models" => self.list_models(args.get("concept").and_then(Value::as_str)),
            "get_model_metadata" => self.get_model_metadata(string_arg(args, "model_name")?),
            "run_calculation" => {
                let model_name = string_arg(args, "model_name")?;
                let empty = Map::new();
                let inputs = match args.get("inputs") {
                    None | Some(Value::Null) => &empty,
                    Some(Value::Object(map)) => map,
                    Some(_) => return Err(error_value("'inputs' must be an object")),
                };
                self.run_calculation(model_name, inputs)
            }
            "get_advanced_financial_metrics" => {
                self.get_advanced_financial_metrics(string_arg(args, "ticker")?).await
            }
            "get_risk_metrics" => self.get_risk_metrics(string_arg(args, "ticker")?).await,
            "get_technical_indicators" => {
                self.get_technical_indicators(string_arg(args, "ticker")?).await
            }
            "get_portfolio_analysis" => {
                let raw = args
                    .get("portfolio")
                    .cloned()
                    .ok_or_else(|| error_value("missing argument 'portfolio'"))?;
                let positions: Vec<PortfolioPosition> = serde_json::from_value(raw)
                    .map_err(|e| error_value(format!("invalid portfolio: {}", e)))?;
                self.get_portfolio_analysis(&positions).await
            }
            other => {
                warn!("Unknown tool requested: {}", other);
                return Err(error_value(format!(
                    "unknown tool '{}'; available: {}",
                    other,
                    TOOL_NAMES.join(", ")
                )));
            }
        };
        Ok(value)
    }
}
