use analysis_core::AnalysisError;

use crate::model::{ModelInputs, ValuationModel};
use crate::schema::ModelMetadata;

/// Cost of equity = rf + beta * (market_return - rf)
pub struct Capm;

impl ValuationModel for Capm {
    fn model_name(&self) -> &'static str {
        "CAPM"
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata::new(
            "Capital Asset Pricing Model (CAPM)",
            "Expected return on equity from its systematic risk (beta) relative to the market premium over the risk-free rate.",
        )
        .float("risk_free_rate")
        .float("beta")
        .float("market_return")
    }

    fn calculate(&self, inputs: &ModelInputs) -> Result<f64, AnalysisError> {
        let rf = inputs.get("risk_free_rate")?;
        let beta = inputs.get("beta")?;
        let market_return = inputs.get("market_return")?;

        Ok(rf + beta * (market_return - rf))
    }
}
