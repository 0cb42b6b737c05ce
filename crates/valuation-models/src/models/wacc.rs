use analysis_core::AnalysisError;

use crate::model::{ModelInputs, ValuationModel};
use crate::schema::ModelMetadata;

/// WACC = E/V * Re + D/V * Rd * (1 - Tc), with V = E + D
pub struct Wacc;

impl ValuationModel for Wacc {
    fn model_name(&self) -> &'static str {
        "WACC"
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata::new(
            "Weighted Average Cost of Capital (WACC)",
            "Blended after-tax cost of the firm's equity and debt financing, weighted by market value.",
        )
        .float("market_cap")
        .float("total_debt")
        .concept("cost_of_equity", "cost_of_equity")
        .float("cost_of_debt")
        .float("tax_rate")
    }

    fn calculate(&self, inputs: &ModelInputs) -> Result<f64, AnalysisError> {
        let equity = inputs.get("market_cap")?;
        let debt = inputs.get("total_debt")?;
        let re = inputs.get("cost_of_equity")?;
        let rd = inputs.get("cost_of_debt")?;
        let tax_rate = inputs.get("tax_rate")?;

        let value = equity + debt;
        if value == 0.0 {
            return Ok(0.0);
        }

        Ok(equity / value * re + debt / value * rd * (1.0 - tax_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(e: f64, d: f64) -> ModelInputs {
        ModelInputs::from_pairs(
            "WACC",
            &[
                ("market_cap", e),
                ("total_debt", d),
                ("cost_of_equity", 0.10),
                ("cost_of_debt", 0.05),
                ("tax_rate", 0.25),
            ],
        )
    }

    #[test]
    fn test_blended_rate() {
        // 0.75 * 0.10 + 0.25 * 0.05 * 0.75
        let wacc = Wacc.calculate(&inputs(750.0, 250.0)).unwrap();
        assert!((wacc - 0.084375).abs() < 1e-12);
    }

    #[test]
    fn test_zero_capital_is_zero() {
        assert_eq!(Wacc.calculate(&inputs(0.0, 0.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_all_equity_is_cost_of_equity() {
        let wacc = Wacc.calculate(&inputs(1_000.0, 0.0)).unwrap();
        assert!((wacc - 0.10).abs() < 1e-12);
    }
}
