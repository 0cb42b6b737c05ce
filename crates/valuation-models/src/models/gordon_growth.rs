use analysis_core::AnalysisError;

use crate::model::{ModelInputs, ValuationModel};
use crate::schema::ModelMetadata;

/// Growth rate implied by the current price: g = r - D1 / P0
pub struct GordonGrowthModel;

impl ValuationModel for GordonGrowthModel {
    fn model_name(&self) -> &'static str {
        "GordonGrowthModel"
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata::new(
            "Gordon Growth Model (GGM)",
            "Perpetual dividend growth rate the market is pricing in, given the cost of equity, next year's dividend and the current price.",
        )
        .concept("r", "cost_of_equity")
        .float("D1")
        .float("P0")
    }

    fn calculate(&self, inputs: &ModelInputs) -> Result<f64, AnalysisError> {
        let r = inputs.get("r")?;
        let d1 = inputs.get("D1")?;
        let p0 = inputs.get("P0")?;

        // also rejects NaN
        if !(p0 > 0.0) {
            return Err(AnalysisError::InvalidInput(
                "Current stock price (P0) must be greater than zero".to_string(),
            ));
        }

        Ok(r - d1 / p0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(p0: f64) -> ModelInputs {
        ModelInputs::from_pairs("GordonGrowthModel", &[("r", 0.10), ("D1", 2.0), ("P0", p0)])
    }

    #[test]
    fn test_implied_growth() {
        let g = GordonGrowthModel.calculate(&inputs(50.0)).unwrap();
        assert!((g - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_price_is_invalid() {
        for p0 in [0.0, -10.0, f64::NAN] {
            let err = GordonGrowthModel.calculate(&inputs(p0)).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_declares_cost_of_equity_dependency() {
        let meta = GordonGrowthModel.metadata();
        assert_eq!(meta.concept_dependencies(), vec![("r", "cost_of_equity")]);
    }
}
