use analysis_core::AnalysisError;

use crate::model::{ModelInputs, ValuationModel};
use crate::schema::ModelMetadata;

/// Three-factor cost of equity:
/// rf + beta * (market_return - rf) + smb_loading * smb + hml_loading * hml
///
/// The loadings default to 1.0, so callers passing only the five premia get
/// rf + beta * (market_return - rf) + smb + hml.
pub struct FamaFrench3Factor;

impl ValuationModel for FamaFrench3Factor {
    fn model_name(&self) -> &'static str {
        "FamaFrench3Factor"
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata::new(
            "Fama-French Three-Factor Model",
            "Extends CAPM with size (SMB) and value (HML) premia weighted by the stock's factor loadings.",
        )
        .float("risk_free_rate")
        .float("beta")
        .float("market_return")
        .float("smb")
        .float("hml")
        .optional_float("smb_loading", 1.0)
        .optional_float("hml_loading", 1.0)
    }

    fn calculate(&self, inputs: &ModelInputs) -> Result<f64, AnalysisError> {
        let rf = inputs.get("risk_free_rate")?;
        let beta = inputs.get("beta")?;
        let market_return = inputs.get("market_return")?;
        let smb = inputs.get("smb")?;
        let hml = inputs.get("hml")?;
        let smb_loading = inputs.get("smb_loading")?;
        let hml_loading = inputs.get("hml_loading")?;

        Ok(rf + beta * (market_return - rf) + smb_loading * smb + hml_loading * hml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_loadings_match_capm() {
        let inputs = ModelInputs::from_pairs(
            "FamaFrench3Factor",
            &[
                ("risk_free_rate", 0.04),
                ("beta", 1.2),
                ("market_return", 0.09),
                ("smb", 0.02),
                ("hml", 0.03),
                ("smb_loading", 0.0),
                ("hml_loading", 0.0),
            ],
        );
        let value = FamaFrench3Factor.calculate(&inputs).unwrap();
        assert!((value - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_factor_premia_add_up() {
        let inputs = ModelInputs::from_pairs(
            "FamaFrench3Factor",
            &[
                ("risk_free_rate", 0.04),
                ("beta", 1.0),
                ("market_return", 0.09),
                ("smb", 0.02),
                ("hml", 0.03),
                ("smb_loading", 0.5),
                ("hml_loading", -0.4),
            ],
        );
        let value = FamaFrench3Factor.calculate(&inputs).unwrap();
        // 0.09 + 0.01 - 0.012
        assert!((value - 0.088).abs() < 1e-12);
    }

    #[test]
    fn test_loadings_are_optional() {
        let meta = FamaFrench3Factor.metadata();
        assert_eq!(meta.input_keys().count(), 5);
        assert_eq!(meta.optional_keys().collect::<Vec<_>>(), vec!["smb_loading", "hml_loading"]);
    }
}
