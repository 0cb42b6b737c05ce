use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{kind} '{name}' could not be found")]
    NotFound { kind: &'static str, name: String },

    #[error("Missing required inputs for '{model}': {}", .missing.join(", "))]
    MissingInput { model: String, missing: Vec<String> },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation of '{model}' failed: {source}")]
    Calculation {
        model: String,
        #[source]
        source: Box<AnalysisError>,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Model '{0}' is registered more than once")]
    DuplicateModel(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl AnalysisError {
    pub fn concept_not_found(code: &str) -> Self {
        AnalysisError::NotFound {
            kind: "Concept",
            name: code.to_string(),
        }
    }

    pub fn model_not_found(name: &str) -> Self {
        AnalysisError::NotFound {
            kind: "Model",
            name: name.to_string(),
        }
    }

    /// Keys reported by a `MissingInput` error, empty for every other variant.
    pub fn missing_keys(&self) -> &[String] {
        match self {
            AnalysisError::MissingInput { missing, .. } => missing,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_missing_input_lists_every_key() {
        let err = AnalysisError::MissingInput {
            model: "CAPM".to_string(),
            missing: vec!["beta".to_string(), "market_return".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required inputs for 'CAPM': beta, market_return"
        );
        assert_eq!(err.missing_keys().len(), 2);
    }

    #[test]
    fn test_calculation_keeps_cause() {
        let err = AnalysisError::Calculation {
            model: "GordonGrowthModel".to_string(),
            source: Box::new(AnalysisError::InvalidInput("P0 must be positive".to_string())),
        };
        assert!(err.to_string().contains("GordonGrowthModel"));
        let cause = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert_eq!(cause, "Invalid input: P0 must be positive");
    }
}
