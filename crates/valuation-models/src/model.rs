use analysis_core::AnalysisError;
use std::collections::HashMap;

use crate::schema::ModelMetadata;

/// A valuation or theory model that turns a fixed set of named numbers into one figure.
pub trait ValuationModel: Send + Sync {
    /// Registry key, unique across all concepts (e.g. "CAPM")
    fn model_name(&self) -> &'static str;

    fn metadata(&self) -> ModelMetadata;

    fn calculate(&self, inputs: &ModelInputs) -> Result<f64, AnalysisError>;
}

/// The declared inputs of one model, already checked for presence.
#[derive(Debug, Clone)]
pub struct ModelInputs {
    model: String,
    values: HashMap<String, f64>,
}

impl ModelInputs {
    /// Picks the declared keys out of `source`, ignoring anything else.
    /// Every absent required key is reported at once, in declaration order;
    /// absent optional keys take their defaults.
    pub fn select(
        model: &str,
        metadata: &ModelMetadata,
        source: &HashMap<String, f64>,
    ) -> Result<Self, AnalysisError> {
        let missing: Vec<String> = metadata
            .required_inputs
            .iter()
            .filter(|spec| !source.contains_key(&spec.key))
            .map(|spec| spec.key.clone())
            .collect();

        if !missing.is_empty() {
            return Err(AnalysisError::MissingInput {
                model: model.to_string(),
                missing,
            });
        }

        let mut values: HashMap<String, f64> = metadata
            .required_inputs
            .iter()
            .filter_map(|spec| source.get(&spec.key).map(|v| (spec.key.clone(), *v)))
            .collect();
        for input in &metadata.optional_inputs {
            let value = source.get(&input.key).copied().unwrap_or(input.default);
            values.insert(input.key.clone(), value);
        }

        Ok(Self {
            model: model.to_string(),
            values,
        })
    }

    pub fn from_pairs(model: &str, pairs: &[(&str, f64)]) -> Self {
        Self {
            model: model.to_string(),
            values: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Result<f64, AnalysisError> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| AnalysisError::MissingInput {
                model: self.model.clone(),
                missing: vec![key.to_string()],
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_drops_undeclared_keys() {
        let meta = ModelMetadata::new("m", "").float("a").float("b");
        let source: HashMap<String, f64> = [("a", 1.0), ("b", 2.0), ("c", 3.0)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();

        let inputs = ModelInputs::select("m", &meta, &source).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.get("b").unwrap(), 2.0);
        assert!(inputs.get("c").is_err());
    }

    #[test]
    fn test_select_reports_all_missing_in_order() {
        let meta = ModelMetadata::new("m", "").float("x").float("y").float("z");
        let source: HashMap<String, f64> = [("y".to_string(), 1.0)].into_iter().collect();

        let err = ModelInputs::select("m", &meta, &source).unwrap_err();
        assert_eq!(err.missing_keys(), &["x".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_select_fills_optional_defaults() {
        let meta = ModelMetadata::new("m", "").float("a").optional_float("w", 1.0);
        let source: HashMap<String, f64> = [("a".to_string(), 2.0)].into_iter().collect();

        let inputs = ModelInputs::select("m", &meta, &source).unwrap();
        assert_eq!(inputs.get("w").unwrap(), 1.0);

        let overridden: HashMap<String, f64> =
            [("a".to_string(), 2.0), ("w".to_string(), 0.3)].into_iter().collect();
        let inputs = ModelInputs::select("m", &meta, &overridden).unwrap();
        assert_eq!(inputs.get("w").unwrap(), 0.3);
    }
}
