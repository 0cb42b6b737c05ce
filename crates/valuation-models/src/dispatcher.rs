use analysis_core::AnalysisError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::model::ModelInputs;
use crate::registry::ModelRegistry;

impl ModelRegistry {
    /// Runs one model against a bag of resolved inputs.
    ///
    /// Concept-typed inputs must already be plain numbers; resolving them (and picking
    /// which model serves a concept) is up to the caller. Keys the model does not
    /// declare are ignored. Any failure inside the model, including invalid values it
    /// rejects, comes back as `Calculation` naming the model.
    pub fn run_calculation(
        &self,
        model_name: &str,
        inputs: &HashMap<String, f64>,
    ) -> Result<f64, AnalysisError> {
        let entry = self.entry(model_name)?;
        let selected = ModelInputs::select(model_name, &entry.metadata, inputs)?;

        debug!("Running {} with {} inputs", model_name, selected.len());

        let value = entry
            .model
            .calculate(&selected)
            .map_err(|e| AnalysisError::Calculation {
                model: model_name.to_string(),
                source: Box::new(e),
            })?;

        if !value.is_finite() {
            return Err(AnalysisError::Calculation {
                model: model_name.to_string(),
                source: Box::new(AnalysisError::InvalidInput(format!(
                    "result is not a finite number ({})",
                    value
                ))),
            });
        }

        Ok(value)
    }

    /// Same as [`ModelRegistry::run_calculation`] for loosely typed JSON arguments.
    /// Declared keys holding anything but a number are rejected as invalid input;
    /// an optional key may also be null, which means its default.
    pub fn run_calculation_json(
        &self,
        model_name: &str,
        inputs: &Map<String, Value>,
    ) -> Result<f64, AnalysisError> {
        let entry = self.entry(model_name)?;

        let missing: Vec<String> = entry
            .metadata
            .input_keys()
            .filter(|key| !inputs.contains_key(*key))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::MissingInput {
                model: model_name.to_string(),
                missing,
            });
        }

        let mut numeric = HashMap::new();
        let mut non_numeric = Vec::new();
        for key in entry.metadata.input_keys() {
            match inputs.get(key).and_then(Value::as_f64) {
                Some(v) => {
                    numeric.insert(key.to_string(), v);
                }
                None => non_numeric.push(key.to_string()),
            }
        }
        for key in entry.metadata.optional_keys() {
            match inputs.get(key) {
                None | Some(Value::Null) => {}
                Some(value) => match value.as_f64() {
                    Some(v) => {
                        numeric.insert(key.to_string(), v);
                    }
                    None => non_numeric.push(key.to_string()),
                },
            }
        }

        if !non_numeric.is_empty() {
            return Err(AnalysisError::InvalidInput(format!(
                "inputs for '{}' must be numbers: {}",
                model_name,
                non_numeric.join(", ")
            )));
        }

        self.run_calculation(model_name, &numeric)
    }
}
