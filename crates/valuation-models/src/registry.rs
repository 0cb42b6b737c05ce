use analysis_core::AnalysisError;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::model::ValuationModel;
use crate::schema::{ConceptInfo, ModelMetadata};

/// A registered model: its public metadata and the implementation that executes it.
#[derive(Clone)]
pub struct ModelEntry {
    pub metadata: ModelMetadata,
    pub(crate) model: Arc<dyn ValuationModel>,
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct ConceptGroup {
    code: String,
    display_name: String,
    /// Model names in registration order
    models: Vec<String>,
}

/// Collects concept declarations and models, then validates them all in [`RegistryBuilder::build`].
#[derive(Default)]
pub struct RegistryBuilder {
    concepts: Vec<ConceptGroup>,
    models: Vec<(String, Arc<dyn ValuationModel>)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concept(mut self, code: &str, display_name: &str) -> Self {
        self.concepts.push(ConceptGroup {
            code: code.to_string(),
            display_name: display_name.to_string(),
            models: Vec::new(),
        });
        self
    }

    pub fn model<M: ValuationModel + 'static>(mut self, concept: &str, model: M) -> Self {
        self.models.push((concept.to_string(), Arc::new(model)));
        self
    }

    /// Fails on a model name registered twice (even across concepts), a concept declared
    /// twice, a model filed under an undeclared concept, or an input referring to an
    /// unknown concept.
    pub fn build(self) -> Result<ModelRegistry, AnalysisError> {
        let mut concepts: BTreeMap<String, ConceptGroup> = BTreeMap::new();
        for group in self.concepts {
            if concepts.contains_key(&group.code) {
                return Err(AnalysisError::InvalidInput(format!(
                    "concept '{}' is declared more than once",
                    group.code
                )));
            }
            concepts.insert(group.code.clone(), group);
        }

        let mut models: HashMap<String, ModelEntry> = HashMap::new();
        let mut owners: HashMap<String, String> = HashMap::new();

        for (concept, model) in self.models {
            let name = model.model_name().to_string();
            if models.contains_key(&name) {
                return Err(AnalysisError::DuplicateModel(name));
            }

            let group = concepts
                .get_mut(&concept)
                .ok_or_else(|| AnalysisError::concept_not_found(&concept))?;
            group.models.push(name.clone());

            debug!("Registered model {} under concept {}", name, concept);
            owners.insert(name.clone(), concept);
            models.insert(
                name,
                ModelEntry {
                    metadata: model.metadata(),
                    model,
                },
            );
        }

        for entry in models.values() {
            for (key, code) in entry.metadata.concept_dependencies() {
                if !concepts.contains_key(code) {
                    return Err(AnalysisError::InvalidInput(format!(
                        "input '{}' of '{}' refers to unknown concept '{}'",
                        key, entry.metadata.name, code
                    )));
                }
            }
        }

        Ok(ModelRegistry {
            concepts,
            models,
            owners,
        })
    }
}

/// Catalog of financial concepts and the models that compute them.
///
/// Read-only once built, so it can be shared freely behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    concepts: BTreeMap<String, ConceptGroup>,
    models: HashMap<String, ModelEntry>,
    owners: HashMap<String, String>,
}

impl ModelRegistry {
    pub fn list_concepts(&self) -> BTreeSet<String> {
        self.concepts.keys().cloned().collect()
    }

    pub fn get_concept(&self, code: &str) -> Result<ConceptInfo, AnalysisError> {
        self.concepts
            .get(code)
            .map(|group| ConceptInfo {
                code: group.code.clone(),
                display_name: group.display_name.clone(),
                model_names: group.models.clone(),
            })
            .ok_or_else(|| AnalysisError::concept_not_found(code))
    }

    /// Model names grouped by concept. With a filter, only that concept is returned;
    /// an unknown concept yields an empty map.
    pub fn list_models(&self, concept: Option<&str>) -> BTreeMap<String, Vec<String>> {
        self.concepts
            .values()
            .filter(|group| concept.map_or(true, |code| group.code == code))
            .map(|group| (group.code.clone(), group.models.clone()))
            .collect()
    }

    pub fn get_model_metadata(&self, model_name: &str) -> Result<ModelMetadata, AnalysisError> {
        self.entry(model_name).map(|entry| entry.metadata.clone())
    }

    /// Concept a model is registered under.
    pub fn concept_of(&self, model_name: &str) -> Result<&str, AnalysisError> {
        self.owners
            .get(model_name)
            .map(String::as_str)
            .ok_or_else(|| AnalysisError::model_not_found(model_name))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub(crate) fn entry(&self, model_name: &str) -> Result<&ModelEntry, AnalysisError> {
        self.models
            .get(model_name)
            .ok_or_else(|| AnalysisError::model_not_found(model_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelInputs;
    use crate::{builtin_registry, Capm, Wacc};

    struct AlsoCapm;

    impl ValuationModel for AlsoCapm {
        fn model_name(&self) -> &'static str {
            "CAPM"
        }

        fn metadata(&self) -> ModelMetadata {
            ModelMetadata::new("Shadow CAPM", "").float("beta")
        }

        fn calculate(&self, inputs: &ModelInputs) -> Result<f64, AnalysisError> {
            inputs.get("beta")
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let registry = builtin_registry().unwrap();

        let concepts: Vec<String> = registry.list_concepts().into_iter().collect();
        assert_eq!(concepts, vec!["cost_of_equity", "implied_growth", "wacc"]);
        assert_eq!(registry.model_count(), 4);

        let coe = registry.get_concept("cost_of_equity").unwrap();
        assert_eq!(coe.display_name, "Cost of Equity");
        assert_eq!(coe.model_names, vec!["CAPM", "FamaFrench3Factor"]);
        assert_eq!(registry.concept_of("WACC").unwrap(), "wacc");
    }

    #[test]
    fn test_list_models_filter() {
        let registry = builtin_registry().unwrap();

        let all = registry.list_models(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all["implied_growth"], vec!["GordonGrowthModel"]);

        let one = registry.list_models(Some("wacc"));
        assert_eq!(one.len(), 1);
        assert_eq!(one["wacc"], vec!["WACC"]);

        assert!(registry.list_models(Some("terminal_value")).is_empty());
    }

    #[test]
    fn test_metadata_lookup() {
        let registry = builtin_registry().unwrap();

        let meta = registry.get_model_metadata("CAPM").unwrap();
        assert_eq!(meta.name, "Capital Asset Pricing Model (CAPM)");
        let keys: Vec<&str> = meta.input_keys().collect();
        assert_eq!(keys, vec!["risk_free_rate", "beta", "market_return"]);

        let ggm = registry.get_model_metadata("GordonGrowthModel").unwrap();
        assert_eq!(ggm.input_type("r").unwrap().to_string(), "concept:cost_of_equity");
    }

    #[test]
    fn test_unknown_names_are_not_found() {
        let registry = builtin_registry().unwrap();

        let err = registry.get_model_metadata("DCF").unwrap_err();
        assert_eq!(err.to_string(), "Model 'DCF' could not be found");
        assert!(matches!(
            registry.get_concept("beta"),
            Err(AnalysisError::NotFound { kind: "Concept", .. })
        ));
    }

    #[test]
    fn test_duplicate_model_name_across_concepts() {
        let result = RegistryBuilder::new()
            .concept("cost_of_equity", "Cost of Equity")
            .concept("other", "Other")
            .model("cost_of_equity", Capm)
            .model("other", AlsoCapm)
            .build();

        assert!(matches!(result, Err(AnalysisError::DuplicateModel(name)) if name == "CAPM"));
    }

    #[test]
    fn test_dangling_concept_reference_rejected() {
        // WACC needs cost_of_equity, which is never declared here
        let result = RegistryBuilder::new()
            .concept("wacc", "WACC")
            .model("wacc", Wacc)
            .build();
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));

        let undeclared = RegistryBuilder::new().model("cost_of_equity", Capm).build();
        assert!(matches!(undeclared, Err(AnalysisError::NotFound { .. })));
    }
}
