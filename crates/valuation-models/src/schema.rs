use analysis_core::AnalysisError;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CONCEPT_PREFIX: &str = "concept:";

/// Declared type of a model input: a primitive, or a quantity produced by another concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputType {
    Float,
    Concept(String),
}

impl InputType {
    pub fn concept(code: &str) -> Self {
        InputType::Concept(code.to_string())
    }

    /// Concept code this input refers to, if any.
    pub fn concept_code(&self) -> Option<&str> {
        match self {
            InputType::Concept(code) => Some(code),
            InputType::Float => None,
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Float => write!(f, "float"),
            InputType::Concept(code) => write!(f, "{}{}", CONCEPT_PREFIX, code),
        }
    }
}

impl FromStr for InputType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "float" {
            return Ok(InputType::Float);
        }
        match s.strip_prefix(CONCEPT_PREFIX) {
            Some(code) if !code.is_empty() => Ok(InputType::Concept(code.to_string())),
            _ => Err(AnalysisError::InvalidInput(format!("unknown input type tag '{}'", s))),
        }
    }
}

impl Serialize for InputType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InputType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub key: String,
    pub input_type: InputType,
}

/// Input a caller may leave out; `default` stands in for it.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalInput {
    pub key: String,
    pub default: f64,
}

/// Description of a model: display name, purpose and its declared inputs in order.
/// The executable implementation lives beside it in the registry and is never exposed here.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub name: String,
    pub description: String,
    pub required_inputs: Vec<InputSpec>,
    pub optional_inputs: Vec<OptionalInput>,
}

impl ModelMetadata {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required_inputs: Vec::new(),
            optional_inputs: Vec::new(),
        }
    }

    pub fn input(mut self, key: &str, input_type: InputType) -> Self {
        self.required_inputs.push(InputSpec {
            key: key.to_string(),
            input_type,
        });
        self
    }

    pub fn float(self, key: &str) -> Self {
        self.input(key, InputType::Float)
    }

    pub fn concept(self, key: &str, code: &str) -> Self {
        self.input(key, InputType::concept(code))
    }

    pub fn optional_float(mut self, key: &str, default: f64) -> Self {
        self.optional_inputs.push(OptionalInput {
            key: key.to_string(),
            default,
        });
        self
    }

    pub fn input_keys(&self) -> impl Iterator<Item = &str> {
        self.required_inputs.iter().map(|spec| spec.key.as_str())
    }

    pub fn optional_keys(&self) -> impl Iterator<Item = &str> {
        self.optional_inputs.iter().map(|input| input.key.as_str())
    }

    pub fn input_type(&self, key: &str) -> Option<&InputType> {
        self.required_inputs
            .iter()
            .find(|spec| spec.key == key)
            .map(|spec| &spec.input_type)
    }

    /// (input key, concept code) for every input the caller must resolve through another model.
    pub fn concept_dependencies(&self) -> Vec<(&str, &str)> {
        self.required_inputs
            .iter()
            .filter_map(|spec| spec.input_type.concept_code().map(|code| (spec.key.as_str(), code)))
            .collect()
    }
}

struct OrderedInputs<'a>(&'a [InputSpec]);

impl Serialize for OrderedInputs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(&spec.key, &spec.input_type)?;
        }
        map.end()
    }
}

struct OptionalDefaults<'a>(&'a [OptionalInput]);

impl Serialize for OptionalDefaults<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for input in self.0 {
            map.serialize_entry(&input.key, &input.default)?;
        }
        map.end()
    }
}

impl Serialize for ModelMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ModelMetadata", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("required_inputs", &OrderedInputs(&self.required_inputs))?;
        if !self.optional_inputs.is_empty() {
            state.serialize_field("optional_inputs", &OptionalDefaults(&self.optional_inputs))?;
        }
        state.end()
    }
}

/// Public view of a concept group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptInfo {
    pub code: String,
    pub display_name: String,
    pub model_names: Vec<String>,
}
