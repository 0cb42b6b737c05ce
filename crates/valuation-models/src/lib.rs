//! Valuation and theory models grouped by the financial concept they produce,
//! plus the registry that catalogs them and the dispatcher that runs them.
//!
//! Concepts shipped with the crate:
//! - `cost_of_equity` - `CAPM`, `FamaFrench3Factor`
//! - `implied_growth` - `GordonGrowthModel` (needs a resolved `cost_of_equity`)
//! - `wacc` - `WACC` (needs a resolved `cost_of_equity`)

pub mod dispatcher;
pub mod model;
pub mod models;
pub mod registry;
pub mod schema;


pub use model::{ModelInputs, ValuationModel};
pub use models::{Capm, FamaFrench3Factor, GordonGrowthModel, Wacc};
pub use registry::{ModelRegistry, RegistryBuilder};
pub use schema::{ConceptInfo, InputSpec, InputType, ModelMetadata, OptionalInput};

use analysis_core::AnalysisError;

/// Registry holding every concept and model compiled into the crate.
pub fn builtin_registry() -> Result<ModelRegistry, AnalysisError> {
    RegistryBuilder::new()
        .concept("cost_of_equity", "Cost of Equity")
        .model("cost_of_equity", Capm)
        .model("cost_of_equity", FamaFrench3Factor)
        .concept("implied_growth", "Implied Growth")
        .model("implied_growth", GordonGrowthModel)
        .concept("wacc", "Weighted Average Cost of Capital")
        .model("wacc", Wacc)
        .build()
}
