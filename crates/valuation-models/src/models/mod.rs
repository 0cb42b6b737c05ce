mod capm;
mod fama_french;
mod gordon_growth;
mod wacc;

pub use capm::Capm;
pub use fama_french::FamaFrench3Factor;
pub use gordon_growth::GordonGrowthModel;
pub use wacc::Wacc;
