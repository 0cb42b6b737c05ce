//! Tool boundary of the analytics workspace: configuration, a TTL cache in front of
//! the market-data provider, and [`AnalyticsToolkit`], which exposes the valuation
//! registry and the analysis engines as JSON-in/JSON-out tools.

pub mod cache;
pub mod config;
pub mod toolkit;


pub use cache::CachedProvider;
pub use config::AnalyticsConfig;
pub use toolkit::{AnalyticsToolkit, TOOL_NAMES};
