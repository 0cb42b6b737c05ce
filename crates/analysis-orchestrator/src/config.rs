use anyhow::{bail, Context, Result};
use portfolio_analytics::PortfolioSettings;
use quant_analysis::RiskSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Longest accepted price-history window, in calendar days.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    // Risk-free rate used when the reference rate is unavailable
    pub domestic_risk_free_fallback: f64,      // 0.035
    pub international_risk_free_fallback: f64, // 0.045

    // Benchmarks for beta
    pub domestic_benchmark: String,      // ^KS11
    pub international_benchmark: String, // ^GSPC

    pub risk_lookback_days: i64,          // 365
    pub high_correlation_threshold: f64,  // 0.7

    // Provider cache, 0 disables it
    pub data_cache_ttl_secs: u64,         // 300
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            domestic_risk_free_fallback: 0.035,
            international_risk_free_fallback: 0.045,
            domestic_benchmark: "^KS11".to_string(),
            international_benchmark: "^GSPC".to_string(),
            risk_lookback_days: 365,
            high_correlation_threshold: 0.7,
            data_cache_ttl_secs: 300,
        }
    }
}

fn setting<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{} has an invalid value '{}'", key, raw))
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            domestic_risk_free_fallback: setting(&lookup, "DOMESTIC_RISK_FREE_FALLBACK", "0.035")?,
            international_risk_free_fallback: setting(
                &lookup,
                "INTERNATIONAL_RISK_FREE_FALLBACK",
                "0.045",
            )?,
            domestic_benchmark: lookup("DOMESTIC_BENCHMARK").unwrap_or_else(|| "^KS11".to_string()),
            international_benchmark: lookup("INTERNATIONAL_BENCHMARK")
                .unwrap_or_else(|| "^GSPC".to_string()),
            risk_lookback_days: setting(&lookup, "RISK_LOOKBACK_DAYS", "365")?,
            high_correlation_threshold: setting(&lookup, "HIGH_CORRELATION_THRESHOLD", "0.7")?,
            data_cache_ttl_secs: setting(&lookup, "DATA_CACHE_TTL_SECS", "300")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("DOMESTIC_RISK_FREE_FALLBACK", self.domestic_risk_free_fallback),
            ("INTERNATIONAL_RISK_FREE_FALLBACK", self.international_risk_free_fallback),
        ] {
            if !(0.0..1.0).contains(&rate) {
                bail!("{} must be in [0, 1), got {}", name, rate);
            }
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.risk_lookback_days) {
            bail!(
                "RISK_LOOKBACK_DAYS must be in 1..={}, got {}",
                MAX_LOOKBACK_DAYS,
                self.risk_lookback_days
            );
        }
        if !(self.high_correlation_threshold > 0.0 && self.high_correlation_threshold < 1.0) {
            bail!(
                "HIGH_CORRELATION_THRESHOLD must be in (0, 1), got {}",
                self.high_correlation_threshold
            );
        }
        if self.domestic_benchmark.trim().is_empty() || self.international_benchmark.trim().is_empty() {
            bail!("benchmark symbols must not be empty");
        }
        Ok(())
    }

    pub fn risk_settings(&self) -> RiskSettings {
        RiskSettings {
            domestic_benchmark: self.domestic_benchmark.clone(),
            international_benchmark: self.international_benchmark.clone(),
            domestic_risk_free_fallback: self.domestic_risk_free_fallback,
            international_risk_free_fallback: self.international_risk_free_fallback,
            lookback_days: self.risk_lookback_days,
        }
    }

    pub fn portfolio_settings(&self) -> PortfolioSettings {
        PortfolioSettings {
            high_correlation_threshold: self.high_correlation_threshold,
            lookback_days: self.risk_lookback_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<AnalyticsConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AnalyticsConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.risk_settings(), RiskSettings::default());
        assert_eq!(config.portfolio_settings(), PortfolioSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("INTERNATIONAL_BENCHMARK", "^NDX"),
            ("RISK_LOOKBACK_DAYS", "730"),
            ("DATA_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.international_benchmark, "^NDX");
        assert_eq!(config.risk_settings().lookback_days, 730);
        assert_eq!(config.data_cache_ttl_secs, 0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(from_map(&[("RISK_LOOKBACK_DAYS", "a year")]).is_err());
        assert!(from_map(&[("RISK_LOOKBACK_DAYS", "0")]).is_err());
        assert!(from_map(&[("RISK_LOOKBACK_DAYS", "9223372036854775807")]).is_err());
        assert!(from_map(&[("RISK_LOOKBACK_DAYS", "36500")]).is_ok());
        assert!(from_map(&[("DOMESTIC_RISK_FREE_FALLBACK", "3.5")]).is_err());
        assert!(from_map(&[("HIGH_CORRELATION_THRESHOLD", "1.0")]).is_err());

        let err = from_map(&[("DATA_CACHE_TTL_SECS", "-5")]).unwrap_err();
        assert!(err.to_string().contains("DATA_CACHE_TTL_SECS"));
    }
}
