use analysis_core::{AnalysisError, Bar, PriceHistoryProvider};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::*;

/// Window lengths for the indicator snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub rsi_length: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub sma_length: usize,
    pub bollinger_length: usize,
    pub bollinger_std: f64,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub stoch_smooth_k: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_length: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            sma_length: 20,
            bollinger_length: 20,
            bollinger_std: 2.0,
            stoch_k: 14,
            stoch_d: 3,
            stoch_smooth_k: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

/// Latest value of each indicator. `None` where the history is too short for its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub sma: Option<f64>,
    pub bollinger_bands: Option<BandValue>,
    pub obv: Option<f64>,
    pub stochastic: Option<StochasticValue>,
}

pub struct TechnicalAnalysisEngine {
    settings: IndicatorSettings,
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self::with_settings(IndicatorSettings::default())
    }

    pub fn with_settings(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn snapshot(&self, symbol: &str, bars: &[Bar]) -> Result<IndicatorSnapshot, AnalysisError> {
        let s = &self.settings;
        let bars: Vec<Bar> = bars
            .iter()
            .filter(|b| b.close.is_finite() && b.close > 0.0)
            .cloned()
            .collect();

        if bars.len() < s.rsi_length + 1 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least {} bars for {}, got {}",
                s.rsi_length + 1,
                symbol,
                bars.len()
            )));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let last = &bars[bars.len() - 1];

        let macd_result = macd(&closes, s.macd_fast, s.macd_slow, s.macd_signal);
        let macd_value = match (
            macd_result.macd_line.last(),
            macd_result.signal_line.last(),
            macd_result.histogram.last(),
        ) {
            (Some(m), Some(sig), Some(h)) => Some(MacdValue {
                macd: *m,
                signal: *sig,
                histogram: *h,
            }),
            _ => None,
        };

        let bands = bollinger_bands(&closes, s.bollinger_length, s.bollinger_std);
        let band_value = match (bands.upper.last(), bands.middle.last(), bands.lower.last()) {
            (Some(u), Some(m), Some(l)) => Some(BandValue {
                upper: *u,
                middle: *m,
                lower: *l,
            }),
            _ => None,
        };

        let stoch = stochastic(&bars, s.stoch_k, s.stoch_d, s.stoch_smooth_k);
        let stoch_value = match (stoch.k.last(), stoch.d.last()) {
            (Some(k), Some(d)) => Some(StochasticValue { k: *k, d: *d }),
            _ => None,
        };

        Ok(IndicatorSnapshot {
            symbol: symbol.to_string(),
            as_of: last.date(),
            close: last.close,
            rsi: rsi(&closes, s.rsi_length).last().copied(),
            macd: macd_value,
            sma: sma(&closes, s.sma_length).last().copied(),
            bollinger_bands: band_value,
            obv: obv(&bars).last().copied().filter(|v| v.is_finite()),
            stochastic: stoch_value,
        })
    }

    pub async fn analyze<P>(
        &self,
        provider: &P,
        symbol: &str,
        days: i64,
    ) -> Result<IndicatorSnapshot, AnalysisError>
    where
        P: PriceHistoryProvider + ?Sized,
    {
        debug!("Indicator snapshot for {} over {} days", symbol, days);
        let bars = provider.price_history(symbol, days).await?;
        self.snapshot(symbol, &bars)
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::InMemoryProvider;
    use chrono::{Duration, TimeZone, Utc};

    fn trending_bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64 + if i % 3 == 0 { -1.5 } else { 0.0 };
                Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_full_snapshot() {
        let engine = TechnicalAnalysisEngine::new();
        let bars = trending_bars(60);
        let snap = engine.snapshot("AAPL", &bars).unwrap();

        assert_eq!(snap.as_of, bars[59].date());
        let rsi = snap.rsi.unwrap();
        assert!(rsi > 50.0 && rsi <= 100.0);
        assert!(snap.macd.is_some());
        let bands = snap.bollinger_bands.unwrap();
        assert!(bands.upper > bands.middle && bands.middle > bands.lower);
        assert!((snap.sma.unwrap() - bands.middle).abs() < 1e-9);
        let stoch = snap.stochastic.unwrap();
        assert!((0.0..=100.0).contains(&stoch.k));
        assert!(snap.obv.is_some());
    }

    #[test]
    fn test_short_history_leaves_long_windows_empty() {
        let engine = TechnicalAnalysisEngine::new();
        let snap = engine.snapshot("AAPL", &trending_bars(16)).unwrap();

        assert!(snap.rsi.is_some());
        assert!(snap.sma.is_none());
        assert!(snap.bollinger_bands.is_none());
        assert!(snap.macd.is_none());
        // 14-bar %K smoothed by 3 needs 16 bars, %D needs 18
        assert!(snap.stochastic.is_none());
    }

    #[test]
    fn test_too_few_bars() {
        let err = TechnicalAnalysisEngine::new()
            .snapshot("AAPL", &trending_bars(14))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[tokio::test]
    async fn test_analyze_through_provider() {
        let provider = InMemoryProvider::new().with_prices("MSFT", trending_bars(40));
        let engine = TechnicalAnalysisEngine::new();

        let snap = engine.analyze(&provider, "MSFT", 365).await.unwrap();
        assert_eq!(snap.symbol, "MSFT");
        assert!(snap.sma.is_some());

        assert!(engine.analyze(&provider, "IBM", 365).await.is_err());
    }
}
