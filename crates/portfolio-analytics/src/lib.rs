//! Portfolio-level risk decomposition: position weights, Herfindahl-Hirschman
//! concentration and pairwise return correlation.

use analysis_core::{AnalysisError, Bar, PortfolioPosition, PriceHistoryProvider};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub mod concentration;
pub mod correlation;

pub use concentration::{herfindahl_index, ConcentrationLevel, Holdings};
pub use correlation::{
    aligned_returns, correlation_matrix, significant_pairs, CorrelationMatrix, PairRisk,
    SignificantPair,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSettings {
    pub high_correlation_threshold: f64,
    pub lookback_days: i64,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            high_correlation_threshold: 0.7,
            lookback_days: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub weights: BTreeMap<String, f64>,
    /// Rounded to 2 decimals
    pub hhi: f64,
    pub concentration_level: ConcentrationLevel,
    pub correlation_matrix: CorrelationMatrix,
    pub significant_pairs: Vec<SignificantPair>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_market_value: Decimal,
}

pub struct PortfolioAnalyzer {
    settings: PortfolioSettings,
}

impl PortfolioAnalyzer {
    pub fn new() -> Self {
        Self::with_settings(PortfolioSettings::default())
    }

    pub fn with_settings(settings: PortfolioSettings) -> Self {
        Self { settings }
    }

    /// Weights and concentration only; correlation is left empty.
    fn concentration(&self, holdings: &Holdings) -> PortfolioAnalysis {
        let weights = holdings.weights();
        let raw: Vec<f64> = weights.iter().map(|(_, w)| *w).collect();
        let hhi = (herfindahl_index(&raw) * 100.0).round() / 100.0;

        PortfolioAnalysis {
            weights: weights.into_iter().collect(),
            hhi,
            concentration_level: ConcentrationLevel::from_hhi(hhi),
            correlation_matrix: BTreeMap::new(),
            significant_pairs: Vec::new(),
            total_market_value: holdings.total,
        }
    }

    /// Analyzes positions against already fetched histories.
    /// A single holding needs no history and gets an empty matrix.
    pub fn compute(
        &self,
        positions: &[PortfolioPosition],
        history: &HashMap<String, Vec<Bar>>,
    ) -> Result<PortfolioAnalysis, AnalysisError> {
        let holdings = Holdings::aggregate(positions)?;
        self.compute_holdings(&holdings, history)
    }

    fn compute_holdings(
        &self,
        holdings: &Holdings,
        history: &HashMap<String, Vec<Bar>>,
    ) -> Result<PortfolioAnalysis, AnalysisError> {
        let mut analysis = self.concentration(holdings);
        let tickers = holdings.tickers();
        if tickers.len() < 2 {
            return Ok(analysis);
        }

        let returns = aligned_returns(&tickers, history)?;
        let matrix = correlation_matrix(&tickers, &returns);
        analysis.significant_pairs =
            significant_pairs(&tickers, &matrix, self.settings.high_correlation_threshold);
        analysis.correlation_matrix = matrix;
        Ok(analysis)
    }

    /// Validates the positions, fetches every history concurrently, then computes.
    pub async fn analyze<P>(
        &self,
        provider: &P,
        positions: &[PortfolioPosition],
    ) -> Result<PortfolioAnalysis, AnalysisError>
    where
        P: PriceHistoryProvider + ?Sized,
    {
        let holdings = Holdings::aggregate(positions)?;
        let tickers = holdings.tickers();
        debug!("Portfolio analysis over {} holdings", tickers.len());

        if tickers.len() < 2 {
            return self.compute_holdings(&holdings, &HashMap::new());
        }

        let days = self.settings.lookback_days;
        let fetched = join_all(tickers.iter().map(|t| provider.price_history(t, days))).await;

        let mut history = HashMap::with_capacity(tickers.len());
        for (ticker, bars) in tickers.iter().zip(fetched) {
            history.insert(ticker.clone(), bars?);
        }

        self.compute_holdings(&holdings, &history)
    }
}

impl Default for PortfolioAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
