use analysis_core::{AnalysisError, PortfolioPosition};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HHI above which a portfolio counts as highly concentrated.
pub const HIGH_CONCENTRATION_HHI: f64 = 2500.0;
/// HHI from which a portfolio counts as moderately concentrated.
pub const MODERATE_CONCENTRATION_HHI: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcentrationLevel {
    Low,
    Moderate,
    High,
}

impl ConcentrationLevel {
    pub fn from_hhi(hhi: f64) -> Self {
        if hhi > HIGH_CONCENTRATION_HHI {
            ConcentrationLevel::High
        } else if hhi >= MODERATE_CONCENTRATION_HHI {
            ConcentrationLevel::Moderate
        } else {
            ConcentrationLevel::Low
        }
    }
}

fn overflow() -> AnalysisError {
    AnalysisError::InvalidInput("total portfolio market value overflows".to_string())
}

/// Positions merged by ticker, in order of first appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct Holdings {
    pub positions: Vec<(String, Decimal)>,
    pub total: Decimal,
}

impl Holdings {
    /// Sums duplicate tickers. Rejects an empty list, negative market values
    /// and a zero total.
    pub fn aggregate(positions: &[PortfolioPosition]) -> Result<Self, AnalysisError> {
        if positions.is_empty() {
            return Err(AnalysisError::InvalidInput("Portfolio is empty.".to_string()));
        }

        let mut merged: Vec<(String, Decimal)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for p in positions {
            let ticker = p.ticker.trim().to_string();
            if ticker.is_empty() {
                return Err(AnalysisError::InvalidInput("position without a ticker".to_string()));
            }
            if p.market_value < Decimal::ZERO {
                return Err(AnalysisError::InvalidInput(format!(
                    "market value of {} is negative ({})",
                    ticker, p.market_value
                )));
            }
            match index.get(&ticker) {
                Some(&i) => {
                    merged[i].1 = merged[i].1.checked_add(p.market_value).ok_or_else(overflow)?;
                }
                None => {
                    index.insert(ticker.clone(), merged.len());
                    merged.push((ticker, p.market_value));
                }
            }
        }

        let total = merged
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, v)| acc.checked_add(*v))
            .ok_or_else(overflow)?;
        if total.is_zero() {
            return Err(AnalysisError::InvalidInput(
                "total portfolio market value is zero".to_string(),
            ));
        }

        Ok(Self {
            positions: merged,
            total,
        })
    }

    pub fn tickers(&self) -> Vec<String> {
        self.positions.iter().map(|(t, _)| t.clone()).collect()
    }

    /// Each holding's share of the total, in holding order.
    pub fn weights(&self) -> Vec<(String, f64)> {
        self.positions
            .iter()
            .map(|(ticker, value)| {
                let weight = (*value / self.total).to_f64().unwrap_or(0.0);
                (ticker.clone(), weight)
            })
            .collect()
    }
}

/// Herfindahl-Hirschman index on a 0..=10000 scale: sum of squared percentage weights.
pub fn herfindahl_index(weights: &[f64]) -> f64 {
    weights.iter().map(|w| (w * 100.0).powi(2)).sum()
}
