use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    AnalysisError, Bar, CompanyInfo, CompanyInfoProvider, FinancialStatements, Market,
    PriceHistoryProvider, ReferenceRateProvider, ReportingPeriod, StatementProvider,
};

/// Point-in-time copy of everything the engines read from a data provider.
/// Deserializable, so a snapshot can be captured once and replayed deterministically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub companies: HashMap<String, CompanyInfo>,
    #[serde(default)]
    pub annual_statements: HashMap<String, FinancialStatements>,
    #[serde(default)]
    pub quarterly_statements: HashMap<String, FinancialStatements>,
    /// Daily bars per symbol, oldest first
    #[serde(default)]
    pub price_history: HashMap<String, Vec<Bar>>,
    #[serde(default)]
    pub reference_rates: HashMap<Market, f64>,
}

/// Provider backed by a [`MarketSnapshot`]. Used by tests and the snapshot-driven CLI.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    snapshot: MarketSnapshot,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: MarketSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn with_company(mut self, info: CompanyInfo) -> Self {
        self.snapshot.companies.insert(info.symbol.clone(), info);
        self
    }

    pub fn with_statements(mut self, statements: FinancialStatements) -> Self {
        let symbol = statements.symbol.clone();
        match statements.period {
            ReportingPeriod::Annual => self.snapshot.annual_statements.insert(symbol, statements),
            ReportingPeriod::Quarterly => {
                self.snapshot.quarterly_statements.insert(symbol, statements)
            }
        };
        self
    }

    pub fn with_prices(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.snapshot.price_history.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_reference_rate(mut self, market: Market, rate: f64) -> Self {
        self.snapshot.reference_rates.insert(market, rate);
        self
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl CompanyInfoProvider for InMemoryProvider {
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, AnalysisError> {
        self.snapshot
            .companies
            .get(symbol)
            .cloned()
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no company info for {}", symbol)))
    }
}

#[async_trait]
impl StatementProvider for InMemoryProvider {
    async fn financial_statements(
        &self,
        symbol: &str,
        period: ReportingPeriod,
    ) -> Result<FinancialStatements, AnalysisError> {
        let source = match period {
            ReportingPeriod::Annual => &self.snapshot.annual_statements,
            ReportingPeriod::Quarterly => &self.snapshot.quarterly_statements,
        };
        source.get(symbol).cloned().ok_or_else(|| {
            AnalysisError::DataUnavailable(format!("no {:?} statements for {}", period, symbol))
        })
    }
}

#[async_trait]
impl PriceHistoryProvider for InMemoryProvider {
    /// Bars within `days` calendar days of the latest stored bar.
    async fn price_history(&self, symbol: &str, days: i64) -> Result<Vec<Bar>, AnalysisError> {
        let bars = self
            .snapshot
            .price_history
            .get(symbol)
            .filter(|bars| !bars.is_empty())
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no price history for {}", symbol)))?;

        let latest = bars.iter().map(|b| b.timestamp).max();
        let window: Vec<Bar> = match latest {
            Some(latest) => {
                // a window reaching past the representable range keeps everything
                match Duration::try_days(days).and_then(|d| latest.checked_sub_signed(d)) {
                    Some(start) => bars.iter().filter(|b| b.timestamp >= start).cloned().collect(),
                    None => bars.clone(),
                }
            }
            None => Vec::new(),
        };
        Ok(window)
    }
}

#[async_trait]
impl ReferenceRateProvider for InMemoryProvider {
    async fn reference_rate(&self, market: Market) -> Result<Option<f64>, AnalysisError> {
        Ok(self.snapshot.reference_rates.get(&market).copied())
    }
}
