use async_trait::async_trait;
use crate::{AnalysisError, Bar, CompanyInfo, FinancialStatements, Market, ReportingPeriod};

/// Source of static company information (market cap, currency, sector)
#[async_trait]
pub trait CompanyInfoProvider: Send + Sync {
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, AnalysisError>;
}

/// Source of balance sheet, income statement and cash-flow line items
#[async_trait]
pub trait StatementProvider: Send + Sync {
    async fn financial_statements(
        &self,
        symbol: &str,
        period: ReportingPeriod,
    ) -> Result<FinancialStatements, AnalysisError>;
}

/// Source of daily OHLCV bars, oldest first
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn price_history(&self, symbol: &str, days: i64) -> Result<Vec<Bar>, AnalysisError>;
}

/// Source of the current short-term reference rate for a market.
/// Returns an annualized fraction (0.045 = 4.5%), or `None` when the rate is unavailable.
#[async_trait]
pub trait ReferenceRateProvider: Send + Sync {
    async fn reference_rate(&self, market: Market) -> Result<Option<f64>, AnalysisError>;
}

/// Everything the analytics engines read from the outside world.
pub trait MarketDataProvider:
    CompanyInfoProvider + StatementProvider + PriceHistoryProvider + ReferenceRateProvider
{
}

impl<T> MarketDataProvider for T where
    T: CompanyInfoProvider + StatementProvider + PriceHistoryProvider + ReferenceRateProvider
{
}
