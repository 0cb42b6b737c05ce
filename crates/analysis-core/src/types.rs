use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// Calendar date of the bar, used to align series from different symbols.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Closing prices of a bar series, skipping non-finite or non-positive closes.
pub fn valid_closes(bars: &[Bar]) -> Vec<(NaiveDate, f64)> {
    bars.iter()
        .filter(|b| b.close.is_finite() && b.close > 0.0)
        .map(|b| (b.date(), b.close))
        .collect()
}

/// Market a ticker trades in. Drives benchmark selection and the fallback risk-free rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    Domestic,
    International,
}

/// Exchange suffixes treated as the domestic market.
pub const DOMESTIC_SUFFIXES: [&str; 2] = [".KS", ".KQ"];

impl Market {
    pub fn for_symbol(symbol: &str) -> Self {
        let upper = symbol.trim().to_ascii_uppercase();
        if DOMESTIC_SUFFIXES.iter().any(|s| upper.ends_with(s)) {
            Market::Domestic
        } else {
            Market::International
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Market::Domestic => "domestic",
            Market::International => "international",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    Annual,
    Quarterly,
}

/// One financial statement: line item name -> values per reporting period,
/// most recent period first. Gaps are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statement {
    items: BTreeMap<String, Vec<Option<f64>>>,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a fully populated line item.
    pub fn with_item(mut self, name: &str, values: &[f64]) -> Self {
        self.items
            .insert(name.to_string(), values.iter().copied().map(Some).collect());
        self
    }

    pub fn insert(&mut self, name: &str, values: Vec<Option<f64>>) {
        self.items.insert(name.to_string(), values);
    }

    /// Value of a line item for a period. NaN and infinities read as missing.
    pub fn value(&self, name: &str, period: usize) -> Option<f64> {
        self.items
            .get(name)
            .and_then(|values| values.get(period).copied().flatten())
            .filter(|v| v.is_finite())
    }

    /// First available value among alternative line-item names.
    pub fn value_of(&self, names: &[&str], period: usize) -> Option<f64> {
        names.iter().find_map(|name| self.value(name, period))
    }

    /// Number of reporting periods covered by the longest line item.
    pub fn periods(&self) -> usize {
        self.items.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Balance sheet, income statement and cash-flow statement for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub symbol: String,
    pub period: ReportingPeriod,
    #[serde(default)]
    pub balance_sheet: Statement,
    #[serde(default)]
    pub income_statement: Statement,
    #[serde(default)]
    pub cash_flow: Statement,
}

impl FinancialStatements {
    pub fn annual(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            period: ReportingPeriod::Annual,
            balance_sheet: Statement::new(),
            income_statement: Statement::new(),
            cash_flow: Statement::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.balance_sheet.is_empty() && self.income_statement.is_empty() && self.cash_flow.is_empty()
    }

    /// Looks a line item up across all three statements (balance sheet, then income
    /// statement, then cash flow), trying each alternative name in turn.
    pub fn value_of(&self, names: &[&str], period: usize) -> Option<f64> {
        names.iter().find_map(|name| {
            self.balance_sheet
                .value(name, period)
                .or_else(|| self.income_statement.value(name, period))
                .or_else(|| self.cash_flow.value(name, period))
        })
    }

    /// Number of periods available in the longest statement.
    pub fn periods(&self) -> usize {
        self.balance_sheet
            .periods()
            .max(self.income_statement.periods())
            .max(self.cash_flow.periods())
    }
}

/// Static company information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Enterprise value as reported by the provider, when it reports one.
    #[serde(default)]
    pub enterprise_value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

/// A holding as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub ticker: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub market_value: Decimal,
}

impl PortfolioPosition {
    pub fn new(ticker: &str, market_value: Decimal) -> Self {
        Self {
            ticker: ticker.to_string(),
            market_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_from_suffix() {
        assert_eq!(Market::for_symbol("005930.KS"), Market::Domestic);
        assert_eq!(Market::for_symbol("035720.kq"), Market::Domestic);
        assert_eq!(Market::for_symbol("AAPL"), Market::International);
        assert_eq!(Market::for_symbol("7203.T"), Market::International);
    }

    #[test]
    fn test_statement_lookup_and_fallback() {
        let mut stmt = Statement::new().with_item("EBIT", &[120.0, 100.0]);
        stmt.insert("Reconciled Depreciation", vec![Some(10.0), None]);
        stmt.insert("Tax Provision", vec![Some(f64::NAN)]);

        assert_eq!(stmt.value("EBIT", 1), Some(100.0));
        assert_eq!(stmt.value("EBIT", 2), None);
        assert_eq!(stmt.value("Tax Provision", 0), None);
        assert_eq!(
            stmt.value_of(&["Depreciation And Amortization", "Reconciled Depreciation"], 0),
            Some(10.0)
        );
        assert_eq!(stmt.value_of(&["Reconciled Depreciation"], 1), None);
        assert_eq!(stmt.periods(), 2);
    }

    #[test]
    fn test_lookup_across_statements() {
        let mut fs = FinancialStatements::annual("AAPL");
        fs.income_statement = Statement::new().with_item("Net Income", &[90.0, 80.0]);
        fs.cash_flow = Statement::new()
            .with_item("Operating Cash Flow", &[110.0])
            .with_item("Net Income", &[1.0]);

        // balance sheet and income statement win over cash flow
        assert_eq!(fs.value_of(&["Net Income"], 0), Some(90.0));
        assert_eq!(fs.value_of(&["Operating Cash Flow"], 0), Some(110.0));
        assert_eq!(fs.value_of(&["Operating Cash Flow"], 1), None);
        assert_eq!(fs.periods(), 2);
        assert!(!fs.is_empty());
    }

    #[test]
    fn test_statement_deserializes_with_nulls() {
        let stmt: Statement =
            serde_json::from_str(r#"{"Total Assets": [500.0, null, 450.0]}"#).unwrap();
        assert_eq!(stmt.value("Total Assets", 0), Some(500.0));
        assert_eq!(stmt.value("Total Assets", 1), None);
        assert_eq!(stmt.value("Total Assets", 2), Some(450.0));
    }

    #[test]
    fn test_position_market_value_from_float() {
        let pos: PortfolioPosition =
            serde_json::from_str(r#"{"ticker": "AAPL", "market_value": 10000.5}"#).unwrap();
        assert_eq!(pos.ticker, "AAPL");
        assert_eq!(pos.market_value, Decimal::new(100005, 1));
    }
}
