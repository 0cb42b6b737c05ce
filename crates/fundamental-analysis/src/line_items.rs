//! Standard statement line-item names. Where providers disagree on naming, the
//! alternatives are listed in lookup order.

pub const NET_INCOME: &[&str] = &["Net Income"];
pub const OPERATING_CASH_FLOW: &[&str] = &["Operating Cash Flow"];
pub const CAPITAL_EXPENDITURE: &[&str] = &["Capital Expenditure"];
pub const EBIT: &[&str] = &["EBIT"];
pub const TAX_PROVISION: &[&str] = &["Tax Provision"];
pub const PRETAX_INCOME: &[&str] = &["Pretax Income"];
pub const TOTAL_DEBT: &[&str] = &["Total Debt"];
pub const STOCKHOLDERS_EQUITY: &[&str] = &["Stockholders Equity"];
pub const CASH: &[&str] = &["Cash And Cash Equivalents"];
pub const WORKING_CAPITAL: &[&str] = &["Working Capital"];
pub const RETAINED_EARNINGS: &[&str] = &["Retained Earnings"];
pub const TOTAL_ASSETS: &[&str] = &["Total Assets"];
pub const TOTAL_LIABILITIES: &[&str] = &["Total Liabilities Net Minority Interest", "Total Liabilities"];
pub const TOTAL_REVENUE: &[&str] = &["Total Revenue"];
pub const GROSS_PROFIT: &[&str] = &["Gross Profit"];
pub const INTEREST_EXPENSE: &[&str] = &["Interest Expense"];
pub const DEPRECIATION: &[&str] = &["Depreciation And Amortization", "Reconciled Depreciation"];
pub const LONG_TERM_DEBT: &[&str] = &["Long Term Debt"];
pub const CURRENT_ASSETS: &[&str] = &["Current Assets"];
pub const CURRENT_LIABILITIES: &[&str] = &["Current Liabilities"];
pub const SHARES_OUTSTANDING: &[&str] = &["Ordinary Shares Number", "Share Issued"];
