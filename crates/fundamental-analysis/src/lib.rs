use analysis_core::stats::finite;
use analysis_core::{
    AnalysisError, CompanyInfo, CompanyInfoProvider, FinancialStatements, ReportingPeriod,
    StatementProvider,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod line_items;
pub mod piotroski;

use line_items::*;
pub use piotroski::PiotroskiSignals;

/// Effective tax rate used when pre-tax income is not positive.
pub const DEFAULT_TAX_RATE: f64 = 0.21;
/// Upper bound for the effective tax rate.
pub const MAX_TAX_RATE: f64 = 0.5;

/// Quality and valuation diagnostics computed from a company's annual statements.
/// Any figure that cannot be computed is `None`, never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    pub symbol: String,
    #[serde(rename = "ROIC")]
    pub roic: Option<f64>,
    #[serde(rename = "FCF")]
    pub fcf: Option<f64>,
    #[serde(rename = "Altman_Z_Score")]
    pub altman_z_score: Option<f64>,
    #[serde(rename = "Piotroski_F_Score")]
    pub piotroski_f_score: u8,
    #[serde(rename = "EV_EBITDA")]
    pub ev_ebitda: Option<f64>,
    #[serde(rename = "Cost_of_Debt")]
    pub cost_of_debt: Option<f64>,
    pub piotroski_signals: PiotroskiSignals,
}

/// Operating cash flow plus capital expenditure as reported.
/// Capex is usually reported as a negative outflow, so it is added, not subtracted.
pub fn free_cash_flow(operating_cash_flow: f64, capital_expenditure: f64) -> f64 {
    operating_cash_flow + capital_expenditure
}

/// Tax provision over pre-tax income, clamped to `[0, MAX_TAX_RATE]`.
pub fn effective_tax_rate(tax_provision: f64, pretax_income: f64) -> f64 {
    if pretax_income <= 0.0 {
        return DEFAULT_TAX_RATE;
    }
    (tax_provision / pretax_income).clamp(0.0, MAX_TAX_RATE)
}

pub fn roic(ebit: f64, tax_rate: f64, total_debt: f64, equity: f64, cash: f64) -> f64 {
    let invested_capital = total_debt + equity - cash;
    if invested_capital <= 0.0 {
        return 0.0;
    }
    ebit * (1.0 - tax_rate) / invested_capital
}

/// Balance-sheet and market figures feeding the Altman Z-Score.
#[derive(Debug, Clone, Copy, Default)]
pub struct AltmanInputs {
    pub working_capital: f64,
    pub retained_earnings: f64,
    pub ebit: f64,
    pub market_cap: f64,
    pub sales: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
}

pub fn altman_z_score(i: &AltmanInputs) -> f64 {
    if i.total_assets <= 0.0 || i.total_liabilities <= 0.0 {
        return 0.0;
    }
    let a = i.working_capital / i.total_assets;
    let b = i.retained_earnings / i.total_assets;
    let c = i.ebit / i.total_assets;
    let d = i.market_cap / i.total_liabilities;
    let e = i.sales / i.total_assets;

    1.2 * a + 1.4 * b + 3.3 * c + 0.6 * d + 1.0 * e
}

pub fn cost_of_debt(interest_expense: f64, total_debt: f64) -> f64 {
    if total_debt <= 0.0 {
        return 0.0;
    }
    interest_expense.abs() / total_debt
}

/// EV / EBITDA, `None` when EBITDA is zero.
pub fn ev_to_ebitda(enterprise_value: f64, ebitda: f64) -> Option<f64> {
    if ebitda == 0.0 {
        return None;
    }
    finite(enterprise_value / ebitda)
}

pub struct FundamentalAnalysisEngine;

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes every diagnostic from annual statements (period 0 = latest).
    /// Absent line items count as 0.0, except operating cash flow, without which
    /// free cash flow is not reported.
    pub fn compute(
        &self,
        info: &CompanyInfo,
        statements: &FinancialStatements,
    ) -> Result<AdvancedMetrics, AnalysisError> {
        if statements.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "no financial statements for {}",
                statements.symbol
            )));
        }

        let item = |names: &[&str]| statements.value_of(names, 0);
        let or_zero = |names: &[&str]| item(names).unwrap_or(0.0);

        let market_cap = info.market_cap.filter(|v| v.is_finite()).unwrap_or(0.0);
        let ebit = or_zero(EBIT);
        let total_debt = or_zero(TOTAL_DEBT);
        let cash = or_zero(CASH);

        let fcf = item(OPERATING_CASH_FLOW)
            .map(|ocf| free_cash_flow(ocf, or_zero(CAPITAL_EXPENDITURE)))
            .and_then(finite);

        let tax_rate = effective_tax_rate(or_zero(TAX_PROVISION), or_zero(PRETAX_INCOME));
        let roic_value = finite(roic(
            ebit,
            tax_rate,
            total_debt,
            or_zero(STOCKHOLDERS_EQUITY),
            cash,
        ));

        let altman = finite(altman_z_score(&AltmanInputs {
            working_capital: or_zero(WORKING_CAPITAL),
            retained_earnings: or_zero(RETAINED_EARNINGS),
            ebit,
            market_cap,
            sales: or_zero(TOTAL_REVENUE),
            total_assets: or_zero(TOTAL_ASSETS),
            total_liabilities: or_zero(TOTAL_LIABILITIES),
        }));

        let enterprise_value = info
            .enterprise_value
            .filter(|v| v.is_finite())
            .unwrap_or(market_cap + total_debt - cash);
        let ebitda = ebit + or_zero(DEPRECIATION);
        let ev_ebitda = ev_to_ebitda(enterprise_value, ebitda);

        let debt_cost = finite(cost_of_debt(or_zero(INTEREST_EXPENSE), total_debt));

        let signals = PiotroskiSignals::evaluate(statements);

        Ok(AdvancedMetrics {
            symbol: statements.symbol.clone(),
            roic: roic_value,
            fcf,
            altman_z_score: altman,
            piotroski_f_score: signals.score(),
            ev_ebitda,
            cost_of_debt: debt_cost,
            piotroski_signals: signals,
        })
    }

    /// Fetches company info and annual statements, then computes the diagnostics.
    /// Missing company info is tolerated (market-based figures fall back to zero);
    /// missing statements are not.
    pub async fn analyze<P>(&self, provider: &P, symbol: &str) -> Result<AdvancedMetrics, AnalysisError>
    where
        P: CompanyInfoProvider + StatementProvider + ?Sized,
    {
        debug!("Computing fundamental diagnostics for {}", symbol);

        let statements = provider
            .financial_statements(symbol, ReportingPeriod::Annual)
            .await?;

        let info = match provider.company_info(symbol).await {
            Ok(info) => info,
            Err(AnalysisError::DataUnavailable(reason)) => {
                warn!("No company info for {}: {}; market figures default to 0", symbol, reason);
                CompanyInfo {
                    symbol: symbol.to_string(),
                    ..CompanyInfo::default()
                }
            }
            Err(e) => return Err(e),
        };

        self.compute(&info, &statements)
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
