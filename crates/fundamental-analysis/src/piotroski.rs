use analysis_core::FinancialStatements;
use serde::{Deserialize, Serialize};

use crate::line_items::*;

/// The nine Piotroski tests, current period against the prior one.
/// A test whose data is missing counts as failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiotroskiSignals {
    pub positive_net_income: bool,
    pub positive_operating_cash_flow: bool,
    pub roa_improved: bool,
    pub cash_flow_exceeds_income: bool,
    pub leverage_not_increased: bool,
    pub current_ratio_improved: bool,
    pub no_dilution: bool,
    pub gross_margin_improved: bool,
    pub asset_turnover_improved: bool,
}

impl PiotroskiSignals {
    pub fn evaluate(statements: &FinancialStatements) -> Self {
        let now = |names: &[&str]| statements.value_of(names, 0);
        let prior = |names: &[&str]| statements.value_of(names, 1);

        let net_income = now(NET_INCOME);
        let ocf = now(OPERATING_CASH_FLOW);

        let roa = |period: usize| {
            ratio(
                statements.value_of(NET_INCOME, period),
                statements.value_of(TOTAL_ASSETS, period),
            )
        };
        let current_ratio = |period: usize| {
            ratio(
                statements.value_of(CURRENT_ASSETS, period),
                statements.value_of(CURRENT_LIABILITIES, period),
            )
        };
        let gross_margin = |period: usize| {
            ratio(
                statements.value_of(GROSS_PROFIT, period),
                statements.value_of(TOTAL_REVENUE, period),
            )
        };
        let asset_turnover = |period: usize| {
            ratio(
                statements.value_of(TOTAL_REVENUE, period),
                statements.value_of(TOTAL_ASSETS, period),
            )
        };

        Self {
            positive_net_income: net_income.is_some_and(|ni| ni > 0.0),
            positive_operating_cash_flow: ocf.is_some_and(|cf| cf > 0.0),
            roa_improved: improved(roa(0), roa(1)),
            cash_flow_exceeds_income: matches!((ocf, net_income), (Some(cf), Some(ni)) if cf > ni),
            leverage_not_increased: not_increased(now(LONG_TERM_DEBT), prior(LONG_TERM_DEBT)),
            current_ratio_improved: improved(current_ratio(0), current_ratio(1)),
            no_dilution: not_increased(now(SHARES_OUTSTANDING), prior(SHARES_OUTSTANDING)),
            gross_margin_improved: improved(gross_margin(0), gross_margin(1)),
            asset_turnover_improved: improved(asset_turnover(0), asset_turnover(1)),
        }
    }

    pub fn score(&self) -> u8 {
        [
            self.positive_net_income,
            self.positive_operating_cash_flow,
            self.roa_improved,
            self.cash_flow_exceeds_income,
            self.leverage_not_increased,
            self.current_ratio_improved,
            self.no_dilution,
            self.gross_margin_improved,
            self.asset_turnover_improved,
        ]
        .iter()
        .filter(|passed| **passed)
        .count() as u8
    }
}

/// Zero or missing denominators give no ratio.
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d).filter(|r| r.is_finite()),
        _ => None,
    }
}

fn improved(current: Option<f64>, prior: Option<f64>) -> bool {
    matches!((current, prior), (Some(c), Some(p)) if c > p)
}

fn not_increased(current: Option<f64>, prior: Option<f64>) -> bool {
    matches!((current, prior), (Some(c), Some(p)) if c <= p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Statement;

    fn strong_company() -> FinancialStatements {
        let mut fs = FinancialStatements::annual("GOOD");
        fs.income_statement = Statement::new()
            .with_item("Net Income", &[120.0, 100.0])
            .with_item("Total Revenue", &[1_200.0, 1_000.0])
            .with_item("Gross Profit", &[540.0, 400.0]);
        fs.balance_sheet = Statement::new()
            .with_item("Total Assets", &[1_000.0, 1_000.0])
            .with_item("Long Term Debt", &[200.0, 250.0])
            .with_item("Current Assets", &[400.0, 300.0])
            .with_item("Current Liabilities", &[200.0, 200.0])
            .with_item("Ordinary Shares Number", &[50.0, 50.0]);
        fs.cash_flow = Statement::new().with_item("Operating Cash Flow", &[150.0, 130.0]);
        fs
    }

    #[test]
    fn test_all_nine_signals() {
        let signals = PiotroskiSignals::evaluate(&strong_company());
        assert_eq!(signals.score(), 9);
    }

    #[test]
    fn test_missing_prior_period_scores_partially() {
        let mut fs = FinancialStatements::annual("NEW");
        fs.income_statement = Statement::new().with_item("Net Income", &[10.0]);
        fs.cash_flow = Statement::new().with_item("Operating Cash Flow", &[25.0]);
        fs.balance_sheet = Statement::new().with_item("Total Assets", &[100.0]);

        let signals = PiotroskiSignals::evaluate(&fs);
        assert!(signals.positive_net_income);
        assert!(signals.positive_operating_cash_flow);
        assert!(signals.cash_flow_exceeds_income);
        assert!(!signals.roa_improved);
        assert!(!signals.leverage_not_increased);
        assert_eq!(signals.score(), 3);
    }

    #[test]
    fn test_zero_prior_assets_awards_no_roa_point() {
        let mut fs = strong_company();
        fs.balance_sheet.insert("Total Assets", vec![Some(1_000.0), Some(0.0)]);
        let signals = PiotroskiSignals::evaluate(&fs);
        assert!(!signals.roa_improved);
        assert!(!signals.asset_turnover_improved);
        assert_eq!(signals.score(), 7);
    }

    #[test]
    fn test_share_count_fallback_name() {
        let mut fs = strong_company();
        let mut balance = Statement::new()
            .with_item("Total Assets", &[1_000.0, 1_000.0])
            .with_item("Share Issued", &[55.0, 50.0]);
        balance.insert("Long Term Debt", vec![Some(200.0), Some(250.0)]);
        fs.balance_sheet = balance;

        let signals = PiotroskiSignals::evaluate(&fs);
        assert!(!signals.no_dilution);
        assert!(signals.leverage_not_increased);
    }

    #[test]
    fn test_empty_statements_score_zero() {
        let signals = PiotroskiSignals::evaluate(&FinancialStatements::annual("NONE"));
        assert_eq!(signals, PiotroskiSignals::default());
        assert_eq!(signals.score(), 0);
    }
}
