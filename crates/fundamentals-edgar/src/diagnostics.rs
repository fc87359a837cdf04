//! Data-quality checks on reconciled financials.
//!
//! These catch the symptoms of a bad tag mapping or unit problem before the
//! numbers reach a ratio: net income above revenue, receivables worth nearly a
//! year of sales, or a revenue figure that is really the receivables balance.

use fundamentals_core::{ReconciledFinancials, fields};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ratios::DAYS_PER_YEAR;

/// DSO above which receivables are considered implausible.
pub const EXTREME_DSO_DAYS: f64 = 300.0;

/// Absolute difference under which revenue is taken to be the receivables balance.
pub const RECEIVABLES_MATCH_TOLERANCE: f64 = 1_000_000.0;

/// Fields whose absence is worth reporting.
const EXPECTED_FIELDS: &[&str] = &[fields::REVENUE, fields::CFO];

/// How serious a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational; the data may still be fine.
    Info,
    /// The data is very likely wrong.
    Warning,
}

/// A data-quality problem found in one company-year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Finding {
    /// Net income exceeds positive revenue.
    NetIncomeExceedsRevenue {
        /// Net income.
        net_income: f64,
        /// Revenue.
        revenue: f64,
    },
    /// Days sales outstanding above [`EXTREME_DSO_DAYS`].
    ExtremeDso {
        /// Computed DSO in days.
        days: f64,
    },
    /// Revenue is within [`RECEIVABLES_MATCH_TOLERANCE`] of accounts receivable.
    RevenueMatchesReceivables {
        /// Revenue.
        revenue: f64,
        /// Accounts receivable.
        accounts_receivable: f64,
    },
    /// Gross profit is negative.
    NegativeGrossProfit {
        /// Gross profit.
        gross_profit: f64,
    },
    /// An expected field is absent.
    MissingField {
        /// The absent canonical field.
        field: String,
    },
}

impl Finding {
    /// Returns the severity of this finding.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::MissingField { .. } | Self::NegativeGrossProfit { .. } => Severity::Info,
            Self::NetIncomeExceedsRevenue { .. }
            | Self::ExtremeDso { .. }
            | Self::RevenueMatchesReceivables { .. } => Severity::Warning,
        }
    }
}

/// Runs every data-quality check and logs each finding.
#[must_use]
pub fn diagnose(financials: &ReconciledFinancials) -> Vec<Finding> {
    let mut findings = Vec::new();
    let revenue = financials.get(fields::REVENUE);
    let receivables = financials.get(fields::ACCOUNTS_RECEIVABLE);

    for &field in EXPECTED_FIELDS {
        if !financials.contains(field) {
            findings.push(Finding::MissingField {
                field: field.to_string(),
            });
        }
    }

    if let (Some(revenue), Some(net_income)) = (revenue, financials.get(fields::NET_INCOME)) {
        if revenue > 0.0 && net_income > revenue {
            findings.push(Finding::NetIncomeExceedsRevenue {
                net_income,
                revenue,
            });
        }
    }

    if let (Some(revenue), Some(accounts_receivable)) = (revenue, receivables) {
        if revenue > 0.0 {
            let days = accounts_receivable / revenue * DAYS_PER_YEAR;
            if days > EXTREME_DSO_DAYS {
                findings.push(Finding::ExtremeDso { days });
            }
        }
        if (revenue - accounts_receivable).abs() < RECEIVABLES_MATCH_TOLERANCE {
            findings.push(Finding::RevenueMatchesReceivables {
                revenue,
                accounts_receivable,
            });
        }
    }

    if let Some(gross_profit) = financials.get(fields::GROSS_PROFIT) {
        if gross_profit < 0.0 {
            findings.push(Finding::NegativeGrossProfit { gross_profit });
        }
    }

    let cik = financials.cik().map(|c| c.to_string());
    let year = financials.fiscal_year();
    for finding in &findings {
        match finding.severity() {
            Severity::Warning => warn!(cik, year, ?finding, "Data quality problem"),
            Severity::Info => info!(cik, year, ?finding, "Data quality note"),
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundamentals_core::Cik;
    use std::collections::BTreeMap;

    fn financials(values: &[(&str, f64)]) -> ReconciledFinancials {
        let values: BTreeMap<String, f64> =
            values.iter().map(|&(k, v)| (k.to_string(), v)).collect();
        ReconciledFinancials::new(Some(Cik::new(320193)), Some(2023), values, Vec::new())
    }

    #[test]
    fn test_clean_financials_have_no_findings() {
        let fin = financials(&[
            (fields::REVENUE, 383_285_000_000.0),
            (fields::GROSS_PROFIT, 169_148_000_000.0),
            (fields::NET_INCOME, 96_995_000_000.0),
            (fields::CFO, 110_543_000_000.0),
            (fields::ACCOUNTS_RECEIVABLE, 29_508_000_000.0),
        ]);

        assert!(diagnose(&fin).is_empty());
    }

    #[test]
    fn test_receivables_reported_as_revenue() {
        // Revenue populated from the receivables tag.
        let fin = financials(&[
            (fields::REVENUE, 29_508_000_000.0),
            (fields::NET_INCOME, 96_995_000_000.0),
            (fields::CFO, 110_543_000_000.0),
            (fields::ACCOUNTS_RECEIVABLE, 29_508_000_000.0),
        ]);

        let findings = diagnose(&fin);
        assert!(findings.contains(&Finding::NetIncomeExceedsRevenue {
            net_income: 96_995_000_000.0,
            revenue: 29_508_000_000.0,
        }));
        assert!(findings.contains(&Finding::ExtremeDso { days: 365.0 }));
        assert!(findings.iter().any(|f| matches!(f, Finding::RevenueMatchesReceivables { .. })));
        assert!(findings.iter().all(|f| f.severity() == Severity::Warning));
    }

    #[test]
    fn test_missing_fields_and_negative_gross_profit() {
        let fin = financials(&[(fields::GROSS_PROFIT, -5.0)]);

        let findings = diagnose(&fin);
        assert_eq!(
            findings,
            vec![
                Finding::MissingField {
                    field: fields::REVENUE.to_string()
                },
                Finding::MissingField {
                    field: fields::CFO.to_string()
                },
                Finding::NegativeGrossProfit { gross_profit: -5.0 },
            ]
        );
        assert!(findings.iter().all(|f| f.severity() == Severity::Info));
    }
}
