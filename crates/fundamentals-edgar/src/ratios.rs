//! Efficiency and earnings-quality ratios over reconciled financials.

use fundamentals_core::{ReconciledFinancials, fields};
use serde::{Deserialize, Serialize};

/// Days used to annualize turnover ratios.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Ratios derived from one company-year of reconciled financials.
///
/// A ratio is `None` when an input is missing or its denominator is not
/// positive. Missing data is never treated as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRatios {
    /// Days sales outstanding: receivables / revenue * 365.
    pub dso: Option<f64>,
    /// Days inventory outstanding: inventory / COGS * 365.
    pub dio: Option<f64>,
    /// Gross profit / revenue.
    pub gross_margin: Option<f64>,
    /// Net income / revenue.
    pub net_margin: Option<f64>,
    /// Operating cash flow / revenue.
    pub cfo_to_revenue: Option<f64>,
    /// (Net income - operating cash flow) / total assets.
    pub accrual_ratio: Option<f64>,
}

impl EfficiencyRatios {
    /// Computes every ratio whose inputs are present.
    #[must_use]
    pub fn from_financials(financials: &ReconciledFinancials) -> Self {
        let get = |field| financials.get(field);

        Self {
            dso: ratio(get(fields::ACCOUNTS_RECEIVABLE), get(fields::REVENUE))
                .map(|r| r * DAYS_PER_YEAR),
            dio: ratio(get(fields::INVENTORY), get(fields::COGS)).map(|r| r * DAYS_PER_YEAR),
            gross_margin: ratio(get(fields::GROSS_PROFIT), get(fields::REVENUE)),
            net_margin: ratio(get(fields::NET_INCOME), get(fields::REVENUE)),
            cfo_to_revenue: ratio(get(fields::CFO), get(fields::REVENUE)),
            accrual_ratio: match (get(fields::NET_INCOME), get(fields::CFO)) {
                (Some(ni), Some(cfo)) => ratio(Some(ni - cfo), get(fields::TOTAL_ASSETS)),
                _ => None,
            },
        }
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn financials(values: &[(&str, f64)]) -> ReconciledFinancials {
        let values: BTreeMap<String, f64> =
            values.iter().map(|&(k, v)| (k.to_string(), v)).collect();
        ReconciledFinancials::new(None, Some(2023), values, Vec::new())
    }

    #[test]
    fn test_apple_fy2023_ratios() {
        let fin = financials(&[
            (fields::REVENUE, 383_285_000_000.0),
            (fields::COGS, 214_137_000_000.0),
            (fields::GROSS_PROFIT, 169_148_000_000.0),
            (fields::NET_INCOME, 96_995_000_000.0),
            (fields::CFO, 110_543_000_000.0),
            (fields::TOTAL_ASSETS, 352_583_000_000.0),
            (fields::ACCOUNTS_RECEIVABLE, 29_508_000_000.0),
            (fields::INVENTORY, 6_331_000_000.0),
        ]);

        let ratios = EfficiencyRatios::from_financials(&fin);
        let dso = ratios.dso.unwrap();
        assert!((dso - 28.1).abs() < 0.1, "dso {dso}");
        let dio = ratios.dio.unwrap();
        assert!((dio - 10.8).abs() < 0.1, "dio {dio}");
        let net_margin = ratios.net_margin.unwrap();
        assert!((net_margin - 0.253).abs() < 0.001);
        let cfo = ratios.cfo_to_revenue.unwrap();
        assert!((cfo - 0.288).abs() < 0.001);
        let accrual = ratios.accrual_ratio.unwrap();
        assert!((accrual + 0.038).abs() < 0.001, "accrual {accrual}");
    }

    #[test]
    fn test_missing_inputs_leave_ratio_empty() {
        let fin = financials(&[(fields::ACCOUNTS_RECEIVABLE, 29_508_000_000.0)]);

        let ratios = EfficiencyRatios::from_financials(&fin);
        assert_eq!(ratios, EfficiencyRatios::default());
    }

    #[test]
    fn test_zero_denominator_is_skipped() {
        let fin = financials(&[
            (fields::REVENUE, 0.0),
            (fields::ACCOUNTS_RECEIVABLE, 10.0),
            (fields::NET_INCOME, 5.0),
            (fields::CFO, 3.0),
            (fields::TOTAL_ASSETS, -1.0),
        ]);

        let ratios = EfficiencyRatios::from_financials(&fin);
        assert_eq!(ratios.dso, None);
        assert_eq!(ratios.net_margin, None);
        assert_eq!(ratios.accrual_ratio, None);
    }
}
