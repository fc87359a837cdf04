//! Core data types for filing rows and reconciled financials.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Cik`] - SEC Central Index Key
//! - [`FilingRow`] - One company-year record as produced by a loader
//! - [`ReconciledFinancials`] - Reconciled output for one company-year
//! - [`Adjustment`] - A change applied during reconciliation
//! - [`fields`] - Canonical field names

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{FinancialsError, Result};

/// Canonical field names shared by loaders, the resolver and downstream ratios.
pub mod fields {
    /// Total revenue.
    pub const REVENUE: &str = "revenue";
    /// Revenue from products (goods).
    pub const REVENUE_PRODUCTS: &str = "revenue_products";
    /// Revenue from services.
    pub const REVENUE_SERVICES: &str = "revenue_services";
    /// Revenue transferred at a point in time.
    pub const REVENUE_POINT_IN_TIME: &str = "revenue_point";
    /// Revenue transferred over time.
    pub const REVENUE_OVER_TIME: &str = "revenue_over_time";
    /// Cost of goods sold.
    pub const COGS: &str = "cogs";
    /// Gross profit.
    pub const GROSS_PROFIT: &str = "gross_profit";
    /// Operating income.
    pub const OPERATING_INCOME: &str = "operating_income";
    /// Net income.
    pub const NET_INCOME: &str = "net_income";
    /// Cash flow from operations.
    pub const CFO: &str = "cfo";
    /// Total assets.
    pub const TOTAL_ASSETS: &str = "total_assets";
    /// Current assets.
    pub const CURRENT_ASSETS: &str = "current_assets";
    /// Cash and cash equivalents.
    pub const CASH: &str = "cash";
    /// Accounts receivable.
    pub const ACCOUNTS_RECEIVABLE: &str = "accounts_receivable";
    /// Inventory.
    pub const INVENTORY: &str = "inventory";
    /// Total liabilities.
    pub const TOTAL_LIABILITIES: &str = "total_liabilities";
    /// Current liabilities.
    pub const CURRENT_LIABILITIES: &str = "current_liabilities";
    /// Accounts payable.
    pub const ACCOUNTS_PAYABLE: &str = "accounts_payable";
    /// Long-term debt.
    pub const LONG_TERM_DEBT: &str = "long_term_debt";
    /// Stockholders' equity.
    pub const STOCKHOLDERS_EQUITY: &str = "stockholders_equity";

    /// Row metadata key holding the company CIK.
    pub const CIK_KEY: &str = "cik";
    /// Row metadata key holding the fiscal year.
    pub const YEAR_KEY: &str = "year";
}

/// SEC Central Index Key identifying a filer.
///
/// Displayed zero-padded to 10 digits, the form EDGAR uses in URLs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cik(u64);

impl Cik {
    /// Creates a CIK from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

impl FromStr for Cik {
    type Err = FinancialsError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("CIK")
            .or_else(|| trimmed.strip_prefix("cik"))
            .unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FinancialsError::InvalidParameter(format!(
                "Invalid CIK: {s:?}"
            )));
        }
        digits
            .parse()
            .map(Self)
            .map_err(|e| FinancialsError::InvalidParameter(format!("Invalid CIK {s:?}: {e}")))
    }
}

impl From<u64> for Cik {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One company-year record produced by a filing loader.
///
/// Values are keyed by canonical field name. `None` is the explicit absence
/// marker; a field that was never inserted is equally absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingRow {
    /// Filer the row belongs to.
    pub cik: Option<Cik>,
    /// Fiscal year of the row.
    pub fiscal_year: Option<i32>,
    /// Field values keyed by canonical field name.
    pub values: BTreeMap<String, Option<f64>>,
}

impl FilingRow {
    /// Creates an empty row with no company or year.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row for a company-year.
    #[must_use]
    pub fn for_company(cik: Cik, fiscal_year: i32) -> Self {
        Self {
            cik: Some(cik),
            fiscal_year: Some(fiscal_year),
            values: BTreeMap::new(),
        }
    }

    /// Sets a present value for a field.
    #[must_use]
    pub fn with_value(mut self, field: impl Into<String>, value: f64) -> Self {
        self.values.insert(field.into(), Some(value));
        self
    }

    /// Marks a field as explicitly absent.
    #[must_use]
    pub fn with_absent(mut self, field: impl Into<String>) -> Self {
        self.values.insert(field.into(), None);
        self
    }

    /// Inserts a field value, returning the previous entry if any.
    pub fn insert(&mut self, field: impl Into<String>, value: Option<f64>) -> Option<Option<f64>> {
        self.values.insert(field.into(), value)
    }

    /// Returns the value of a field if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied().flatten()
    }

    /// Returns an iterator over the present values.
    pub fn present(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.map(|value| (k.as_str(), value)))
    }

    /// Returns the number of fields, present or absent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks the field-name-to-number contract.
    ///
    /// Field names must be non-empty and present values must be finite.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in &self.values {
            if field.trim().is_empty() {
                return Err(FinancialsError::MalformedRow(format!(
                    "empty field name in {}",
                    self.describe()
                )));
            }
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(FinancialsError::MalformedRow(format!(
                        "{field} is {v} in {}, expected a finite number",
                        self.describe()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds a row from a JSON object of field names to numbers or nulls.
    ///
    /// The `cik` and `year` keys become row metadata. Any other non-numeric,
    /// non-null value is a contract violation and is rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            FinancialsError::MalformedRow(format!("expected a JSON object, got {value}"))
        })?;

        let mut row = Self::new();
        for (key, v) in object {
            match key.as_str() {
                fields::CIK_KEY => row.cik = parse_json_cik(v)?,
                fields::YEAR_KEY => row.fiscal_year = parse_json_year(v)?,
                _ => {
                    let value = match v {
                        Value::Null => None,
                        Value::Number(n) => Some(n.as_f64().ok_or_else(|| {
                            FinancialsError::MalformedRow(format!("{key} is not representable: {n}"))
                        })?),
                        other => {
                            return Err(FinancialsError::MalformedRow(format!(
                                "{key} is not a number: {other}"
                            )));
                        }
                    };
                    row.values.insert(key.clone(), value);
                }
            }
        }
        row.validate()?;
        Ok(row)
    }

    /// Human-readable company-year label used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        describe(self.cik, self.fiscal_year)
    }
}

fn parse_json_cik(v: &Value) -> Result<Option<Cik>> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(|c| Some(Cik::new(c)))
            .ok_or_else(|| FinancialsError::MalformedRow(format!("cik is not an integer: {n}"))),
        Value::String(s) => s.parse().map(Some),
        other => Err(FinancialsError::MalformedRow(format!(
            "cik is not a number: {other}"
        ))),
    }
}

fn parse_json_year(v: &Value) -> Result<Option<i32>> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .map(Some)
            .ok_or_else(|| FinancialsError::MalformedRow(format!("year is not an integer: {n}"))),
        other => Err(FinancialsError::MalformedRow(format!(
            "year is not a number: {other}"
        ))),
    }
}

fn describe(cik: Option<Cik>, fiscal_year: Option<i32>) -> String {
    match (cik, fiscal_year) {
        (Some(cik), Some(fy)) => format!("CIK {cik} FY{fy}"),
        (Some(cik), None) => format!("CIK {cik}"),
        (None, Some(fy)) => format!("FY{fy}"),
        (None, None) => "unidentified row".to_string(),
    }
}

/// A change applied to a row during reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Adjustment {
    /// Revenue was replaced by the sum of product and service revenue.
    RevenueFromComponents {
        /// Directly reported revenue, if any.
        reported: Option<f64>,
        /// Product revenue.
        products: f64,
        /// Service revenue.
        services: f64,
        /// Revenue used after the adjustment.
        total: f64,
    },
    /// Gross profit was recomputed as revenue minus cost of goods sold.
    GrossProfitRecomputed {
        /// Directly reported gross profit, if any.
        reported: Option<f64>,
        /// Gross profit used after the adjustment.
        computed: f64,
    },
}

/// Reconciled financials for one company-year.
///
/// Values are fixed at construction. A corrected result is a new value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciledFinancials {
    cik: Option<Cik>,
    fiscal_year: Option<i32>,
    values: BTreeMap<String, f64>,
    adjustments: Vec<Adjustment>,
}

impl ReconciledFinancials {
    /// Creates reconciled financials from their parts.
    #[must_use]
    pub fn new(
        cik: Option<Cik>,
        fiscal_year: Option<i32>,
        values: BTreeMap<String, f64>,
        adjustments: Vec<Adjustment>,
    ) -> Self {
        Self {
            cik,
            fiscal_year,
            values,
            adjustments,
        }
    }

    /// Filer the financials belong to.
    #[must_use]
    pub const fn cik(&self) -> Option<Cik> {
        self.cik
    }

    /// Fiscal year of the financials.
    #[must_use]
    pub const fn fiscal_year(&self) -> Option<i32> {
        self.fiscal_year
    }

    /// Returns the value of a field if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Returns the value of a field or a soft [`FinancialsError::MissingData`].
    pub fn require(&self, field: &str) -> Result<f64> {
        self.get(field).ok_or_else(|| FinancialsError::MissingData {
            field: field.to_string(),
            context: describe(self.cik, self.fiscal_year),
        })
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Returns an iterator over all fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the number of present fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Adjustments applied while reconciling, in application order.
    #[must_use]
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cik_padding_and_parsing() {
        let cik = Cik::new(320193);
        assert_eq!(cik.to_string(), "0000320193");

        assert_eq!("0000320193".parse::<Cik>().unwrap(), cik);
        assert_eq!("320193".parse::<Cik>().unwrap(), cik);
        assert_eq!("CIK0000320193".parse::<Cik>().unwrap(), cik);
        assert!("AAPL".parse::<Cik>().is_err());
        assert!("".parse::<Cik>().is_err());
    }

    #[test]
    fn test_filing_row_absence() {
        let row = FilingRow::for_company(Cik::new(320193), 2023)
            .with_value(fields::REVENUE, 383_285_000_000.0)
            .with_absent(fields::COGS);

        assert_eq!(row.get(fields::REVENUE), Some(383_285_000_000.0));
        assert_eq!(row.get(fields::COGS), None);
        assert_eq!(row.get(fields::INVENTORY), None);
        assert_eq!(row.len(), 2);
        assert_eq!(row.present().count(), 1);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let row = FilingRow::new().with_value(fields::REVENUE, f64::NAN);
        assert!(matches!(
            row.validate(),
            Err(FinancialsError::MalformedRow(_))
        ));

        let row = FilingRow::new().with_value("", 1.0);
        assert!(matches!(
            row.validate(),
            Err(FinancialsError::MalformedRow(_))
        ));

        let row = FilingRow::new().with_value(fields::NET_INCOME, -5.0);
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let row = FilingRow::from_json(&json!({
            "cik": 320193,
            "year": 2023,
            "revenue": 383285000000_u64,
            "cogs": null,
        }))
        .unwrap();

        assert_eq!(row.cik, Some(Cik::new(320193)));
        assert_eq!(row.fiscal_year, Some(2023));
        assert_eq!(row.get(fields::REVENUE), Some(383_285_000_000.0));
        assert_eq!(row.values.get(fields::COGS), Some(&None));
    }

    #[test]
    fn test_from_json_rejects_non_numeric() {
        let err = FilingRow::from_json(&json!({ "revenue": "383.3B" })).unwrap_err();
        assert!(matches!(err, FinancialsError::MalformedRow(_)));

        let err = FilingRow::from_json(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, FinancialsError::MalformedRow(_)));

        let err = FilingRow::from_json(&json!({ "year": "2023" })).unwrap_err();
        assert!(matches!(err, FinancialsError::MalformedRow(_)));
    }

    #[test]
    fn test_require_reports_missing_data() {
        let financials = ReconciledFinancials::new(
            Some(Cik::new(320193)),
            Some(2023),
            BTreeMap::from([(fields::NET_INCOME.to_string(), 96_995_000_000.0)]),
            Vec::new(),
        );

        assert_eq!(financials.require(fields::NET_INCOME).unwrap(), 96_995_000_000.0);
        let err = financials.require(fields::REVENUE).unwrap_err();
        assert!(err.is_soft());
        assert_eq!(err.to_string(), "Missing revenue for CIK 0000320193 FY2023");
    }
}
