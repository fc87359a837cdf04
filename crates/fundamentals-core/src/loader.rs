//! Filing loader seam.
//!
//! A [`FilingLoader`] is the external collaborator that retrieves filings,
//! resolves company identifiers, normalizes units to whole currency, and
//! pre-aggregates raw tag observations into one value per canonical field per
//! company-year. Reconciliation happens after the loader, never inside it.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    mapping::TagMapping,
    types::{Cik, FilingRow},
};

/// Source of per-company per-year filing rows.
#[async_trait]
pub trait FilingLoader: Send + Sync + Debug {
    /// Returns the name of this loader (e.g., "EDGAR financial statements").
    fn name(&self) -> &str;

    /// Returns true once the loader has data to serve.
    fn is_loaded(&self) -> bool;

    /// Fetches filing rows for a company.
    ///
    /// # Arguments
    ///
    /// * `cik` - The filer
    /// * `years` - Fiscal years to return; empty means all available years
    /// * `mapping` - Active tag mapping used to aggregate raw tags into fields
    ///
    /// Returns one row per available fiscal year. Years with no filing are
    /// simply missing from the result.
    async fn get_company_financials(
        &self,
        cik: Cik,
        years: &[i32],
        mapping: &TagMapping,
    ) -> Result<Vec<FilingRow>>;
}
