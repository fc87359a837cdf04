//! Cache trait for storing reconciled financials.
//!
//! This module defines the [`FinancialsCache`] trait that provides a unified
//! interface for caching reconciled company-year financials per loader.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    types::{Cik, ReconciledFinancials},
};

/// Trait for caching reconciled financials.
///
/// Entries depend on the tag mapping they were reconciled under; owners must
/// [`clear`](Self::clear) the cache whenever that mapping changes.
#[async_trait]
pub trait FinancialsCache: Send + Sync {
    /// Retrieves cached financials for a company-year.
    ///
    /// Returns `Ok(Some(financials))` if cached, `Ok(None)` if not cached.
    async fn get(
        &self,
        loader: &str,
        cik: Cik,
        fiscal_year: i32,
    ) -> Result<Option<ReconciledFinancials>>;

    /// Stores reconciled financials for a company-year.
    async fn put(
        &self,
        loader: &str,
        cik: Cik,
        fiscal_year: i32,
        financials: &ReconciledFinancials,
    ) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
