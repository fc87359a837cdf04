//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use fundamentals_core::{Cik, FinancialsCache, ReconciledFinancials, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for reconciled financials entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FinancialsKey {
    loader: String,
    cik: Cik,
    fiscal_year: i32,
}

/// Simple in-memory cache.
///
/// Entries are stored in a `RwLock`-protected `HashMap` and are lost when the
/// cache is dropped. Financials are cloned on get/put.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    financials: RwLock<HashMap<FinancialsKey, CacheEntry<ReconciledFinancials>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached company-years.
    pub async fn len(&self) -> usize {
        self.financials.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.financials.read().await.is_empty()
    }
}

#[async_trait]
impl FinancialsCache for InMemoryCache {
    #[instrument(skip(self), fields(loader = %loader, cik = %cik))]
    async fn get(
        &self,
        loader: &str,
        cik: Cik,
        fiscal_year: i32,
    ) -> Result<Option<ReconciledFinancials>> {
        let key = FinancialsKey {
            loader: loader.to_string(),
            cik,
            fiscal_year,
        };

        let cache = self.financials.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for financials");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for financials");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, financials), fields(loader = %loader, cik = %cik))]
    async fn put(
        &self,
        loader: &str,
        cik: Cik,
        fiscal_year: i32,
        financials: &ReconciledFinancials,
    ) -> Result<()> {
        let key = FinancialsKey {
            loader: loader.to_string(),
            cik,
            fiscal_year,
        };

        let mut cache = self.financials.write().await;
        cache.insert(key, CacheEntry::new(financials.clone()));
        debug!("Cached {} fields", financials.len());
        Ok(())
    }

    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.financials.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        debug!("Invalidated {} stale cache entries", removed);
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        self.financials.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}
