//! Reconciled financials from registered loaders with fallback and caching.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use fundamentals_core::{
    Cik, FilingLoader, FilingRow, FinancialsCache, FinancialsError, ReconciledFinancials, Result,
    TagMapping,
};
use fundamentals_edgar::{EfficiencyRatios, Finding, TagResolver, diagnose, edgar_tag_mapping};

/// Reconciled financials together with the ratios and findings derived from them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinancialsReport {
    /// Reconciled financials.
    pub financials: ReconciledFinancials,
    /// Efficiency ratios.
    pub ratios: EfficiencyRatios,
    /// Data-quality findings.
    pub findings: Vec<Finding>,
}

/// Service that reconciles loader output before handing it to callers.
///
/// Loaders are tried in registration order until one has the requested data.
/// The active [`TagMapping`] is passed to every loader call and can be
/// extended at runtime; each change replaces the shared snapshot and clears
/// the cache, since cached rows were aggregated under the old mapping.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use fundamentals::{Cik, FinancialsService, InMemoryCache};
///
/// let mut service = FinancialsService::new().set_cache(Arc::new(InMemoryCache::new()));
/// service.register_loader(Arc::new(my_loader));
///
/// let apple = service.to_financials(Cik::new(320193), 2023).await?;
/// ```
pub struct FinancialsService {
    loaders: Vec<Arc<dyn FilingLoader>>,
    mapping: RwLock<Arc<TagMapping>>,
    cache: Option<Arc<dyn FinancialsCache>>,
}

impl Default for FinancialsService {
    fn default() -> Self {
        Self::with_mapping(edgar_tag_mapping())
    }
}

impl std::fmt::Debug for FinancialsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinancialsService")
            .field(
                "loaders",
                &self.loaders.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .finish_non_exhaustive()
    }
}

impl FinancialsService {
    /// Create a service with the default us-gaap tag mapping and no loaders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with a custom tag mapping.
    #[must_use]
    pub fn with_mapping(mapping: TagMapping) -> Self {
        Self {
            loaders: Vec::new(),
            mapping: RwLock::new(Arc::new(mapping)),
            cache: None,
        }
    }

    /// Create a service with a cache and the default tag mapping.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn FinancialsCache>) -> Self {
        Self::new().set_cache(cache)
    }

    /// Set the cache for this service.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn FinancialsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a filing loader.
    pub fn register_loader(&mut self, loader: Arc<dyn FilingLoader>) {
        debug!(loader = loader.name(), "Registering filing loader");
        self.loaders.push(loader);
    }

    /// Returns a snapshot of the active tag mapping.
    pub async fn mapping(&self) -> Arc<TagMapping> {
        Arc::clone(&*self.mapping.read().await)
    }

    /// Returns a resolver over the active tag mapping.
    pub async fn resolver(&self) -> TagResolver {
        TagResolver::new(self.mapping().await)
    }

    /// Registers additional tag entries, all or nothing.
    ///
    /// Fails with `TagConflict` if any tag is already mapped to a different
    /// field, leaving the mapping unchanged. Returns the number of new entries.
    pub async fn register_tags<I, T, F>(&self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (T, F)>,
        T: Into<String>,
        F: Into<String>,
    {
        let added = {
            let mut current = self.mapping.write().await;
            let mut next = TagMapping::clone(&current);
            let added = next.register_all(entries)?;
            if added > 0 {
                *current = Arc::new(next);
            }
            added
        };

        if added > 0 {
            debug!(added, "Registered tag entries");
            self.invalidate_cache().await;
        }
        Ok(added)
    }

    /// Registers the entries of a JSON object of `"Tag": "field"` pairs.
    pub async fn register_tags_from_json(&self, json: &str) -> Result<usize> {
        let mut parsed = TagMapping::new();
        parsed.extend_from_json(json)?;
        self.register_tags(parsed.iter().map(|e| (e.tag.clone(), e.field.clone())))
            .await
    }

    /// Maps a tag to a field, explicitly overriding any existing entry.
    ///
    /// Returns the field the tag was previously mapped to.
    pub async fn replace_tag(&self, tag: &str, field: &str) -> Result<Option<String>> {
        let previous = {
            let mut current = self.mapping.write().await;
            let mut next = TagMapping::clone(&current);
            let previous = next.replace(tag, field)?;
            *current = Arc::new(next);
            previous
        };

        debug!(tag, field, ?previous, "Replaced tag entry");
        self.invalidate_cache().await;
        Ok(previous)
    }

    /// Fetch reconciled financials for one company-year.
    ///
    /// Checks the cache first, then tries each loaded loader in order until
    /// one has a row for the year. Rows without a fiscal year are taken to be
    /// the requested year. Returns `Ok(None)` when the loaders answered but
    /// none had the company-year.
    pub async fn to_financials(&self, cik: Cik, year: i32) -> Result<Option<ReconciledFinancials>> {
        if self.loaders.is_empty() {
            return Err(FinancialsError::LoaderNotConfigured(
                "No filing loaders registered".to_string(),
            ));
        }

        // Check cache first
        if let Some(cache) = &self.cache {
            for loader in self.loaders.iter().filter(|l| l.is_loaded()) {
                match cache.get(loader.name(), cik, year).await {
                    Ok(Some(cached)) => {
                        debug!(
                            loader = loader.name(),
                            cik = %cik,
                            year,
                            "Cache hit for financials"
                        );
                        return Ok(Some(cached));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!(loader = loader.name(), error = %e, "Cache lookup failed");
                    }
                }
            }
        }

        let mapping = self.mapping().await;
        let Some((loader, rows)) = self
            .load_rows(cik, &[year], &mapping, |r| {
                r.fiscal_year.is_none_or(|fy| fy == year)
            })
            .await?
        else {
            return Ok(None);
        };
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let financials =
            TagResolver::new(Arc::clone(&mapping)).reconcile(&identified(row, cik, year))?;

        // Cache the result unless the mapping changed while loading. Holding
        // the read lock keeps a concurrent swap and clear behind this put.
        if let Some(cache) = &self.cache {
            let current = self.mapping.read().await;
            if !Arc::ptr_eq(&mapping, &*current) {
                debug!(cik = %cik, year, "Mapping changed during load, not caching");
            } else if let Err(e) = cache.put(loader.name(), cik, year, &financials).await {
                warn!(
                    loader = loader.name(),
                    error = %e,
                    "Failed to cache financials"
                );
            }
        }

        Ok(Some(financials))
    }

    /// Fetch reconciled financials for several years, ordered by fiscal year.
    ///
    /// An empty `years` slice asks for every year the loader has. Rows for
    /// years that were not requested are dropped.
    pub async fn financials_for_years(
        &self,
        cik: Cik,
        years: &[i32],
    ) -> Result<Vec<ReconciledFinancials>> {
        if self.loaders.is_empty() {
            return Err(FinancialsError::LoaderNotConfigured(
                "No filing loaders registered".to_string(),
            ));
        }

        let mapping = self.mapping().await;
        let Some((_, rows)) = self
            .load_rows(cik, years, &mapping, |r| {
                years.is_empty() || r.fiscal_year.is_some_and(|fy| years.contains(&fy))
            })
            .await?
        else {
            return Ok(Vec::new());
        };

        let resolver = TagResolver::new(mapping);
        let mut financials = rows
            .into_iter()
            .map(|mut row| {
                row.cik.get_or_insert(cik);
                resolver.reconcile(&row)
            })
            .collect::<Result<Vec<_>>>()?;

        financials.sort_by_key(ReconciledFinancials::fiscal_year);
        Ok(financials)
    }

    /// Fetch reconciled financials for several companies concurrently.
    ///
    /// Results are returned in the order of `ciks`; one company's failure does
    /// not affect the others.
    pub async fn financials_batch(
        &self,
        ciks: &[Cik],
        year: i32,
    ) -> Vec<Result<Option<ReconciledFinancials>>> {
        debug!(company_count = ciks.len(), year, "Fetching batch financials");
        join_all(ciks.iter().map(|&cik| self.to_financials(cik, year))).await
    }

    /// Fetch reconciled financials with their ratios and data-quality findings.
    pub async fn analyze(&self, cik: Cik, year: i32) -> Result<Option<FinancialsReport>> {
        Ok(self
            .to_financials(cik, year)
            .await?
            .map(|financials| FinancialsReport {
                ratios: EfficiencyRatios::from_financials(&financials),
                findings: diagnose(&financials),
                financials,
            }))
    }

    /// Tries each loaded loader in order until one returns a wanted row.
    ///
    /// Only rows accepted by `wanted` are returned. A loader whose rows are
    /// all rejected counts as having answered without data.
    async fn load_rows<F>(
        &self,
        cik: Cik,
        years: &[i32],
        mapping: &TagMapping,
        wanted: F,
    ) -> Result<Option<(Arc<dyn FilingLoader>, Vec<FilingRow>)>>
    where
        F: Fn(&FilingRow) -> bool,
    {
        let mut last_error = None;
        let mut answered = false;
        let mut any_loaded = false;

        for loader in &self.loaders {
            if !loader.is_loaded() {
                warn!(loader = loader.name(), "Loader not loaded, skipping");
                continue;
            }
            any_loaded = true;

            debug!(
                loader = loader.name(),
                cik = %cik,
                ?years,
                "Fetching company financials"
            );

            match loader.get_company_financials(cik, years, mapping).await {
                Ok(rows) => {
                    let rows: Vec<FilingRow> = rows.into_iter().filter(&wanted).collect();
                    if !rows.is_empty() {
                        return Ok(Some((Arc::clone(loader), rows)));
                    }
                    debug!(loader = loader.name(), cik = %cik, "No matching rows, trying next");
                    answered = true;
                }
                Err(e) => {
                    warn!(
                        loader = loader.name(),
                        error = %e,
                        "Loader failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        if !any_loaded {
            return Err(FinancialsError::LoaderNotReady(
                "No registered loader has finished loading".to_string(),
            ));
        }
        if answered {
            return Ok(None);
        }
        Err(last_error
            .unwrap_or_else(|| FinancialsError::Other("All loaders failed with no error".to_string())))
    }

    async fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear().await {
                warn!(error = %e, "Failed to clear cache after mapping change");
            }
        }
    }
}

fn identified(row: &FilingRow, cik: Cik, year: i32) -> FilingRow {
    let mut row = row.clone();
    row.cik.get_or_insert(cik);
    row.fiscal_year.get_or_insert(year);
    row
}
