//! Tag resolution and revenue reconciliation.

use fundamentals_core::{
    Adjustment, FilingRow, ReconciledFinancials, Result, TagMapping, UnknownTagWarning, fields,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::tags::edgar_tag_mapping;

/// Result of resolving a set of raw tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Canonical fields and the raw tags that reported them.
    pub fields: BTreeMap<String, BTreeSet<String>>,
    /// Tags with no mapping entry, in input order.
    pub unknown: Vec<UnknownTagWarning>,
}

impl Resolution {
    /// Returns true if more than one raw tag reported the field.
    #[must_use]
    pub fn is_multiply_reported(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|tags| tags.len() > 1)
    }
}

/// Maps raw filing tags to canonical fields and reconciles filing rows.
///
/// Holds a shared, read-only [`TagMapping`].
#[derive(Clone, Debug)]
pub struct TagResolver {
    mapping: Arc<TagMapping>,
}

impl Default for TagResolver {
    fn default() -> Self {
        Self::edgar()
    }
}

impl TagResolver {
    /// Create a resolver over the given mapping.
    #[must_use]
    pub const fn new(mapping: Arc<TagMapping>) -> Self {
        Self { mapping }
    }

    /// Create a resolver over the default us-gaap table.
    #[must_use]
    pub fn edgar() -> Self {
        Self::new(Arc::new(edgar_tag_mapping()))
    }

    /// Returns the mapping this resolver uses.
    #[must_use]
    pub fn mapping(&self) -> &TagMapping {
        &self.mapping
    }

    /// Looks up the canonical field for a raw tag.
    ///
    /// Tags with a taxonomy prefix (`us-gaap:Revenues`) fall back to their
    /// local name when the full text has no entry.
    #[must_use]
    pub fn lookup(&self, tag: &str) -> Option<&str> {
        self.mapping.field_for(tag).or_else(|| {
            tag.rsplit_once(':')
                .and_then(|(_, local)| self.mapping.field_for(local))
        })
    }

    /// Maps raw tags to canonical fields.
    ///
    /// Tags without a mapping entry are dropped. A field reported by several
    /// tags keeps all of them; choosing a value is left to [`reconcile`](Self::reconcile)
    /// and the loader.
    pub fn resolve<I, S>(&self, raw_tags: I) -> BTreeMap<String, BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_detailed(raw_tags).fields
    }

    /// Maps raw tags to canonical fields, reporting the tags that were dropped.
    pub fn resolve_detailed<I, S>(&self, raw_tags: I) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolution = Resolution::default();
        for tag in raw_tags {
            let tag = tag.as_ref();
            match self.lookup(tag) {
                Some(field) => {
                    resolution
                        .fields
                        .entry(field.to_string())
                        .or_default()
                        .insert(tag.to_string());
                }
                None => {
                    debug!(tag, "Dropping unmapped tag");
                    let warning = UnknownTagWarning::new(tag);
                    if !resolution.unknown.contains(&warning) {
                        resolution.unknown.push(warning);
                    }
                }
            }
        }
        resolution
    }

    /// Reconciles one company-year row.
    ///
    /// 1. Present values are copied unchanged; absent ones stay absent.
    /// 2. When both `revenue_products` and `revenue_services` are present and
    ///    their sum exceeds the reported `revenue` (or revenue is absent), the
    ///    sum replaces revenue.
    /// 3. When `revenue` and `cogs` are both present, `gross_profit` is set to
    ///    `revenue - cogs`, overriding any reported value.
    ///
    /// Step 2 is a heuristic: some filers report disjoint revenue pieces but
    /// tag only a narrower aggregate, and the pieces' sum is then the better
    /// estimate. It is not a general accounting rule and applies only to the
    /// products + services pair.
    ///
    /// Fails with `MalformedRow` if the row has an empty field name or a
    /// non-finite value. Missing fields are never an error.
    #[instrument(level = "debug", skip_all, fields(row = %row.describe()))]
    pub fn reconcile(&self, row: &FilingRow) -> Result<ReconciledFinancials> {
        row.validate()?;

        let mut values: BTreeMap<String, f64> = row
            .present()
            .map(|(field, value)| (field.to_string(), value))
            .collect();
        let mut adjustments = Vec::new();

        let products = values.get(fields::REVENUE_PRODUCTS).copied();
        let services = values.get(fields::REVENUE_SERVICES).copied();
        if let (Some(products), Some(services)) = (products, services) {
            let total = products + services;
            let reported = values.get(fields::REVENUE).copied();
            if reported.is_none_or(|revenue| total > revenue) {
                debug!(?reported, total, "Revenue replaced by product + service revenue");
                values.insert(fields::REVENUE.to_string(), total);
                adjustments.push(Adjustment::RevenueFromComponents {
                    reported,
                    products,
                    services,
                    total,
                });
            }
        }

        let revenue = values.get(fields::REVENUE).copied();
        let cogs = values.get(fields::COGS).copied();
        if let (Some(revenue), Some(cogs)) = (revenue, cogs) {
            let computed = revenue - cogs;
            let reported = values.insert(fields::GROSS_PROFIT.to_string(), computed);
            if reported != Some(computed) {
                debug!(?reported, computed, "Gross profit recomputed");
                adjustments.push(Adjustment::GrossProfitRecomputed { reported, computed });
            }
        }

        Ok(ReconciledFinancials::new(
            row.cik,
            row.fiscal_year,
            values,
            adjustments,
        ))
    }
}
