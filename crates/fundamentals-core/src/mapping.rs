//! Raw XBRL tag to canonical field mapping.
//!
//! A [`TagMapping`] is ordered: the order in which tags were registered for a
//! field is that field's tag precedence. Registration never silently remaps a
//! tag; use [`TagMapping::replace`] for an explicit override.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{FinancialsError, Result};

/// Outcome of a successful [`TagMapping::register`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// The tag was not mapped before and now is.
    Added,
    /// The tag was already mapped to the same field.
    Unchanged,
}

/// A single tag-to-field entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    /// Raw taxonomy element name.
    pub tag: String,
    /// Canonical field the tag maps to.
    pub field: String,
}

/// Ordered mapping from raw filing tags to canonical field names.
///
/// Several tags may map to the same field. Share it as `Arc<TagMapping>` and
/// update by cloning: a mapping that other callers hold is never changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagMapping {
    entries: Vec<TagEntry>,
    index: HashMap<String, usize>,
}

impl TagMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from `(tag, field)` pairs.
    ///
    /// Fails on the first tag that appears twice with different fields.
    pub fn from_entries<I, T, F>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, F)>,
        T: Into<String>,
        F: Into<String>,
    {
        let mut mapping = Self::new();
        for (tag, field) in entries {
            mapping.register(tag, field)?;
        }
        Ok(mapping)
    }

    /// Registers a tag for a field.
    ///
    /// Re-registering an identical entry is a no-op. Registering a tag that is
    /// mapped to a different field fails with [`FinancialsError::TagConflict`]
    /// and leaves the mapping untouched.
    pub fn register(&mut self, tag: impl Into<String>, field: impl Into<String>) -> Result<Registration> {
        let tag = tag.into();
        let field = field.into();
        validate_entry(&tag, &field)?;

        if let Some(&i) = self.index.get(&tag) {
            let existing = &self.entries[i].field;
            if *existing == field {
                return Ok(Registration::Unchanged);
            }
            return Err(FinancialsError::TagConflict {
                tag,
                existing: existing.clone(),
                requested: field,
            });
        }

        self.index.insert(tag.clone(), self.entries.len());
        self.entries.push(TagEntry { tag, field });
        Ok(Registration::Added)
    }

    /// Registers a batch of entries, all or nothing.
    ///
    /// Returns the number of newly added entries.
    pub fn register_all<I, T, F>(&mut self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (T, F)>,
        T: Into<String>,
        F: Into<String>,
    {
        let mut staged = self.clone();
        let mut added = 0;
        for (tag, field) in entries {
            if staged.register(tag, field)? == Registration::Added {
                added += 1;
            }
        }
        *self = staged;
        Ok(added)
    }

    /// Maps a tag to a field, overriding any existing entry.
    ///
    /// An overridden tag keeps its precedence position. Returns the field the
    /// tag was previously mapped to.
    pub fn replace(&mut self, tag: impl Into<String>, field: impl Into<String>) -> Result<Option<String>> {
        let tag = tag.into();
        let field = field.into();
        validate_entry(&tag, &field)?;

        if let Some(&i) = self.index.get(&tag) {
            let previous = std::mem::replace(&mut self.entries[i].field, field);
            return Ok(Some(previous));
        }

        self.index.insert(tag.clone(), self.entries.len());
        self.entries.push(TagEntry { tag, field });
        Ok(None)
    }

    /// Registers the entries of a JSON object of `"Tag": "field"` pairs.
    ///
    /// Uses [`register_all`](Self::register_all) semantics.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize> {
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| FinancialsError::Parse(format!("Failed to parse tag mapping: {}", e)))?;

        let mut pairs = Vec::with_capacity(entries.len());
        for (tag, field) in entries {
            match field {
                serde_json::Value::String(field) => pairs.push((tag, field)),
                other => {
                    return Err(FinancialsError::Parse(format!(
                        "Field for tag {tag} must be a string, got {other}"
                    )));
                }
            }
        }
        self.register_all(pairs)
    }

    /// Returns the canonical field for a tag.
    #[must_use]
    pub fn field_for(&self, tag: &str) -> Option<&str> {
        self.index
            .get(tag)
            .map(|&i| self.entries[i].field.as_str())
    }

    /// Returns true if the tag has an entry.
    #[must_use]
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Returns the tags mapped to a field in precedence order.
    pub fn tags_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.tag.as_str())
    }

    /// Returns the distinct canonical fields in the mapping.
    #[must_use]
    pub fn fields(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.field.as_str()).collect()
    }

    /// Returns an iterator over all entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_entry(tag: &str, field: &str) -> Result<()> {
    if tag.trim().is_empty() {
        return Err(FinancialsError::InvalidParameter("Empty tag".to_string()));
    }
    if field.trim().is_empty() {
        return Err(FinancialsError::InvalidParameter(format!(
            "Empty field for tag {tag}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TagMapping {
        TagMapping::from_entries([
            ("Revenues", "revenue"),
            ("NetSales", "revenue"),
            ("AccountsReceivableNetCurrent", "accounts_receivable"),
        ])
        .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mapping = sample();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.field_for("NetSales"), Some("revenue"));
        assert_eq!(mapping.field_for("Unknown"), None);
        assert_eq!(
            mapping.tags_for("revenue").collect::<Vec<_>>(),
            vec!["Revenues", "NetSales"]
        );
        assert_eq!(
            mapping.fields().into_iter().collect::<Vec<_>>(),
            vec!["accounts_receivable", "revenue"]
        );
    }

    #[test]
    fn test_register_same_entry_is_noop() {
        let mut mapping = sample();
        assert_eq!(
            mapping.register("NetSales", "revenue").unwrap(),
            Registration::Unchanged
        );
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_register_conflict_is_refused() {
        let mut mapping = sample();
        let err = mapping
            .register("AccountsReceivableNetCurrent", "revenue")
            .unwrap_err();
        assert!(matches!(err, FinancialsError::TagConflict { .. }));
        assert_eq!(
            mapping.field_for("AccountsReceivableNetCurrent"),
            Some("accounts_receivable")
        );
    }

    #[test]
    fn test_register_all_is_atomic() {
        let mut mapping = sample();
        let result = mapping.register_all([
            ("SalesRevenueGoodsNet", "revenue_products"),
            ("NetSales", "revenue_services"),
        ]);
        assert!(result.is_err());
        assert!(!mapping.contains_tag("SalesRevenueGoodsNet"));

        let added = mapping
            .register_all([
                ("SalesRevenueGoodsNet", "revenue_products"),
                ("SalesRevenueServicesNet", "revenue_services"),
                ("NetSales", "revenue"),
            ])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(mapping.len(), 5);
    }

    #[test]
    fn test_replace_keeps_precedence() {
        let mut mapping = sample();
        let previous = mapping.replace("Revenues", "revenue_products").unwrap();
        assert_eq!(previous.as_deref(), Some("revenue"));
        assert_eq!(mapping.iter().next().unwrap().field, "revenue_products");
        assert_eq!(mapping.tags_for("revenue").collect::<Vec<_>>(), vec!["NetSales"]);

        assert_eq!(mapping.replace("TotalRevenues", "revenue").unwrap(), None);
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn test_empty_entries_rejected() {
        let mut mapping = TagMapping::new();
        assert!(mapping.register("", "revenue").is_err());
        assert!(mapping.register("NetSales", " ").is_err());
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_extend_from_json() {
        let mut mapping = sample();
        let added = mapping
            .extend_from_json(r#"{"RevenueNet": "revenue", "InventoryNet": "inventory"}"#)
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(mapping.field_for("InventoryNet"), Some("inventory"));

        assert!(matches!(
            mapping.extend_from_json(r#"{"RevenueNet": 3}"#),
            Err(FinancialsError::Parse(_))
        ));
        assert!(matches!(
            mapping.extend_from_json("not json"),
            Err(FinancialsError::Parse(_))
        ));
    }
}
