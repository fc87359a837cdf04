//! Error types for tag mapping and reconciliation.
//!
//! This module defines [`FinancialsError`] which covers every failure that can
//! surface while mapping filing tags, reconciling filing rows, or loading them
//! through a [`FilingLoader`](crate::loader::FilingLoader).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while mapping or reconciling financial data.
#[derive(Error, Debug)]
pub enum FinancialsError {
    /// A requested canonical field is absent for a company-year.
    ///
    /// This is a soft error: callers should render it as "N/A" or skip the
    /// dependent computation, never substitute zero.
    #[error("Missing {field} for {context}")]
    MissingData {
        /// The canonical field that was requested.
        field: String,
        /// Company-year the field was requested for.
        context: String,
    },

    /// The input row does not satisfy the field-name-to-number contract.
    #[error("Malformed filing row: {0}")]
    MalformedRow(String),

    /// A tag registration would silently remap an existing tag.
    #[error("Tag {tag} is already mapped to {existing}, refusing to map it to {requested}")]
    TagConflict {
        /// The raw tag being registered.
        tag: String,
        /// The canonical field the tag is currently mapped to.
        existing: String,
        /// The canonical field the registration asked for.
        requested: String,
    },

    /// No filing loader has been registered.
    #[error("Loader not configured: {0}")]
    LoaderNotConfigured(String),

    /// Loaders are registered but none of them has finished loading.
    #[error("Loader not ready: {0}")]
    LoaderNotReady(String),

    /// A filing loader failed to produce rows.
    #[error("Loader error: {0}")]
    Loader(String),

    /// Error parsing configuration or loader output.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl FinancialsError {
    /// Returns true for errors that describe absent data rather than a failure.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::MissingData { .. })
    }
}

/// Result type alias using [`FinancialsError`].
pub type Result<T> = std::result::Result<T, FinancialsError>;

/// A raw tag with no entry in the active tag mapping.
///
/// Unknown tags are expected as taxonomies evolve; they are dropped and
/// reported through this value instead of failing the call.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnknownTagWarning {
    /// The raw tag that could not be mapped.
    pub tag: String,
}

impl UnknownTagWarning {
    /// Creates a warning for the given raw tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl fmt::Display for UnknownTagWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no mapping for tag {}", self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_is_soft() {
        let err = FinancialsError::MissingData {
            field: "revenue".to_string(),
            context: "CIK 0000320193 FY2023".to_string(),
        };
        assert!(err.is_soft());
        assert_eq!(err.to_string(), "Missing revenue for CIK 0000320193 FY2023");

        let err = FinancialsError::MalformedRow("revenue is not a number".to_string());
        assert!(!err.is_soft());
    }

    #[test]
    fn test_tag_conflict_message() {
        let err = FinancialsError::TagConflict {
            tag: "NetSales".to_string(),
            existing: "revenue".to_string(),
            requested: "accounts_receivable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tag NetSales is already mapped to revenue, refusing to map it to accounts_receivable"
        );
    }
}
