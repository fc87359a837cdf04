#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for XBRL financial reconciliation.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`TagMapping`](mapping::TagMapping) - Ordered raw tag to canonical field mapping
//! - [`FilingRow`](types::FilingRow) - One company-year record from a loader
//! - [`ReconciledFinancials`](types::ReconciledFinancials) - Reconciled output
//! - [`FilingLoader`](loader::FilingLoader) - External loader seam
//! - [`FinancialsCache`](cache::FinancialsCache) - Caching abstraction

/// Cache trait for reconciled financials.
pub mod cache;
/// Error types for mapping and reconciliation.
pub mod error;
/// Filing loader trait.
pub mod loader;
/// Raw tag to canonical field mapping.
pub mod mapping;
/// Core data types (Cik, FilingRow, ReconciledFinancials, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::FinancialsCache;
pub use error::{FinancialsError, Result, UnknownTagWarning};
pub use loader::FilingLoader;
pub use mapping::{Registration, TagEntry, TagMapping};
pub use types::{Adjustment, Cik, FilingRow, ReconciledFinancials, fields};
