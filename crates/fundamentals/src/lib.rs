#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Reconciled company financials for quantitative research.
//!
//! This crate re-exports the core types, the us-gaap tag resolver and the
//! cache implementations, and provides a [`FinancialsService`] that pulls
//! filing rows from registered loaders, reconciles them and caches the result.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fundamentals::{Cik, FinancialsService, InMemoryCache};
//!
//! #[tokio::main]
//! async fn main() -> fundamentals::Result<()> {
//!     let mut service = FinancialsService::with_cache(Arc::new(InMemoryCache::new()));
//!     service.register_loader(Arc::new(MyBulkLoader::open("companyfacts.zip")?));
//!
//!     if let Some(report) = service.analyze(Cik::new(320193), 2023).await? {
//!         println!("DSO: {:?}", report.ratios.dso);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use fundamentals_core::*;

// Cache implementations
pub use fundamentals_cache::{InMemoryCache, NoopCache};

// Tag resolution and analysis
pub use fundamentals_edgar::{
    EDGAR_TAGS, EfficiencyRatios, Finding, Resolution, Severity, TagResolver, diagnose,
    edgar_tag_mapping, rows_from_frame,
};

mod service;
pub use service::{FinancialsReport, FinancialsService};
