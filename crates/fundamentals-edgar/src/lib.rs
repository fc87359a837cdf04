#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR tag resolution and revenue reconciliation.
//!
//! This crate provides:
//!
//! - The default us-gaap tag table ([`edgar_tag_mapping`])
//! - [`TagResolver`] for mapping raw tags and reconciling filing rows
//! - DataFrame to [`FilingRow`](fundamentals_core::FilingRow) extraction
//! - Efficiency ratios and data-quality diagnostics
//!
//! # Example
//!
//! ```
//! use fundamentals_core::{Cik, FilingRow, fields};
//! use fundamentals_edgar::TagResolver;
//!
//! let resolver = TagResolver::edgar();
//!
//! let row = FilingRow::for_company(Cik::new(320193), 2023)
//!     .with_value(fields::REVENUE, 181_000_000_000.0)
//!     .with_value(fields::REVENUE_PRODUCTS, 298_085_000_000.0)
//!     .with_value(fields::REVENUE_SERVICES, 85_200_000_000.0)
//!     .with_value(fields::COGS, 214_137_000_000.0);
//!
//! let financials = resolver.reconcile(&row)?;
//! assert_eq!(financials.get(fields::REVENUE), Some(383_285_000_000.0));
//! assert_eq!(financials.get(fields::GROSS_PROFIT), Some(169_148_000_000.0));
//! # Ok::<(), fundamentals_core::FinancialsError>(())
//! ```

/// Data-quality checks.
pub mod diagnostics;
/// DataFrame row extraction.
pub mod frame;
/// Efficiency ratios.
pub mod ratios;
/// Tag resolution and reconciliation.
pub mod resolver;
/// Default us-gaap tag table.
pub mod tags;

pub use diagnostics::{Finding, Severity, diagnose};
pub use frame::rows_from_frame;
pub use ratios::EfficiencyRatios;
pub use resolver::{Resolution, TagResolver};
pub use tags::{EDGAR_TAGS, edgar_tag_mapping};
