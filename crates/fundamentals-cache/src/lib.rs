#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for reconciled financials.
//!
//! This crate provides implementations of the [`FinancialsCache`] trait from
//! `fundamentals-core`:
//!
//! - [`InMemoryCache`] - In-memory cache with TTL invalidation
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use fundamentals_core::FinancialsCache;

// Re-export implementations
pub use memory::InMemoryCache;
pub use noop::NoopCache;
