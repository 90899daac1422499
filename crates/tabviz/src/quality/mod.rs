//! Data quality analysis module.
//!
//! This module computes the [`QualityReport`](crate::types::QualityReport)
//! for a dataset: overview counts, per-column completeness, duplicate rows
//! and text columns that actually hold numbers.

mod analyzer;

pub use analyzer::{DataQualityAnalyzer, count_duplicate_rows};
