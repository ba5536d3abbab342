#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation and derived-metrics engine for incident records.
//!
//! Every public function is pure: it borrows a record slice, never mutates
//! it, and returns a freshly derived value. Callers filter first (see
//! [`comparative::apply_selection`]) and aggregate second.

pub mod comparative;
pub mod grouping;
pub mod query;
pub mod simulation;
pub mod summary;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Prediction criteria have empty required fields.
    #[error("Incomplete prediction criteria: missing {}", .missing.join(", "))]
    Validation {
        /// Wire names of the empty fields.
        missing: Vec<&'static str>,
    },
}
