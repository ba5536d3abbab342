#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Access to the upstream incident collection and prediction model.
//!
//! The dashboard talks to its collaborator only through the
//! [`IncidentSource`] trait. [`client::ApiClient`] implements it over HTTP;
//! [`memory::StaticSource`] serves a fixed record set for offline use and
//! tests.

pub mod client;
pub mod config;
pub mod memory;
pub mod retry;
pub mod sequence;

use async_trait::async_trait;
use violence_dashboard_analytics_models::{FilterQuery, PredictionCriteria, PredictionResponse};
use violence_dashboard_incident_models::IncidentRecord;

/// Errors that can occur while talking to the collaborator.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The collaborator answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// No record has the requested identifier.
    #[error("Incident {id} not found")]
    NotFound {
        /// Requested identifier.
        id: String,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// The four operations the dashboard needs from its collaborator.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Returns every record in the collection.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the collection cannot be read.
    async fn fetch_all(&self) -> Result<Vec<IncidentRecord>, SourceError>;

    /// Returns the records matching `query`, filtered by the collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the collection cannot be read.
    async fn fetch_filtered(&self, query: &FilterQuery) -> Result<Vec<IncidentRecord>, SourceError>;

    /// Returns the record with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] if no record has that identifier.
    async fn fetch_by_id(&self, id: &str) -> Result<IncidentRecord, SourceError>;

    /// Asks the predictive model for the expected case count.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the model cannot be reached.
    async fn predict(&self, criteria: &PredictionCriteria)
    -> Result<PredictionResponse, SourceError>;
}
