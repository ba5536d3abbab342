//! In-memory [`IncidentSource`] over a fixed record set.
//!
//! Filtering applies the same comma-separated "any of" semantics the
//! collaborator's `/filter` endpoint uses. Predictions come from a fixed
//! value, or fail when none is configured.

use std::path::Path;

use async_trait::async_trait;
use violence_dashboard_analytics_models::{
    FilterDimension, FilterQuery, PredictionCriteria, PredictionResponse,
};
use violence_dashboard_incident_models::IncidentRecord;

use crate::{IncidentSource, SourceError};

/// Serves a fixed collection.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<IncidentRecord>,
    prediction: Option<f64>,
}

impl StaticSource {
    /// Creates a source over `records` with no prediction model.
    #[must_use]
    pub const fn new(records: Vec<IncidentRecord>) -> Self {
        Self {
            records,
            prediction: None,
        }
    }

    /// Reads a JSON array of records from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read or is not a JSON
    /// array of records.
    pub fn from_json_file(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let records: Vec<IncidentRecord> = serde_json::from_str(&text)?;
        log::info!("Loaded {} incidents from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    /// Returns a copy that answers every prediction with `predicted_cases`.
    #[must_use]
    pub fn with_prediction(mut self, predicted_cases: f64) -> Self {
        self.prediction = Some(predicted_cases);
        self
    }

    /// The records this source serves.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }
}

fn matches_query(record: &IncidentRecord, query: &FilterQuery) -> bool {
    FilterDimension::all().iter().all(|dimension| {
        query.get(dimension.param_name()).is_none_or(|wanted| {
            record
                .value_of(dimension.dimension())
                .is_some_and(|value| wanted.split(',').any(|w| w == value))
        })
    })
}

#[async_trait]
impl IncidentSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<IncidentRecord>, SourceError> {
        Ok(self.records.clone())
    }

    async fn fetch_filtered(&self, query: &FilterQuery) -> Result<Vec<IncidentRecord>, SourceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| matches_query(r, query))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<IncidentRecord, SourceError> {
        self.records
            .iter()
            .find(|r| r.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| SourceError::NotFound { id: id.to_string() })
    }

    async fn predict(
        &self,
        _criteria: &PredictionCriteria,
    ) -> Result<PredictionResponse, SourceError> {
        self.prediction
            .map(|predicted_cases| PredictionResponse { predicted_cases })
            .ok_or_else(|| SourceError::Config {
                message: "no prediction model available offline".to_string(),
            })
    }
}
