//! HTTP client for the incident collection and prediction endpoints.

use async_trait::async_trait;
use violence_dashboard_analytics_models::{FilterQuery, PredictionCriteria, PredictionResponse};
use violence_dashboard_incident_models::IncidentRecord;

use crate::config::DashboardConfig;
use crate::retry::{self, RetryPolicy};
use crate::{IncidentSource, SourceError};

const RESERVED_SEGMENTS: &[&str] = &["filter", "predict"];

/// [`IncidentSource`] backed by the collaborator's REST API.
pub struct ApiClient {
    base_url: String,
    policy: RetryPolicy,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the endpoint in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &DashboardConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            base_url: config.base_url().to_string(),
            policy: config.retry_policy(),
            client,
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// URL of a single record, with `id` encoded as one path segment.
    fn record_url(&self, id: &str) -> Result<reqwest::Url, SourceError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| SourceError::Config {
            message: format!("invalid api_base_url {:?}: {e}", self.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|()| SourceError::Config {
                message: format!("api_base_url {:?} cannot take a path", self.base_url),
            })?
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl IncidentSource for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<IncidentRecord>, SourceError> {
        let url = self.url("");
        log::info!("Fetching all incidents from {url}");
        let records: Vec<IncidentRecord> =
            retry::send_json(&self.policy, || self.client.get(&url)).await?;
        log::info!("Fetched {} incidents", records.len());
        Ok(records)
    }

    async fn fetch_filtered(&self, query: &FilterQuery) -> Result<Vec<IncidentRecord>, SourceError> {
        let url = self.url("filter");
        let params: Vec<(&str, &str)> = query.iter().collect();
        log::info!("Fetching filtered incidents from {url} with {params:?}");
        let records: Vec<IncidentRecord> =
            retry::send_json(&self.policy, || self.client.get(&url).query(&params)).await?;
        log::info!("Fetched {} filtered incidents", records.len());
        Ok(records)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<IncidentRecord, SourceError> {
        // These segments route to the collection endpoints, never to a record.
        if id.is_empty() || RESERVED_SEGMENTS.contains(&id) {
            return Err(SourceError::NotFound { id: id.to_string() });
        }
        let url = self.record_url(id)?;
        log::debug!("Fetching incident {id} from {url}");
        retry::send_json(&self.policy, || self.client.get(url.clone()))
            .await
            .map_err(|e| match e {
                SourceError::Status { status: 404, .. } => SourceError::NotFound { id: id.to_string() },
                other => other,
            })
    }

    async fn predict(
        &self,
        criteria: &PredictionCriteria,
    ) -> Result<PredictionResponse, SourceError> {
        let url = self.url("predict");
        log::info!("Requesting prediction from {url}");
        let response: PredictionResponse =
            retry::send_json(&self.policy, || self.client.post(&url).json(criteria)).await?;
        log::debug!("Predicted {} cases", response.predicted_cases);
        Ok(response)
    }
}
