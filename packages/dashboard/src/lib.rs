#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard orchestration.
//!
//! [`Dashboard`] owns the current record collection and keeps it in sync
//! with a filter selection by fetching from an [`IncidentSource`]. Every
//! chart and statistic is derived from that collection on demand, so a
//! view never disagrees with the data it was computed from.
//!
//! Collaborator failures never clear the collection: the last successful
//! fetch stays in place and a [`Notice`] describes what went wrong.

pub mod notice;

use std::sync::{PoisonError, RwLock};

use violence_dashboard_analytics::query::{FetchPlan, plan_fetch};
use violence_dashboard_analytics::{AnalyticsError, comparative, grouping, simulation, summary};
use violence_dashboard_analytics_models::{
    ChartDatum, FilterQuery, FilterSelection, PredictionCriteria, SimulationOutcome, StateFilter,
    SummarySnapshot,
};
use violence_dashboard_incident_models::{Dimension, IncidentRecord};
use violence_dashboard_source::sequence::{RequestSequencer, Ticket};
use violence_dashboard_source::{IncidentSource, SourceError};

pub use notice::Notice;

/// Errors surfaced by dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Input was rejected before reaching the collaborator.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// The collaborator call failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The records replaced the current collection.
    Applied {
        /// Number of records now held.
        records: usize,
    },
    /// A newer fetch was started meanwhile; the records were dropped.
    Stale,
}

#[derive(Debug, Default)]
struct State {
    records: Vec<IncidentRecord>,
    selection: FilterSelection,
    notice: Option<Notice>,
}

/// Record collection plus the source it is fetched from.
pub struct Dashboard<S: IncidentSource> {
    source: S,
    sequencer: RequestSequencer,
    state: RwLock<State>,
}

impl<S: IncidentSource> Dashboard<S> {
    /// Creates an empty dashboard over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            sequencer: RequestSequencer::new(),
            state: RwLock::new(State::default()),
        }
    }

    /// The underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the records matching `selection` and makes them current.
    ///
    /// An empty selection fetches the whole collection. If another refresh
    /// starts before this one completes, this one's result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Source`] if the fetch fails. The previous
    /// records are kept and a [`Notice`] is recorded.
    pub async fn refresh(
        &self,
        selection: &FilterSelection,
    ) -> Result<RefreshOutcome, DashboardError> {
        let ticket = self.sequencer.issue();
        log::debug!("refresh #{} started", ticket.number());

        let result = match plan_fetch(selection) {
            FetchPlan::All => self.source.fetch_all().await,
            FetchPlan::Filtered(query) => self.source.fetch_filtered(&query).await,
        };

        self.commit(ticket, selection, result)
    }

    /// Applies a completed fetch if `ticket` is still the newest.
    ///
    /// The currency check and the write happen under one write guard, so a
    /// newer refresh can never be overwritten by an older one.
    fn commit(
        &self,
        ticket: Ticket,
        selection: &FilterSelection,
        result: Result<Vec<IncidentRecord>, SourceError>,
    ) -> Result<RefreshOutcome, DashboardError> {
        let mut state = self.write();

        if !self.sequencer.is_current(ticket) {
            log::warn!("refresh #{} superseded, discarding result", ticket.number());
            return Ok(RefreshOutcome::Stale);
        }

        match result {
            Ok(records) => {
                let count = records.len();
                state.records = records;
                state.selection = selection.clone();
                state.notice = None;
                log::info!("refresh #{}: {count} records", ticket.number());
                Ok(RefreshOutcome::Applied { records: count })
            }
            Err(e) => {
                log::error!("refresh #{} failed: {e}", ticket.number());
                state.notice = Some(Notice::new(format!("Erro ao carregar dados: {e}")));
                Err(e.into())
            }
        }
    }

    /// Fetches a single record.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Source`] if the record does not exist or
    /// the fetch fails.
    pub async fn lookup(&self, id: &str) -> Result<IncidentRecord, DashboardError> {
        self.source.fetch_by_id(id).await.map_err(|e| {
            log::error!("lookup of {id} failed: {e}");
            e.into()
        })
    }

    /// Runs a prediction for `criteria` and compares it with the historical
    /// cases matching the same criteria.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Analytics`] if any criterion is empty (no
    /// request is sent), or [`DashboardError::Source`] if either request
    /// fails. Both cases also record a [`Notice`].
    pub async fn simulate(
        &self,
        criteria: &PredictionCriteria,
    ) -> Result<SimulationOutcome, DashboardError> {
        if let Err(e) = simulation::validate_criteria(criteria) {
            log::warn!("simulation rejected: {e}");
            self.write().notice = Some(Notice::new(e.to_string()));
            return Err(e.into());
        }

        let baseline_query: FilterQuery = simulation::criteria_query(criteria);
        let fetched = async {
            let prediction = self.source.predict(criteria).await?;
            let historical = self.source.fetch_filtered(&baseline_query).await?;
            Ok::<_, SourceError>((prediction, historical))
        }
        .await;

        match fetched {
            Ok((prediction, historical)) => {
                Ok(simulation::simulate(prediction.predicted_cases, &historical))
            }
            Err(e) => {
                log::error!("simulation failed: {e}");
                self.write().notice = Some(Notice::new(format!("Erro ao simular cenário: {e}")));
                Err(e.into())
            }
        }
    }

    /// Copy of the current records.
    #[must_use]
    pub fn records(&self) -> Vec<IncidentRecord> {
        self.read().records.clone()
    }

    /// Selection the current records were fetched with.
    #[must_use]
    pub fn selection(&self) -> FilterSelection {
        self.read().selection.clone()
    }

    /// The most recent failure, if the last operation failed.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.read().notice.clone()
    }

    /// Summary statistics of the current records.
    #[must_use]
    pub fn snapshot(&self) -> SummarySnapshot {
        summary::summarize(&self.read().records)
    }

    /// Current records grouped by `dimension`.
    #[must_use]
    pub fn group(&self, dimension: Dimension) -> Vec<ChartDatum> {
        grouping::group_by_dimension(&self.read().records, dimension)
    }

    /// Year-over-year change for `year`.
    #[must_use]
    pub fn variation(&self, year: i32, occurrence: Option<&str>) -> f64 {
        comparative::yearly_variation(&self.read().records, year, occurrence)
    }

    /// Feminicide rate over the current records.
    #[must_use]
    pub fn feminicide_rate(&self, year: Option<i32>, state: &StateFilter) -> f64 {
        comparative::feminicide_rate(&self.read().records, year, state)
    }

    /// Cases per year over the current records.
    #[must_use]
    pub fn trend(&self, occurrence: Option<&str>, state: &StateFilter) -> Vec<ChartDatum> {
        comparative::yearly_trend(&self.read().records, occurrence, state)
    }

    /// Years present in the current records.
    #[must_use]
    pub fn available_years(&self) -> Vec<i32> {
        comparative::available_years(&self.read().records)
    }

    /// Distinct values of `dimension` in the current records.
    #[must_use]
    pub fn options(&self, dimension: Dimension) -> Vec<String> {
        comparative::distinct_values(&self.read().records, dimension)
    }

    /// Narrows the current records by `selection` without fetching.
    #[must_use]
    pub fn refine(&self, selection: &FilterSelection) -> Vec<IncidentRecord> {
        comparative::apply_selection(&self.read().records, selection)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use violence_dashboard_analytics_models::{
        Comparison, FilterDimension, PredictionResponse, RiskLevel,
    };
    use violence_dashboard_source::memory::StaticSource;

    use super::*;

    fn record(year: i32, occurrence: &str, age: &str, count: f64) -> IncidentRecord {
        IncidentRecord {
            year: Some(year),
            occurrence_type: Some(occurrence.to_string()),
            violence_type: Some("Física".to_string()),
            age_group: Some(age.to_string()),
            ethnicity: Some("Parda".to_string()),
            weapon: Some("Arma de Fogo".to_string()),
            sex: Some("Mulher".to_string()),
            case_count: count,
            ..IncidentRecord::default()
        }
    }

    fn sample() -> Vec<IncidentRecord> {
        vec![
            record(2021, "Feminicídio", "18-25", 4.0),
            record(2022, "Feminicídio", "26-35", 6.0),
            record(2022, "Estupro", "18-25", 10.0),
        ]
    }

    /// Source whose first fetch blocks until released, and which fails
    /// every fetch once `failing` is set.
    #[derive(Default)]
    struct GatedSource {
        calls: AtomicUsize,
        gate: tokio::sync::Notify,
        failing: std::sync::atomic::AtomicBool,
    }

    impl GatedSource {
        async fn respond(&self) -> Result<Vec<IncidentRecord>, SourceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SourceError::Status {
                    status: 503,
                    url: "http://collaborator/".to_string(),
                });
            }
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
                return Ok(vec![record(2000, "Outros", "60+", 1.0)]);
            }
            Ok(sample())
        }
    }

    #[async_trait]
    impl IncidentSource for GatedSource {
        async fn fetch_all(&self) -> Result<Vec<IncidentRecord>, SourceError> {
            self.respond().await
        }

        async fn fetch_filtered(
            &self,
            _query: &FilterQuery,
        ) -> Result<Vec<IncidentRecord>, SourceError> {
            self.respond().await
        }

        async fn fetch_by_id(&self, id: &str) -> Result<IncidentRecord, SourceError> {
            Err(SourceError::NotFound { id: id.to_string() })
        }

        async fn predict(
            &self,
            _criteria: &PredictionCriteria,
        ) -> Result<PredictionResponse, SourceError> {
            Ok(PredictionResponse {
                predicted_cases: 1.0,
            })
        }
    }

    fn criteria() -> PredictionCriteria {
        PredictionCriteria {
            year: Some(2022),
            occurrence: "Feminicídio".to_string(),
            violence_type: "Física".to_string(),
            age_group: "26-35".to_string(),
            ethnicity: "Parda".to_string(),
            weapon: "Arma de Fogo".to_string(),
        }
    }

    #[tokio::test]
    async fn refresh_with_empty_selection_loads_everything() {
        let dashboard = Dashboard::new(StaticSource::new(sample()));
        let outcome = dashboard.refresh(&FilterSelection::new()).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied { records: 3 });

        let snapshot = dashboard.snapshot();
        assert!((snapshot.total_crimes - 20.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.peak_year, Some(2022));
        assert_eq!(dashboard.available_years(), vec![2021, 2022]);
    }

    #[tokio::test]
    async fn refresh_with_selection_uses_filtered_fetch() {
        let dashboard = Dashboard::new(StaticSource::new(sample()));
        let selection =
            FilterSelection::new().with_values(FilterDimension::AgeGroup, ["18-25"]);
        dashboard.refresh(&selection).await.unwrap();

        assert_eq!(dashboard.records().len(), 2);
        assert_eq!(dashboard.selection(), selection);
        let by_occurrence = dashboard.group(Dimension::OccurrenceType);
        assert_eq!(by_occurrence.len(), 2);
    }

    #[tokio::test]
    async fn superseded_refresh_is_discarded() {
        let dashboard = Arc::new(Dashboard::new(GatedSource::default()));

        let slow = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.refresh(&FilterSelection::new()).await }
        });
        while dashboard.source().calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fast = dashboard.refresh(&FilterSelection::new()).await.unwrap();
        assert_eq!(fast, RefreshOutcome::Applied { records: 3 });

        dashboard.source().gate.notify_one();
        assert_eq!(slow.await.unwrap().unwrap(), RefreshOutcome::Stale);
        assert_eq!(dashboard.records(), sample());
    }

    #[test]
    fn older_fetch_completing_last_never_overwrites_newer() {
        let dashboard = Dashboard::new(StaticSource::new(Vec::new()));
        let older = dashboard.sequencer.issue();
        let newer = dashboard.sequencer.issue();
        let everything = FilterSelection::new();

        let applied = dashboard.commit(newer, &everything, Ok(sample())).unwrap();
        assert_eq!(applied, RefreshOutcome::Applied { records: 3 });

        let late = vec![record(2000, "Outros", "60+", 1.0)];
        let outcome = dashboard.commit(older, &everything, Ok(late)).unwrap();
        assert_eq!(outcome, RefreshOutcome::Stale);
        assert_eq!(dashboard.records(), sample());

        let failure = Err(SourceError::Status {
            status: 503,
            url: "http://collaborator/".to_string(),
        });
        let outcome = dashboard.commit(older, &everything, failure).unwrap();
        assert_eq!(outcome, RefreshOutcome::Stale);
        assert!(dashboard.notice().is_none());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_records_and_records_notice() {
        let dashboard = Dashboard::new(GatedSource::default());
        dashboard.source().calls.store(1, Ordering::SeqCst);
        dashboard.refresh(&FilterSelection::new()).await.unwrap();
        assert!(dashboard.notice().is_none());

        dashboard.source().failing.store(true, Ordering::SeqCst);
        let result = dashboard.refresh(&FilterSelection::new()).await;
        assert!(matches!(result, Err(DashboardError::Source(_))));
        assert_eq!(dashboard.records(), sample());
        assert!(dashboard.notice().is_some_and(|n| n.message.contains("503")));
    }

    #[tokio::test]
    async fn simulation_compares_prediction_with_history() {
        let dashboard = Dashboard::new(StaticSource::new(sample()).with_prediction(9.0));
        let outcome = dashboard.simulate(&criteria()).await.unwrap();

        assert!((outcome.historical_base_rate - 6.0).abs() < f64::EPSILON);
        assert!((outcome.impact_percentage - 150.0).abs() < 1e-9);
        assert_eq!(outcome.risk_level, RiskLevel::High);
        assert_eq!(outcome.comparison, Comparison::AboveAverage);
    }

    #[tokio::test]
    async fn incomplete_criteria_never_reach_the_source() {
        let source = GatedSource::default();
        source.failing.store(true, Ordering::SeqCst);
        let dashboard = Dashboard::new(source);

        let criteria = PredictionCriteria {
            age_group: String::new(),
            ..criteria()
        };
        let result = dashboard.simulate(&criteria).await;
        assert!(matches!(result, Err(DashboardError::Analytics(_))));
        assert_eq!(dashboard.source().calls.load(Ordering::SeqCst), 0);
        assert!(
            dashboard
                .notice()
                .is_some_and(|n| n.message.contains("faixa_etaria"))
        );
    }

    #[tokio::test]
    async fn lookup_and_local_refinement() {
        let mut records = sample();
        records[1].id = Some("x1".to_string());
        let dashboard = Dashboard::new(StaticSource::new(records));
        dashboard.refresh(&FilterSelection::new()).await.unwrap();

        assert!(dashboard.lookup("x1").await.is_ok());
        assert!(matches!(
            dashboard.lookup("missing").await,
            Err(DashboardError::Source(SourceError::NotFound { .. }))
        ));

        let selection =
            FilterSelection::new().with_values(FilterDimension::OccurrenceType, ["Estupro"]);
        assert_eq!(dashboard.refine(&selection).len(), 1);
        assert_eq!(dashboard.options(Dimension::AgeGroup), ["18-25", "26-35"]);
        assert!((dashboard.variation(2022, None) - 300.0).abs() < 1e-9);
        assert!(dashboard.feminicide_rate(None, &StateFilter::All) > 0.0);
        assert_eq!(dashboard.trend(Some("feminic"), &StateFilter::All).len(), 2);
    }
}
