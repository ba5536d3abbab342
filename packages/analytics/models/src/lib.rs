#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Value types produced and consumed by the dashboard engine.
//!
//! Chart data, the summary snapshot, filter selections and the
//! prediction/simulation types. All of them serialize to the camelCase JSON
//! the presentation layer expects, except where a type talks to the
//! upstream collaborator and must keep its Portuguese wire keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use violence_dashboard_incident_models::Dimension;

/// Label used when no most-affected group can be determined.
pub const UNKNOWN_GROUP_LABEL: &str = "Desconhecida";

/// Label used when no peak year can be determined.
pub const UNKNOWN_PERIOD_LABEL: &str = "Desconhecido";

/// A `(label, summed value)` pair ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDatum {
    /// Group label.
    pub name: String,
    /// Summed case count.
    pub value: f64,
    /// Optional CSS color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChartDatum {
    /// Creates an uncolored datum.
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            color: None,
        }
    }
}

/// Risk classification label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RiskLevel {
    /// Lowest band.
    #[serde(rename = "Baixo")]
    #[strum(serialize = "Baixo")]
    Low,
    /// Middle band.
    #[serde(rename = "Médio")]
    #[strum(serialize = "Médio")]
    Medium,
    /// Highest band.
    #[serde(rename = "Alto")]
    #[strum(serialize = "Alto")]
    High,
}

impl RiskLevel {
    /// Classifies a 0-100 risk score: `>= 80` high, `>= 50` medium.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::High
        } else if score >= 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Classifies a simulation impact percentage: `>= 120` high, `>= 80`
    /// medium.
    #[must_use]
    pub fn from_impact(percentage: f64) -> Self {
        if percentage >= 120.0 {
            Self::High
        } else if percentage >= 80.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Risk score (0-100) with its label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Score between 0 and 100.
    pub score: f64,
    /// Classification of [`Self::score`].
    pub level: RiskLevel,
}

/// The age band and ethnicity combination with the most female victims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MostAffectedGroup {
    /// Age band.
    pub age_group: String,
    /// Ethnicity.
    pub ethnicity: String,
    /// Summed case count of the combination.
    pub cases: f64,
}

impl Default for MostAffectedGroup {
    fn default() -> Self {
        Self {
            age_group: UNKNOWN_GROUP_LABEL.to_string(),
            ethnicity: UNKNOWN_GROUP_LABEL.to_string(),
            cases: 0.0,
        }
    }
}

/// The year with the most cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPeriod {
    /// Peak year, `None` when no record carries a year.
    pub year: Option<i32>,
    /// Cases in the peak year.
    pub cases: f64,
}

impl CriticalPeriod {
    /// Returns the year as display text, or `"Desconhecido"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.year
            .map_or_else(|| UNKNOWN_PERIOD_LABEL.to_string(), |y| y.to_string())
    }
}

/// Every derived scalar statistic of one record collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySnapshot {
    /// Sum of all case counts.
    pub total_crimes: f64,
    /// Cases whose violence type mentions feminicide.
    pub feminicides: f64,
    /// Cases whose violence type is not exactly feminicide.
    pub violent_crimes: f64,
    /// Cases classified as sexual crimes.
    pub sexual_crimes: f64,
    /// Age band with the most cases.
    pub most_affected_age: String,
    /// Ethnicity with the most cases.
    pub most_affected_ethnicity: String,
    /// Age/ethnicity combination with the most female victims.
    pub most_affected_group: MostAffectedGroup,
    /// Year with the most cases.
    pub peak_year: Option<i32>,
    /// Cases in [`Self::peak_year`].
    pub peak_cases: f64,
    /// Risk score between 0 and 100.
    pub risk_score: f64,
    /// Classification of [`Self::risk_score`].
    pub risk_level: RiskLevel,
}

/// Dimensions the user can restrict from the filter panel.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FilterDimension {
    /// Victim age band.
    AgeGroup,
    /// Victim ethnicity.
    Ethnicity,
    /// Secondary classification.
    ViolenceType,
    /// Weapon used.
    Weapon,
    /// Primary classification.
    OccurrenceType,
    /// Calendar year.
    Year,
}

impl FilterDimension {
    /// Returns the query parameter name sent to the collaborator.
    #[must_use]
    pub const fn param_name(self) -> &'static str {
        self.dimension().wire_key()
    }

    /// Returns the record dimension this filter restricts.
    #[must_use]
    pub const fn dimension(self) -> Dimension {
        match self {
            Self::AgeGroup => Dimension::AgeGroup,
            Self::Ethnicity => Dimension::Ethnicity,
            Self::ViolenceType => Dimension::ViolenceType,
            Self::Weapon => Dimension::Weapon,
            Self::OccurrenceType => Dimension::OccurrenceType,
            Self::Year => Dimension::Year,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AgeGroup,
            Self::Ethnicity,
            Self::ViolenceType,
            Self::Weapon,
            Self::OccurrenceType,
            Self::Year,
        ]
    }
}

/// User-chosen restriction: one ordered set of allowed values per
/// dimension. A dimension with no values is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    values: BTreeMap<FilterDimension, Vec<String>>,
}

impl FilterSelection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `values` added to `dimension`, skipping
    /// duplicates and empty strings.
    #[must_use]
    pub fn with_values<I, S>(mut self, dimension: FilterDimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.insert(dimension, value.into());
        }
        self
    }

    /// Returns a copy with `value` checked or unchecked in `dimension`.
    #[must_use]
    pub fn toggle(mut self, dimension: FilterDimension, value: &str, checked: bool) -> Self {
        if checked {
            self.insert(dimension, value.to_string());
        } else if let Some(list) = self.values.get_mut(&dimension) {
            list.retain(|v| v != value);
            if list.is_empty() {
                self.values.remove(&dimension);
            }
        }
        self
    }

    /// Returns an empty selection.
    #[must_use]
    pub fn clear(self) -> Self {
        Self::default()
    }

    /// Whether no dimension is restricted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    /// Returns the selected values for `dimension` in selection order.
    #[must_use]
    pub fn values(&self, dimension: FilterDimension) -> &[String] {
        self.values.get(&dimension).map_or(&[], Vec::as_slice)
    }

    /// Iterates over restricted dimensions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterDimension, &[String])> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(d, v)| (*d, v.as_slice()))
    }

    fn insert(&mut self, dimension: FilterDimension, value: String) {
        if value.is_empty() {
            return;
        }
        let list = self.values.entry(dimension).or_default();
        if !list.contains(&value) {
            list.push(value);
        }
    }
}

/// Query parameters for the filtered fetch, keyed by wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterQuery(BTreeMap<String, String>);

impl FilterQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `param` to `value`.
    pub fn insert(&mut self, param: impl Into<String>, value: impl Into<String>) {
        self.0.insert(param.into(), value.into());
    }

    /// Returns the value of `param`.
    #[must_use]
    pub fn get(&self, param: &str) -> Option<&str> {
        self.0.get(param).map(String::as_str)
    }

    /// Whether no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(param, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// State restriction for the rate and trend metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateFilter {
    /// No restriction.
    #[default]
    All,
    /// Only this state, compared case-insensitively.
    Named(String),
}

impl StateFilter {
    /// Parses user input; `"all"` (any case) and blank mean no restriction.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(trimmed.to_string())
        }
    }

    /// Whether a record with `state` passes this filter.
    #[must_use]
    pub fn matches(&self, state: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Named(wanted) => state.is_some_and(|s| s.to_lowercase() == wanted.to_lowercase()),
        }
    }
}

/// Criteria sent to the predictive model. Serializes with the
/// collaborator's wire keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionCriteria {
    /// Target year.
    #[serde(rename = "ano")]
    pub year: Option<i32>,
    /// Primary classification.
    #[serde(rename = "ocorrencia")]
    pub occurrence: String,
    /// Secondary classification.
    #[serde(rename = "tipo_de_violencia")]
    pub violence_type: String,
    /// Victim age band.
    #[serde(rename = "faixa_etaria")]
    pub age_group: String,
    /// Victim ethnicity.
    #[serde(rename = "raca")]
    pub ethnicity: String,
    /// Weapon used.
    #[serde(rename = "arma")]
    pub weapon: String,
}

/// Response of the predictive model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Estimated number of cases.
    #[serde(
        rename = "predictedCases",
        alias = "predicted_cases",
        alias = "previsao"
    )]
    pub predicted_cases: f64,
}

/// Whether a simulated scenario sits above or below the historical rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum Comparison {
    /// Prediction exceeds the historical base rate.
    #[serde(rename = "acima da média")]
    #[strum(serialize = "acima da média")]
    AboveAverage,
    /// Prediction is at or below the historical base rate.
    #[serde(rename = "abaixo da média")]
    #[strum(serialize = "abaixo da média")]
    BelowAverage,
}

/// Result of combining a prediction with its historical baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    /// Cases estimated by the model.
    pub predicted_cases: f64,
    /// Historical case total for the same criteria.
    pub historical_base_rate: f64,
    /// `predicted / base * 100`.
    pub impact_percentage: f64,
    /// Classification of [`Self::impact_percentage`].
    pub risk_level: RiskLevel,
    /// Prediction relative to the base rate.
    pub comparison: Comparison,
    /// Simulated vs. remaining cases, for a pie chart.
    pub chart: Vec<ChartDatum>,
}
