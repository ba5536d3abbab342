//! Year-over-year and cross-category metrics, plus local filtering.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use violence_dashboard_analytics_models::{ChartDatum, FilterSelection, StateFilter};
use violence_dashboard_incident_models::{ClassificationAxis, Dimension, IncidentRecord};

use crate::summary::sum_where;

/// Percentage change of cases from `year - 1` to `year`.
///
/// When `occurrence` is given only records with exactly that occurrence
/// count. Returns 0 when the previous year has no cases, which also hides
/// growth from zero.
#[must_use]
pub fn yearly_variation(records: &[IncidentRecord], year: i32, occurrence: Option<&str>) -> f64 {
    let occurrence = occurrence.filter(|o| !o.is_empty());
    let matches = |r: &IncidentRecord, wanted: i32| {
        r.year == Some(wanted) && occurrence.is_none_or(|o| r.occurrence_type.as_deref() == Some(o))
    };

    let current = sum_where(records, |r| matches(r, year));
    let previous = sum_where(records, |r| matches(r, year.saturating_sub(1)));

    if previous <= 0.0 {
        return 0.0;
    }

    (current - previous) / previous * 100.0
}

/// Feminicide cases as a percentage of all other cases.
///
/// Feminicide is any occurrence containing `"feminic"` (ignoring case).
/// Returns 0 when there are no other cases.
#[must_use]
pub fn feminicide_rate(records: &[IncidentRecord], year: Option<i32>, state: &StateFilter) -> f64 {
    let in_scope = |r: &IncidentRecord| {
        year.is_none_or(|y| r.year == Some(y)) && state.matches(r.state.as_deref())
    };

    let feminicides = sum_where(records, |r| {
        in_scope(r) && r.mentions_feminicide(ClassificationAxis::Occurrence)
    });
    let others = sum_where(records, |r| {
        in_scope(r) && !r.mentions_feminicide(ClassificationAxis::Occurrence)
    });

    if others <= 0.0 {
        return 0.0;
    }

    feminicides / others * 100.0
}

/// Cases per year in ascending order, optionally restricted to occurrences
/// containing `occurrence` (ignoring case) and to one state.
#[must_use]
pub fn yearly_trend(
    records: &[IncidentRecord],
    occurrence: Option<&str>,
    state: &StateFilter,
) -> Vec<ChartDatum> {
    let needle = occurrence
        .filter(|o| !o.is_empty())
        .map(str::to_lowercase);

    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        let Some(year) = record.year else {
            continue;
        };
        let matches_crime = needle.as_deref().is_none_or(|n| {
            record
                .occurrence_type
                .as_deref()
                .is_some_and(|o| o.to_lowercase().contains(n))
        });
        if matches_crime && state.matches(record.state.as_deref()) {
            *by_year.entry(year).or_default() += record.case_count;
        }
    }

    by_year
        .into_iter()
        .map(|(year, value)| ChartDatum::new(year.to_string(), value))
        .collect()
}

/// Returns the records passing every restricted dimension of `selection`.
///
/// A record passes a dimension when its value is one of the selected
/// values; a record missing the field never passes a restricted dimension.
#[must_use]
pub fn apply_selection(
    records: &[IncidentRecord],
    selection: &FilterSelection,
) -> Vec<IncidentRecord> {
    let restrictions: Vec<_> = selection.iter().collect();
    if restrictions.is_empty() {
        return records.to_vec();
    }

    let filtered: Vec<IncidentRecord> = records
        .iter()
        .filter(|record| {
            restrictions.iter().all(|(dimension, allowed)| {
                record
                    .value_of(dimension.dimension())
                    .is_some_and(|v| allowed.contains(&v))
            })
        })
        .cloned()
        .collect();

    log::debug!(
        "apply_selection: {} of {} records kept",
        filtered.len(),
        records.len()
    );

    filtered
}

/// Distinct years present in `records`, ascending.
#[must_use]
pub fn available_years(records: &[IncidentRecord]) -> Vec<i32> {
    records
        .iter()
        .filter_map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct present values of `dimension` in first-seen order. Absent
/// values are skipped rather than reported as the fallback label.
#[must_use]
pub fn distinct_values(records: &[IncidentRecord], dimension: Dimension) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| r.value_of(dimension))
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
