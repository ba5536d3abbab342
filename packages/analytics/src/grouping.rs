//! Group-by-key primitive and its per-dimension specializations.
//!
//! Grouping never drops a record: absent keys land in the dimension's
//! fallback bucket, so the summed values of any grouping equal the total
//! case count of the input.

use std::collections::{BTreeMap, HashMap};

use violence_dashboard_analytics_models::ChartDatum;
use violence_dashboard_incident_models::{Dimension, IncidentRecord};

/// Hue step between consecutive occurrence groups.
const OCCURRENCE_HUE_STEP: usize = 40;

/// Hue step between consecutive violence type groups.
const VIOLENCE_TYPE_HUE_STEP: usize = 50;

/// Groups `records` by the key `extract` returns, summing case counts.
///
/// Absent or empty keys are grouped under `fallback`. Output follows the
/// order in which each key was first seen.
pub fn group_by<F>(records: &[IncidentRecord], extract: F, fallback: &str) -> Vec<ChartDatum>
where
    F: Fn(&IncidentRecord) -> Option<String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ChartDatum> = Vec::new();

    for record in records {
        let key = extract(record)
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        if let Some(&i) = index.get(&key) {
            groups[i].value += record.case_count;
        } else {
            index.insert(key.clone(), groups.len());
            groups.push(ChartDatum::new(key, record.case_count));
        }
    }

    groups
}

/// Groups by any [`Dimension`]. Years are sorted ascending; every other
/// dimension keeps first-seen order.
#[must_use]
pub fn group_by_dimension(records: &[IncidentRecord], dimension: Dimension) -> Vec<ChartDatum> {
    match dimension {
        Dimension::Year => group_by_year(records),
        Dimension::OccurrenceType => group_by_occurrence(records),
        Dimension::ViolenceType => group_by_violence_type(records),
        _ => group_by(
            records,
            |r| r.value_of(dimension),
            dimension.fallback_label(),
        ),
    }
}

/// Groups by occurrence type, coloring each group.
#[must_use]
pub fn group_by_occurrence(records: &[IncidentRecord]) -> Vec<ChartDatum> {
    let dimension = Dimension::OccurrenceType;
    colorize(
        group_by(records, |r| r.value_of(dimension), dimension.fallback_label()),
        OCCURRENCE_HUE_STEP,
    )
}

/// Groups by violence type, coloring each group.
#[must_use]
pub fn group_by_violence_type(records: &[IncidentRecord]) -> Vec<ChartDatum> {
    let dimension = Dimension::ViolenceType;
    colorize(
        group_by(records, |r| r.value_of(dimension), dimension.fallback_label()),
        VIOLENCE_TYPE_HUE_STEP,
    )
}

/// Groups by year in ascending numeric order. Records without a year are
/// summed into a trailing `"Desconhecido"` bucket.
#[must_use]
pub fn group_by_year(records: &[IncidentRecord]) -> Vec<ChartDatum> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    let mut unknown: Option<f64> = None;

    for record in records {
        match record.year {
            Some(year) => *by_year.entry(year).or_default() += record.case_count,
            None => *unknown.get_or_insert(0.0) += record.case_count,
        }
    }

    by_year
        .into_iter()
        .map(|(year, value)| ChartDatum::new(year.to_string(), value))
        .chain(unknown.map(|value| ChartDatum::new(Dimension::Year.fallback_label(), value)))
        .collect()
}

/// Groups by victim age band.
#[must_use]
pub fn group_by_age_group(records: &[IncidentRecord]) -> Vec<ChartDatum> {
    group_by_dimension(records, Dimension::AgeGroup)
}

/// Groups by victim ethnicity.
#[must_use]
pub fn group_by_ethnicity(records: &[IncidentRecord]) -> Vec<ChartDatum> {
    group_by_dimension(records, Dimension::Ethnicity)
}

/// Groups by weapon.
#[must_use]
pub fn group_by_weapon(records: &[IncidentRecord]) -> Vec<ChartDatum> {
    group_by_dimension(records, Dimension::Weapon)
}

/// Groups by state.
#[must_use]
pub fn group_by_state(records: &[IncidentRecord]) -> Vec<ChartDatum> {
    group_by_dimension(records, Dimension::State)
}

/// Sorts descending by value. Equal values are ordered by name so the
/// first entry is deterministic.
#[must_use]
pub fn sort_descending(mut data: Vec<ChartDatum>) -> Vec<ChartDatum> {
    data.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    data
}

fn colorize(mut data: Vec<ChartDatum>, hue_step: usize) -> Vec<ChartDatum> {
    for (i, datum) in data.iter_mut().enumerate() {
        datum.color = Some(format!("hsl({} 70% 50%)", (i * hue_step) % 360));
    }
    data
}
