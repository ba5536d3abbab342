//! Scalar statistics and the dashboard summary snapshot.
//!
//! The upstream data codes feminicide on two different axes, and two
//! report sections define "violent crimes" differently. Each variant is a
//! separate function here; [`summarize`] picks the ones the overview uses.

use std::collections::{BTreeMap, HashMap};

use violence_dashboard_analytics_models::{
    CriticalPeriod, MostAffectedGroup, RiskAssessment, RiskLevel, SummarySnapshot,
    UNKNOWN_GROUP_LABEL,
};
use violence_dashboard_incident_models::{
    ClassificationAxis, Dimension, FEMINICIDE_LABEL, IncidentRecord,
};

use crate::grouping::{group_by_dimension, sort_descending};

/// Sums case counts of records matching `predicate`.
#[must_use]
pub fn sum_where<P>(records: &[IncidentRecord], predicate: P) -> f64
where
    P: Fn(&IncidentRecord) -> bool,
{
    records
        .iter()
        .filter(|&r| predicate(r))
        .map(|r| r.case_count)
        .sum()
}

/// Sum of every case count.
#[must_use]
pub fn total_cases(records: &[IncidentRecord]) -> f64 {
    sum_where(records, |_| true)
}

/// Cases whose occurrence is exactly `"Feminicídio"`.
#[must_use]
pub fn feminicide_count_exact(records: &[IncidentRecord]) -> f64 {
    sum_where(records, IncidentRecord::is_feminicide_exact)
}

/// Cases whose classification on `axis` contains `"feminic"`, ignoring
/// case.
#[must_use]
pub fn feminicide_count_substring(records: &[IncidentRecord], axis: ClassificationAxis) -> f64 {
    sum_where(records, |r| r.mentions_feminicide(axis))
}

/// Cases classified as rape, sexual harassment or sexual importuning.
#[must_use]
pub fn sexual_crime_count(records: &[IncidentRecord]) -> f64 {
    sum_where(records, IncidentRecord::is_sexual_crime)
}

/// Total minus the violence-type feminicide count.
#[must_use]
pub fn violent_count_remainder(records: &[IncidentRecord]) -> f64 {
    total_cases(records) - feminicide_count_substring(records, ClassificationAxis::ViolenceType)
}

/// Cases whose violence type is not exactly feminicide (ignoring case).
/// Records without a violence type are counted.
#[must_use]
pub fn violent_count_excluding_label(records: &[IncidentRecord]) -> f64 {
    let label = FEMINICIDE_LABEL.to_lowercase();
    sum_where(records, |r| {
        r.violence_type
            .as_deref()
            .is_none_or(|v| v.to_lowercase() != label)
    })
}

/// Returns the label of the largest group for `dimension`, or
/// `"Desconhecida"` when there are no records. Ties go to the
/// lexicographically smallest label.
#[must_use]
pub fn most_affected_label(records: &[IncidentRecord], dimension: Dimension) -> String {
    sort_descending(group_by_dimension(records, dimension))
        .into_iter()
        .next()
        .map_or_else(|| UNKNOWN_GROUP_LABEL.to_string(), |d| d.name)
}

/// Finds the age band and ethnicity pair with the most female victims.
#[must_use]
pub fn most_affected_group(records: &[IncidentRecord]) -> MostAffectedGroup {
    female_demographic_totals(records)
        .into_iter()
        .max_by(|((a_age, a_eth), a), ((b_age, b_eth), b)| {
            a.total_cmp(b)
                .then_with(|| (b_age, b_eth).cmp(&(a_age, a_eth)))
        })
        .map(|((age_group, ethnicity), cases)| MostAffectedGroup {
            age_group,
            ethnicity,
            cases,
        })
        .unwrap_or_default()
}

/// Finds the year with the most cases. Records without a year are
/// ignored; ties go to the earliest year.
#[must_use]
pub fn critical_period(records: &[IncidentRecord]) -> CriticalPeriod {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        if let Some(year) = record.year {
            *by_year.entry(year).or_default() += record.case_count;
        }
    }

    let mut peak = CriticalPeriod::default();
    for (year, cases) in by_year {
        if peak.year.is_none() || cases > peak.cases {
            peak = CriticalPeriod {
                year: Some(year),
                cases,
            };
        }
    }
    peak
}

/// Risk score of the female demographic distribution.
///
/// The score is the largest group divided by itself, times 100: exactly
/// 100 whenever a group has cases, 0 otherwise.
#[must_use]
pub fn risk_assessment(records: &[IncidentRecord]) -> RiskAssessment {
    let max = female_demographic_totals(records)
        .into_values()
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    let score = match max {
        Some(max) if max > 0.0 => max / max * 100.0,
        _ => 0.0,
    };

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
    }
}

/// Computes the full summary snapshot of `records`.
#[must_use]
pub fn summarize(records: &[IncidentRecord]) -> SummarySnapshot {
    log::debug!("summarize: {} records", records.len());

    let period = critical_period(records);
    let risk = risk_assessment(records);

    SummarySnapshot {
        total_crimes: total_cases(records),
        feminicides: feminicide_count_substring(records, ClassificationAxis::ViolenceType),
        violent_crimes: violent_count_excluding_label(records),
        sexual_crimes: sexual_crime_count(records),
        most_affected_age: most_affected_label(records, Dimension::AgeGroup),
        most_affected_ethnicity: most_affected_label(records, Dimension::Ethnicity),
        most_affected_group: most_affected_group(records),
        peak_year: period.year,
        peak_cases: period.cases,
        risk_score: risk.score,
        risk_level: risk.level,
    }
}

/// Sums female victims' cases by `(age band, ethnicity)`.
fn female_demographic_totals(records: &[IncidentRecord]) -> HashMap<(String, String), f64> {
    let mut grouped: HashMap<(String, String), f64> = HashMap::new();
    for record in records.iter().filter(|r| r.is_female()) {
        let key = (
            record
                .text_of(Dimension::AgeGroup)
                .unwrap_or(UNKNOWN_GROUP_LABEL)
                .to_string(),
            record
                .text_of(Dimension::Ethnicity)
                .unwrap_or(UNKNOWN_GROUP_LABEL)
                .to_string(),
        );
        *grouped.entry(key).or_default() += record.case_count;
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn woman(age: &str, ethnicity: &str, count: f64) -> IncidentRecord {
        IncidentRecord {
            sex: Some("Mulher".to_string()),
            age_group: Some(age.to_string()),
            ethnicity: Some(ethnicity.to_string()),
            case_count: count,
            ..IncidentRecord::default()
        }
    }

    fn classified(occurrence: &str, violence: Option<&str>, count: f64) -> IncidentRecord {
        IncidentRecord {
            occurrence_type: Some(occurrence.to_string()),
            violence_type: violence.map(str::to_string),
            case_count: count,
            ..IncidentRecord::default()
        }
    }

    #[test]
    fn empty_snapshot_uses_fallbacks() {
        let snapshot = summarize(&[]);
        assert!(snapshot.total_crimes.abs() < f64::EPSILON);
        assert_eq!(snapshot.most_affected_age, "Desconhecida");
        assert_eq!(snapshot.most_affected_ethnicity, "Desconhecida");
        assert_eq!(snapshot.most_affected_group, MostAffectedGroup::default());
        assert_eq!(snapshot.peak_year, None);
        assert!(snapshot.risk_score.abs() < f64::EPSILON);
        assert_eq!(snapshot.risk_level, RiskLevel::Low);
    }

    #[test]
    fn total_matches_sum_of_case_counts() {
        let records = vec![
            classified("Estupro", None, 5.0),
            classified("Feminicídio", Some("Feminicídio"), 10.0),
            woman("18-25", "Preta", 2.5),
        ];
        assert!((summarize(&records).total_crimes - 17.5).abs() < f64::EPSILON);
    }

    #[test]
    fn feminicide_variants_read_different_axes() {
        let records = vec![
            classified("Feminicídio", Some("Homicídio"), 4.0),
            classified("Homicídio", Some("feminicídio"), 6.0),
            classified("Feminicidio tentado", None, 1.0),
        ];
        assert!((feminicide_count_exact(&records) - 4.0).abs() < f64::EPSILON);
        assert!(
            (feminicide_count_substring(&records, ClassificationAxis::Occurrence) - 5.0).abs()
                < f64::EPSILON
        );
        assert!(
            (feminicide_count_substring(&records, ClassificationAxis::ViolenceType) - 6.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn violent_definitions_differ_on_partial_labels() {
        let records = vec![
            classified("Homicídio", Some("Feminicídio"), 3.0),
            classified("Homicídio", Some("Feminicídio tentado"), 2.0),
            classified("Lesão Corporal", None, 7.0),
        ];
        assert!((violent_count_remainder(&records) - 7.0).abs() < f64::EPSILON);
        assert!((violent_count_excluding_label(&records) - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sexual_crimes_use_fixed_label_set() {
        let records = vec![
            classified("Estupro", None, 3.0),
            classified("Assédio Sexual", None, 2.0),
            classified("Importunação Sexual", None, 1.0),
            classified("estupro", None, 100.0),
        ];
        assert!((sexual_crime_count(&records) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn most_affected_group_only_counts_women() {
        let mut man = woman("46-55", "Branca", 50.0);
        man.sex = Some("Homem".to_string());
        let records = vec![
            woman("26-35", "Parda", 10.0),
            woman("26-35", "Parda", 5.0),
            woman("18-25", "Preta", 12.0),
            man,
        ];
        let group = most_affected_group(&records);
        assert_eq!(group.age_group, "26-35");
        assert_eq!(group.ethnicity, "Parda");
        assert!((group.cases - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn most_affected_group_ties_pick_smallest_pair() {
        let records = vec![woman("36-45", "Preta", 4.0), woman("18-25", "Parda", 4.0)];
        let group = most_affected_group(&records);
        assert_eq!(group.age_group, "18-25");
    }

    #[test]
    fn most_affected_group_defaults_when_no_women() {
        let records = vec![classified("Estupro", None, 5.0)];
        assert_eq!(most_affected_group(&records), MostAffectedGroup::default());
    }

    #[test]
    fn critical_period_ties_pick_lowest_year() {
        let records = vec![
            IncidentRecord {
                year: Some(2022),
                case_count: 9.0,
                ..IncidentRecord::default()
            },
            IncidentRecord {
                year: Some(2020),
                case_count: 9.0,
                ..IncidentRecord::default()
            },
            IncidentRecord {
                year: None,
                case_count: 40.0,
                ..IncidentRecord::default()
            },
        ];
        let period = critical_period(&records);
        assert_eq!(period.year, Some(2020));
        assert!((period.cases - 9.0).abs() < f64::EPSILON);
        assert_eq!(period.label(), "2020");
        assert_eq!(critical_period(&[]).label(), "Desconhecido");
    }

    #[test]
    fn risk_score_is_full_whenever_a_female_group_exists() {
        let risk = risk_assessment(&[woman("26-35", "Parda", 1.0), woman("56+", "Branca", 30.0)]);
        assert!((risk.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(risk.level, RiskLevel::High);
    }

    #[test]
    fn risk_score_is_zero_for_zero_mass() {
        let risk = risk_assessment(&[woman("26-35", "Parda", 0.0)]);
        assert!(risk.score.abs() < f64::EPSILON);
        assert_eq!(risk.level, RiskLevel::Low);
    }

    #[test]
    fn most_affected_label_ranks_by_value() {
        let records = vec![
            woman("18-25", "Parda", 3.0),
            woman("26-35", "Preta", 8.0),
            woman("18-25", "Preta", 1.0),
        ];
        assert_eq!(most_affected_label(&records, Dimension::AgeGroup), "26-35");
        assert_eq!(most_affected_label(&records, Dimension::Ethnicity), "Preta");
    }
}
