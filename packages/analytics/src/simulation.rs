//! Scenario simulation: combines a model prediction with the historical
//! case total for the same criteria.

use violence_dashboard_analytics_models::{
    ChartDatum, Comparison, FilterQuery, PredictionCriteria, RiskLevel, SimulationOutcome,
};
use violence_dashboard_incident_models::{Dimension, IncidentRecord};

use crate::AnalyticsError;
use crate::summary::total_cases;

/// Chart label of the simulated slice.
pub const SIMULATED_LABEL: &str = "Cenário Simulado";

/// Chart label of the remaining historical slice.
pub const REMAINING_LABEL: &str = "Casos Restantes";

/// Rejects criteria with any empty field, naming every missing wire key.
///
/// # Errors
///
/// Returns [`AnalyticsError::Validation`] if any field is empty.
pub fn validate_criteria(criteria: &PredictionCriteria) -> Result<(), AnalyticsError> {
    let mut missing = Vec::new();

    if criteria.year.is_none() {
        missing.push(Dimension::Year.wire_key());
    }
    for (dimension, value) in text_fields(criteria) {
        if value.trim().is_empty() {
            missing.push(dimension.wire_key());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalyticsError::Validation { missing })
    }
}

/// Builds the filtered-fetch parameters that select the historical rows
/// matching `criteria`. Values are trimmed the same way validation trims
/// them.
#[must_use]
pub fn criteria_query(criteria: &PredictionCriteria) -> FilterQuery {
    let mut query = FilterQuery::new();
    if let Some(year) = criteria.year {
        query.insert(Dimension::Year.wire_key(), year.to_string());
    }
    for (dimension, value) in text_fields(criteria) {
        let value = value.trim();
        if !value.is_empty() {
            query.insert(dimension.wire_key(), value);
        }
    }
    query
}

/// Compares `predicted_cases` with the case total of `historical`.
///
/// The impact percentage is `predicted / base * 100`, 0 when the base is
/// 0. The scenario is above average only when the prediction strictly
/// exceeds the base.
#[must_use]
pub fn simulate(predicted_cases: f64, historical: &[IncidentRecord]) -> SimulationOutcome {
    let base = total_cases(historical);
    let impact = if base > 0.0 {
        predicted_cases / base * 100.0
    } else {
        0.0
    };

    let comparison = if predicted_cases > base {
        Comparison::AboveAverage
    } else {
        Comparison::BelowAverage
    };

    log::debug!("simulate: predicted={predicted_cases} base={base} impact={impact:.1}%");

    SimulationOutcome {
        predicted_cases,
        historical_base_rate: base,
        impact_percentage: impact,
        risk_level: RiskLevel::from_impact(impact),
        comparison,
        chart: vec![
            ChartDatum::new(SIMULATED_LABEL, predicted_cases),
            ChartDatum::new(REMAINING_LABEL, (base - predicted_cases).max(0.0)),
        ],
    }
}

fn text_fields(criteria: &PredictionCriteria) -> [(Dimension, &str); 5] {
    [
        (Dimension::OccurrenceType, criteria.occurrence.as_str()),
        (Dimension::ViolenceType, criteria.violence_type.as_str()),
        (Dimension::AgeGroup, criteria.age_group.as_str()),
        (Dimension::Ethnicity, criteria.ethnicity.as_str()),
        (Dimension::Weapon, criteria.weapon.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PredictionCriteria {
        PredictionCriteria {
            year: Some(2024),
            occurrence: "Feminicídio".to_string(),
            violence_type: "Física".to_string(),
            age_group: "26-35".to_string(),
            ethnicity: "Parda".to_string(),
            weapon: "Arma de Fogo".to_string(),
        }
    }

    fn history(counts: &[f64]) -> Vec<IncidentRecord> {
        counts
            .iter()
            .map(|&case_count| IncidentRecord {
                case_count,
                ..IncidentRecord::default()
            })
            .collect()
    }

    #[test]
    fn complete_criteria_validate() {
        assert!(validate_criteria(&complete()).is_ok());
    }

    #[test]
    fn incomplete_criteria_name_missing_fields() {
        let criteria = PredictionCriteria {
            year: None,
            weapon: "  ".to_string(),
            ..complete()
        };
        let Err(AnalyticsError::Validation { missing }) = validate_criteria(&criteria) else {
            panic!("expected a validation error");
        };
        assert_eq!(missing, ["ano", "arma"]);
    }

    #[test]
    fn criteria_query_uses_wire_keys() {
        let query = criteria_query(&complete());
        assert_eq!(query.len(), 6);
        assert_eq!(query.get("ano"), Some("2024"));
        assert_eq!(query.get("faixa_etaria"), Some("26-35"));
        assert_eq!(query.get("tipo_de_violencia"), Some("Física"));
    }

    #[test]
    fn criteria_query_trims_padded_values() {
        let criteria = PredictionCriteria {
            ethnicity: " Parda ".to_string(),
            weapon: "   ".to_string(),
            ..complete()
        };
        let query = criteria_query(&criteria);
        assert_eq!(query.get("raca"), Some("Parda"));
        assert_eq!(query.get("arma"), None);
    }

    #[test]
    fn impact_above_base_is_high_risk() {
        let outcome = simulate(150.0, &history(&[60.0, 40.0]));
        assert!((outcome.historical_base_rate - 100.0).abs() < f64::EPSILON);
        assert!((outcome.impact_percentage - 150.0).abs() < 1e-9);
        assert_eq!(outcome.risk_level, RiskLevel::High);
        assert_eq!(outcome.comparison, Comparison::AboveAverage);
        assert!(outcome.chart[1].value.abs() < f64::EPSILON);
    }

    #[test]
    fn impact_bands() {
        let outcome = simulate(90.0, &history(&[100.0]));
        assert_eq!(outcome.risk_level, RiskLevel::Medium);
        assert_eq!(outcome.comparison, Comparison::BelowAverage);
        assert!((outcome.chart[1].value - 10.0).abs() < 1e-9);

        let outcome = simulate(10.0, &history(&[100.0]));
        assert_eq!(outcome.risk_level, RiskLevel::Low);
    }

    #[test]
    fn zero_base_yields_zero_impact() {
        let outcome = simulate(25.0, &[]);
        assert!(outcome.impact_percentage.abs() < f64::EPSILON);
        assert_eq!(outcome.risk_level, RiskLevel::Low);
        assert_eq!(outcome.comparison, Comparison::AboveAverage);
        assert_eq!(outcome.chart[0].name, SIMULATED_LABEL);
    }
}
