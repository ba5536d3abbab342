//! Report rendering as pretty-printed JSON.

use serde::Serialize;
use violence_dashboard::Dashboard;
use violence_dashboard_analytics::grouping::sort_descending;
use violence_dashboard_analytics_models::StateFilter;
use violence_dashboard_incident_models::Dimension;
use violence_dashboard_source::IncidentSource;

/// A view over the dashboard's current records.
pub enum Report {
    Summary,
    Group {
        by: Dimension,
        sorted: bool,
    },
    Variation {
        year: i32,
        occurrence: Option<String>,
    },
    Rate {
        year: Option<i32>,
        state: String,
    },
    Trend {
        occurrence: Option<String>,
        state: String,
    },
    Years,
}

/// Prints `value` as indented JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Computes `report` over the current records and prints it.
pub fn print<S: IncidentSource>(
    dashboard: &Dashboard<S>,
    report: &Report,
) -> Result<(), Box<dyn std::error::Error>> {
    match report {
        Report::Summary => print_json(&dashboard.snapshot()),
        Report::Group { by, sorted } => {
            let groups = dashboard.group(*by);
            print_json(&if *sorted { sort_descending(groups) } else { groups })
        }
        Report::Variation { year, occurrence } => print_json(&serde_json::json!({
            "year": year,
            "occurrence": occurrence,
            "variationPercent": dashboard.variation(*year, occurrence.as_deref()),
        })),
        Report::Rate { year, state } => print_json(&serde_json::json!({
            "year": year,
            "state": state,
            "feminicideRatePercent": dashboard.feminicide_rate(*year, &StateFilter::parse(state)),
        })),
        Report::Trend { occurrence, state } => {
            print_json(&dashboard.trend(occurrence.as_deref(), &StateFilter::parse(state)))
        }
        Report::Years => print_json(&dashboard.available_years()),
    }
}
