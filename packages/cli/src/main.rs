#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the violence incidence dashboard.
//!
//! Reads incidents from the collaborator API (or a local JSON file with
//! `--file`), applies the filter flags and prints the requested report as
//! JSON. Without a subcommand it opens an interactive menu.

mod interactive;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use violence_dashboard::Dashboard;
use violence_dashboard_analytics::query::build_filter_query;
use violence_dashboard_analytics_models::{FilterDimension, FilterSelection, PredictionCriteria};
use violence_dashboard_incident_models::Dimension;
use violence_dashboard_source::IncidentSource;
use violence_dashboard_source::client::ApiClient;
use violence_dashboard_source::config::DashboardConfig;
use violence_dashboard_source::memory::StaticSource;

#[derive(Parser)]
#[command(
    name = "violence_dashboard",
    about = "Violence against women incidence dashboard"
)]
struct Cli {
    /// TOML file with collaborator settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read incidents from a JSON array file instead of the API
    #[arg(long)]
    file: Option<PathBuf>,
    /// Fixed prediction used by `simulate` together with `--file`
    #[arg(long)]
    prediction: Option<f64>,
    #[command(flatten)]
    filters: FilterArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Filter flags. Each may be repeated; values of one flag are alternatives.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Age band to include
    #[arg(long = "age")]
    age: Vec<String>,
    /// Ethnicity to include
    #[arg(long)]
    ethnicity: Vec<String>,
    /// Violence type to include
    #[arg(long = "violence-type")]
    violence_type: Vec<String>,
    /// Weapon to include
    #[arg(long)]
    weapon: Vec<String>,
    /// Occurrence type to include
    #[arg(long = "occurrence-filter")]
    occurrence: Vec<String>,
    /// Year to include
    #[arg(long = "year-filter")]
    year: Vec<String>,
}

impl FilterArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection::new()
            .with_values(FilterDimension::AgeGroup, self.age.iter().cloned())
            .with_values(FilterDimension::Ethnicity, self.ethnicity.iter().cloned())
            .with_values(FilterDimension::ViolenceType, self.violence_type.iter().cloned())
            .with_values(FilterDimension::Weapon, self.weapon.iter().cloned())
            .with_values(FilterDimension::OccurrenceType, self.occurrence.iter().cloned())
            .with_values(FilterDimension::Year, self.year.iter().cloned())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the summary statistics
    Summary,
    /// Group cases by a dimension
    Group {
        /// occurrence-type, violence-type, year, age-group, ethnicity,
        /// weapon, state or sex
        #[arg(long, value_parser = parse_dimension)]
        by: Dimension,
        /// Sort groups by descending case count
        #[arg(long)]
        sorted: bool,
    },
    /// Year-over-year change in cases
    Variation {
        /// Year compared with the one before it
        #[arg(long)]
        year: i32,
        /// Only count this exact occurrence type
        #[arg(long)]
        occurrence: Option<String>,
    },
    /// Feminicide cases as a percentage of all other cases
    Rate {
        /// Restrict to one year
        #[arg(long)]
        year: Option<i32>,
        /// State name, or "all"
        #[arg(long, default_value = "all")]
        state: String,
    },
    /// Cases per year
    Trend {
        /// Occurrence substring to match, ignoring case
        #[arg(long)]
        occurrence: Option<String>,
        /// State name, or "all"
        #[arg(long, default_value = "all")]
        state: String,
    },
    /// List the years present in the data
    Years,
    /// Print the query parameters the filter flags translate to
    Query,
    /// Print one incident by identifier
    Show {
        /// Incident identifier
        id: String,
    },
    /// Compare a model prediction with historical cases
    Simulate {
        /// Target year
        #[arg(long)]
        year: Option<i32>,
        /// Occurrence type
        #[arg(long, default_value = "")]
        occurrence: String,
        /// Violence type
        #[arg(long, default_value = "")]
        violence_type: String,
        /// Age band
        #[arg(long, default_value = "")]
        age_group: String,
        /// Ethnicity
        #[arg(long, default_value = "")]
        ethnicity: String,
        /// Weapon
        #[arg(long, default_value = "")]
        weapon: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let selection = cli.filters.selection();

    if let Some(path) = &cli.file {
        let mut source = StaticSource::from_json_file(path)?;
        if let Some(predicted) = cli.prediction {
            source = source.with_prediction(predicted);
        }
        run(Dashboard::new(source), cli.command, selection).await
    } else {
        let config = DashboardConfig::load(cli.config.as_deref())?;
        log::debug!("Using collaborator at {}", config.base_url());
        run(Dashboard::new(ApiClient::new(&config)?), cli.command, selection).await
    }
}

fn parse_dimension(value: &str) -> Result<Dimension, String> {
    value.parse().map_err(|_| {
        let known: Vec<String> = Dimension::all().iter().map(ToString::to_string).collect();
        format!("unknown dimension {value:?}, expected one of: {}", known.join(", "))
    })
}

async fn run<S: IncidentSource>(
    dashboard: Dashboard<S>,
    command: Option<Commands>,
    selection: FilterSelection,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = command else {
        return interactive::run(&dashboard, selection).await;
    };

    let report = match command {
        Commands::Summary => report::Report::Summary,
        Commands::Group { by, sorted } => report::Report::Group { by, sorted },
        Commands::Variation { year, occurrence } => report::Report::Variation { year, occurrence },
        Commands::Rate { year, state } => report::Report::Rate { year, state },
        Commands::Trend { occurrence, state } => report::Report::Trend { occurrence, state },
        Commands::Years => report::Report::Years,
        Commands::Query => return report::print_json(&build_filter_query(&selection)),
        Commands::Show { id } => {
            let record = dashboard.lookup(&id).await?;
            return report::print_json(&record);
        }
        Commands::Simulate {
            year,
            occurrence,
            violence_type,
            age_group,
            ethnicity,
            weapon,
        } => {
            let criteria = PredictionCriteria {
                year,
                occurrence,
                violence_type,
                age_group,
                ethnicity,
                weapon,
            };
            let outcome = dashboard.simulate(&criteria).await?;
            return report::print_json(&outcome);
        }
    };

    dashboard.refresh(&selection).await?;
    report::print(&dashboard, &report)
}
