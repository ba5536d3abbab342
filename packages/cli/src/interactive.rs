//! Interactive menu for exploring the dashboard.
//!
//! Provides a menu-driven interface using `dialoguer`: pick filters with
//! checkboxes, then any report, repeatedly until quitting.

use std::collections::BTreeMap;

use dialoguer::{Input, MultiSelect, Select};
use violence_dashboard::Dashboard;
use violence_dashboard_analytics_models::{FilterDimension, FilterSelection, PredictionCriteria};
use violence_dashboard_incident_models::Dimension;
use violence_dashboard_source::IncidentSource;

use crate::report::{self, Report};

/// Top-level actions available in the interactive menu.
enum Action {
    Summary,
    Group,
    Trend,
    Variation,
    Rate,
    Filters,
    Simulate,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Summary,
        Self::Group,
        Self::Trend,
        Self::Variation,
        Self::Rate,
        Self::Filters,
        Self::Simulate,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Summary => "Summary statistics",
            Self::Group => "Cases by dimension",
            Self::Trend => "Yearly trend",
            Self::Variation => "Year-over-year variation",
            Self::Rate => "Feminicide rate",
            Self::Filters => "Change filters",
            Self::Simulate => "Simulate a scenario",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive menu loop, starting from `selection`.
///
/// # Errors
///
/// Returns an error if a prompt fails or the initial fetch fails.
pub async fn run<S: IncidentSource>(
    dashboard: &Dashboard<S>,
    mut selection: FilterSelection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Option lists always come from the unfiltered collection.
    dashboard.refresh(&FilterSelection::new()).await?;
    let catalog = option_catalog(dashboard);
    if !selection.is_empty() {
        dashboard.refresh(&selection).await?;
    }

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!(
            "{} records loaded, {} filter(s) active",
            dashboard.records().len(),
            selection.iter().count()
        );

        let idx = Select::new()
            .with_prompt("What would you like to see?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Summary => report::print(dashboard, &Report::Summary)?,
            Action::Group => {
                let dimensions = Dimension::all();
                let names: Vec<String> = dimensions.iter().map(ToString::to_string).collect();
                let choice = Select::new()
                    .with_prompt("Group by")
                    .items(&names)
                    .default(0)
                    .interact()?;
                report::print(
                    dashboard,
                    &Report::Group {
                        by: dimensions[choice],
                        sorted: true,
                    },
                )?;
            }
            Action::Trend => {
                let occurrence = prompt_optional_text("Occurrence contains (empty for all)")?;
                let state = prompt_state()?;
                report::print(dashboard, &Report::Trend { occurrence, state })?;
            }
            Action::Variation => {
                let Some(year) = pick_year(dashboard)? else {
                    continue;
                };
                let occurrence = prompt_optional_text("Exact occurrence (empty for all)")?;
                report::print(dashboard, &Report::Variation { year, occurrence })?;
            }
            Action::Rate => {
                let year = prompt_optional_i32("Year (empty for all)")?;
                let state = prompt_state()?;
                report::print(dashboard, &Report::Rate { year, state })?;
            }
            Action::Filters => {
                selection = choose_filters(&catalog, selection)?;
                if let Err(e) = dashboard.refresh(&selection).await {
                    log::error!("Keeping previous records: {e}");
                }
            }
            Action::Simulate => {
                let criteria = simulation_form(&catalog)?;
                match dashboard.simulate(&criteria).await {
                    Ok(outcome) => report::print_json(&outcome)?,
                    Err(e) => println!("{e}"),
                }
            }
            Action::Quit => return Ok(()),
        }
    }
}

fn option_catalog<S: IncidentSource>(
    dashboard: &Dashboard<S>,
) -> BTreeMap<FilterDimension, Vec<String>> {
    FilterDimension::all()
        .iter()
        .map(|&dimension| {
            let options = if dimension == FilterDimension::Year {
                dashboard
                    .available_years()
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            } else {
                let mut values = dashboard.options(dimension.dimension());
                values.sort();
                values
            };
            (dimension, options)
        })
        .collect()
}

/// Prompts one checkbox list per dimension, pre-checked with the current
/// selection.
fn choose_filters(
    catalog: &BTreeMap<FilterDimension, Vec<String>>,
    mut selection: FilterSelection,
) -> Result<FilterSelection, Box<dyn std::error::Error>> {
    for (&dimension, options) in catalog {
        if options.is_empty() {
            continue;
        }
        let checked: Vec<bool> = options
            .iter()
            .map(|o| selection.values(dimension).contains(o))
            .collect();

        let picked = MultiSelect::new()
            .with_prompt(format!("{dimension} (space=toggle, enter=confirm)"))
            .items(options)
            .defaults(&checked)
            .max_length(15)
            .interact()?;

        for (i, option) in options.iter().enumerate() {
            selection = selection.toggle(dimension, option, picked.contains(&i));
        }
    }
    Ok(selection)
}

fn simulation_form(
    catalog: &BTreeMap<FilterDimension, Vec<String>>,
) -> Result<PredictionCriteria, Box<dyn std::error::Error>> {
    let pick = |dimension: FilterDimension| -> Result<String, Box<dyn std::error::Error>> {
        let options = catalog.get(&dimension).map_or(&[][..], Vec::as_slice);
        if options.is_empty() {
            return Ok(Input::new()
                .with_prompt(dimension.param_name())
                .allow_empty(true)
                .interact_text()?);
        }
        let idx = Select::new()
            .with_prompt(dimension.param_name())
            .items(options)
            .default(0)
            .interact()?;
        Ok(options[idx].clone())
    };

    Ok(PredictionCriteria {
        year: prompt_optional_i32("Target year")?,
        occurrence: pick(FilterDimension::OccurrenceType)?,
        violence_type: pick(FilterDimension::ViolenceType)?,
        age_group: pick(FilterDimension::AgeGroup)?,
        ethnicity: pick(FilterDimension::Ethnicity)?,
        weapon: pick(FilterDimension::Weapon)?,
    })
}

fn pick_year<S: IncidentSource>(
    dashboard: &Dashboard<S>,
) -> Result<Option<i32>, Box<dyn std::error::Error>> {
    let years = dashboard.available_years();
    if years.is_empty() {
        println!("No years in the current data.");
        return Ok(None);
    }
    let labels: Vec<String> = years.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("Year")
        .items(&labels)
        .default(labels.len() - 1)
        .interact()?;
    Ok(Some(years[idx]))
}

fn prompt_state() -> Result<String, Box<dyn std::error::Error>> {
    Ok(Input::new()
        .with_prompt("State (\"all\" for every state)")
        .default("all".to_string())
        .interact_text()?)
}

fn prompt_optional_text(prompt: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let trimmed = input.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn prompt_optional_i32(prompt: &str) -> Result<Option<i32>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.trim().parse()?))
    }
}
