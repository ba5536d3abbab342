//! Translation of a filter selection into collaborator query parameters.

use violence_dashboard_analytics_models::{FilterQuery, FilterSelection};

/// Which fetch contract to call for a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// Nothing is restricted: fetch the whole collection.
    All,
    /// Fetch server-side filtered rows with these parameters.
    Filtered(FilterQuery),
}

/// Builds the filtered-fetch parameters for `selection`.
///
/// Each restricted dimension's values are comma-joined under its wire name
/// (`faixa_etaria`, `raca`, `tipo_de_violencia`, `arma`, `ocorrencia`,
/// `ano`). Unrestricted dimensions are omitted, never sent empty.
#[must_use]
pub fn build_filter_query(selection: &FilterSelection) -> FilterQuery {
    let mut query = FilterQuery::new();
    for (dimension, values) in selection.iter() {
        query.insert(dimension.param_name(), values.join(","));
    }
    query
}

/// Chooses between the fetch-all and fetch-filtered contracts. The
/// collaborator treats an empty filter query differently from no query,
/// so an empty selection always maps to [`FetchPlan::All`].
#[must_use]
pub fn plan_fetch(selection: &FilterSelection) -> FetchPlan {
    let query = build_filter_query(selection);
    if query.is_empty() {
        FetchPlan::All
    } else {
        FetchPlan::Filtered(query)
    }
}
