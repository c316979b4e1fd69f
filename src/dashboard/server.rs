use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::dashboard::figure::{build_species_figure, species_map, MapData};
use crate::dashboard::*;

pub type AppState = Arc<Loaded>;

#[derive(Deserialize, Debug, Default)]
pub struct SpeciesQuery {
    pub species: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct SpeciesList {
    pub species: Vec<String>,
    pub default: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct EntryJs {
    pub country: String,
    pub value: f64,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct EndemicityJs {
    pub species: String,
    pub threshold: f64,
    pub entries: Vec<EntryJs>,
    pub no_data: bool,
}

const PAGE_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
    <style>
      body { font-family: "Open Sans", verdana, arial, sans-serif; margin: 16px; }
      #species-dropdown { width: 50%; padding: 4px; font-size: 14px; }
      #world-map { height: 780px; }
    </style>
  </head>
  <body>
    <h1>{title}</h1>
    <select id="species-dropdown">
{options}
    </select>
    <div id="world-map"></div>
    <div id="threshold-label"></div>
    <script>
      const dropdown = document.getElementById("species-dropdown");
      async function updateMap() {
        const url = "figure?species=" + encodeURIComponent(dropdown.value);
        try {
          const response = await fetch(url);
          if (!response.ok) {
            throw new Error("HTTP " + response.status);
          }
          const fig = await response.json();
          Plotly.react("world-map", fig.data, fig.layout, {responsive: true});
        } catch (err) {
          console.error("Failed to load the map of " + dropdown.value, err);
          Plotly.purge("world-map");
        }
      }
      dropdown.addEventListener("change", updateMap);
      updateMap();
    </script>
  </body>
</html>
"##;

fn escape_html(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }
    res
}

pub fn render_page(title: &str, species: &[String], default: Option<&str>) -> String {
    let options: Vec<String> = species
        .iter()
        .map(|s| {
            let selected = if Some(s.as_str()) == default {
                " selected"
            } else {
                ""
            };
            format!(
                "      <option value=\"{0}\"{1}>{0}</option>",
                escape_html(s),
                selected
            )
        })
        .collect();
    PAGE_TEMPLATE
        .replace("{title}", &escape_html(title))
        .replace("{options}", &options.join("\n"))
}

fn selected_species(loaded: &Loaded, q: SpeciesQuery) -> String {
    q.species
        .or_else(|| loaded.dataset.default_species().map(|s| s.to_string()))
        .unwrap_or_default()
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(
        &state.settings.title,
        &state.dataset.species(),
        state.dataset.default_species(),
    ))
}

pub async fn species(State(state): State<AppState>) -> Json<SpeciesList> {
    Json(SpeciesList {
        species: state.dataset.species(),
        default: state.dataset.default_species().map(|s| s.to_string()),
    })
}

pub async fn figure(
    State(state): State<AppState>,
    Query(q): Query<SpeciesQuery>,
) -> Json<JSValue> {
    let species = selected_species(&state, q);
    debug!("figure: {:?}", species);
    Json(build_species_figure(
        &state.dataset,
        &state.geometry,
        &species,
        state.settings.threshold,
    ))
}

pub async fn endemicity(
    State(state): State<AppState>,
    Query(q): Query<SpeciesQuery>,
) -> Json<EndemicityJs> {
    let species = selected_species(&state, q);
    let threshold = state.settings.threshold;
    let (entries, no_data) = match species_map(&state.dataset, &species, threshold) {
        MapData::Entries(entries) => (entries, false),
        MapData::NoData => (Vec::new(), true),
    };
    Json(EndemicityJs {
        species,
        threshold,
        entries: entries
            .into_iter()
            .map(|e| EntryJs {
                country: e.country,
                value: e.value,
            })
            .collect(),
        no_data,
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/species", get(species))
        .route("/figure", get(figure))
        .route("/endemicity", get(endemicity))
        .with_state(state)
}

/// Serves the dashboard until the process is stopped.
pub async fn serve(state: AppState) -> DashboardResult<()> {
    let address = state.settings.bind_address.clone();
    let listener = tokio::net::TcpListener::bind(address.as_str())
        .await
        .context(BindSnafu { address: address.clone() })?;
    info!("Serving the dashboard on http://{}", address);
    axum::serve(listener, router(state))
        .await
        .context(ServeSnafu {})
}
