// Builds the choropleth figures, in the JSON format understood by plotly.js.

use geojson::{FeatureCollection, JsonObject};
use log::{debug, warn};
use serde_json::json;

use crate::dashboard::geometry::GeometryIndex;
use crate::dashboard::*;

pub const COLOR_RANGE: (f64, f64) = (0.0, 100.0);
pub const COLORBAR_TITLE: &str = "Endemicity by %";
pub const HOVER_TEMPLATE: &str = "<b>%{location}</b><br>Endemicity: %{z:.2f}%";
pub const NO_DATA_MESSAGE: &str = "No renderable data";

// The sequential Plasma color scale.
const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

/// What the calculator produced for one species.
#[derive(PartialEq, Debug, Clone)]
pub enum MapData {
    Entries(Vec<EndemicityEntry>),
    /// The species has no range to split between countries.
    NoData,
}

pub fn species_map(dataset: &Dataset, species: &str, threshold: f64) -> MapData {
    match compute(dataset, species, threshold) {
        Ok(entries) => MapData::Entries(entries),
        Err(EndemicityErrors::NoData { .. }) => MapData::NoData,
        Err(e) => {
            warn!("species_map: {:?}: {}", species, e);
            MapData::NoData
        }
    }
}

fn colorscale() -> JSValue {
    let steps = (PLASMA.len() - 1) as f64;
    JSValue::Array(
        PLASMA
            .iter()
            .enumerate()
            .map(|(i, c)| json!([i as f64 / steps, c]))
            .collect(),
    )
}

fn layout(annotation: Option<String>) -> JSValue {
    let mut layout = json!({
        "geo": {
            "showcountries": true,
            "countrycolor": "black",
            "showframe": false,
            "showcoastlines": false,
            "projection": {"type": "equirectangular"}
        },
        "margin": {"l": 0, "r": 0, "t": 0, "b": 0}
    });
    if let Some(text) = annotation {
        layout["annotations"] = json!([{
            "text": text,
            "showarrow": false,
            "xref": "paper",
            "yref": "paper",
            "x": 0.5,
            "y": 0.5
        }]);
    }
    layout
}

/// The choropleth of the given entries.
///
/// The entries without geometry are dropped, so that every location of the figure can be drawn.
pub fn build_figure(species: &str, entries: &[EndemicityEntry], geometry: &GeometryIndex) -> JSValue {
    let mut locations: Vec<&str> = Vec::new();
    let mut z: Vec<f64> = Vec::new();
    let mut features = Vec::new();
    for entry in entries.iter() {
        match geometry.feature(&entry.country) {
            Some(f) => {
                locations.push(entry.country.as_str());
                z.push(entry.value);
                features.push(f.clone());
            }
            None => warn!("No geometry for {:?}, it will not be drawn", entry.country),
        }
    }
    debug!(
        "build_figure: {:?}: {} of {} entries drawn",
        species,
        locations.len(),
        entries.len()
    );

    let fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    json!({
        "data": [{
            "type": "choropleth",
            "name": species,
            "geojson": JSValue::Object(JsonObject::from(&fc)),
            "featureidkey": "properties.name",
            "locations": locations,
            "z": z,
            "zmin": COLOR_RANGE.0,
            "zmax": COLOR_RANGE.1,
            "colorscale": colorscale(),
            "colorbar": {"title": {"text": COLORBAR_TITLE}},
            "hovertemplate": HOVER_TEMPLATE
        }],
        "layout": layout(None)
    })
}

/// An empty map with a message in the middle.
pub fn no_data_figure(species: &str) -> JSValue {
    let mut fig = build_figure(species, &[], &GeometryIndex::default());
    fig["layout"] = layout(Some(format!("{} for {}", NO_DATA_MESSAGE, species)));
    fig
}

/// Runs the calculator for a species and turns the outcome into a figure.
///
/// This never fails: a species without data gives an empty map.
pub fn build_species_figure(
    dataset: &Dataset,
    geometry: &GeometryIndex,
    species: &str,
    threshold: f64,
) -> JSValue {
    match species_map(dataset, species, threshold) {
        MapData::Entries(entries) => build_figure(species, &entries, geometry),
        MapData::NoData => no_data_figure(species),
    }
}
