use log::{info, warn};

use endemicity::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value as JSValue;

use crate::args::Args;

pub mod config_reader;
pub mod figure;
pub mod geometry;
pub mod io_csv;
pub mod server;

use crate::dashboard::config_reader::*;
use crate::dashboard::figure::build_species_figure;
use crate::dashboard::geometry::{load_geometry, unmapped_countries, GeometryIndex};
use crate::dashboard::io_csv::read_dataset;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashboardError {
    #[snafu(display("Error opening config file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing config file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening data file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the data file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Missing column {column} in the data file"))]
    MissingColumn { column: String },
    #[snafu(display("Line {lineno}: invalid value {value:?} for {column}"))]
    InvalidCell {
        lineno: usize,
        column: String,
        value: String,
    },
    #[snafu(display("Invalid dataset"))]
    InvalidDataset { source: EndemicityErrors },
    #[snafu(display("Error fetching country geometry from {url}"))]
    GeometryFetch { source: reqwest::Error, url: String },
    #[snafu(display("Error reading country geometry from {path}"))]
    GeometryRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing country geometry"))]
    GeometryParse { source: geojson::Error },
    #[snafu(display("No usable country in the geometry from {location}"))]
    EmptyGeometry {
        #[snafu(implicit(false))]
        location: String,
    },
    #[snafu(display("Error binding to {address}"))]
    Bind {
        source: std::io::Error,
        address: String,
    },
    #[snafu(display("Error while serving the dashboard"))]
    Serve { source: std::io::Error },
    #[snafu(display("Error serializing the map"))]
    SerializingFigure { source: serde_json::Error },
    #[snafu(display("Error writing the map to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Everything loaded at startup, shared read-only by all the requests.
#[derive(Debug)]
pub struct Loaded {
    pub settings: Settings,
    pub dataset: Dataset,
    pub geometry: GeometryIndex,
}

/// Loads the dataset and the geometry. Both are fatal on failure.
pub async fn load(settings: Settings) -> DashboardResult<Loaded> {
    if !(0.0..=100.0).contains(&settings.threshold) {
        warn!(
            "Threshold {} is outside of [0, 100]: the maps will be empty or complete",
            settings.threshold
        );
    }
    let dataset = read_dataset(&settings.data_file)?;
    info!(
        "Loaded {} rows, {} species and {} countries from {}",
        dataset.rows().len(),
        dataset.species().len(),
        dataset.countries().len(),
        settings.data_file
    );
    let geometry = load_geometry(&settings.geometry_source).await?;

    let unmapped = unmapped_countries(&dataset, &geometry);
    if !unmapped.is_empty() {
        warn!(
            "{} countries of the dataset have no geometry and will not be drawn: {:?}",
            unmapped.len(),
            unmapped
        );
    }
    Ok(Loaded {
        settings,
        dataset,
        geometry,
    })
}

/// Prints the countries of the dataset without geometry.
///
/// Fails if at least one such country is found.
pub fn check_geometry(loaded: &Loaded) -> DashboardResult<()> {
    let unmapped = unmapped_countries(&loaded.dataset, &loaded.geometry);
    println!(
        "{} countries in the dataset, {} with geometry",
        loaded.dataset.countries().len(),
        loaded.dataset.countries().len() - unmapped.len()
    );
    for country in unmapped.iter() {
        println!("missing geometry: {}", country);
    }
    if !unmapped.is_empty() {
        whatever!("{} countries have no geometry", unmapped.len())
    }
    Ok(())
}

/// Computes the map of one species and writes it in JSON format.
pub fn export_figure(loaded: &Loaded, species: &str, out: &str) -> DashboardResult<()> {
    let fig: JSValue = build_species_figure(
        &loaded.dataset,
        &loaded.geometry,
        species,
        loaded.settings.threshold,
    );
    let pretty_js = serde_json::to_string_pretty(&fig).context(SerializingFigureSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        let mut file = fs::File::create(out).context(WritingOutputSnafu { path: out })?;
        file.write_all(pretty_js.as_bytes())
            .context(WritingOutputSnafu { path: out })?;
        info!("Map of {:?} written to {}", species, out);
    }
    Ok(())
}

/// Runs the program as described by the command line.
pub async fn run(args: &Args) -> DashboardResult<()> {
    let file_config = match &args.config {
        Some(path) => Some(read_config(path)?),
        None => None,
    };
    let settings = Settings::resolve(args, file_config.as_ref());
    info!("settings: {:?}", settings);

    let loaded = load(settings).await?;

    if args.check_geometry {
        return check_geometry(&loaded);
    }

    match (&args.species, &args.out) {
        (Some(species), Some(out)) => export_figure(&loaded, species, out),
        (None, Some(_)) => whatever!("--out requires --species"),
        (Some(_), None) => whatever!("--species requires --out"),
        (None, None) => server::serve(Arc::new(loaded)).await,
    }
}
