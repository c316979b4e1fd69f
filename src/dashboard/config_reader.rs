use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::args::Args;
use crate::dashboard::*;

pub const DEFAULT_DATA_FILE: &str = "area_percentage_by_country_each_species_final.csv";
pub const DEFAULT_GEOMETRY_SOURCE: &str =
    "https://raw.githubusercontent.com/johan/world.geo.json/master/countries.geo.json";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8050";
pub const DEFAULT_TITLE: &str = "Biodiversity: Endemicity by Country";

/// The content of the JSON configuration file. All the entries are optional.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "dataFile")]
    pub data_file: Option<String>,
    #[serde(rename = "geometrySource")]
    pub geometry_source: Option<String>,
    pub threshold: Option<f64>,
    #[serde(rename = "bindAddress")]
    pub bind_address: Option<String>,
    pub title: Option<String>,
}

/// The settings in effect, after merging the command line, the config file and the defaults.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub data_file: String,
    pub geometry_source: String,
    pub threshold: f64,
    pub bind_address: String,
    pub title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_file: DEFAULT_DATA_FILE.to_string(),
            geometry_source: DEFAULT_GEOMETRY_SOURCE.to_string(),
            threshold: DEFAULT_THRESHOLD,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Settings {
    /// The command line takes precedence over the config file, which takes precedence
    /// over the defaults.
    pub fn resolve(args: &Args, config: Option<&(String, DashboardConfig)>) -> Settings {
        let defaults = Settings::default();
        let (config_path, file_config) = match config {
            Some((p, c)) => (Some(p.as_str()), c.clone()),
            None => (None, DashboardConfig::default()),
        };

        // A data file given in the config is relative to the config file itself.
        let config_data_file = file_config.data_file.map(|f| match config_path {
            Some(p) => resolve_relative(p, &f),
            None => f,
        });

        Settings {
            data_file: args
                .data
                .clone()
                .or(config_data_file)
                .unwrap_or(defaults.data_file),
            geometry_source: args
                .geometry
                .clone()
                .or(file_config.geometry_source)
                .unwrap_or(defaults.geometry_source),
            threshold: args
                .threshold
                .or(file_config.threshold)
                .unwrap_or(defaults.threshold),
            bind_address: args
                .bind
                .clone()
                .or(file_config.bind_address)
                .unwrap_or(defaults.bind_address),
            title: file_config.title.unwrap_or(defaults.title),
        }
    }
}

/// Reads the config file. The path is returned alongside to resolve relative paths.
pub fn read_config(path: &str) -> DashboardResult<(String, DashboardConfig)> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok((path.to_string(), config))
}

fn resolve_relative(config_path: &str, file: &str) -> String {
    let file_p = Path::new(file);
    if file_p.is_absolute() {
        return file.to_string();
    }
    match Path::new(config_path).parent() {
        Some(parent) => parent.join(file_p).display().to_string(),
        None => file.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(cmd: &[&str]) -> Args {
        let mut all = vec!["endemap"];
        all.extend_from_slice(cmd);
        Args::parse_from(all)
    }

    #[test]
    fn defaults_without_config() {
        let s = Settings::resolve(&args(&[]), None);
        assert_eq!(s, Settings::default());
        assert_eq!(s.threshold, 50.0);
    }

    #[test]
    fn config_values_and_relative_data_file() {
        let js = r#"{"dataFile": "data/species.csv", "threshold": 25.0, "title": "Amphibians"}"#;
        let config: DashboardConfig = serde_json::from_str(js).unwrap();
        let s = Settings::resolve(
            &args(&[]),
            Some(&("/srv/maps/config.json".to_string(), config)),
        );
        assert_eq!(s.data_file, "/srv/maps/data/species.csv");
        assert_eq!(s.threshold, 25.0);
        assert_eq!(s.title, "Amphibians");
        assert_eq!(s.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn command_line_overrides_config() {
        let js = r#"{"dataFile": "a.csv", "geometrySource": "world.json", "threshold": 25.0, "bindAddress": "0.0.0.0:80"}"#;
        let config: DashboardConfig = serde_json::from_str(js).unwrap();
        let s = Settings::resolve(
            &args(&["--data", "b.csv", "--threshold", "75", "--bind", "127.0.0.1:9000"]),
            Some(&("config.json".to_string(), config)),
        );
        assert_eq!(s.data_file, "b.csv");
        assert_eq!(s.geometry_source, "world.json");
        assert_eq!(s.threshold, 75.0);
        assert_eq!(s.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn missing_config_file() {
        let res = read_config("/nonexistent/endemap/config.json");
        assert!(matches!(res, Err(DashboardError::OpeningConfig { .. })));
    }
}
