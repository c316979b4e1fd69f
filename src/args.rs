use clap::Parser;

/// This is an interactive world map of the endemicity of species.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the settings of the dashboard. The values passed with the other flags
    /// override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The CSV file with the area of each species per country. It must contain the columns
    /// 'species', 'group' and 'lcat', every other column being a country name.
    #[clap(short, long, value_parser)]
    pub data: Option<String>,

    /// (URL or file path) The GeoJSON collection of country boundaries, keyed by the country name.
    #[clap(short, long, value_parser)]
    pub geometry: Option<String>,

    /// (percentage, default 50) The maximum share of the range of a species that a country may hold to be shown
    /// on the map.
    #[clap(short, long, value_parser)]
    pub threshold: Option<f64>,

    /// (address, default 127.0.0.1:8050) The address the dashboard listens on.
    #[clap(short, long, value_parser)]
    pub bind: Option<String>,

    /// (species name) If specified together with --out, the map of this species is computed once and written
    /// in JSON format instead of starting the dashboard.
    #[clap(short, long, value_parser)]
    pub species: Option<String>,

    /// (file path or 'stdout') The location where the map of --species is written.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// If passed as an argument, lists the countries of the dataset that have no boundaries in the geometry
    /// and exits.
    #[clap(long, takes_value = false)]
    pub check_geometry: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
