// Primitives for reading the species CSV file.

use std::io::Read;

use endemicity::builder::DatasetBuilder;
use log::debug;
use snafu::prelude::*;

use crate::dashboard::*;

/// The metadata columns. All the other columns are countries.
pub const SPECIES_COLUMN: &str = "species";
pub const GROUP_COLUMN: &str = "group";
pub const LCAT_COLUMN: &str = "lcat";

pub fn read_dataset(path: &str) -> DashboardResult<Dataset> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_records(rdr)
}

pub fn read_dataset_from_reader<R: Read>(input: R) -> DashboardResult<Dataset> {
    let rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(input);
    read_records(rdr)
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>) -> DashboardResult<Dataset> {
    let header = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .clone();
    debug!("header: {:?}", header);

    let column = |name: &str| -> DashboardResult<usize> {
        header
            .iter()
            .position(|h| h.trim() == name)
            .context(MissingColumnSnafu { column: name })
    };
    let species_idx = column(SPECIES_COLUMN)?;
    let group_idx = column(GROUP_COLUMN)?;
    let lcat_idx = column(LCAT_COLUMN)?;

    let country_cols: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter(|(idx, _)| ![species_idx, group_idx, lcat_idx].contains(idx))
        .map(|(idx, name)| (idx, name.trim().to_string()))
        .collect();
    let countries: Vec<String> = country_cols.iter().map(|(_, c)| c.clone()).collect();

    let mut builder = DatasetBuilder::new(&countries);
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let field = |i: usize| line.get(i).unwrap_or("").trim();

        let mut values: Vec<f64> = Vec::with_capacity(country_cols.len());
        for (col_idx, country) in country_cols.iter() {
            values.push(parse_cell(field(*col_idx), lineno, country)?);
        }
        debug!(
            "read_dataset: lineno: {:?} species: {:?}",
            lineno,
            field(species_idx)
        );
        builder
            .add_row(field(species_idx), field(group_idx), field(lcat_idx), &values)
            .context(InvalidDatasetSnafu {})?;
    }
    builder.build().context(InvalidDatasetSnafu {})
}

/// An empty cell means that the species is absent from this country.
fn parse_cell(cell: &str, lineno: usize, column: &str) -> DashboardResult<f64> {
    if cell.is_empty() {
        return Ok(0.0);
    }
    match cell.parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 0.0 => Ok(x),
        _ => InvalidCellSnafu {
            lineno,
            column,
            value: cell,
        }
        .fail(),
    }
}
