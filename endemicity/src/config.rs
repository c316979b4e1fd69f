// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// The share threshold used by the dashboard when nothing else is configured.
pub const DEFAULT_THRESHOLD: f64 = 50.0;

/// One record of the dataset: the area measures of a species in every country column.
///
/// `group` and `lcat` are descriptive metadata and play no role in the computation.
#[derive(PartialEq, Debug, Clone)]
pub struct SpeciesRow {
    pub species: String,
    pub group: String,
    pub lcat: String,
    /// One value per country column of the owning dataset, in column order.
    pub values: Vec<f64>,
}

/// The full table of species rows, sharing one set of country columns.
///
/// Invariant: every row holds exactly one finite, non-negative value per country,
/// and the values of a row have a finite sum.
#[derive(PartialEq, Debug, Clone)]
pub struct Dataset {
    pub(crate) countries: Vec<String>,
    pub(crate) rows: Vec<SpeciesRow>,
}

impl Dataset {
    /// Builds a dataset after checking the shape and the values of all the rows.
    pub fn new(countries: Vec<String>, rows: Vec<SpeciesRow>) -> Result<Dataset, EndemicityErrors> {
        for (row_idx, row) in rows.iter().enumerate() {
            if row.values.len() != countries.len() {
                return Err(EndemicityErrors::RaggedRow {
                    row: row_idx,
                    expected: countries.len(),
                    found: row.values.len(),
                });
            }
            for (country, value) in countries.iter().zip(row.values.iter()) {
                if !value.is_finite() || *value < 0.0 {
                    return Err(EndemicityErrors::InvalidValue {
                        row: row_idx,
                        country: country.clone(),
                        value: *value,
                    });
                }
            }
            let total: f64 = row.values.iter().sum();
            if !total.is_finite() {
                return Err(EndemicityErrors::RangeOverflow { row: row_idx });
            }
        }
        Ok(Dataset { countries, rows })
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn rows(&self) -> &[SpeciesRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The distinct species, in the order in which they first appear.
    pub fn species(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut res: Vec<String> = Vec::new();
        for row in self.rows.iter() {
            if seen.insert(row.species.as_str()) {
                res.push(row.species.clone());
            }
        }
        res
    }

    /// The first species encountered in the dataset.
    pub fn default_species(&self) -> Option<&str> {
        self.rows.first().map(|r| r.species.as_str())
    }

    /// The rows of a given species, with their position in the dataset.
    pub fn rows_for<'a>(&'a self, species: &'a str) -> impl Iterator<Item = (usize, &'a SpeciesRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.species == species)
    }
}

// ******** Output data structures *********

/// The share of one country in the total range of one species row.
#[derive(PartialEq, Debug, Clone)]
pub struct NormalizedEntry {
    /// Position of the originating row in the dataset.
    pub row: usize,
    pub country: String,
    pub raw_value: f64,
    pub percentage: f64,
}

/// A country that passed the threshold, with its raw (non-normalized) value.
#[derive(PartialEq, Debug, Clone)]
pub struct EndemicityEntry {
    pub country: String,
    pub value: f64,
}

/// Errors that prevent the computation from completing successfully.
#[derive(PartialEq, Debug, Clone)]
pub enum EndemicityErrors {
    /// All the rows of the species sum to zero: no share can be defined.
    NoData { species: String },
    /// A row does not have one value per country column.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A value is negative, infinite or NaN.
    InvalidValue {
        row: usize,
        country: String,
        value: f64,
    },
    /// The values of a row are too large to be summed.
    RangeOverflow { row: usize },
    /// A sparse row referred to a country that is not a column of the dataset.
    UnknownCountry { country: String },
}

impl Error for EndemicityErrors {}

impl Display for EndemicityErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndemicityErrors::NoData { species } => {
                write!(f, "no renderable data for species {}", species)
            }
            EndemicityErrors::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} values but the dataset has {} countries",
                row, found, expected
            ),
            EndemicityErrors::InvalidValue {
                row,
                country,
                value,
            } => write!(f, "row {}: invalid value {} for {}", row, value, country),
            EndemicityErrors::RangeOverflow { row } => {
                write!(f, "row {}: the total of the values overflows", row)
            }
            EndemicityErrors::UnknownCountry { country } => {
                write!(f, "unknown country column: {}", country)
            }
        }
    }
}
