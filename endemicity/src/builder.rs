pub use crate::config::*;

/// A builder for assembling a dataset row by row.
///
/// ```
/// use endemicity::builder::DatasetBuilder;
/// # use endemicity::EndemicityErrors;
///
/// let mut builder = DatasetBuilder::new(&["France".to_string(), "Spain".to_string()]);
/// builder.add_row("Lynx pardinus", "mammals", "EN", &[10.0, 90.0])?;
/// builder.add_sparse_row("Ursus arctos", "mammals", "LC", &[("Spain", 5.0)])?;
///
/// let dataset = builder.build()?;
/// assert_eq!(dataset.species().len(), 2);
/// # Ok::<(), EndemicityErrors>(())
/// ```
pub struct DatasetBuilder {
    pub(crate) _countries: Vec<String>,
    pub(crate) _rows: Vec<SpeciesRow>,
}

impl DatasetBuilder {
    pub fn new(countries: &[String]) -> DatasetBuilder {
        DatasetBuilder {
            _countries: countries.to_vec(),
            _rows: Vec::new(),
        }
    }

    /// Adds a row with one value per country, in column order.
    pub fn add_row(
        &mut self,
        species: &str,
        group: &str,
        lcat: &str,
        values: &[f64],
    ) -> Result<(), EndemicityErrors> {
        if values.len() != self._countries.len() {
            return Err(EndemicityErrors::RaggedRow {
                row: self._rows.len(),
                expected: self._countries.len(),
                found: values.len(),
            });
        }
        self._rows.push(SpeciesRow {
            species: species.to_string(),
            group: group.to_string(),
            lcat: lcat.to_string(),
            values: values.to_vec(),
        });
        Ok(())
    }

    /// Adds a row from the countries where the species is present.
    ///
    /// The countries that are not mentioned are recorded as zero.
    pub fn add_sparse_row(
        &mut self,
        species: &str,
        group: &str,
        lcat: &str,
        presence: &[(&str, f64)],
    ) -> Result<(), EndemicityErrors> {
        let mut values = vec![0.0; self._countries.len()];
        for (country, value) in presence.iter() {
            let idx = self
                ._countries
                .iter()
                .position(|c| c == country)
                .ok_or_else(|| EndemicityErrors::UnknownCountry {
                    country: country.to_string(),
                })?;
            values[idx] = *value;
        }
        self.add_row(species, group, lcat, &values)
    }

    pub fn build(self) -> Result<Dataset, EndemicityErrors> {
        Dataset::new(self._countries, self._rows)
    }
}
