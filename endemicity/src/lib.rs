/*!
Computes how much each country contributes to the known range of a species.

The dataset holds one row per species (occasionally more), with one area
measure per country. For a selected species, each country's measure is
turned into a share of the row total, and the countries whose share stays
under a threshold are reported with their raw measure:

```
use endemicity::builder::DatasetBuilder;
use endemicity::compute;
# use endemicity::EndemicityErrors;

let countries = vec!["CountryX".to_string(), "CountryY".to_string()];
let mut builder = DatasetBuilder::new(&countries);
builder.add_row("SpeciesA", "plants", "LC", &[30.0, 70.0])?;
let dataset = builder.build()?;

let entries = compute(&dataset, "SpeciesA", 50.0)?;
assert_eq!(entries.len(), 1);
assert_eq!(entries[0].country, "CountryX");
assert_eq!(entries[0].value, 30.0);
# Ok::<(), EndemicityErrors>(())
```
*/

pub mod builder;
mod config;
use log::{debug, info};

pub use crate::config::*;

/// Computes the share of every country for all the rows of a species.
///
/// Returns an empty list if the species is not part of the dataset.
/// Rows that sum to zero have no defined shares and are skipped. If every row
/// of the species sums to zero, [EndemicityErrors::NoData] is returned instead.
/// A row total that is not finite gives [EndemicityErrors::RangeOverflow].
pub fn normalize(
    dataset: &Dataset,
    species: &str,
) -> Result<Vec<NormalizedEntry>, EndemicityErrors> {
    let mut res: Vec<NormalizedEntry> = Vec::new();
    let mut num_rows = 0;
    let mut num_zero_rows = 0;
    for (row_idx, row) in dataset.rows_for(species) {
        num_rows += 1;
        let total: f64 = row.values.iter().sum();
        debug!("normalize: {} row {} total {}", species, row_idx, total);
        if !total.is_finite() {
            return Err(EndemicityErrors::RangeOverflow { row: row_idx });
        }
        if total <= 0.0 {
            num_zero_rows += 1;
            continue;
        }
        for (country, raw_value) in dataset.countries.iter().zip(row.values.iter()) {
            res.push(NormalizedEntry {
                row: row_idx,
                country: country.clone(),
                raw_value: *raw_value,
                percentage: raw_value / total * 100.0,
            });
        }
    }

    if num_rows == 0 {
        info!("normalize: species {:?} not found", species);
        return Ok(res);
    }
    if num_zero_rows == num_rows {
        info!("normalize: species {:?} has only empty ranges", species);
        return Err(EndemicityErrors::NoData {
            species: species.to_string(),
        });
    }
    Ok(res)
}

/// Runs the endemicity computation for one species.
///
/// Arguments:
/// * `dataset` the full dataset
/// * `species` the species to look at. An unknown species gives an empty result.
/// * `threshold` the maximum share (in percent) that a country may have to be kept.
///   Values outside of `[0, 100]` are accepted and give an empty or a full result.
///
/// The result holds the raw values of the kept countries, not their shares.
pub fn compute(
    dataset: &Dataset,
    species: &str,
    threshold: f64,
) -> Result<Vec<EndemicityEntry>, EndemicityErrors> {
    let normalized = normalize(dataset, species)?;
    let num_entries = normalized.len();
    let res: Vec<EndemicityEntry> = normalized
        .into_iter()
        .filter(|e| e.percentage <= threshold)
        .map(|e| EndemicityEntry {
            country: e.country,
            value: e.raw_value,
        })
        .collect();
    info!(
        "compute: {:?} threshold {}: {} of {} countries kept",
        species,
        threshold,
        res.len(),
        num_entries
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::builder::DatasetBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn countries(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Dataset {
        let mut builder = DatasetBuilder::new(&countries(&["CountryX", "CountryY", "CountryZ"]));
        builder
            .add_row("SpeciesA", "g1", "LC", &[30.0, 70.0, 0.0])
            .unwrap();
        builder
            .add_row("SpeciesB", "g1", "EN", &[0.0, 0.0, 0.0])
            .unwrap();
        builder
            .add_row("SpeciesC", "g2", "VU", &[10.0, 20.0, 20.0])
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn threshold_keeps_small_shares() {
        init();
        let res = compute(&sample(), "SpeciesA", 50.0).unwrap();
        assert_eq!(
            res,
            vec![
                EndemicityEntry {
                    country: "CountryX".to_string(),
                    value: 30.0
                },
                EndemicityEntry {
                    country: "CountryZ".to_string(),
                    value: 0.0
                },
            ]
        );
    }

    #[test]
    fn shares_sum_to_hundred() {
        init();
        let ds = sample();
        for species in ["SpeciesA", "SpeciesC"] {
            let total: f64 = normalize(&ds, species)
                .unwrap()
                .iter()
                .map(|e| e.percentage)
                .sum();
            assert!((total - 100.0).abs() < 1e-9, "{} {}", species, total);
        }
    }

    #[test]
    fn shares_near_the_float_limits() {
        init();
        let mut builder = DatasetBuilder::new(&countries(&["CountryX", "CountryY", "CountryZ"]));
        builder
            .add_row("Huge", "g", "LC", &[f64::MAX / 2.0, f64::MAX / 4.0, 0.0])
            .unwrap();
        builder
            .add_row("Tiny", "g", "LC", &[5e-324, 5e-324, 1e-320])
            .unwrap();
        let ds = builder.build().unwrap();

        for species in ["Huge", "Tiny"] {
            let res = normalize(&ds, species).unwrap();
            assert!(res.iter().all(|e| e.percentage.is_finite()));
            let total: f64 = res.iter().map(|e| e.percentage).sum();
            assert!((total - 100.0).abs() < 1e-9, "{} {}", species, total);
        }
        let kept: Vec<String> = compute(&ds, "Huge", 50.0)
            .unwrap()
            .into_iter()
            .map(|e| e.country)
            .collect();
        assert_eq!(kept, vec!["CountryY".to_string(), "CountryZ".to_string()]);
    }

    #[test]
    fn many_small_values_share_evenly() {
        init();
        let names: Vec<String> = (0..1000).map(|i| format!("C{}", i)).collect();
        let mut builder = DatasetBuilder::new(&names);
        builder
            .add_row("Widespread", "g", "LC", &vec![1e-300; 1000])
            .unwrap();
        let ds = builder.build().unwrap();
        let res = normalize(&ds, "Widespread").unwrap();
        assert!(res.iter().all(|e| (e.percentage - 0.1).abs() < 1e-9));
        let total: f64 = res.iter().map(|e| e.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(compute(&ds, "Widespread", 0.05).unwrap().is_empty());
    }

    #[test]
    fn overflowing_total_is_rejected() {
        init();
        let mut builder = DatasetBuilder::new(&countries(&["CountryX", "CountryY"]));
        builder.add_row("Small", "g", "LC", &[1.0, 1.0]).unwrap();
        builder.add_row("Giant", "g", "LC", &[1e308, 1e308]).unwrap();
        assert_eq!(
            builder.build(),
            Err(EndemicityErrors::RangeOverflow { row: 1 })
        );
    }

    #[test]
    fn shares_for_species_c() {
        init();
        let res = normalize(&sample(), "SpeciesC").unwrap();
        let pcts: Vec<f64> = res.iter().map(|e| e.percentage).collect();
        assert_eq!(pcts, vec![20.0, 40.0, 40.0]);
        assert!(res.iter().all(|e| e.row == 2));
    }

    #[test]
    fn all_zero_species_has_no_data() {
        init();
        let res = compute(&sample(), "SpeciesB", 50.0);
        assert_eq!(
            res,
            Err(EndemicityErrors::NoData {
                species: "SpeciesB".to_string()
            })
        );
    }

    #[test]
    fn unknown_species_is_empty() {
        init();
        assert_eq!(compute(&sample(), "SpeciesQ", 50.0), Ok(vec![]));
        assert_eq!(normalize(&sample(), "SpeciesQ"), Ok(vec![]));
    }

    #[test]
    fn threshold_hundred_keeps_the_total() {
        init();
        let ds = sample();
        for species in ["SpeciesA", "SpeciesC"] {
            let kept: f64 = compute(&ds, species, 100.0)
                .unwrap()
                .iter()
                .map(|e| e.value)
                .sum();
            let (_, row) = ds.rows_for(species).next().unwrap();
            let total: f64 = row.values.iter().sum();
            assert_eq!(kept, total);
        }
    }

    #[test]
    fn threshold_zero_keeps_absent_countries_only() {
        init();
        let ds = sample();
        let res = compute(&ds, "SpeciesA", 0.0).unwrap();
        assert_eq!(
            res,
            vec![EndemicityEntry {
                country: "CountryZ".to_string(),
                value: 0.0
            }]
        );
        assert!(compute(&ds, "SpeciesC", 0.0).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_thresholds() {
        init();
        let ds = sample();
        assert!(compute(&ds, "SpeciesC", -5.0).unwrap().is_empty());
        assert_eq!(compute(&ds, "SpeciesC", 250.0).unwrap().len(), 3);
    }

    #[test]
    fn single_country_range() {
        init();
        let mut builder = DatasetBuilder::new(&countries(&["CountryX", "CountryY"]));
        builder
            .add_sparse_row("Endemic", "g", "CR", &[("CountryY", 3.5)])
            .unwrap();
        let ds = builder.build().unwrap();
        assert_eq!(
            compute(&ds, "Endemic", 100.0).unwrap(),
            vec![
                EndemicityEntry {
                    country: "CountryX".to_string(),
                    value: 0.0
                },
                EndemicityEntry {
                    country: "CountryY".to_string(),
                    value: 3.5
                },
            ]
        );
        assert_eq!(compute(&ds, "Endemic", 99.9).unwrap().len(), 1);
    }

    #[test]
    fn compute_is_idempotent() {
        init();
        let ds = sample();
        let first = compute(&ds, "SpeciesC", 40.0).unwrap();
        let second = compute(&ds, "SpeciesC", 40.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn several_rows_for_one_species() {
        init();
        let mut builder = DatasetBuilder::new(&countries(&["CountryX", "CountryY"]));
        builder.add_row("Split", "g", "LC", &[1.0, 3.0]).unwrap();
        builder.add_row("Other", "g", "LC", &[1.0, 1.0]).unwrap();
        builder.add_row("Split", "g", "NT", &[0.0, 0.0]).unwrap();
        builder.add_row("Split", "g", "NT", &[9.0, 1.0]).unwrap();
        let ds = builder.build().unwrap();

        let normalized = normalize(&ds, "Split").unwrap();
        let rows: Vec<usize> = normalized.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![0, 0, 3, 3]);

        let res = compute(&ds, "Split", 50.0).unwrap();
        assert_eq!(
            res,
            vec![
                EndemicityEntry {
                    country: "CountryX".to_string(),
                    value: 1.0
                },
                EndemicityEntry {
                    country: "CountryY".to_string(),
                    value: 1.0
                },
            ]
        );
    }

    #[test]
    fn species_in_order_of_appearance() {
        let ds = sample();
        assert_eq!(
            ds.species(),
            vec![
                "SpeciesA".to_string(),
                "SpeciesB".to_string(),
                "SpeciesC".to_string()
            ]
        );
        assert_eq!(ds.default_species(), Some("SpeciesA"));
        assert_eq!(Dataset::new(vec![], vec![]).unwrap().default_species(), None);
    }

    #[test]
    fn invalid_rows_are_rejected() {
        let mut builder = DatasetBuilder::new(&countries(&["CountryX"]));
        assert_eq!(
            builder.add_row("S", "g", "LC", &[1.0, 2.0]),
            Err(EndemicityErrors::RaggedRow {
                row: 0,
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            builder.add_sparse_row("S", "g", "LC", &[("Atlantis", 1.0)]),
            Err(EndemicityErrors::UnknownCountry {
                country: "Atlantis".to_string()
            })
        );
        builder.add_row("S", "g", "LC", &[-1.0]).unwrap();
        assert!(matches!(
            builder.build(),
            Err(EndemicityErrors::InvalidValue { row: 0, .. })
        ));
    }
}
