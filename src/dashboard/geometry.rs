// The country boundaries, read once at startup.

use std::collections::BTreeMap;

use geojson::{Feature, FeatureCollection, GeoJson};
use log::{debug, info, warn};
use snafu::prelude::*;

use crate::dashboard::*;

/// The property of a feature that holds the country name.
pub const NAME_PROPERTY: &str = "name";

/// Where the geometry is read from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GeometrySource {
    Url(String),
    File(String),
}

impl GeometrySource {
    pub fn parse(location: &str) -> GeometrySource {
        if location.starts_with("http://") || location.starts_with("https://") {
            GeometrySource::Url(location.to_string())
        } else {
            GeometrySource::File(location.to_string())
        }
    }
}

/// Country boundaries, keyed by country name.
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    features: BTreeMap<String, Feature>,
}

impl GeometryIndex {
    /// Indexes the features of a collection by their name.
    ///
    /// Features without a name are skipped. If a name appears twice, the last feature wins.
    pub fn from_collection(fc: FeatureCollection) -> GeometryIndex {
        let mut features: BTreeMap<String, Feature> = BTreeMap::new();
        for feature in fc.features.into_iter() {
            let name = feature
                .property(NAME_PROPERTY)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            match name {
                Some(n) => {
                    if features.insert(n.clone(), feature).is_some() {
                        warn!("Duplicate geometry for {:?}, keeping the last one", n);
                    }
                }
                None => {
                    warn!("Skipping a feature without a {:?} property", NAME_PROPERTY);
                }
            }
        }
        GeometryIndex { features }
    }

    pub fn parse(contents: &str) -> DashboardResult<GeometryIndex> {
        let gj: GeoJson = contents.parse::<GeoJson>().context(GeometryParseSnafu {})?;
        match gj {
            GeoJson::FeatureCollection(fc) => Ok(GeometryIndex::from_collection(fc)),
            GeoJson::Feature(f) => Ok(GeometryIndex::from_collection(FeatureCollection {
                bbox: None,
                features: vec![f],
                foreign_members: None,
            })),
            GeoJson::Geometry(_) => whatever!("Expected GeoJSON features, found a bare geometry"),
        }
    }

    pub fn contains(&self, country: &str) -> bool {
        self.features.contains_key(country)
    }

    pub fn feature(&self, country: &str) -> Option<&Feature> {
        self.features.get(country)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Fetches or reads the geometry. Any failure here prevents the dashboard from starting.
pub async fn load_geometry(location: &str) -> DashboardResult<GeometryIndex> {
    let contents = match GeometrySource::parse(location) {
        GeometrySource::Url(url) => fetch(&url).await?,
        GeometrySource::File(path) => {
            tokio::fs::read_to_string(&path)
                .await
                .context(GeometryReadSnafu { path: path.clone() })?
        }
    };
    debug!("load_geometry: {} bytes from {}", contents.len(), location);
    let index = GeometryIndex::parse(&contents)?;
    ensure!(!index.is_empty(), EmptyGeometrySnafu { location });
    info!("Loaded geometry for {} countries from {}", index.len(), location);
    Ok(index)
}

async fn fetch(url: &str) -> DashboardResult<String> {
    info!("Fetching country geometry from {}", url);
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .context(GeometryFetchSnafu { url })?;
    response.text().await.context(GeometryFetchSnafu { url })
}

/// The country columns of the dataset that cannot be drawn.
pub fn unmapped_countries(dataset: &Dataset, geometry: &GeometryIndex) -> Vec<String> {
    dataset
        .countries()
        .iter()
        .filter(|c| !geometry.contains(c))
        .cloned()
        .collect()
}
