//! Country and province boundary collections.
//!
//! Both GeoJSON sources are normalized at load: positions become [`LatLng`]
//! and each feature gets one canonical name per kind (provinces: `name`, then
//! `NAME_1`; countries: `ADMIN`, then `name`). Every one of those fields that
//! is present is kept as a match alias.

use geojson::{GeoJson, Value};
use serde::{Deserialize, Serialize};

use crate::geo::{BoundaryGeometry, Ring};
use crate::models::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    Province,
    Country,
}

impl BoundaryKind {
    fn name_fields(self) -> &'static [&'static str] {
        match self {
            BoundaryKind::Province => &["name", "NAME_1"],
            BoundaryKind::Country => &["ADMIN", "name"],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    #[error("expected a FeatureCollection")]
    NotACollection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub aliases: Vec<String>,
    pub kind: BoundaryKind,
    pub geometry: BoundaryGeometry,
}

impl BoundaryFeature {
    /// Trimmed, case-insensitive match against any alias.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.aliases.iter().any(|a| a.to_lowercase() == query)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySet {
    pub features: Vec<BoundaryFeature>,
}

fn to_ring(positions: &[Vec<f64>]) -> Ring {
    positions
        .iter()
        .filter_map(|p| match p.as_slice() {
            [lng, lat, ..] => Some(LatLng { lat: *lat, lng: *lng }),
            _ => None,
        })
        .collect()
}

fn to_geometry(value: &Value) -> Option<BoundaryGeometry> {
    match value {
        Value::Polygon(rings) => Some(BoundaryGeometry::Polygon(
            rings.iter().map(|r| to_ring(r)).collect(),
        )),
        Value::MultiPolygon(polys) => Some(BoundaryGeometry::MultiPolygon(
            polys
                .iter()
                .map(|rings| rings.iter().map(|r| to_ring(r)).collect())
                .collect(),
        )),
        _ => None,
    }
}

impl BoundarySet {
    pub fn from_geojson(text: &str, kind: BoundaryKind) -> Result<Self, BoundaryError> {
        let geojson: GeoJson = text.parse()?;
        let GeoJson::FeatureCollection(fc) = geojson else {
            return Err(BoundaryError::NotACollection);
        };

        let mut features = Vec::with_capacity(fc.features.len());
        let mut skipped = 0usize;
        for feature in fc.features {
            let aliases: Vec<String> = kind
                .name_fields()
                .iter()
                .filter_map(|field| feature.property(field))
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            let geometry = feature.geometry.as_ref().and_then(|g| to_geometry(&g.value));

            match (aliases.first().cloned(), geometry) {
                (Some(name), Some(geometry)) => features.push(BoundaryFeature {
                    name,
                    aliases,
                    kind,
                    geometry,
                }),
                _ => skipped += 1,
            }
        }

        tracing::debug!(?kind, loaded = features.len(), skipped, "Parsed boundary collection");
        Ok(BoundarySet { features })
    }

    pub fn find(&self, query: &str) -> Option<&BoundaryFeature> {
        self.features.iter().find(|f| f.matches(query))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Both boundary collections, searched provinces first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryIndex {
    pub provinces: BoundarySet,
    pub countries: BoundarySet,
}

impl BoundaryIndex {
    pub fn new(provinces: BoundarySet, countries: BoundarySet) -> Self {
        BoundaryIndex { provinces, countries }
    }

    /// Resolve a travel origin to a boundary. Provinces win over countries.
    pub fn resolve(&self, origin: &str) -> Option<&BoundaryFeature> {
        self.provinces
            .find(origin)
            .or_else(|| self.countries.find(origin))
    }

    /// Sorted canonical names for the origin picker. Spain is left out of the
    /// country list since Spanish origins are entered by province.
    pub fn names(&self, kind: BoundaryKind) -> Vec<String> {
        let set = match kind {
            BoundaryKind::Province => &self.provinces,
            BoundaryKind::Country => &self.countries,
        };
        let mut names: Vec<String> = set
            .features
            .iter()
            .map(|f| f.name.clone())
            .filter(|n| kind != BoundaryKind::Country || !n.eq_ignore_ascii_case("spain"))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
