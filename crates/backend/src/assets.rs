use std::path::{Path, PathBuf};

use tourmap_shared::boundary::{BoundaryIndex, BoundaryKind, BoundarySet};
use tourmap_shared::models::SiteConfig;

pub struct Assets {
    pub site: SiteConfig,
    pub boundaries: BoundaryIndex,
}

/// Boundary URLs under `/static/` are served from the assets directory, so
/// the same file can be read at startup.
fn local_path(assets_dir: &Path, url: &str) -> Option<PathBuf> {
    url.strip_prefix("/static/").map(|rel| assets_dir.join(rel))
}

fn load_boundaries(assets_dir: &Path, url: &str, kind: BoundaryKind) -> BoundarySet {
    let Some(path) = local_path(assets_dir, url) else {
        tracing::warn!(url, ?kind, "Boundary source is not a local asset, names unavailable");
        return BoundarySet::default();
    };
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), ?kind, error = %e, "Failed to read boundaries");
            return BoundarySet::default();
        }
    };
    match BoundarySet::from_geojson(&text, kind) {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(path = %path.display(), ?kind, error = %e, "Failed to parse boundaries");
            BoundarySet::default()
        }
    }
}

impl Assets {
    pub fn load(assets_dir: &Path) -> Result<Self, String> {
        let site_path = assets_dir.join("site.json");
        let site_data = std::fs::read_to_string(&site_path)
            .map_err(|e| format!("Failed to read {}: {}", site_path.display(), e))?;
        let site: SiteConfig = serde_json::from_str(&site_data)
            .map_err(|e| format!("Failed to parse site.json: {}", e))?;
        for (name, layer) in [("venueMap", &site.venue_map), ("opinionMap", &site.opinion_map)] {
            layer
                .validate()
                .map_err(|e| format!("Invalid {} in site.json: {}", name, e))?;
        }

        let provinces = load_boundaries(assets_dir, &site.boundaries.provinces, BoundaryKind::Province);
        let countries = load_boundaries(assets_dir, &site.boundaries.countries, BoundaryKind::Country);

        tracing::info!(
            provinces = provinces.len(),
            countries = countries.len(),
            "Loaded site assets"
        );

        Ok(Assets {
            site,
            boundaries: BoundaryIndex::new(provinces, countries),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SITE_JSON: &str = r#"{
        "sheets": {"venues": "https://sheets/v.csv", "travels": "https://sheets/t.csv", "opinions": "https://sheets/o.csv"},
        "boundaries": {"countries": "/static/geojson/countries.geojson", "provinces": "/static/geojson/provinces.geojson"},
        "venueMap": {"urlTemplate": "https://tile/{z}/{x}/{y}.png", "attribution": "OSM", "minZoom": 3, "maxZoom": 18, "center": {"lat": 40.0, "lng": -4.0}, "zoom": 6},
        "opinionMap": {"urlTemplate": "https://{s}.tile/{z}/{x}/{y}.png", "attribution": "OSM", "minZoom": 2, "maxZoom": 6, "center": {"lat": 20.0, "lng": 0.0}, "zoom": 2},
        "travelRelay": {"endpoint": "https://forms/travel", "fields": {"origin": "entry.1", "destination": "entry.2"}},
        "opinionRelay": {"endpoint": "https://forms/opinion", "fields": {"name": "entry.3", "country": "entry.4"}}
    }"#;

    pub(crate) const COUNTRIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ADMIN": "Spain"},
             "geometry": {"type": "Polygon", "coordinates": [[[-9.0, 36.0], [3.0, 36.0], [3.0, 43.0], [-9.0, 36.0]]]}},
            {"type": "Feature", "properties": {"ADMIN": "Portugal"},
             "geometry": {"type": "Polygon", "coordinates": [[[-9.5, 37.0], [-6.2, 37.0], [-6.2, 42.0], [-9.5, 37.0]]]}},
            {"type": "Feature", "properties": {"ADMIN": "France"},
             "geometry": {"type": "Polygon", "coordinates": [[[0.0, 44.0], [4.0, 44.0], [4.0, 48.0], [0.0, 44.0]]]}}
        ]
    }"#;

    /// Assets dir with site.json and only the countries file.
    pub(crate) fn assets_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("site.json"), SITE_JSON).unwrap();
        std::fs::create_dir(dir.path().join("geojson")).unwrap();
        std::fs::write(dir.path().join("geojson/countries.geojson"), COUNTRIES).unwrap();
        dir
    }

    #[test]
    fn test_load_reads_site_and_boundaries() {
        let dir = assets_dir();
        let assets = Assets::load(dir.path()).unwrap();
        assert_eq!(assets.site.sheets.venues, "https://sheets/v.csv");
        assert_eq!(assets.boundaries.countries.len(), 3);
    }

    #[test]
    fn test_missing_boundary_file_leaves_set_empty() {
        let dir = assets_dir();
        let assets = Assets::load(dir.path()).unwrap();
        assert!(assets.boundaries.provinces.is_empty());
    }

    #[test]
    fn test_missing_site_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Assets::load(dir.path()).err().unwrap();
        assert!(err.contains("site.json"));
    }

    #[test]
    fn test_invalid_site_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("site.json"), "{").unwrap();
        let err = Assets::load(dir.path()).err().unwrap();
        assert!(err.starts_with("Failed to parse site.json"));
    }

    #[test]
    fn test_inverted_zoom_bounds_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let site = SITE_JSON.replace(r#""minZoom": 3, "maxZoom": 18"#, r#""minZoom": 18, "maxZoom": 3"#);
        std::fs::write(dir.path().join("site.json"), site).unwrap();
        let err = Assets::load(dir.path()).err().unwrap();
        assert!(err.starts_with("Invalid venueMap"), "{err}");
    }

    #[test]
    fn test_excessive_max_zoom_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let site = SITE_JSON.replace(r#""minZoom": 2, "maxZoom": 6"#, r#""minZoom": 2, "maxZoom": 63"#);
        std::fs::write(dir.path().join("site.json"), site).unwrap();
        let err = Assets::load(dir.path()).err().unwrap();
        assert!(err.starts_with("Invalid opinionMap"), "{err}");
    }

    #[test]
    fn test_remote_boundary_url_is_skipped() {
        assert!(local_path(Path::new("assets"), "https://cdn/countries.geojson").is_none());
        assert_eq!(
            local_path(Path::new("assets"), "/static/geojson/x.geojson"),
            Some(PathBuf::from("assets/geojson/x.geojson"))
        );
    }
}
