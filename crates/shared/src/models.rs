use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::projection::MAX_TILE_ZOOM;

/// A geographic coordinate. Every geometry in this crate uses this order;
/// GeoJSON `[lng, lat]` positions are flipped when boundaries are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

/// One event row of the venues sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VenueRow {
    #[serde(rename = "ciudad", default)]
    pub city: String,
    #[serde(rename = "lugar", default)]
    pub venue_name: String,
    #[serde(rename = "latitud", default)]
    pub latitude: String,
    #[serde(rename = "longitud", default)]
    pub longitude: String,
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "agotado", default, deserialize_with = "de_flag")]
    pub sold_out: bool,
    #[serde(rename = "porcentaje", default)]
    pub occupancy_percent: String,
    #[serde(rename = "link", default)]
    pub ticket_link: String,
}

impl VenueRow {
    /// Grouping key: trimmed, lowercased city.
    pub fn city_key(&self) -> String {
        city_key(&self.city)
    }

    /// Parsed coordinate, `None` when either field is not a finite number.
    pub fn position(&self) -> Option<LatLng> {
        let lat = self.latitude.trim().parse::<f64>().ok()?;
        let lng = self.longitude.trim().parse::<f64>().ok()?;
        if lat.is_finite() && lng.is_finite() {
            Some(LatLng { lat, lng })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TravelRow {
    #[serde(rename = "origen", default)]
    pub origin: String,
    #[serde(rename = "destino", default)]
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpinionRow {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "pais", default)]
    pub country: String,
    #[serde(rename = "concierto", default)]
    pub concert_label: String,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "redes", default)]
    pub social_links: String,
}

/// Normalize a city name for grouping and matching.
pub fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().eq_ignore_ascii_case("true"))
}

// --- Site configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub sheets: SheetUrls,
    pub boundaries: BoundaryUrls,
    pub venue_map: TileLayer,
    pub opinion_map: TileLayer,
    pub travel_relay: FormRelay,
    pub opinion_relay: FormRelay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetUrls {
    pub venues: String,
    pub travels: String,
    pub opinions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryUrls {
    pub countries: String,
    pub provinces: String,
}

/// A slippy-map tile source plus the initial view over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub center: LatLng,
    pub zoom: u8,
}

impl TileLayer {
    /// Zoom bounds must be ordered, within what tile servers provide, and
    /// contain the initial zoom.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_zoom > self.max_zoom {
            return Err(format!("minZoom {} is above maxZoom {}", self.min_zoom, self.max_zoom));
        }
        if self.max_zoom > MAX_TILE_ZOOM {
            return Err(format!("maxZoom {} exceeds {}", self.max_zoom, MAX_TILE_ZOOM));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.zoom) {
            return Err(format!(
                "zoom {} is outside {}..={}",
                self.zoom, self.min_zoom, self.max_zoom
            ));
        }
        Ok(())
    }
}

/// An external form-intake endpoint and the mapping from our logical field
/// names to the names the endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRelay {
    pub endpoint: String,
    pub fields: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_key_trims_and_lowercases() {
        assert_eq!(city_key("  Madrid "), "madrid");
        assert_eq!(city_key("BARCELONA"), "barcelona");
    }

    #[test]
    fn test_venue_position_parses() {
        let row = VenueRow {
            latitude: " 40.4168".to_string(),
            longitude: "-3.7038 ".to_string(),
            ..Default::default()
        };
        assert_eq!(row.position(), Some(LatLng::new(40.4168, -3.7038)));
    }

    #[test]
    fn test_venue_position_rejects_non_numeric() {
        let row = VenueRow {
            latitude: "abc".to_string(),
            longitude: "-3.7".to_string(),
            ..Default::default()
        };
        assert!(row.position().is_none());

        let row = VenueRow {
            latitude: "NaN".to_string(),
            longitude: "1.0".to_string(),
            ..Default::default()
        };
        assert!(row.position().is_none());
    }

    #[test]
    fn test_site_config_deserializes() {
        let json = r#"{
            "sheets": {"venues": "v.csv", "travels": "t.csv", "opinions": "o.csv"},
            "boundaries": {"countries": "/static/geojson/countries.geojson", "provinces": "/static/geojson/spain_provinces.geojson"},
            "venueMap": {"urlTemplate": "https://tile/{z}/{x}/{y}.png", "attribution": "OSM", "minZoom": 3, "maxZoom": 18, "center": {"lat": 40.0, "lng": -4.0}, "zoom": 6},
            "opinionMap": {"urlTemplate": "https://{s}.tile/{z}/{x}/{y}.png", "attribution": "OSM", "minZoom": 2, "maxZoom": 6, "center": {"lat": 20.0, "lng": 0.0}, "zoom": 2},
            "travelRelay": {"endpoint": "https://forms/travel", "fields": {"origin": "entry.1", "destination": "entry.2"}},
            "opinionRelay": {"endpoint": "https://forms/opinion", "fields": {"name": "entry.3"}}
        }"#;
        let config: SiteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.venue_map.zoom, 6);
        assert_eq!(config.venue_map.center, LatLng::new(40.0, -4.0));
        assert_eq!(config.travel_relay.fields["origin"], "entry.1");
    }

    fn layer(min_zoom: u8, max_zoom: u8, zoom: u8) -> TileLayer {
        TileLayer {
            url_template: "https://tile/{z}/{x}/{y}.png".to_string(),
            attribution: "OSM".to_string(),
            min_zoom,
            max_zoom,
            center: LatLng::new(40.0, -4.0),
            zoom,
        }
    }

    #[test]
    fn test_tile_layer_bounds() {
        assert!(layer(3, 18, 6).validate().is_ok());
        assert!(layer(18, 3, 6).validate().unwrap_err().contains("minZoom"));
        assert!(layer(0, 64, 6).validate().unwrap_err().contains("maxZoom 64"));
        assert!(layer(3, 18, 2).validate().unwrap_err().contains("zoom 2"));
    }
}
