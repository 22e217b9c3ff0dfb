use crate::models::LatLng;

/// Mean Earth radius in meters, matching the slippy-map convention.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("no centroid: boundary ring has no vertices")]
    EmptyRing,
}

/// Polygon outline; the first ring of a polygon is its outer ring.
pub type Ring = Vec<LatLng>;

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl BoundaryGeometry {
    /// The ring used for centroid approximation: the outer ring of the
    /// polygon, or of the first polygon of a multi-polygon.
    pub fn outer_ring(&self) -> Option<&Ring> {
        match self {
            BoundaryGeometry::Polygon(rings) => rings.first(),
            BoundaryGeometry::MultiPolygon(polys) => polys.first().and_then(|p| p.first()),
        }
    }

    /// Every polygon as a list of rings, for drawing and hit-testing.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            BoundaryGeometry::Polygon(rings) => vec![rings.as_slice()],
            BoundaryGeometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
        }
    }
}

/// Arithmetic mean of the ring's vertices. Not area-weighted.
pub fn ring_centroid(ring: &[LatLng]) -> Result<LatLng, GeoError> {
    if ring.is_empty() {
        return Err(GeoError::EmptyRing);
    }
    let n = ring.len() as f64;
    let (lat_sum, lng_sum) = ring
        .iter()
        .fold((0.0, 0.0), |(la, ln), p| (la + p.lat, ln + p.lng));
    Ok(LatLng {
        lat: lat_sum / n,
        lng: lng_sum / n,
    })
}

/// Representative point of a boundary, from its outer ring only.
pub fn centroid(geometry: &BoundaryGeometry) -> Result<LatLng, GeoError> {
    match geometry.outer_ring() {
        Some(ring) => ring_centroid(ring),
        None => Err(GeoError::EmptyRing),
    }
}

/// Great-circle distance in meters (haversine).
pub fn distance_m(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Tooltip text for a distance, in kilometers with one decimal.
pub fn format_distance(meters: f64) -> String {
    format!("Distancia: {:.1} km", meters / 1000.0)
}

/// Even-odd test over every ring, so holes are excluded.
pub fn point_in_rings(point: LatLng, rings: &[Ring]) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (ring[i], ring[j]);
            if (pi.lat > point.lat) != (pj.lat > point.lat) {
                let cross_lng = (pj.lng - pi.lng) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lng;
                if point.lng < cross_lng {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}

pub fn point_in_geometry(point: LatLng, geometry: &BoundaryGeometry) -> bool {
    geometry
        .polygons()
        .into_iter()
        .any(|rings| point_in_rings(point, rings))
}

/// Distance from `p` to the segment `a`-`b` in plain 2D (screen space).
pub fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
