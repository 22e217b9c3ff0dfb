//! Web Mercator math for a slippy-map tile layer.
//!
//! World pixel space at zoom `z` is `256 * 2^z` pixels square, origin at the
//! top-left (lng -180, lat ~85.05).

use crate::models::LatLng;

pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Deepest zoom any tile provider serves. Keeps `2^zoom` tile counts in range.
pub const MAX_TILE_ZOOM: u8 = 22;

const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Project a coordinate into world pixels at `zoom`.
pub fn project(p: LatLng, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (p.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    LatLng { lat, lng }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRef {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

/// A tile placed on screen, top-left corner in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub tile: TileRef,
    pub left: f64,
    pub top: f64,
}

/// Fill `{s}`, `{z}`, `{x}` and `{y}` in a tile URL template.
pub fn tile_url(template: &str, tile: TileRef) -> String {
    let sub = SUBDOMAINS[((tile.x + tile.y) as usize) % SUBDOMAINS.len()];
    template
        .replace("{s}", sub)
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

/// The visible part of the map: center, integer zoom and container size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Out-of-order or too-deep bounds are pulled into range rather than
    /// trusted.
    pub fn new(center: LatLng, zoom: u8, min_zoom: u8, max_zoom: u8) -> Self {
        let max_zoom = max_zoom.min(MAX_TILE_ZOOM);
        let min_zoom = min_zoom.min(max_zoom);
        Viewport {
            center,
            zoom: zoom.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            width: 0.0,
            height: 0.0,
        }
    }

    fn top_left(&self) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom as f64);
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    /// Container pixel position of a coordinate.
    pub fn to_screen(&self, p: LatLng) -> (f64, f64) {
        let (x, y) = project(p, self.zoom as f64);
        let (ox, oy) = self.top_left();
        (x - ox, y - oy)
    }

    /// Coordinate under a container pixel.
    pub fn from_screen(&self, sx: f64, sy: f64) -> LatLng {
        let (ox, oy) = self.top_left();
        unproject(ox + sx, oy + sy, self.zoom as f64)
    }

    /// Move the view by a screen-space drag delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = project(self.center, self.zoom as f64);
        let size = world_size(self.zoom as f64);
        let y = (cy - dy).clamp(0.0, size);
        self.center = unproject(cx - dx, y, self.zoom as f64);
        self.center.lng = wrap_lng(self.center.lng);
    }

    /// Change zoom by `steps` levels keeping the point under `cursor` fixed.
    pub fn zoom_around(&mut self, steps: i32, cursor: (f64, f64)) {
        let new_zoom = (self.zoom as i32 + steps).clamp(self.min_zoom as i32, self.max_zoom as i32) as u8;
        if new_zoom == self.zoom {
            return;
        }
        let anchor = self.from_screen(cursor.0, cursor.1);
        self.zoom = new_zoom;
        let (ax, ay) = project(anchor, new_zoom as f64);
        let cx = ax - cursor.0 + self.width / 2.0;
        let cy = ay - cursor.1 + self.height / 2.0;
        self.center = unproject(cx, cy, new_zoom as f64);
    }

    /// Tiles covering the container, with their screen offsets.
    pub fn visible_tiles(&self) -> Vec<PlacedTile> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec::new();
        }
        let (ox, oy) = self.top_left();
        let count = 1i64 << self.zoom;
        let x0 = (ox / TILE_SIZE).floor() as i64;
        let x1 = ((ox + self.width) / TILE_SIZE).floor() as i64;
        let y0 = ((oy / TILE_SIZE).floor() as i64).max(0);
        let y1 = (((oy + self.height) / TILE_SIZE).floor() as i64).min(count - 1);

        let mut tiles = Vec::new();
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                tiles.push(PlacedTile {
                    tile: TileRef {
                        x: tx.rem_euclid(count) as u32,
                        y: ty as u32,
                        z: self.zoom,
                    },
                    left: tx as f64 * TILE_SIZE - ox,
                    top: ty as f64 * TILE_SIZE - oy,
                });
            }
        }
        tiles
    }
}

fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut vp = Viewport::new(LatLng::new(40.0, -4.0), 6, 3, 18);
        vp.width = 800.0;
        vp.height = 600.0;
        vp
    }

    #[test]
    fn test_project_origin() {
        let (x, y) = project(LatLng::new(0.0, 0.0), 0.0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let p = LatLng::new(40.4168, -3.7038);
        let (x, y) = project(p, 6.0);
        let back = unproject(x, y, 6.0);
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn test_center_maps_to_container_middle() {
        let vp = viewport();
        let (sx, sy) = vp.to_screen(vp.center);
        assert!((sx - 400.0).abs() < 1e-6);
        assert!((sy - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_screen_inverts_to_screen() {
        let vp = viewport();
        let p = LatLng::new(41.38, 2.17);
        let (sx, sy) = vp.to_screen(p);
        let back = vp.from_screen(sx, sy);
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn test_pan_moves_content_with_drag() {
        let mut vp = viewport();
        let p = LatLng::new(41.38, 2.17);
        let (sx, sy) = vp.to_screen(p);
        vp.pan_by(50.0, -20.0);
        let (nx, ny) = vp.to_screen(p);
        assert!((nx - (sx + 50.0)).abs() < 1e-6);
        assert!((ny - (sy - 20.0)).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_around_keeps_cursor_point() {
        let mut vp = viewport();
        let cursor = (600.0, 150.0);
        let before = vp.from_screen(cursor.0, cursor.1);
        vp.zoom_around(1, cursor);
        assert_eq!(vp.zoom, 7);
        let after = vp.from_screen(cursor.0, cursor.1);
        assert!((before.lat - after.lat).abs() < 1e-6);
        assert!((before.lng - after.lng).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = viewport();
        vp.zoom_around(-10, (400.0, 300.0));
        assert_eq!(vp.zoom, 3);
        vp.zoom_around(100, (400.0, 300.0));
        assert_eq!(vp.zoom, 18);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let vp = Viewport::new(LatLng::new(40.0, -4.0), 6, 18, 3);
        assert_eq!((vp.min_zoom, vp.max_zoom, vp.zoom), (3, 3, 3));
    }

    #[test]
    fn test_deep_zoom_is_capped() {
        let mut vp = Viewport::new(LatLng::new(40.0, -4.0), 70, 3, 200);
        assert_eq!(vp.zoom, MAX_TILE_ZOOM);
        vp.width = 800.0;
        vp.height = 600.0;
        assert!(!vp.visible_tiles().is_empty());
    }

    #[test]
    fn test_visible_tiles_cover_container() {
        let vp = viewport();
        let tiles = vp.visible_tiles();
        assert!(!tiles.is_empty());
        let min_left = tiles.iter().map(|t| t.left).fold(f64::INFINITY, f64::min);
        let max_right = tiles.iter().map(|t| t.left + TILE_SIZE).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_left <= 0.0);
        assert!(max_right >= 800.0);
        assert!(tiles.iter().all(|t| t.tile.z == 6 && t.tile.x < 64 && t.tile.y < 64));
    }

    #[test]
    fn test_visible_tiles_empty_without_size() {
        let vp = Viewport::new(LatLng::new(0.0, 0.0), 2, 2, 6);
        assert!(vp.visible_tiles().is_empty());
    }

    #[test]
    fn test_tile_url_fills_placeholders() {
        let url = tile_url(
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileRef { x: 31, y: 24, z: 6 },
        );
        assert_eq!(url, "https://b.tile.openstreetmap.org/6/31/24.png");
    }
}
