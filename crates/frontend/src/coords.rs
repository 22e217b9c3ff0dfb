use tourmap_shared::geo;
use tourmap_shared::highlight::TravelLine;
use tourmap_shared::models::LatLng;
use tourmap_shared::projection::Viewport;

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Get the bounding client rect of a container element.
pub fn container_rect(container_id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    Some(element.get_bounding_client_rect())
}

/// Container-relative position of a client point, using the live element rect.
pub fn client_to_container_in(container_id: &str, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
    let rect = container_rect(container_id)?;
    Some(client_to_container(client_x, client_y, rect.left(), rect.top()))
}

/// Coordinate under a container pixel.
pub fn container_to_lat_lng(viewport: &Viewport, point: (f64, f64)) -> LatLng {
    viewport.from_screen(point.0, point.1)
}

/// On-screen distance from a container pixel to a travel line.
pub fn line_distance_px(viewport: &Viewport, point: (f64, f64), line: &TravelLine) -> f64 {
    let a = viewport.to_screen(line.from);
    let b = viewport.to_screen(line.to);
    geo::distance_to_segment(point, a, b)
}

/// Index of the position nearest to `click` within `threshold` pixels.
pub fn find_nearest(positions: &[(f64, f64)], click: (f64, f64), threshold: f64) -> Option<usize> {
    let mut best_idx = None;
    let mut best_dist = threshold;
    for (i, pos) in positions.iter().enumerate() {
        let dx = pos.0 - click.0;
        let dy = pos.1 - click.1;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < best_dist {
            best_dist = dist;
            best_idx = Some(i);
        }
    }
    best_idx
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
    fn test_client_to_container_origin() {
        let (x, y) = client_to_container(100.0, 200.0, 100.0, 200.0);
        assert!((x - 0.0).abs() < 1e-9);
        assert!((y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_client_to_container_offset() {
        let (x, y) = client_to_container(450.0, 350.0, 320.0, 50.0);
        assert!((x - 130.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_center_is_view_center() {
        let vp = viewport();
        let p = container_to_lat_lng(&vp, (400.0, 300.0));
        assert!((p.lat - 40.0).abs() < 1e-9);
        assert!((p.lng - -4.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_distance_px_on_and_off_line() {
        let vp = viewport();
        let line = TravelLine {
            from: LatLng::new(40.0, -6.0),
            to: LatLng::new(40.0, -2.0),
            tooltip: String::new(),
        };
        let on = vp.to_screen(LatLng::new(40.0, -4.0));
        assert!(line_distance_px(&vp, on, &line) < 1e-6);
        let off = (on.0, on.1 + 10.0);
        assert!((line_distance_px(&vp, off, &line) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_find_nearest_within_threshold() {
        let positions = vec![(100.0, 100.0), (200.0, 200.0)];
        assert_eq!(find_nearest(&positions, (101.0, 101.0), 30.0), Some(0));
        assert_eq!(find_nearest(&positions, (199.0, 199.0), 30.0), Some(1));
    }

    #[test]
    fn test_find_nearest_outside_threshold() {
        let positions = vec![(100.0, 100.0)];
        assert_eq!(find_nearest(&positions, (200.0, 200.0), 30.0), None);
    }

    #[test]
    fn test_find_nearest_picks_closest() {
        let positions = vec![(100.0, 100.0), (110.0, 110.0)];
        assert_eq!(find_nearest(&positions, (108.0, 108.0), 30.0), Some(1));
        assert_eq!(find_nearest(&positions, (102.0, 102.0), 30.0), Some(0));
    }
}
