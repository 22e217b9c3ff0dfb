//! Origin areas and travel lines for a selected destination.

use crate::boundary::{BoundaryIndex, BoundaryKind};
use crate::geo::{self, BoundaryGeometry};
use crate::models::{city_key, LatLng, TravelRow, VenueRow};
use crate::venues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightMode {
    /// Shaded origin boundaries only.
    #[default]
    Areas,
    /// Boundaries plus a dashed line from each origin to the venue.
    AreasAndLines,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub dash_array: Option<&'static str>,
}

pub const AREA_STYLE: PathStyle = PathStyle {
    color: "#d32f2f",
    weight: 3.0,
    opacity: 1.0,
    fill_opacity: 0.3,
    dash_array: None,
};

pub const AREA_HOVER_STYLE: PathStyle = PathStyle {
    fill_opacity: 0.5,
    ..AREA_STYLE
};

pub const LINE_STYLE: PathStyle = PathStyle {
    color: "#d32f2f",
    weight: 2.0,
    opacity: 0.7,
    fill_opacity: 0.0,
    dash_array: Some("5, 10"),
};

pub const LINE_HOVER_STYLE: PathStyle = PathStyle {
    color: "#b71c1c",
    weight: 4.0,
    opacity: 1.0,
    ..LINE_STYLE
};

#[derive(Debug, Clone, PartialEq)]
pub struct OriginArea {
    /// Origin as written in the travel record.
    pub origin: String,
    pub boundary_name: String,
    pub kind: BoundaryKind,
    pub geometry: BoundaryGeometry,
    pub centroid: Option<LatLng>,
    /// Distance tooltip; absent when the centroid could not be resolved.
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TravelLine {
    pub from: LatLng,
    pub to: LatLng,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlightPlan {
    pub destination: Option<LatLng>,
    pub areas: Vec<OriginArea>,
    pub lines: Vec<TravelLine>,
}

impl HighlightPlan {
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty() && self.lines.is_empty()
    }
}

/// Build the highlight layers for a destination city.
///
/// Origins with no matching boundary are skipped without feedback.
pub fn plan_highlights(
    city: &str,
    venue_rows: &[VenueRow],
    travels: &[TravelRow],
    boundaries: &BoundaryIndex,
    mode: HighlightMode,
) -> HighlightPlan {
    let Some(destination) = venues::find_destination(venue_rows, city) else {
        tracing::debug!(city, "No destination venue with coordinates");
        return HighlightPlan::default();
    };
    let key = city_key(city);

    let mut plan = HighlightPlan {
        destination: Some(destination),
        ..Default::default()
    };

    for travel in travels.iter().filter(|t| city_key(&t.destination) == key) {
        let Some(feature) = boundaries.resolve(&travel.origin) else {
            tracing::debug!(origin = %travel.origin, "Origin has no boundary");
            continue;
        };

        let centroid = geo::centroid(&feature.geometry).ok();
        let tooltip = centroid.map(|c| geo::format_distance(geo::distance_m(c, destination)));

        if mode == HighlightMode::AreasAndLines {
            if let (Some(from), Some(text)) = (centroid, tooltip.clone()) {
                plan.lines.push(TravelLine {
                    from,
                    to: destination,
                    tooltip: text,
                });
            }
        }

        plan.areas.push(OriginArea {
            origin: travel.origin.trim().to_string(),
            boundary_name: feature.name.clone(),
            kind: feature.kind,
            geometry: feature.geometry.clone(),
            centroid,
            tooltip,
        });
    }

    plan
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Area(usize),
    Line(usize),
}

/// The drawn highlight layer plus its hover state. Replaced wholesale on
/// every selection change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlightLayer {
    pub plan: HighlightPlan,
    pub hovered: Option<HoverTarget>,
}

impl HighlightLayer {
    pub fn new(plan: HighlightPlan) -> Self {
        HighlightLayer { plan, hovered: None }
    }

    pub fn clear(&mut self) {
        self.plan = HighlightPlan::default();
        self.hovered = None;
    }

    pub fn area_style(&self, index: usize) -> PathStyle {
        if self.hovered == Some(HoverTarget::Area(index)) {
            AREA_HOVER_STYLE
        } else {
            AREA_STYLE
        }
    }

    pub fn line_style(&self, index: usize) -> PathStyle {
        if self.hovered == Some(HoverTarget::Line(index)) {
            LINE_HOVER_STYLE
        } else {
            LINE_STYLE
        }
    }

    /// Tooltip for the hovered element, if it has one.
    pub fn tooltip(&self) -> Option<&str> {
        match self.hovered? {
            HoverTarget::Area(i) => self.plan.areas.get(i)?.tooltip.as_deref(),
            HoverTarget::Line(i) => self.plan.lines.get(i).map(|l| l.tooltip.as_str()),
        }
    }

    /// Find what lies under the pointer. Lines take precedence over areas;
    /// `line_distance` reports the on-screen distance from the pointer to a
    /// line, and `tolerance` is the pick radius in the same units.
    pub fn hit_test<F>(&self, point: LatLng, line_distance: F, tolerance: f64) -> Option<HoverTarget>
    where
        F: Fn(&TravelLine) -> f64,
    {
        let line_hit = self
            .plan
            .lines
            .iter()
            .enumerate()
            .map(|(i, l)| (i, line_distance(l)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| HoverTarget::Line(i));

        line_hit.or_else(|| {
            self.plan
                .areas
                .iter()
                .rposition(|a| geo::point_in_geometry(point, &a.geometry))
                .map(HoverTarget::Area)
        })
    }

    /// Update the hover target; returns whether anything changed.
    pub fn set_hover(&mut self, target: Option<HoverTarget>) -> bool {
        if self.hovered == target {
            return false;
        }
        self.hovered = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::tests::index;

    fn venues() -> Vec<VenueRow> {
        vec![VenueRow {
            city: "Barcelona".to_string(),
            venue_name: "Liceu".to_string(),
            latitude: "41.38".to_string(),
            longitude: "2.17".to_string(),
            ..Default::default()
        }]
    }

    fn travel(origin: &str, destination: &str) -> TravelRow {
        TravelRow {
            origin: origin.to_string(),
            destination: destination.to_string(),
        }
    }

    fn travels() -> Vec<TravelRow> {
        vec![
            travel("Madrid", "Barcelona"),
            travel("France", " barcelona "),
            travel("Atlantis", "Barcelona"),
            travel("Sevilla", "Bilbao"),
        ]
    }

    #[test]
    fn test_filters_by_destination_and_skips_unmatched() {
        let plan = plan_highlights("barcelona", &venues(), &travels(), &index(), HighlightMode::Areas);
        let names: Vec<&str> = plan.areas.iter().map(|a| a.boundary_name.as_str()).collect();
        assert_eq!(names, vec!["Madrid", "France"]);
        assert!(plan.lines.is_empty());
    }

    #[test]
    fn test_province_preferred_over_country() {
        let plan = plan_highlights("Barcelona", &venues(), &travels(), &index(), HighlightMode::Areas);
        assert_eq!(plan.areas[0].kind, BoundaryKind::Province);
    }

    #[test]
    fn test_area_tooltip_uses_centroid_distance() {
        let plan = plan_highlights("Barcelona", &venues(), &travels(), &index(), HighlightMode::Areas);
        let madrid = &plan.areas[0];
        let c = madrid.centroid.unwrap();
        let expected = geo::format_distance(geo::distance_m(c, LatLng::new(41.38, 2.17)));
        assert_eq!(madrid.tooltip.as_deref(), Some(expected.as_str()));
        assert!(expected.ends_with(" km"));
    }

    #[test]
    fn test_lines_mode_adds_one_line_per_area() {
        let plan = plan_highlights(
            "Barcelona",
            &venues(),
            &travels(),
            &index(),
            HighlightMode::AreasAndLines,
        );
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].to, LatLng::new(41.38, 2.17));
        assert_eq!(plan.lines[0].from, plan.areas[0].centroid.unwrap());
    }

    #[test]
    fn test_unknown_destination_is_empty() {
        let plan = plan_highlights("Bilbao", &venues(), &travels(), &index(), HighlightMode::Areas);
        assert!(plan.is_empty());
        assert!(plan.destination.is_none());
    }

    #[test]
    fn test_hover_styles_and_tooltip() {
        let plan = plan_highlights(
            "Barcelona",
            &venues(),
            &travels(),
            &index(),
            HighlightMode::AreasAndLines,
        );
        let mut layer = HighlightLayer::new(plan);
        assert_eq!(layer.area_style(0).fill_opacity, 0.3);
        assert!(layer.tooltip().is_none());

        assert!(layer.set_hover(Some(HoverTarget::Area(0))));
        assert_eq!(layer.area_style(0).fill_opacity, 0.5);
        assert_eq!(layer.area_style(1).fill_opacity, 0.3);
        assert!(layer.tooltip().unwrap().starts_with("Distancia: "));
        assert!(!layer.set_hover(Some(HoverTarget::Area(0))));

        layer.set_hover(Some(HoverTarget::Line(1)));
        assert_eq!(layer.line_style(1).color, "#b71c1c");
        assert_eq!(layer.line_style(0).color, "#d32f2f");

        layer.set_hover(None);
        assert_eq!(layer.area_style(0), AREA_STYLE);
        assert!(layer.tooltip().is_none());
    }

    #[test]
    fn test_hit_test_prefers_lines() {
        let plan = plan_highlights(
            "Barcelona",
            &venues(),
            &travels(),
            &index(),
            HighlightMode::AreasAndLines,
        );
        let layer = HighlightLayer::new(plan);
        let inside_madrid = LatLng::new(40.5, -3.5);

        let hit = layer.hit_test(inside_madrid, |_| 100.0, 5.0);
        assert_eq!(hit, Some(HoverTarget::Area(0)));

        let hit = layer.hit_test(inside_madrid, |l| if l.from.lat > 42.0 { 2.0 } else { 100.0 }, 5.0);
        assert_eq!(hit, Some(HoverTarget::Line(1)));

        let hit = layer.hit_test(LatLng::new(-30.0, 150.0), |_| 100.0, 5.0);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_clear_resets_everything() {
        let plan = plan_highlights("Barcelona", &venues(), &travels(), &index(), HighlightMode::Areas);
        let mut layer = HighlightLayer::new(plan);
        layer.set_hover(Some(HoverTarget::Area(0)));
        layer.clear();
        assert!(layer.plan.is_empty());
        assert!(layer.hovered.is_none());
        layer.clear();
        assert_eq!(layer, HighlightLayer::default());
    }
}
