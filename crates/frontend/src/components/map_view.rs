use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use tourmap_shared::geo::{BoundaryGeometry, Ring};
use tourmap_shared::highlight::{HighlightLayer, PathStyle};
use tourmap_shared::models::TileLayer;
use tourmap_shared::opinions::escape_html;
use tourmap_shared::projection::{self, Viewport, TILE_SIZE};
use tourmap_shared::selection::{MapEvent, MarkerIcon, SelectionState};
use tourmap_shared::venues::VenueMarker;

use crate::components::venue_popup::VenuePopup;
use crate::coords;

/// Drag threshold in pixels; movement below this is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch drag threshold, larger than the mouse one.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Pick radius around a marker, in screen pixels.
const MARKER_HIT_RADIUS: f64 = 14.0;

/// Pick radius around a travel line, in screen pixels.
const LINE_HIT_TOLERANCE: f64 = 6.0;

/// Wheel movement needed for one zoom step.
const WHEEL_STEP: f64 = 100.0;

const MARKER_DEFAULT_FILL: &str = "#1e5aa8";
const MARKER_SELECTED_FILL: &str = "#d32f2f";
const MARKER_DOT_FILL: &str = "#555555";

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Zoom steps for a wheel movement: at least one level per event.
fn wheel_steps(delta_y: f64) -> i32 {
    let steps = (delta_y.abs() / WHEEL_STEP).round().max(1.0) as i32;
    if delta_y < 0.0 {
        steps
    } else {
        -steps
    }
}

fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Read the container size into the viewport.
fn sync_size(viewport: &mut Signal<Viewport>, container_id: &str) {
    let Some(rect) = coords::container_rect(container_id) else {
        return;
    };
    let (w, h) = (rect.width(), rect.height());
    let current = *viewport.read();
    if (current.width - w).abs() > 0.5 || (current.height - h).abs() > 0.5 {
        let mut vp = viewport.write();
        vp.width = w;
        vp.height = h;
    }
}

/// Marker screen positions, in the same order as `markers`.
fn marker_positions(viewport: &Viewport, markers: &[VenueMarker]) -> Vec<(f64, f64)> {
    markers.iter().map(|m| viewport.to_screen(m.position)).collect()
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

/// Build the overlay SVG content: origin areas, travel lines, then markers.
fn build_svg_content(
    viewport: &Viewport,
    highlights: Option<&HighlightLayer>,
    markers: &[VenueMarker],
    selection: &SelectionState,
) -> String {
    let mut svg = String::with_capacity(8192);
    if let Some(layer) = highlights {
        build_area_paths(&mut svg, viewport, layer);
        build_travel_lines(&mut svg, viewport, layer);
    }
    build_markers(&mut svg, viewport, markers, selection);
    svg
}

fn push_ring(d: &mut String, viewport: &Viewport, ring: &Ring) {
    for (i, p) in ring.iter().enumerate() {
        let (x, y) = viewport.to_screen(*p);
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{cmd}{x:.1},{y:.1}"));
    }
    if !ring.is_empty() {
        d.push('Z');
    }
}

/// SVG path data for a boundary: one subpath per ring, holes included.
fn geometry_path(viewport: &Viewport, geometry: &BoundaryGeometry) -> String {
    let mut d = String::new();
    for polygon in geometry.polygons() {
        for ring in polygon {
            push_ring(&mut d, viewport, ring);
        }
    }
    d
}

fn style_attrs(style: &PathStyle) -> String {
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{}" stroke-opacity="{}""#,
        style.color, style.weight, style.opacity
    );
    if let Some(dash) = style.dash_array {
        attrs.push_str(&format!(r#" stroke-dasharray="{dash}""#));
    }
    attrs
}

fn build_area_paths(svg: &mut String, viewport: &Viewport, layer: &HighlightLayer) {
    for (i, area) in layer.plan.areas.iter().enumerate() {
        let style = layer.area_style(i);
        let d = geometry_path(viewport, &area.geometry);
        let fill = style.color;
        let fill_opacity = style.fill_opacity;
        let stroke = style_attrs(&style);
        let title = escape_html(&area.boundary_name);
        svg.push_str(&format!(
            r#"<path d="{d}" fill="{fill}" fill-opacity="{fill_opacity}" fill-rule="evenodd" {stroke}><title>{title}</title></path>"#
        ));
    }
}

fn build_travel_lines(svg: &mut String, viewport: &Viewport, layer: &HighlightLayer) {
    for (i, line) in layer.plan.lines.iter().enumerate() {
        let style = layer.line_style(i);
        let (x1, y1) = viewport.to_screen(line.from);
        let (x2, y2) = viewport.to_screen(line.to);
        let stroke = style_attrs(&style);
        svg.push_str(&format!(
            r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" fill="none" {stroke}/>"#
        ));
    }
}

fn build_markers(svg: &mut String, viewport: &Viewport, markers: &[VenueMarker], selection: &SelectionState) {
    // Draw in z order so the selected marker ends up on top
    let mut order: Vec<usize> = (0..markers.len()).collect();
    order.sort_by_key(|&i| selection.z_offset(&markers[i].key));

    for i in order {
        let marker = &markers[i];
        let (x, y) = viewport.to_screen(marker.position);
        let title = escape_html(&marker.title);
        svg.push_str(&format!(r#"<g role="img"><title>{title}</title>"#));
        match selection.marker_icon(&marker.key) {
            MarkerIcon::Default => build_pin(svg, x, y, 1.0, MARKER_DEFAULT_FILL),
            MarkerIcon::Selected => build_pin(svg, x, y, 1.4, MARKER_SELECTED_FILL),
            MarkerIcon::Dot => svg.push_str(&format!(
                r#"<circle cx="{x:.1}" cy="{y:.1}" r="5" fill="{MARKER_DOT_FILL}" stroke="white" stroke-width="2"/>"#
            )),
        }
        svg.push_str("</g>");
    }
}

/// Teardrop pin whose tip sits on the venue.
fn build_pin(svg: &mut String, x: f64, y: f64, scale: f64, fill: &str) {
    let r = 8.0 * scale;
    let cy = y - 2.2 * r;
    svg.push_str(&format!(
        r#"<path d="M{x:.1},{y:.1} L{:.1},{:.1} A{r:.1},{r:.1} 0 1 1 {:.1},{:.1} Z" fill="{fill}" stroke="white" stroke-width="2"/>"#,
        x - r * 0.8,
        cy + r * 0.6,
        x + r * 0.8,
        cy + r * 0.6,
    ));
    svg.push_str(&format!(
        r#"<circle cx="{x:.1}" cy="{cy:.1}" r="{:.1}" fill="white"/>"#,
        r * 0.35
    ));
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Slippy map with an SVG overlay. Venue markers, selection and highlights
/// are optional so the same view serves the opinions page.
#[component]
pub fn MapView(
    container_id: String,
    layer: TileLayer,
    #[props(default)] markers: Vec<VenueMarker>,
    #[props(default)] selection: SelectionState,
    highlights: Option<Signal<HighlightLayer>>,
    on_event: Option<EventHandler<MapEvent>>,
) -> Element {
    let mut viewport = use_signal(|| {
        Viewport::new(layer.center, layer.zoom, layer.min_zoom, layer.max_zoom)
    });

    // Pointer position inside the container, for the hover tooltip
    let mut cursor = use_signal(|| None::<(f64, f64)>);

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_last = use_signal(|| (0.0_f64, 0.0_f64));

    // Touch state
    let mut touch_start_pos = use_signal(|| None::<(f64, f64)>);
    let mut touch_last = use_signal(|| (0.0_f64, 0.0_f64));
    let mut touch_did_pan = use_signal(|| false);

    let vp = *viewport.read();
    let layer_snapshot = highlights.map(|h| h.read().clone());

    let svg_content = build_svg_content(&vp, layer_snapshot.as_ref(), &markers, &selection);
    let svg_html = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="position:absolute;top:0;left:0;pointer-events:none;">{svg_content}</svg>"#,
        w = vp.width,
        h = vp.height,
    );

    let tiles: Vec<(String, f64, f64)> = vp
        .visible_tiles()
        .into_iter()
        .map(|t| (projection::tile_url(&layer.url_template, t.tile), t.left, t.top))
        .collect();

    let tooltip = layer_snapshot
        .as_ref()
        .and_then(|l| l.tooltip().map(str::to_string))
        .zip(*cursor.read())
        .map(|(text, (x, y))| (text, x + 12.0, y - 12.0));

    let popup = selection
        .open_popup()
        .and_then(|key| markers.iter().find(|m| m.key == key))
        .map(|m| {
            let (x, y) = vp.to_screen(m.position);
            (m.clone(), x, y)
        });

    let container_class = if *is_dragging.read() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    // Click dispatch shared by mouse and touch: markers first, else the map
    let markers_for_click = markers.clone();
    let dispatch_click = move |point: (f64, f64)| {
        let Some(handler) = on_event else { return };
        let positions = marker_positions(&viewport.read(), &markers_for_click);
        match coords::find_nearest(&positions, point, MARKER_HIT_RADIUS) {
            Some(i) => handler.call(MapEvent::MarkerClicked(markers_for_click[i].key.clone())),
            None => handler.call(MapEvent::MapClicked),
        }
    };
    let dispatch_mouse_click = dispatch_click.clone();
    let dispatch_touch_click = dispatch_click;

    let id_mount = container_id.clone();
    let id_wheel = container_id.clone();
    let id_down = container_id.clone();
    let id_move = container_id.clone();
    let id_up = container_id.clone();
    let id_touch = container_id.clone();
    let id_touch_end = container_id.clone();

    rsx! {
        div {
            id: "{container_id}",
            class: "{container_class}",

            onmounted: move |_| sync_size(&mut viewport, &id_mount),

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                sync_size(&mut viewport, &id_wheel);
                let client = evt.data().client_coordinates();
                let Some(point) = coords::client_to_container_in(&id_wheel, client.x, client.y) else {
                    return;
                };
                let steps = wheel_steps(wheel_delta_y(evt.data().delta()));
                viewport.write().zoom_around(steps, point);
            },

            onmousedown: move |evt: Event<MouseData>| {
                // Only track drag/click for left mouse button
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                sync_size(&mut viewport, &id_down);
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_last.set((client.x, client.y));
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();

                if *is_dragging.read() {
                    let start = *drag_start.read();
                    let dx = client.x - start.0;
                    let dy = client.y - start.1;
                    if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                        did_drag.set(true);
                    }
                    if *did_drag.read() {
                        let last = *drag_last.read();
                        viewport.write().pan_by(client.x - last.0, client.y - last.1);
                        drag_last.set((client.x, client.y));
                        return;
                    }
                }

                // Hover: lines win over areas
                let Some(mut overlay) = highlights else { return };
                let Some(point) = coords::client_to_container_in(&id_move, client.x, client.y) else {
                    return;
                };
                let vp = *viewport.read();
                let at = coords::container_to_lat_lng(&vp, point);
                let target = overlay.read().hit_test(
                    at,
                    |line| coords::line_distance_px(&vp, point, line),
                    LINE_HIT_TOLERANCE,
                );
                if overlay.read().hovered != target {
                    overlay.write().set_hover(target);
                }
                if target.is_some() {
                    cursor.set(Some(point));
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_dragging = *is_dragging.read();
                let was_drag = *did_drag.read();
                is_dragging.set(false);

                // A mouseup without drag movement = a click
                if was_dragging && !was_drag {
                    let client = evt.client_coordinates();
                    if let Some(point) = coords::client_to_container_in(&id_up, client.x, client.y) {
                        dispatch_mouse_click(point);
                    }
                }
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
                cursor.set(None);
                if let Some(mut overlay) = highlights {
                    if overlay.read().hovered.is_some() {
                        overlay.write().set_hover(None);
                    }
                }
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                let touches = evt.data().touches();
                if touches.len() == 1 {
                    sync_size(&mut viewport, &id_touch);
                    let c = touches[0].client_coordinates();
                    touch_start_pos.set(Some((c.x, c.y)));
                    touch_last.set((c.x, c.y));
                    touch_did_pan.set(false);
                } else {
                    touch_start_pos.set(None);
                    touch_did_pan.set(true);
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                let touches = evt.data().touches();
                if touches.len() != 1 {
                    return;
                }
                evt.prevent_default();
                let c = touches[0].client_coordinates();
                let cur = (c.x, c.y);
                let Some(start) = *touch_start_pos.read() else { return };
                if !*touch_did_pan.read() && point_distance(start, cur) > TOUCH_DRAG_THRESHOLD {
                    touch_did_pan.set(true);
                }
                if *touch_did_pan.read() {
                    let last = *touch_last.read();
                    viewport.write().pan_by(cur.0 - last.0, cur.1 - last.1);
                    touch_last.set(cur);
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                let remaining = evt.data().touches().len();
                // Single-finger tap: no pan and all fingers up
                if remaining == 0 && !*touch_did_pan.read() {
                    if let Some(start) = *touch_start_pos.read() {
                        evt.prevent_default();
                        if let Some(point) = coords::client_to_container_in(&id_touch_end, start.0, start.1) {
                            dispatch_touch_click(point);
                        }
                    }
                }
                if remaining == 0 {
                    touch_start_pos.set(None);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                touch_start_pos.set(None);
                touch_did_pan.set(false);
            },

            div { class: "map-tiles",
                for (url, left, top) in tiles {
                    img {
                        key: "{url}-{left}-{top}",
                        class: "map-tile",
                        src: "{url}",
                        draggable: "false",
                        alt: "",
                        style: "left:{left}px;top:{top}px;width:{TILE_SIZE}px;height:{TILE_SIZE}px;",
                    }
                }
            }

            div {
                class: "map-overlay",
                dangerous_inner_html: "{svg_html}",
            }

            if let Some((text, x, y)) = tooltip {
                div {
                    class: "map-tooltip",
                    style: "left:{x}px;top:{y}px;",
                    "{text}"
                }
            }

            if let Some((marker, x, y)) = popup {
                div {
                    class: "map-popup",
                    style: "left:{x}px;top:{y}px;",
                    // Keep clicks inside the popup away from the map
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onmouseup: move |evt: Event<MouseData>| evt.stop_propagation(),
                    ontouchstart: move |evt: Event<TouchData>| evt.stop_propagation(),
                    ontouchend: move |evt: Event<TouchData>| evt.stop_propagation(),
                    VenuePopup { marker }
                }
            }

            div { class: "map-attribution", "{layer.attribution}" }
        }
    }
}
