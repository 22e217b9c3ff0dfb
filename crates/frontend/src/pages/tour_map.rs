use dioxus::logger::tracing;
use dioxus::prelude::*;
use tourmap_shared::highlight::{plan_highlights, HighlightLayer, HighlightMode};
use tourmap_shared::models::{SiteConfig, TravelRow, VenueRow};
use tourmap_shared::relay::RelayQueue;
use tourmap_shared::selection::{transition, Effect, MapEvent, SelectionState};
use tourmap_shared::venues::{destination_cities, group_venues};

use crate::api;
use crate::components::map_view::MapView;
use crate::components::relay_status::RelayStatus;
use crate::components::travel_form::TravelForm;
use crate::notify;
use crate::Route;

const MAP_CONTAINER_ID: &str = "tour-map";

const LOAD_ERROR: &str = "Error al cargar datos. Revisa la consola.";
const BOUNDARY_ERROR: &str = "No se pudieron cargar los límites geográficos.";

#[derive(Debug, Clone, PartialEq)]
struct TourData {
    site: SiteConfig,
    venues: Vec<VenueRow>,
    travels: Vec<TravelRow>,
}

async fn load_tour() -> Result<TourData, String> {
    let site = api::fetch_site_config().await?;
    let venues = api::fetch_venues(&site.sheets.venues).await?;
    let travels = api::fetch_travels(&site.sheets.travels).await?;
    tracing::info!(venues = venues.len(), travels = travels.len(), "Tour data loaded");
    Ok(TourData { site, venues, travels })
}

/// Signals shared by the selection handler and the highlight task.
#[derive(Clone, Copy)]
struct MapState {
    tour: Signal<Option<TourData>>,
    selection: Signal<SelectionState>,
    mode: Signal<HighlightMode>,
    highlights: Signal<HighlightLayer>,
    notice: Signal<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HighlightOutcome {
    Apply,
    ShowError,
    Drop,
}

/// What a finished boundary load may touch. Results of a superseded
/// selection, successful or not, leave the page alone.
fn highlight_outcome(current: bool, loaded: bool) -> HighlightOutcome {
    match (current, loaded) {
        (false, _) => HighlightOutcome::Drop,
        (true, true) => HighlightOutcome::Apply,
        (true, false) => HighlightOutcome::ShowError,
    }
}

impl MapState {
    fn handle(mut self, event: MapEvent) {
        let (next, effects) = transition(&self.selection.read(), event);
        self.selection.set(next);
        for effect in effects {
            match effect {
                // The popup is drawn from the selection itself
                Effect::OpenPopup(_) | Effect::ClosePopup(_) => {}
                Effect::ClearHighlights => self.highlights.write().clear(),
                Effect::RequestHighlights { city, generation } => {
                    self.request_highlights(city, generation)
                }
            }
        }
    }

    fn request_highlights(self, city: String, generation: u64) {
        let Some(urls) = self.tour.read().as_ref().map(|t| t.site.boundaries.clone()) else {
            return;
        };
        let MapState {
            tour,
            selection,
            mode,
            mut highlights,
            mut notice,
        } = self;

        spawn(async move {
            let loaded = api::fetch_boundaries(&urls).await;
            let current = selection.read().is_current(generation);
            let index = match (highlight_outcome(current, loaded.is_ok()), loaded) {
                (HighlightOutcome::Apply, Ok(index)) => index,
                (HighlightOutcome::ShowError, Err(e)) => {
                    tracing::error!("Failed to load boundaries: {}", e);
                    notice.set(Some(BOUNDARY_ERROR.to_string()));
                    return;
                }
                (_, loaded) => {
                    if let Err(e) = loaded {
                        tracing::warn!("Boundary load failed for a superseded selection: {}", e);
                    }
                    tracing::debug!(city, generation, "Dropping stale highlights");
                    return;
                }
            };
            let plan = {
                let tour = tour.read();
                let Some(data) = tour.as_ref() else { return };
                plan_highlights(&city, &data.venues, &data.travels, &index, mode())
            };
            tracing::debug!(city, areas = plan.areas.len(), lines = plan.lines.len(), "Highlights ready");
            notice.set(None);
            highlights.set(HighlightLayer::new(plan));
        });
    }
}

/// Venue map with travel-origin highlights.
#[component]
pub fn TourMap() -> Element {
    let mut tour = use_signal(|| None::<TourData>);
    let mut load_failed = use_signal(|| false);
    let selection = use_signal(SelectionState::new);
    let mut mode = use_signal(HighlightMode::default);
    let highlights = use_signal(HighlightLayer::default);
    let mut notice = use_signal(|| None::<String>);
    let mut show_travel_form = use_signal(|| false);
    let queue = use_context::<Signal<RelayQueue>>();

    let _loader = use_resource(move || async move {
        match load_tour().await {
            Ok(data) => tour.set(Some(data)),
            Err(e) => {
                tracing::error!("Failed to load tour data: {}", e);
                load_failed.set(true);
                notify::alert(LOAD_ERROR);
            }
        }
    });

    let state = MapState {
        tour,
        selection,
        mode,
        highlights,
        notice,
    };

    let Some(data) = tour.read().clone() else {
        return rsx! {
            div { class: "page tour-page",
                if load_failed() {
                    p { class: "load-error", "{LOAD_ERROR}" }
                } else {
                    p { class: "loading", "Cargando…" }
                }
            }
        };
    };

    let markers = group_venues(&data.venues);
    let destinations = destination_cities(&data.venues);
    let show_lines = mode() == HighlightMode::AreasAndLines;

    rsx! {
        div { class: "page tour-page",
            header { class: "page-header",
                h1 { "Mapa de la gira" }
                nav {
                    Link { to: Route::Opinions {}, "Opiniones" }
                }
            }

            div { class: "map-toolbar",
                label {
                    input {
                        r#type: "checkbox",
                        checked: show_lines,
                        onchange: move |evt: Event<FormData>| {
                            mode.set(if evt.checked() {
                                HighlightMode::AreasAndLines
                            } else {
                                HighlightMode::Areas
                            });
                            // Redraw the current selection in the new mode
                            let current = selection
                                .read()
                                .selected()
                                .map(|city| (city.to_string(), selection.read().generation()));
                            if let Some((city, generation)) = current {
                                state.request_highlights(city, generation);
                            }
                        },
                    }
                    " Mostrar rutas"
                }
                button {
                    id: "btn-add-travel",
                    onclick: move |_| show_travel_form.set(true),
                    "Añadir viaje"
                }
            }

            if let Some(msg) = notice() {
                div { class: "map-notice", role: "status",
                    "{msg}"
                    button {
                        class: "close-btn",
                        aria_label: "Cerrar",
                        onclick: move |_| notice.set(None),
                        "×"
                    }
                }
            }

            MapView {
                container_id: MAP_CONTAINER_ID.to_string(),
                layer: data.site.venue_map.clone(),
                markers,
                selection: selection(),
                highlights: Some(highlights),
                on_event: move |event: MapEvent| state.handle(event),
            }

            TravelForm {
                show: show_travel_form,
                destinations,
                relay: data.site.travel_relay.clone(),
                queue,
            }

            RelayStatus { queue }
        }
    }
}
