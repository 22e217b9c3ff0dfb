use dioxus::logger::tracing;
use dioxus::prelude::*;
use tourmap_shared::models::{OpinionRow, SiteConfig, VenueRow};
use tourmap_shared::opinions::{concert_choices, countries, filter_by_country};
use tourmap_shared::relay::RelayQueue;

use crate::api;
use crate::components::map_view::MapView;
use crate::components::opinion_detail::OpinionDetail;
use crate::components::opinion_feed::OpinionFeed;
use crate::components::opinion_form::OpinionForm;
use crate::components::relay_status::RelayStatus;
use crate::notify;
use crate::Route;

const MAP_CONTAINER_ID: &str = "opinions-map";

const LOAD_ERROR: &str = "Error al cargar datos. Revisa la consola.";

#[derive(Debug, Clone, PartialEq)]
struct FeedData {
    site: SiteConfig,
    opinions: Vec<OpinionRow>,
    venues: Vec<VenueRow>,
}

async fn load_feed() -> Result<FeedData, String> {
    let site = api::fetch_site_config().await?;
    let opinions = api::fetch_opinions(&site.sheets.opinions).await?;
    let venues = api::fetch_venues(&site.sheets.venues).await?;
    tracing::info!(opinions = opinions.len(), venues = venues.len(), "Feed data loaded");
    Ok(FeedData { site, opinions, venues })
}

/// Opinion wall over a world map, with the country filter and the form.
#[component]
pub fn Opinions() -> Element {
    let mut feed = use_signal(|| None::<FeedData>);
    let mut load_failed = use_signal(|| false);
    let mut country_filter = use_signal(String::new);
    let selected = use_signal(|| None::<OpinionRow>);
    let mut show_form = use_signal(|| false);
    let queue = use_context::<Signal<RelayQueue>>();

    let _loader = use_resource(move || async move {
        match load_feed().await {
            Ok(data) => feed.set(Some(data)),
            Err(e) => {
                tracing::error!("Failed to load opinions: {}", e);
                load_failed.set(true);
                notify::alert(LOAD_ERROR);
            }
        }
    });

    let Some(data) = feed.read().clone() else {
        return rsx! {
            div { class: "page opinions-page",
                if load_failed() {
                    p { class: "load-error", "{LOAD_ERROR}" }
                } else {
                    p { class: "loading", "Cargando…" }
                }
            }
        };
    };

    let country_list = countries(&data.opinions);
    let filter = country_filter();
    let visible: Vec<OpinionRow> = filter_by_country(&data.opinions, Some(&filter))
        .into_iter()
        .cloned()
        .collect();
    let concerts = concert_choices(&data.venues);

    rsx! {
        div { class: "page opinions-page",
            header { class: "page-header",
                h1 { "Opiniones" }
                nav {
                    Link { to: Route::Home {}, "Mapa de la gira" }
                }
            }

            MapView {
                container_id: MAP_CONTAINER_ID.to_string(),
                layer: data.site.opinion_map.clone(),
            }

            div { class: "feed-toolbar",
                label { r#for: "pais-origen", "País" }
                select {
                    id: "pais-origen",
                    value: "{filter}",
                    onchange: move |evt: Event<FormData>| country_filter.set(evt.value()),
                    option { value: "", "Todos" }
                    for c in country_list.iter().cloned() {
                        option { key: "{c}", value: "{c}", "{c}" }
                    }
                }
                button {
                    id: "open-form-btn",
                    onclick: move |_| show_form.set(true),
                    "Enviar mensaje"
                }
            }

            OpinionFeed { opinions: visible, selected }
            OpinionDetail { selected }

            OpinionForm {
                show: show_form,
                countries: country_list,
                concerts,
                relay: data.site.opinion_relay.clone(),
                queue,
            }

            RelayStatus { queue }
        }
    }
}
