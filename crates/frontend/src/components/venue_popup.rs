use dioxus::prelude::*;
use tourmap_shared::venues::{TicketAction, VenueMarker};

/// Popup body for a venue: one block per event in the city.
#[component]
pub fn VenuePopup(marker: VenueMarker) -> Element {
    rsx! {
        div { class: "venue-popup",
            h3 { "{marker.title}" }
            for (i, entry) in marker.entries.iter().enumerate() {
                div { key: "{i}", class: "venue-event",
                    em { "{entry.date}" }
                    br {}
                    match &entry.ticket {
                        TicketAction::SoldOut => rsx! {
                            span { class: "sold-out", "Agotado" }
                        },
                        TicketAction::Buy(link) => rsx! {
                            a {
                                class: "buy-tickets",
                                href: "{link}",
                                target: "_blank",
                                rel: "noopener",
                                "Comprar entradas"
                            }
                        },
                    }
                    br {}
                    small { "{entry.occupancy_label}" }
                }
            }
        }
    }
}
