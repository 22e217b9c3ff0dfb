use dioxus::prelude::*;
use tourmap_shared::relay::{DeliveryStatus, RelayQueue};

use crate::relay::{status_class, status_label};

/// Delivery state of every submission made this session.
#[component]
pub fn RelayStatus(queue: Signal<RelayQueue>) -> Element {
    let items: Vec<(u64, String, &'static str)> = queue
        .read()
        .items()
        .iter()
        .map(|o| (o.id, status_label(o), status_class(&o.status)))
        .collect();

    if items.is_empty() {
        return rsx! {};
    }

    let any_delivered = queue
        .read()
        .items()
        .iter()
        .any(|o| o.status == DeliveryStatus::Delivered);

    rsx! {
        div { class: "relay-status", role: "status",
            ul {
                for (id, label, class) in items {
                    li { key: "{id}", class: "{class}", "{label}" }
                }
            }
            if any_delivered {
                button {
                    class: "relay-clear",
                    onclick: move |_| queue.write().prune_delivered(),
                    "Ocultar enviados"
                }
            }
        }
    }
}
