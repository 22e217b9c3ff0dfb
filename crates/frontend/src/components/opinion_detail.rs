use dioxus::prelude::*;
use tourmap_shared::models::OpinionRow;
use tourmap_shared::opinions::OpinionDetail as Detail;

#[component]
pub fn OpinionDetail(selected: Signal<Option<OpinionRow>>) -> Element {
    let Some(detail) = selected.read().as_ref().map(Detail::from) else {
        return rsx! {};
    };

    rsx! {
        div {
            class: "postit-modal-backdrop",
            onclick: move |_| selected.set(None),

            div {
                class: "postit-modal show",
                role: "dialog",
                aria_modal: "true",
                aria_label: "Detalle de opinión",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                button {
                    class: "close-btn",
                    aria_label: "Cerrar",
                    onclick: move |_| selected.set(None),
                    "×"
                }

                div { class: "modal-content",
                    h3 { "{detail.heading}" }
                    p { strong { "País:" } " {detail.country}" }
                    p { strong { "Concierto:" } " {detail.concert}" }
                    p { strong { "Mensaje:" } }
                    p { class: "message", dangerous_inner_html: "{detail.message_html}" }
                    p { strong { "Redes sociales:" } " {detail.social_links}" }
                }
            }
        }
    }
}
