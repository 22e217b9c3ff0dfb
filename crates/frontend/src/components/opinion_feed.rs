use dioxus::prelude::*;
use tourmap_shared::models::OpinionRow;
use tourmap_shared::opinions::{is_activation_key, preview, tile_title};

/// Post-it wall. Tiles open the detail view on click, Enter or Space.
#[component]
pub fn OpinionFeed(opinions: Vec<OpinionRow>, selected: Signal<Option<OpinionRow>>) -> Element {
    if opinions.is_empty() {
        return rsx! {
            div { class: "comments-container",
                p { "No hay opiniones para mostrar." }
            }
        };
    }

    rsx! {
        div { class: "comments-container",
            for (i, opinion) in opinions.into_iter().enumerate() {
                PostIt { key: "{i}", opinion, selected }
            }
        }
    }
}

#[component]
fn PostIt(opinion: OpinionRow, selected: Signal<Option<OpinionRow>>) -> Element {
    let title = tile_title(&opinion);
    let text = preview(&opinion.message);
    let on_click = opinion.clone();

    rsx! {
        div {
            class: "post-it",
            tabindex: "0",
            role: "button",
            aria_pressed: "false",
            title: "{title}",
            onclick: move |_| selected.set(Some(on_click.clone())),
            onkeydown: move |evt: Event<KeyboardData>| {
                if is_activation_key(&evt.key().to_string()) {
                    evt.prevent_default();
                    selected.set(Some(opinion.clone()));
                }
            },
            "{text}"
        }
    }
}
