use dioxus::logger::tracing;
use dioxus::prelude::*;
use tourmap_shared::boundary::BoundaryKind;
use tourmap_shared::models::FormRelay;
use tourmap_shared::relay::{OriginKind, RelayQueue, SubmissionKind, TravelSubmission};

use crate::{api, notify, relay};

fn parse_origin_kind(value: &str) -> Option<OriginKind> {
    match value {
        "province" => Some(OriginKind::Province),
        "country" => Some(OriginKind::Country),
        _ => None,
    }
}

fn boundary_kind(kind: OriginKind) -> BoundaryKind {
    match kind {
        OriginKind::Province => BoundaryKind::Province,
        OriginKind::Country => BoundaryKind::Country,
    }
}

/// Modal form for reporting a trip to a concert.
#[component]
pub fn TravelForm(
    show: Signal<bool>,
    destinations: Vec<String>,
    relay: FormRelay,
    queue: Signal<RelayQueue>,
) -> Element {
    let mut origin_kind = use_signal(|| None::<OriginKind>);
    let mut origin = use_signal(String::new);
    let mut destination = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    // Origin names follow the chosen kind
    let names = use_resource(move || {
        let kind = origin_kind();
        async move {
            let Some(kind) = kind else {
                return Vec::new();
            };
            match api::fetch_boundary_names(boundary_kind(kind)).await {
                Ok(names) => names,
                Err(e) => {
                    tracing::error!("Failed to load origin names: {}", e);
                    notify::alert("No se pudo cargar la lista de lugares.");
                    Vec::new()
                }
            }
        }
    });

    let mut reset = move || {
        origin_kind.set(None);
        origin.set(String::new());
        destination.set(String::new());
        error.set(None);
    };

    notify::use_escape_key(move || {
        if *show.peek() {
            reset();
            show.set(false);
        }
    });

    if !*show.read() {
        return rsx! {};
    }

    let on_submit = move |evt: Event<FormData>| {
        evt.prevent_default();
        let Some(kind) = origin_kind() else {
            error.set(Some("Por favor, selecciona origen y destino.".to_string()));
            return;
        };
        let submission = TravelSubmission {
            origin_kind: kind,
            origin: origin(),
            destination: destination(),
        };
        if let Err(e) = submission.validate() {
            error.set(Some(e.to_string()));
            return;
        }
        // Delivery progress and the confirmation show up in the status list
        match relay::submit(queue, SubmissionKind::Travel, &relay, &submission.fields()) {
            Ok(_) => {
                reset();
                show.set(false);
            }
            Err(e) => {
                tracing::error!("Travel submission rejected: {}", e);
                error.set(Some("Error al enviar el viaje. Inténtalo de nuevo.".to_string()));
            }
        }
    };

    let name_list = names.read().clone().unwrap_or_default();
    let kind_value = match origin_kind() {
        Some(OriginKind::Province) => "province",
        Some(OriginKind::Country) => "country",
        None => "",
    };

    rsx! {
        div {
            class: "modal-backdrop",
            onclick: move |_| {
                reset();
                show.set(false);
            },

            div {
                class: "modal",
                role: "dialog",
                aria_modal: "true",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                button {
                    class: "modal-close",
                    r#type: "button",
                    aria_label: "Cerrar",
                    onclick: move |_| {
                        reset();
                        show.set(false);
                    },
                    "×"
                }

                h2 { "Añadir viaje" }

                form { onsubmit: on_submit,
                    label { r#for: "select-origin-kind", "Origen" }
                    select {
                        id: "select-origin-kind",
                        value: "{kind_value}",
                        onchange: move |evt: Event<FormData>| {
                            origin_kind.set(parse_origin_kind(&evt.value()));
                            origin.set(String::new());
                        },
                        option { value: "", disabled: true, selected: kind_value.is_empty(), "Selecciona tipo" }
                        option { value: "province", "Provincia de España" }
                        option { value: "country", "Otro país" }
                    }

                    if origin_kind().is_some() {
                        label { r#for: "select-origin", "Lugar" }
                        select {
                            id: "select-origin",
                            value: "{origin}",
                            onchange: move |evt: Event<FormData>| origin.set(evt.value()),
                            option { value: "", "Selecciona lugar" }
                            for name in name_list {
                                option { key: "{name}", value: "{name}", "{name}" }
                            }
                        }
                    }

                    label { r#for: "select-destination", "Destino" }
                    select {
                        id: "select-destination",
                        value: "{destination}",
                        onchange: move |evt: Event<FormData>| destination.set(evt.value()),
                        option { value: "", "Selecciona concierto" }
                        for city in destinations {
                            option { key: "{city}", value: "{city}", "{city}" }
                        }
                    }

                    if let Some(msg) = error() {
                        p { class: "form-error", role: "alert", "{msg}" }
                    }

                    button { r#type: "submit", "Enviar" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_kind() {
        assert_eq!(parse_origin_kind("province"), Some(OriginKind::Province));
        assert_eq!(parse_origin_kind("country"), Some(OriginKind::Country));
        assert_eq!(parse_origin_kind(""), None);
    }

    #[test]
    fn test_origin_kind_maps_to_boundary_set() {
        assert_eq!(boundary_kind(OriginKind::Province), BoundaryKind::Province);
        assert_eq!(boundary_kind(OriginKind::Country), BoundaryKind::Country);
    }
}
