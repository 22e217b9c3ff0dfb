use dioxus::logger::tracing;
use dioxus::prelude::*;
use tourmap_shared::models::FormRelay;
use tourmap_shared::relay::{OpinionSubmission, RelayQueue, SubmissionKind};

use crate::{notify, relay};

/// Add or remove `concert` from the checked list, keeping list order stable.
fn toggle(checked: &mut Vec<String>, concert: &str, on: bool) {
    let present = checked.iter().any(|c| c == concert);
    if on && !present {
        checked.push(concert.to_string());
    } else if !on && present {
        checked.retain(|c| c != concert);
    }
}

#[component]
pub fn OpinionForm(
    show: Signal<bool>,
    countries: Vec<String>,
    concerts: Vec<String>,
    relay: FormRelay,
    queue: Signal<RelayQueue>,
) -> Element {
    let mut name = use_signal(String::new);
    let mut country = use_signal(String::new);
    let mut checked = use_signal(Vec::<String>::new);
    let mut message = use_signal(String::new);
    let mut socials = use_signal(String::new);
    let mut feedback = use_signal(|| None::<String>);

    let mut close = move || {
        name.set(String::new());
        country.set(String::new());
        checked.set(Vec::new());
        message.set(String::new());
        socials.set(String::new());
        feedback.set(None);
        show.set(false);
    };

    // Escape closes the form wherever focus is
    notify::use_escape_key(move || {
        if *show.peek() {
            close();
        }
    });

    if !*show.read() {
        return rsx! {};
    }

    let on_submit = move |evt: Event<FormData>| {
        evt.prevent_default();
        let submission = OpinionSubmission {
            name: name(),
            country: country(),
            concerts: checked(),
            message: message(),
            socials: socials(),
        };
        if let Err(e) = submission.validate() {
            feedback.set(Some(e.to_string()));
            return;
        }
        match relay::submit(queue, SubmissionKind::Opinion, &relay, &submission.fields()) {
            Ok(_) => close(),
            Err(e) => {
                tracing::error!("Opinion submission rejected: {}", e);
                feedback.set(Some("Error al enviar. Inténtalo de nuevo más tarde.".to_string()));
            }
        }
    };

    rsx! {
        div { class: "form-overlay",
            div { class: "form-panel", role: "dialog", aria_modal: "true",
                button {
                    class: "close-btn",
                    r#type: "button",
                    aria_label: "Cerrar",
                    onclick: move |_| close(),
                    "×"
                }

                h2 { "Déjanos tu mensaje" }

                form { class: "fan-form", onsubmit: on_submit,
                    label { r#for: "nombre", "Nombre" }
                    input {
                        id: "nombre",
                        r#type: "text",
                        autofocus: true,
                        placeholder: "Anónimo",
                        value: "{name}",
                        oninput: move |evt: Event<FormData>| name.set(evt.value()),
                    }

                    label { r#for: "pais", "País" }
                    input {
                        id: "pais",
                        r#type: "text",
                        list: "paises",
                        value: "{country}",
                        oninput: move |evt: Event<FormData>| country.set(evt.value()),
                    }
                    datalist { id: "paises",
                        for c in countries {
                            option { key: "{c}", value: "{c}" }
                        }
                    }

                    fieldset { class: "concert-checkboxes",
                        legend { "Conciertos" }
                        for concert in concerts {
                            label { key: "{concert}",
                                input {
                                    r#type: "checkbox",
                                    name: "concierto",
                                    value: "{concert}",
                                    checked: checked.read().contains(&concert),
                                    onchange: {
                                        let concert = concert.clone();
                                        move |evt: Event<FormData>| {
                                            toggle(&mut checked.write(), &concert, evt.checked());
                                        }
                                    },
                                }
                                " {concert}"
                            }
                        }
                    }

                    label { r#for: "mensaje", "Mensaje" }
                    textarea {
                        id: "mensaje",
                        rows: "5",
                        value: "{message}",
                        oninput: move |evt: Event<FormData>| message.set(evt.value()),
                    }

                    label { r#for: "redes", "Redes sociales" }
                    input {
                        id: "redes",
                        r#type: "text",
                        value: "{socials}",
                        oninput: move |evt: Event<FormData>| socials.set(evt.value()),
                    }

                    if let Some(msg) = feedback() {
                        p { class: "form-message", role: "alert", "{msg}" }
                    }

                    button { r#type: "submit", "Enviar" }
                }
            }
        }
    }
}
