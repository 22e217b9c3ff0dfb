use std::rc::Rc;

use dioxus::logger::tracing;
use dioxus::prelude::*;
use tourmap_shared::opinions::is_close_key;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Blocking browser alert. Logs instead when no window is available.
pub fn alert(message: &str) {
    let shown = web_sys::window()
        .map(|w| w.alert_with_message(message).is_ok())
        .unwrap_or(false);
    if !shown {
        tracing::warn!(message, "Could not show alert");
    }
}

type KeyListener = Closure<dyn FnMut(web_sys::KeyboardEvent)>;

/// Runs `on_escape` for every Escape press on the window while the calling
/// component is mounted, whatever element has focus.
pub fn use_escape_key(mut on_escape: impl FnMut() + 'static) {
    let listener = use_hook(move || {
        let listener: Rc<KeyListener> = Rc::new(Closure::new(move |evt: web_sys::KeyboardEvent| {
            if is_close_key(&evt.key()) {
                on_escape();
            }
        }));
        if let Some(window) = web_sys::window() {
            if window
                .add_event_listener_with_callback("keydown", (*listener).as_ref().unchecked_ref())
                .is_err()
            {
                tracing::warn!("Could not attach Escape listener");
            }
        }
        listener
    });

    use_drop(move || {
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback("keydown", (*listener).as_ref().unchecked_ref());
        }
    });
}
