mod api;
mod components;
mod coords;
mod notify;
mod pages;
mod relay;

use dioxus::prelude::*;
use tourmap_shared::relay::RelayQueue;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/opinions")]
    Opinions {},
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::tour_map::TourMap {}
    }
}

#[component]
fn Opinions() -> Element {
    rsx! {
        pages::opinions::Opinions {}
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    // Submissions keep delivering while the visitor switches pages
    use_context_provider(|| Signal::new(RelayQueue::default()));

    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
