use dioxus::prelude::*;

use crate::api;
use crate::components::map_view::MapView;

#[component]
pub fn Explorer() -> Element {
    // The map is only mounted once both fetches have succeeded.
    let map_data = use_resource(|| api::load_map_data());

    let body = match &*map_data.read() {
        None => rsx! {
            div { class: "status", "Loading listings\u{2026}" }
        },
        Some(Err(e)) => {
            tracing::error!(error = %e, "Map initialization failed");
            rsx! {
                div { class: "status error",
                    h2 { "The map could not be loaded" }
                    p { "{e}" }
                }
            }
        }
        Some(Ok(data)) => rsx! {
            MapView { data: data.clone() }
        },
    };

    rsx! {
        div { class: "app",
            header { class: "app-header",
                h1 { "Boston Listings" }
            }
            main { class: "app-main", {body} }
        }
    }
}
