use dioxus::prelude::*;
use listing_map_shared::layers::{ActiveLayer, LayerManager};

/// Label for the button, naming the layer a click switches to.
pub fn toggle_label(active: ActiveLayer) -> &'static str {
    match active {
        ActiveLayer::Points => "Show heatmap",
        ActiveLayer::Heatmap => "Show listings",
    }
}

#[component]
pub fn LayerToggle(layers: Signal<LayerManager>) -> Element {
    let label = toggle_label(layers.read().active());

    rsx! {
        button {
            class: "layer-toggle",
            onclick: move |_| {
                let active = layers.write().toggle();
                tracing::debug!(?active, "Layer toggled");
            },
            "{label}"
        }
    }
}
