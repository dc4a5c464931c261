use dioxus::prelude::*;

#[component]
pub fn HelpOverlay(show: Signal<bool>) -> Element {
    if !*show.read() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "help-overlay-backdrop",
            onclick: move |_| show.set(false),

            div {
                class: "help-overlay",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "Help" }

                div { class: "shortcut-section",
                    h3 { "Map" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Drag" }
                        span { "Pan" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Scroll" " / " "Double-click" }
                        span { "Zoom" }
                    }
                }

                div { class: "shortcut-section",
                    h3 { "Selection" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "Shift" } "+" "Drag" }
                        span { "Select listings inside a box" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "Esc" } }
                        span { "Cancel the box or the polygon in progress" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Polygon" }
                        span { "Click to add points, double-click to finish" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Drag a corner" }
                        span { "Reshape the polygon and reselect" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "Backspace" } " / " kbd { "Ctrl" } "+" kbd { "Z" } }
                        span { "Undo the last point or corner move" }
                    }
                }

                div { class: "shortcut-section",
                    h3 { "Help" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "H" } " / " kbd { "?" } }
                        span { "Toggle this help" }
                    }
                }

                div { class: "help-divider" }

                h2 { class: "help-section-title", "Reading the Map" }

                div { class: "help-info-section",
                    h3 { "Listings" }
                    p { "Each circle is one listing. Larger circles have higher review ratings, darker red ones cost more. Hover a circle for its name, price and rating." }
                }

                div { class: "help-info-section",
                    h3 { "Heatmap" }
                    p { "Shows where highly rated listings concentrate. It fades out past zoom 14, where individual listings become readable." }
                }

                div { class: "help-info-section",
                    h3 { "Selection Limit" }
                    p { "A selection of 1000 listings or more is rejected. Zoom in or draw a smaller region." }
                }

                button {
                    class: "close-help",
                    onclick: move |_| show.set(false),
                    "Close"
                }
            }
        }
    }
}
