use dioxus::prelude::*;

/// Vertices needed before a ring can be closed into a polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

pub fn can_close(vertex_count: usize) -> bool {
    vertex_count >= MIN_POLYGON_VERTICES
}

#[component]
pub fn DrawToolbar(
    drawing: bool,
    vertex_count: usize,
    has_polygon: bool,
    can_undo: bool,
    on_start: EventHandler<()>,
    on_finish: EventHandler<()>,
    on_undo: EventHandler<()>,
    on_trash: EventHandler<()>,
) -> Element {
    let can_finish = drawing && can_close(vertex_count);
    let can_trash = drawing || has_polygon;
    let draw_class = if drawing { "draw-btn active" } else { "draw-btn" };

    rsx! {
        div { class: "draw-toolbar",
            button {
                class: "{draw_class}",
                title: "Draw a polygon to select listings",
                disabled: drawing,
                onclick: move |_| on_start.call(()),
                "Polygon"
            }
            if drawing {
                button {
                    class: "draw-btn",
                    title: "Close the polygon (or double-click)",
                    disabled: !can_finish,
                    onclick: move |_| on_finish.call(()),
                    "Finish"
                }
            }
            button {
                class: "draw-btn",
                title: "Undo the last point or edit (Backspace, Ctrl+Z)",
                disabled: !can_undo,
                onclick: move |_| on_undo.call(()),
                "Undo"
            }
            button {
                class: "draw-btn",
                title: "Delete the polygon",
                disabled: !can_trash,
                onclick: move |_| on_trash.call(()),
                "Delete"
            }
            if drawing {
                span { class: "draw-hint",
                    "{vertex_count} points. Click to add, double-click to finish, Backspace to undo, Esc to cancel."
                }
            }
        }
    }
}
