use dioxus::html::input_data::MouseButton;
use dioxus::html::{Key, Modifiers};
use dioxus::prelude::*;
use listing_map_shared::filter::HighlightFilter;
use listing_map_shared::heatmap::density_grid;
use listing_map_shared::layers::{
    heatmap_color, heatmap_intensity, heatmap_opacity, heatmap_radius, LayerId, LayerManager,
    LayerStyles, CIRCLE_OPACITY, HIGHLIGHT_STROKE_COLOR, HIGHLIGHT_STROKE_WIDTH,
};
use listing_map_shared::models::{LngLat, ScreenBox, ScreenPoint};
use listing_map_shared::projection::{Viewport, DEFAULT_CENTER, DEFAULT_ZOOM};
use listing_map_shared::selection::{
    DrawEvent, DrawMode, Effect, Key as SelectionKey, PointerButton, SelectionEngine,
    SelectionEvent,
};
use listing_map_shared::surface::RenderedScene;
use listing_map_shared::tooltip::TooltipController;
use wasm_bindgen::JsCast;

use crate::api::{self, MapData};
use crate::components::draw_toolbar::{can_close, DrawToolbar};
use crate::components::help_overlay::HelpOverlay;
use crate::components::layer_toggle::LayerToggle;
use crate::coords;
use crate::drawing::{EditHistory, Undo};

const MAP_CONTAINER_ID: &str = "listing-map-container";

/// Used until the container reports its real size.
const FALLBACK_WIDTH: f64 = 1024.0;
const FALLBACK_HEIGHT: f64 = 768.0;

/// Heatmap grid resolution in screen pixels.
const HEATMAP_CELL_PX: f64 = 4.0;

/// How close the pointer must be to grab a polygon vertex.
const VERTEX_GRAB_PX: f64 = 8.0;

const ZOOM_BUTTON_STEP: f64 = 1.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pointer_button(button: Option<MouseButton>) -> Option<PointerButton> {
    match button? {
        MouseButton::Primary => Some(PointerButton::Primary),
        MouseButton::Secondary => Some(PointerButton::Secondary),
        MouseButton::Auxiliary => Some(PointerButton::Auxiliary),
        _ => None,
    }
}

fn scene_for(data: &MapData, viewport: Viewport, layers: LayerManager) -> RenderedScene<'_> {
    RenderedScene::new(
        viewport,
        LayerStyles::from_stats(&data.stats),
        layers,
        &data.features,
    )
}

/// Route pointer events to the container even when the pointer leaves it,
/// and take keyboard focus so Escape reaches the map.
fn capture_pointer(pointer_id: i32) {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(MAP_CONTAINER_ID))
    else {
        return;
    };
    element.set_pointer_capture(pointer_id).ok();
    if let Ok(html) = element.dyn_into::<web_sys::HtmlElement>() {
        html.focus().ok();
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        window.alert_with_message(message).ok();
    }
}

/// Event that closes a selection gesture: a release at `point`, or a cancel
/// when the pointer was released outside the map or the capture was lost.
fn gesture_end_event(point: Option<ScreenPoint>) -> SelectionEvent {
    match point {
        Some(point) => SelectionEvent::PointerUp(point),
        None => SelectionEvent::KeyDown(SelectionKey::Escape),
    }
}

/// Index of the polygon vertex within grabbing distance of `point`, if any.
fn nearest_vertex(ring: &[LngLat], point: ScreenPoint, viewport: &Viewport) -> Option<usize> {
    ring.iter()
        .enumerate()
        .map(|(i, ll)| (i, viewport.project(*ll).distance(point)))
        .filter(|(_, d)| *d <= VERTEX_GRAB_PX)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Signals shared by every map event handler.
#[derive(Clone, Copy)]
struct MapState {
    data: Signal<MapData>,
    viewport: Signal<Viewport>,
    layers: Signal<LayerManager>,
    engine: Signal<SelectionEngine>,
    pan_enabled: Signal<bool>,
    box_overlay: Signal<Option<ScreenBox>>,
}

impl MapState {
    fn is_capturing(&self) -> bool {
        self.engine.read().is_capturing()
    }

    /// Feed one event to the selection engine and carry out its effects.
    fn dispatch(mut self, event: SelectionEvent) {
        let effects = {
            let data = self.data.read();
            let scene = scene_for(&data, *self.viewport.read(), *self.layers.read());
            self.engine.write().handle(event, &scene)
        };
        for effect in effects {
            match effect {
                Effect::DisablePan => self.pan_enabled.set(false),
                Effect::EnablePan => self.pan_enabled.set(true),
                Effect::ShowBox(bbox) => self.box_overlay.set(Some(bbox)),
                Effect::RemoveBox => self.box_overlay.set(None),
                Effect::SetFilter(filter) => {
                    tracing::debug!(
                        selected = filter.len(),
                        expression = %filter.to_expression(),
                        "Highlight filter updated"
                    );
                }
                Effect::Warn(message) => alert(&message),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SVG generation
// ---------------------------------------------------------------------------

fn build_tiles(svg: &mut String, viewport: &Viewport, access_token: &str) {
    for tile in viewport.visible_tiles() {
        svg.push_str(&format!(
            r#"<image href="{}" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" preserveAspectRatio="none"/>"#,
            api::tile_url(&tile, access_token),
            tile.left,
            tile.top,
            tile.size + 0.5,
            tile.size + 0.5,
        ));
    }
}

fn build_heatmap(svg: &mut String, scene: &RenderedScene) {
    let drawn = scene.rendered(LayerId::Heatmap);
    if drawn.is_empty() {
        return;
    }
    let zoom = scene.viewport.zoom;
    let points: Vec<(ScreenPoint, f64)> = drawn
        .iter()
        .map(|(p, f)| (*p, scene.styles.heatmap_weight(f.properties.rating)))
        .collect();
    let cells = density_grid(
        &points,
        heatmap_radius(zoom),
        HEATMAP_CELL_PX,
        heatmap_intensity(zoom),
        scene.viewport.width,
        scene.viewport.height,
    );

    let half = HEATMAP_CELL_PX / 2.0;
    svg.push_str(&format!(
        r#"<g class="heatmap" opacity="{:.3}">"#,
        heatmap_opacity(zoom)
    ));
    for cell in cells {
        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{}" height="{}" fill="{}"/>"#,
            cell.center.x - half,
            cell.center.y - half,
            HEATMAP_CELL_PX,
            HEATMAP_CELL_PX,
            heatmap_color(cell.density).css(),
        ));
    }
    svg.push_str("</g>");
}

fn build_circles(svg: &mut String, scene: &RenderedScene) {
    for (p, feature) in scene.rendered(LayerId::Circles) {
        let props = &feature.properties;
        svg.push_str(&format!(
            r#"<circle class="listing" cx="{:.1}" cy="{:.1}" r="{:.2}" fill="{}" fill-opacity="{}"/>"#,
            p.x,
            p.y,
            scene.styles.circle_radius(props.rating),
            scene.styles.circle_color(props.price_log_num).css(),
            CIRCLE_OPACITY,
        ));
    }
}

fn build_highlight(svg: &mut String, scene: &RenderedScene) {
    for (p, feature) in scene.rendered(LayerId::Highlighted) {
        svg.push_str(&format!(
            r#"<circle class="listing-highlighted" cx="{:.1}" cy="{:.1}" r="{:.2}" fill="none" stroke="{}" stroke-width="{}" stroke-opacity="{}"/>"#,
            p.x,
            p.y,
            scene.styles.circle_radius(feature.properties.rating),
            HIGHLIGHT_STROKE_COLOR.hex(),
            HIGHLIGHT_STROKE_WIDTH,
            CIRCLE_OPACITY,
        ));
    }
}

/// The in-progress ring is open, a finished polygon is closed.
fn build_polygon(svg: &mut String, viewport: &Viewport, ring: &[LngLat], closed: bool) {
    if ring.is_empty() {
        return;
    }
    let points: Vec<ScreenPoint> = ring.iter().map(|ll| viewport.project(*ll)).collect();
    let coords = points
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");
    let tag = if closed { "polygon" } else { "polyline" };
    svg.push_str(&format!(r#"<{tag} class="draw-shape" points="{coords}"/>"#));
    for p in points {
        svg.push_str(&format!(
            r#"<circle class="draw-vertex" cx="{:.1}" cy="{:.1}" r="4"/>"#,
            p.x, p.y
        ));
    }
}

/// Full map frame: base tiles, then heatmap, circles, highlight overlay and
/// any drawn polygon, bottom to top.
fn build_svg(
    data: &MapData,
    viewport: Viewport,
    layers: LayerManager,
    filter: &HighlightFilter,
    draw_ring: &[LngLat],
    polygon: Option<&[LngLat]>,
) -> String {
    let scene = scene_for(data, viewport, layers).with_highlight(filter);

    let mut svg = String::new();
    build_tiles(&mut svg, &viewport, &data.access_token);
    build_heatmap(&mut svg, &scene);
    build_circles(&mut svg, &scene);
    build_highlight(&mut svg, &scene);
    if let Some(ring) = polygon {
        build_polygon(&mut svg, &viewport, ring, true);
    }
    build_polygon(&mut svg, &viewport, draw_ring, false);

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="position:absolute;top:0;left:0;pointer-events:none;">{svg}</svg>"#,
        w = viewport.width,
        h = viewport.height,
    )
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(data: MapData) -> Element {
    let data = use_signal(|| data);
    let mut viewport = use_signal(|| {
        Viewport::new(DEFAULT_CENTER, DEFAULT_ZOOM, FALLBACK_WIDTH, FALLBACK_HEIGHT)
    });
    let layers = use_signal(LayerManager::new);
    let engine = use_signal(SelectionEngine::new);
    let mut tooltip = use_signal(TooltipController::new);
    let pan_enabled = use_signal(|| true);
    let box_overlay = use_signal(|| None::<ScreenBox>);
    let mut show_help = use_signal(|| false);

    // Polygon drawing
    let mut draw_mode = use_signal(|| DrawMode::SimpleSelect);
    let mut draw_ring = use_signal(Vec::<LngLat>::new);
    let mut polygon = use_signal(|| None::<Vec<LngLat>>);
    // Grabbed vertex index and the ring as it was before the drag
    let mut vertex_drag = use_signal(|| None::<(usize, Vec<LngLat>)>);
    let mut history = use_signal(EditHistory::new);

    // Pan gesture: last pointer position while the primary button is held
    let mut pan_anchor = use_signal(|| None::<ScreenPoint>);

    let state = MapState {
        data,
        viewport,
        layers,
        engine,
        pan_enabled,
        box_overlay,
    };

    let mut undo_edit = move || {
        let drawing = *draw_mode.read() == DrawMode::DrawPolygon;
        let outcome = history
            .write()
            .undo(drawing, &mut draw_ring.write(), &mut polygon.write());
        if let Undo::Restored(ring) = outcome {
            state.dispatch(SelectionEvent::Draw(DrawEvent::Update(ring)));
        }
    };

    // Release, cancel and capture loss all finish whatever gesture is active.
    let mut end_gesture = move |point: Option<ScreenPoint>| {
        if state.is_capturing() {
            state.dispatch(gesture_end_event(point));
            return;
        }

        let dragged = vertex_drag.write().take();
        if let Some((_, before)) = dragged {
            let ring = polygon.read().clone();
            if let Some(ring) = ring {
                history.write().record(before, &ring);
                state.dispatch(SelectionEvent::Draw(DrawEvent::Update(ring)));
            }
            return;
        }

        pan_anchor.set(None);
    };

    use_hook(move || {
        let data = data.read();
        let styles = LayerStyles::from_stats(&data.stats);
        let manager = LayerManager::new();
        for layer in LayerId::ALL {
            tracing::debug!(
                layer = %layer,
                layer_json = %styles.layer_json(layer, &manager),
                "Layer declared"
            );
        }
    });

    let svg_html = use_memo(move || {
        let data = data.read();
        let engine = engine.read();
        let polygon = polygon.read();
        build_svg(
            &data,
            *viewport.read(),
            *layers.read(),
            engine.filter(),
            &draw_ring.read(),
            polygon.as_deref(),
        )
    });

    let drawing = *draw_mode.read() == DrawMode::DrawPolygon;
    let container_class = if engine.read().is_capturing() {
        "map-container selecting"
    } else if drawing {
        "map-container drawing"
    } else if pan_anchor.read().is_some() {
        "map-container dragging"
    } else {
        "map-container"
    };
    let cursor_style = match tooltip.read().cursor().css() {
        "" => String::new(),
        cursor => format!("cursor: {cursor};"),
    };

    let box_el = (*box_overlay.read()).map(|bbox| {
        let style = bbox.css();
        rsx! {
            div { class: "boxdraw", style: "{style}" }
        }
    });

    let popup_el = tooltip.read().popup().cloned().map(|popup| {
        let pos = {
            let data = data.read();
            let scene = scene_for(&data, *viewport.read(), *layers.read());
            popup.position(&scene)
        };
        rsx! {
            div {
                class: "listing-popup",
                style: "left: {pos.x}px; top: {pos.y}px;",
                h3 { "{popup.title}" }
                p { "{popup.price_line}" }
                p { "{popup.rating_line}" }
            }
        }
    });

    let selected_count = engine.read().selected_keys().len();
    let vertex_count = draw_ring.read().len();
    let has_polygon = polygon.read().is_some();
    let can_undo = history
        .read()
        .can_undo(drawing, &draw_ring.read(), polygon.read().as_deref());

    rsx! {
        div { class: "map-shell",
            div {
                id: MAP_CONTAINER_ID,
                class: "{container_class}",
                style: "{cursor_style}",
                tabindex: "0",

                onresize: move |evt: Event<ResizeData>| {
                    if let Ok(size) = evt.data().get_content_box_size() {
                        viewport.write().resize(size.width, size.height);
                    }
                },

                onwheel: move |evt: Event<WheelData>| {
                    evt.prevent_default();
                    let client = evt.data().client_coordinates();
                    let Some(point) = coords::pointer_in_container(client.x, client.y, MAP_CONTAINER_ID) else {
                        return;
                    };
                    let delta_y = coords::wheel_delta_y(evt.data().delta());
                    let zoom = viewport.read().zoom + coords::wheel_zoom_delta(delta_y);
                    viewport.write().zoom_at(point, zoom);
                },

                onpointerdown: move |evt: Event<PointerData>| {
                    let client = evt.client_coordinates();
                    let Some(point) = coords::pointer_in_container(client.x, client.y, MAP_CONTAINER_ID) else {
                        return;
                    };
                    let Some(button) = pointer_button(evt.trigger_button()) else {
                        return;
                    };
                    let modifier = evt.modifiers().contains(Modifiers::SHIFT);

                    if *draw_mode.read() == DrawMode::DrawPolygon {
                        if button == PointerButton::Primary {
                            let vertex = viewport.read().unproject(point);
                            draw_ring.write().push(vertex);
                        }
                        return;
                    }

                    state.dispatch(SelectionEvent::PointerDown { point, button, modifier });
                    if state.is_capturing() {
                        evt.prevent_default();
                        tooltip.write().on_pointer_leave();
                        capture_pointer(evt.pointer_id());
                        return;
                    }
                    if button != PointerButton::Primary {
                        return;
                    }

                    let grabbed = {
                        let polygon = polygon.read();
                        polygon.as_deref().and_then(|ring| {
                            nearest_vertex(ring, point, &viewport.read()).map(|index| (index, ring.to_vec()))
                        })
                    };
                    if grabbed.is_some() {
                        vertex_drag.set(grabbed);
                        capture_pointer(evt.pointer_id());
                        return;
                    }

                    if *pan_enabled.read() {
                        pan_anchor.set(Some(point));
                        capture_pointer(evt.pointer_id());
                    }
                },

                onpointermove: move |evt: Event<PointerData>| {
                    let client = evt.client_coordinates();
                    let Some(point) = coords::pointer_in_container(client.x, client.y, MAP_CONTAINER_ID) else {
                        return;
                    };

                    if state.is_capturing() {
                        state.dispatch(SelectionEvent::PointerMove(point));
                        return;
                    }

                    let dragged = vertex_drag.read().as_ref().map(|(index, _)| *index);
                    if let Some(index) = dragged {
                        let vertex = viewport.read().unproject(point);
                        if let Some(slot) = polygon.write().as_mut().and_then(|ring| ring.get_mut(index)) {
                            *slot = vertex;
                        }
                        return;
                    }

                    let anchor = *pan_anchor.read();
                    if let Some(anchor) = anchor {
                        viewport.write().pan_by(point.x - anchor.x, point.y - anchor.y);
                        pan_anchor.set(Some(point));
                        return;
                    }

                    if !drawing {
                        let data = data.read();
                        let scene = scene_for(&data, *viewport.read(), *layers.read());
                        tooltip.write().on_pointer_move(point, &scene);
                    }
                },

                onpointerup: move |evt: Event<PointerData>| {
                    let client = evt.client_coordinates();
                    end_gesture(coords::pointer_in_container(client.x, client.y, MAP_CONTAINER_ID));
                },

                onpointercancel: move |_| end_gesture(None),

                onlostpointercapture: move |_| end_gesture(None),

                onpointerleave: move |_| {
                    if !state.is_capturing() && pan_anchor.read().is_none() {
                        tooltip.write().on_pointer_leave();
                    }
                },

                ondoubleclick: move |evt: Event<MouseData>| {
                    evt.prevent_default();
                    if *draw_mode.read() == DrawMode::DrawPolygon {
                        // The double click's own presses each added a vertex.
                        let ring: Vec<LngLat> = {
                            let mut ring = draw_ring.read().clone();
                            ring.dedup_by(|a, b| {
                                let vp = viewport.read();
                                vp.project(*a).distance(vp.project(*b)) < VERTEX_GRAB_PX
                            });
                            ring
                        };
                        if can_close(ring.len()) {
                            draw_ring.write().clear();
                            history.write().clear();
                            draw_mode.set(DrawMode::SimpleSelect);
                            polygon.set(Some(ring.clone()));
                            state.dispatch(SelectionEvent::Draw(DrawEvent::Create(ring)));
                        }
                        return;
                    }
                    let client = evt.client_coordinates();
                    if let Some(point) = coords::pointer_in_container(client.x, client.y, MAP_CONTAINER_ID) {
                        let zoom = viewport.read().zoom + ZOOM_BUTTON_STEP;
                        viewport.write().zoom_at(point, zoom);
                    }
                },

                onkeydown: move |evt: Event<KeyboardData>| {
                    match evt.key() {
                        Key::Escape => {
                            if *draw_mode.read() == DrawMode::DrawPolygon {
                                draw_ring.write().clear();
                                draw_mode.set(DrawMode::SimpleSelect);
                                state.dispatch(SelectionEvent::Draw(DrawEvent::ModeChange(
                                    DrawMode::SimpleSelect,
                                )));
                            } else {
                                state.dispatch(SelectionEvent::KeyDown(SelectionKey::Escape));
                            }
                        }
                        Key::Backspace => {
                            evt.prevent_default();
                            undo_edit();
                        }
                        Key::Character(c)
                            if c.eq_ignore_ascii_case("z")
                                && (evt.modifiers().contains(Modifiers::CONTROL)
                                    || evt.modifiers().contains(Modifiers::META)) =>
                        {
                            evt.prevent_default();
                            undo_edit();
                        }
                        Key::Character(c) if c == "?" || c == "h" => {
                            let shown = *show_help.read();
                            show_help.set(!shown);
                        }
                        _ => state.dispatch(SelectionEvent::KeyDown(SelectionKey::Other)),
                    }
                },

                div {
                    class: "map-layers",
                    dangerous_inner_html: "{svg_html}",
                }

                {box_el}
                {popup_el}
            }

            // Controls sit outside the container so their clicks never reach the map
            div { class: "map-controls",
                LayerToggle { layers: layers }

                div { class: "zoom-controls",
                    button {
                        class: "zoom-btn",
                        title: "Zoom in",
                        onclick: move |_| {
                            let vp = *viewport.read();
                            let center = ScreenPoint::new(vp.width / 2.0, vp.height / 2.0);
                            viewport.write().zoom_at(center, vp.zoom + ZOOM_BUTTON_STEP);
                        },
                        "+"
                    }
                    button {
                        class: "zoom-btn",
                        title: "Zoom out",
                        onclick: move |_| {
                            let vp = *viewport.read();
                            let center = ScreenPoint::new(vp.width / 2.0, vp.height / 2.0);
                            viewport.write().zoom_at(center, vp.zoom - ZOOM_BUTTON_STEP);
                        },
                        "\u{2212}"
                    }
                }

                DrawToolbar {
                    drawing: drawing,
                    vertex_count: vertex_count,
                    has_polygon: has_polygon,
                    can_undo: can_undo,
                    on_start: move |_| {
                        if *draw_mode.read() == DrawMode::DrawPolygon {
                            return;
                        }
                        polygon.set(None);
                        draw_ring.write().clear();
                        history.write().clear();
                        draw_mode.set(DrawMode::DrawPolygon);
                        tooltip.write().on_pointer_leave();
                        state.dispatch(SelectionEvent::Draw(DrawEvent::ModeChange(DrawMode::DrawPolygon)));
                    },
                    on_finish: move |_| {
                        let ring = draw_ring.read().clone();
                        if !can_close(ring.len()) {
                            return;
                        }
                        draw_ring.write().clear();
                        history.write().clear();
                        draw_mode.set(DrawMode::SimpleSelect);
                        polygon.set(Some(ring.clone()));
                        state.dispatch(SelectionEvent::Draw(DrawEvent::Create(ring)));
                    },
                    on_undo: move |_| undo_edit(),
                    on_trash: move |_| {
                        let had_polygon = polygon.read().is_some();
                        polygon.set(None);
                        draw_ring.write().clear();
                        history.write().clear();
                        if *draw_mode.read() == DrawMode::DrawPolygon {
                            draw_mode.set(DrawMode::SimpleSelect);
                            state.dispatch(SelectionEvent::Draw(DrawEvent::ModeChange(DrawMode::SimpleSelect)));
                        } else if had_polygon {
                            state.dispatch(SelectionEvent::Draw(DrawEvent::Delete));
                        }
                    },
                }

                div { class: "selection-count",
                    if selected_count > 0 {
                        "{selected_count} selected"
                    } else {
                        "Shift-drag to select"
                    }
                }

                button {
                    class: "help-btn",
                    title: "Help",
                    onclick: move |_| show_help.set(true),
                    "?"
                }
            }

            HelpOverlay { show: show_help }
        }
    }
}
