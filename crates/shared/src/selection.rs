//! Region selection: modifier-drag rectangles and drawn polygons, resolved
//! against the rendered circles layer into a [`HighlightFilter`].
//!
//! The engine is a plain state machine. [`SelectionEngine::handle`] takes one
//! input event, advances the state and returns the side effects the host must
//! apply (overlay element, pan gesture, overlay filter, user warning). The
//! engine never touches the DOM or the renderer itself.

use crate::filter::HighlightFilter;
use crate::geometry;
use crate::layers::LayerId;
use crate::models::{LngLat, ScreenBox, ScreenPoint};
use crate::surface::MapSurface;

/// Selections matching this many features or more are rejected.
pub const MAX_SELECTION: usize = 1000;

pub const OVERLOAD_WARNING: &str = "Select a smaller number of features";

/// Layer whose rendered features are candidates for selection.
pub const SELECTABLE_LAYER: LayerId = LayerId::Circles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Modes of the polygon drawing control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    SimpleSelect,
    DrawPolygon,
}

/// Events emitted by the polygon drawing control. Rings are geographic.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Create(Vec<LngLat>),
    Update(Vec<LngLat>),
    Delete,
    ModeChange(DrawMode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    PointerDown {
        point: ScreenPoint,
        button: PointerButton,
        /// Whether the selection modifier (Shift) is held.
        modifier: bool,
    },
    PointerMove(ScreenPoint),
    PointerUp(ScreenPoint),
    KeyDown(Key),
    Draw(DrawEvent),
}

/// Side effects for the host to apply, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    DisablePan,
    EnablePan,
    /// Create the rubber-band overlay if absent, then size it to the box.
    ShowBox(ScreenBox),
    RemoveBox,
    SetFilter(HighlightFilter),
    Warn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    /// Modifier-drag in progress. `current` is `None` until the first move,
    /// which is also when the overlay element comes into existence.
    Dragging {
        anchor: ScreenPoint,
        current: Option<ScreenPoint>,
    },
    /// Polygon drawing mode is active.
    Drawing,
}

/// Outcome of resolving a region against the rendered features.
#[derive(Debug, Clone, PartialEq)]
enum Resolution {
    Selected(Vec<String>),
    Overloaded(usize),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    state: SelectionState,
    filter: HighlightFilter,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn filter(&self) -> &HighlightFilter {
        &self.filter
    }

    /// Selected listing URLs, in render order. Always identical to the filter.
    pub fn selected_keys(&self) -> &[String] {
        self.filter.urls()
    }

    /// True while a drag gesture owns the move/up/escape inputs.
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, SelectionState::Dragging { .. })
    }

    /// Current rubber-band rectangle, if the overlay exists.
    pub fn overlay(&self) -> Option<ScreenBox> {
        match self.state {
            SelectionState::Dragging {
                anchor,
                current: Some(current),
            } => Some(ScreenBox::from_corners(anchor, current)),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: SelectionEvent, surface: &dyn MapSurface) -> Vec<Effect> {
        let (next, effects) = self.transition(event, surface);
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Selection state change");
        }
        self.state = next;
        for effect in &effects {
            if let Effect::SetFilter(filter) = effect {
                self.filter = filter.clone();
            }
        }
        effects
    }

    fn transition(
        &self,
        event: SelectionEvent,
        surface: &dyn MapSurface,
    ) -> (SelectionState, Vec<Effect>) {
        use SelectionEvent as E;
        use SelectionState as S;

        match (self.state, event) {
            (
                S::Idle,
                E::PointerDown {
                    point,
                    button: PointerButton::Primary,
                    modifier: true,
                },
            ) => (
                S::Dragging {
                    anchor: point,
                    current: None,
                },
                vec![Effect::DisablePan],
            ),

            (S::Dragging { anchor, .. }, E::PointerMove(p)) => (
                S::Dragging {
                    anchor,
                    current: Some(p),
                },
                vec![Effect::ShowBox(ScreenBox::from_corners(anchor, p))],
            ),

            (S::Dragging { anchor, current }, E::PointerUp(p)) => {
                let mut effects = Vec::new();
                if current.is_some() {
                    effects.push(Effect::RemoveBox);
                }
                let bbox = ScreenBox::from_corners(anchor, p);
                let candidates = surface.query_rendered_features(bbox, SELECTABLE_LAYER);
                let urls = candidates
                    .iter()
                    .map(|f| f.properties.listing_url.clone())
                    .collect();
                effects.push(self.apply(resolve(urls)));
                effects.push(Effect::EnablePan);
                (S::Idle, effects)
            }

            (S::Dragging { current, .. }, E::KeyDown(Key::Escape)) => {
                let mut effects = Vec::new();
                if current.is_some() {
                    effects.push(Effect::RemoveBox);
                }
                effects.push(Effect::EnablePan);
                (S::Idle, effects)
            }

            (S::Dragging { .. }, E::Draw(DrawEvent::ModeChange(mode))) => {
                // Abandon the drag before honouring the mode change.
                let mut effects = self.cancel_effects();
                effects.push(Effect::SetFilter(HighlightFilter::none()));
                (state_for_mode(mode), effects)
            }

            (_, E::Draw(DrawEvent::Create(ring) | DrawEvent::Update(ring))) => {
                let effect = self.apply(resolve_polygon(&ring, surface));
                let next = match self.state {
                    S::Dragging { .. } => self.state,
                    _ => S::Idle,
                };
                (next, vec![effect])
            }

            (state, E::Draw(DrawEvent::Delete)) => {
                (state, vec![Effect::SetFilter(HighlightFilter::none())])
            }

            (_, E::Draw(DrawEvent::ModeChange(mode))) => (
                state_for_mode(mode),
                vec![Effect::SetFilter(HighlightFilter::none())],
            ),

            (state, _) => (state, Vec::new()),
        }
    }

    fn cancel_effects(&self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.overlay().is_some() {
            effects.push(Effect::RemoveBox);
        }
        if self.is_capturing() {
            effects.push(Effect::EnablePan);
        }
        effects
    }

    fn apply(&self, resolution: Resolution) -> Effect {
        match resolution {
            Resolution::Selected(urls) => {
                tracing::debug!(selected = urls.len(), "Selection resolved");
                Effect::SetFilter(HighlightFilter::including(urls))
            }
            Resolution::Overloaded(count) => {
                tracing::warn!(count, limit = MAX_SELECTION, "Selection rejected");
                Effect::Warn(OVERLOAD_WARNING.to_string())
            }
        }
    }
}

fn state_for_mode(mode: DrawMode) -> SelectionState {
    match mode {
        DrawMode::DrawPolygon => SelectionState::Drawing,
        DrawMode::SimpleSelect => SelectionState::Idle,
    }
}

fn resolve(urls: Vec<String>) -> Resolution {
    if urls.len() >= MAX_SELECTION {
        Resolution::Overloaded(urls.len())
    } else {
        Resolution::Selected(urls)
    }
}

/// Bounding-box query as a pre-filter, then an exact point-in-polygon test.
fn resolve_polygon(ring: &[LngLat], surface: &dyn MapSurface) -> Resolution {
    let polygon = geometry::polygon_from_ring(ring);
    let Some((sw, ne)) = geometry::bounding_corners(&polygon) else {
        return Resolution::Selected(Vec::new());
    };
    let bbox = ScreenBox::from_corners(surface.project(sw), surface.project(ne));
    let survivors = surface
        .query_rendered_features(bbox, SELECTABLE_LAYER)
        .into_iter()
        .filter(|f| geometry::contains(&polygon, f.coordinates))
        .map(|f| f.properties.listing_url.clone())
        .collect();
    resolve(survivors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, FeatureProperties};
    use crate::surface::tests::{scenario_collection, scenario_scene};

    /// Surface whose screen space equals lng/lat degrees, y pointing down.
    struct FlatSurface {
        features: Vec<Feature>,
    }

    impl FlatSurface {
        fn with_points(points: &[(f64, f64)]) -> Self {
            let features = points
                .iter()
                .enumerate()
                .map(|(i, &(lng, lat))| Feature {
                    coordinates: LngLat::new(lng, lat),
                    properties: FeatureProperties {
                        listing_url: format!("u{i}"),
                        name: format!("n{i}"),
                        price: "$1".to_string(),
                        price_log_num: 0.0,
                        rating: None,
                    },
                })
                .collect();
            FlatSurface { features }
        }
    }

    impl MapSurface for FlatSurface {
        fn project(&self, ll: LngLat) -> ScreenPoint {
            ScreenPoint::new(ll.lng, -ll.lat)
        }

        fn query_rendered_features(&self, bbox: ScreenBox, _layer: LayerId) -> Vec<&Feature> {
            self.features
                .iter()
                .filter(|f| bbox.contains(self.project(f.coordinates)))
                .collect()
        }

        fn query_rendered_point(&self, _point: ScreenPoint, _layer: LayerId) -> Vec<&Feature> {
            Vec::new()
        }
    }

    fn down(x: f64, y: f64) -> SelectionEvent {
        SelectionEvent::PointerDown {
            point: ScreenPoint::new(x, y),
            button: PointerButton::Primary,
            modifier: true,
        }
    }

    fn drag(
        engine: &mut SelectionEngine,
        surface: &dyn MapSurface,
        from: ScreenPoint,
        to: ScreenPoint,
    ) -> Vec<Effect> {
        engine.handle(down(from.x, from.y), surface);
        engine.handle(SelectionEvent::PointerMove(to), surface);
        engine.handle(SelectionEvent::PointerUp(to), surface)
    }

    fn urls(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_press_without_modifier_stays_idle() {
        let surface = FlatSurface::with_points(&[]);
        let mut engine = SelectionEngine::new();
        let effects = engine.handle(
            SelectionEvent::PointerDown {
                point: ScreenPoint::new(1.0, 1.0),
                button: PointerButton::Primary,
                modifier: false,
            },
            &surface,
        );
        assert!(effects.is_empty());
        assert_eq!(engine.state(), SelectionState::Idle);
    }

    #[test]
    fn test_modifier_with_secondary_button_stays_idle() {
        let surface = FlatSurface::with_points(&[]);
        let mut engine = SelectionEngine::new();
        let effects = engine.handle(
            SelectionEvent::PointerDown {
                point: ScreenPoint::new(1.0, 1.0),
                button: PointerButton::Secondary,
                modifier: true,
            },
            &surface,
        );
        assert!(effects.is_empty());
        assert!(!engine.is_capturing());
    }

    #[test]
    fn test_press_disables_pan_and_first_move_creates_overlay() {
        let surface = FlatSurface::with_points(&[]);
        let mut engine = SelectionEngine::new();
        assert_eq!(engine.handle(down(10.0, 10.0), &surface), vec![Effect::DisablePan]);
        assert!(engine.is_capturing());
        assert!(engine.overlay().is_none());

        let effects = engine.handle(SelectionEvent::PointerMove(ScreenPoint::new(4.0, 30.0)), &surface);
        let expected = ScreenBox::from_corners(ScreenPoint::new(4.0, 10.0), ScreenPoint::new(10.0, 30.0));
        assert_eq!(effects, vec![Effect::ShowBox(expected)]);
        assert_eq!(engine.overlay(), Some(expected));
    }

    #[test]
    fn test_moves_outside_a_gesture_are_ignored() {
        let surface = FlatSurface::with_points(&[(1.0, -1.0)]);
        let mut engine = SelectionEngine::new();
        assert!(engine
            .handle(SelectionEvent::PointerMove(ScreenPoint::new(5.0, 5.0)), &surface)
            .is_empty());
        assert!(engine
            .handle(SelectionEvent::PointerUp(ScreenPoint::new(5.0, 5.0)), &surface)
            .is_empty());
        assert!(engine
            .handle(SelectionEvent::KeyDown(Key::Escape), &surface)
            .is_empty());
        assert!(engine.filter().is_empty());
    }

    #[test]
    fn test_release_selects_and_restores_pan() {
        let surface = FlatSurface::with_points(&[(1.0, -1.0), (50.0, -50.0), (2.0, -3.0)]);
        let mut engine = SelectionEngine::new();
        let effects = drag(&mut engine, &surface, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0));
        assert_eq!(
            effects,
            vec![
                Effect::RemoveBox,
                Effect::SetFilter(HighlightFilter::including(urls(&["u0", "u2"]))),
                Effect::EnablePan,
            ]
        );
        assert_eq!(engine.selected_keys(), urls(&["u0", "u2"]).as_slice());
        assert_eq!(engine.state(), SelectionState::Idle);
        assert!(engine.overlay().is_none());
    }

    #[test]
    fn test_release_without_move_has_no_overlay_to_remove() {
        let surface = FlatSurface::with_points(&[(1.0, -1.0)]);
        let mut engine = SelectionEngine::new();
        engine.handle(down(1.0, 1.0), &surface);
        let effects = engine.handle(SelectionEvent::PointerUp(ScreenPoint::new(1.0, 1.0)), &surface);
        assert_eq!(effects.first(), Some(&Effect::SetFilter(HighlightFilter::including(urls(&["u0"])))));
        assert!(!effects.contains(&Effect::RemoveBox));
    }

    #[test]
    fn test_empty_rectangle_yields_empty_filter() {
        let surface = FlatSurface::with_points(&[(100.0, -100.0)]);
        let mut engine = SelectionEngine::new();
        engine.filter = HighlightFilter::including(urls(&["stale"]));
        let effects = drag(&mut engine, &surface, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0));
        assert!(effects.contains(&Effect::SetFilter(HighlightFilter::none())));
        assert!(engine.selected_keys().is_empty());
        assert!(!engine.filter().matches("stale"));
        assert_eq!(engine.filter().to_expression(), serde_json::json!(["in", "listing_url", ""]));
    }

    #[test]
    fn test_overload_at_limit_keeps_previous_filter() {
        let points: Vec<(f64, f64)> = (0..MAX_SELECTION).map(|i| (0.5 + (i % 10) as f64, -0.5)).collect();
        let surface = FlatSurface::with_points(&points);
        let mut engine = SelectionEngine::new();

        // Establish a prior selection from a small box.
        drag(&mut engine, &surface, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(1.0, 1.0));
        let before = engine.filter().clone();
        assert_eq!(before.len(), MAX_SELECTION / 10);

        let effects = drag(&mut engine, &surface, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(20.0, 20.0));
        assert!(effects.contains(&Effect::Warn(OVERLOAD_WARNING.to_string())));
        assert!(!effects.iter().any(|e| matches!(e, Effect::SetFilter(_))));
        assert_eq!(effects.last(), Some(&Effect::EnablePan));
        assert_eq!(engine.filter(), &before);
    }

    #[test]
    fn test_just_below_limit_is_accepted() {
        let points: Vec<(f64, f64)> = (0..MAX_SELECTION - 1).map(|_| (1.0, -1.0)).collect();
        let surface = FlatSurface::with_points(&points);
        let mut engine = SelectionEngine::new();
        drag(&mut engine, &surface, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(2.0, 2.0));
        assert_eq!(engine.selected_keys().len(), MAX_SELECTION - 1);
    }

    fn square(min: f64, max: f64) -> Vec<LngLat> {
        vec![
            LngLat::new(min, min),
            LngLat::new(max, min),
            LngLat::new(max, max),
            LngLat::new(min, max),
        ]
    }

    fn create(engine: &mut SelectionEngine, surface: &dyn MapSurface, ring: Vec<LngLat>) -> Vec<Effect> {
        engine.handle(SelectionEvent::Draw(DrawEvent::Create(ring)), surface)
    }

    #[test]
    fn test_polygon_overload_keeps_previous_filter() {
        let points: Vec<(f64, f64)> = (0..MAX_SELECTION).map(|i| (0.5 + (i % 10) as f64, 0.5)).collect();
        let surface = FlatSurface::with_points(&points);
        let mut engine = SelectionEngine::new();

        create(&mut engine, &surface, square(0.0, 1.0));
        let before = engine.filter().clone();
        assert_eq!(before.len(), MAX_SELECTION / 10);

        let effects = create(&mut engine, &surface, square(0.0, 11.0));
        assert_eq!(effects, vec![Effect::Warn(OVERLOAD_WARNING.to_string())]);
        assert_eq!(engine.filter(), &before);
        assert_eq!(engine.state(), SelectionState::Idle);

        // Edits that grow past the ceiling are rejected the same way.
        let effects = engine.handle(SelectionEvent::Draw(DrawEvent::Update(square(0.0, 11.0))), &surface);
        assert_eq!(effects, vec![Effect::Warn(OVERLOAD_WARNING.to_string())]);
        assert_eq!(engine.filter(), &before);
    }

    #[test]
    fn test_polygon_just_below_limit_is_accepted() {
        let points: Vec<(f64, f64)> = (0..MAX_SELECTION - 1).map(|_| (1.0, 1.0)).collect();
        let surface = FlatSurface::with_points(&points);
        let mut engine = SelectionEngine::new();
        let effects = create(&mut engine, &surface, square(0.0, 2.0));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Warn(_))));
        assert_eq!(engine.selected_keys().len(), MAX_SELECTION - 1);
    }

    #[test]
    fn test_polygon_ceiling_counts_survivors_not_candidates() {
        // Everything at (8, 8) sits inside the triangle's bounding box but
        // outside the triangle itself.
        let mut points: Vec<(f64, f64)> = (0..MAX_SELECTION).map(|_| (8.0, 8.0)).collect();
        points.extend([(2.0, 2.0), (3.0, 1.0)]);
        let surface = FlatSurface::with_points(&points);
        let triangle = vec![LngLat::new(0.0, 0.0), LngLat::new(10.0, 0.0), LngLat::new(0.0, 10.0)];
        let mut engine = SelectionEngine::new();

        let effects = create(&mut engine, &surface, triangle);
        let first = format!("u{MAX_SELECTION}");
        let second = format!("u{}", MAX_SELECTION + 1);
        assert_eq!(
            effects,
            vec![Effect::SetFilter(HighlightFilter::including(vec![first, second]))]
        );
    }

    #[test]
    fn test_polygon_includes_points_on_edges() {
        let surface = FlatSurface::with_points(&[(0.0, 5.0), (5.0, 5.0), (10.5, 5.0)]);
        let mut engine = SelectionEngine::new();
        create(&mut engine, &surface, square(0.0, 10.0));
        assert_eq!(engine.selected_keys(), urls(&["u0", "u1"]).as_slice());
    }

    #[test]
    fn test_escape_cancels_without_filter_change() {
        let surface = FlatSurface::with_points(&[(1.0, -1.0)]);
        let mut engine = SelectionEngine::new();
        drag(&mut engine, &surface, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(5.0, 5.0));
        let before = engine.filter().clone();

        engine.handle(down(0.0, 0.0), &surface);
        engine.handle(SelectionEvent::PointerMove(ScreenPoint::new(30.0, 30.0)), &surface);
        let effects = engine.handle(SelectionEvent::KeyDown(Key::Escape), &surface);
        assert_eq!(effects, vec![Effect::RemoveBox, Effect::EnablePan]);
        assert!(engine.overlay().is_none());
        assert!(!engine.is_capturing());
        assert_eq!(engine.filter(), &before);

        // The gesture is over: a late release does nothing.
        assert!(engine
            .handle(SelectionEvent::PointerUp(ScreenPoint::new(30.0, 30.0)), &surface)
            .is_empty());
    }

    #[test]
    fn test_other_keys_do_not_cancel() {
        let surface = FlatSurface::with_points(&[]);
        let mut engine = SelectionEngine::new();
        engine.handle(down(0.0, 0.0), &surface);
        assert!(engine.handle(SelectionEvent::KeyDown(Key::Other), &surface).is_empty());
        assert!(engine.is_capturing());
    }

    #[test]
    fn test_polygon_excludes_points_outside_ring() {
        // Triangle with the right angle at the origin; (8, 8) lies inside the
        // bounding box but outside the triangle.
        let surface = FlatSurface::with_points(&[(2.0, 2.0), (8.0, 8.0), (20.0, 20.0)]);
        let mut engine = SelectionEngine::new();
        let ring = vec![LngLat::new(0.0, 0.0), LngLat::new(10.0, 0.0), LngLat::new(0.0, 10.0)];
        let effects = engine.handle(SelectionEvent::Draw(DrawEvent::Create(ring)), &surface);
        assert_eq!(
            effects,
            vec![Effect::SetFilter(HighlightFilter::including(urls(&["u0"])))]
        );
        assert_eq!(engine.selected_keys(), urls(&["u0"]).as_slice());
    }

    #[test]
    fn test_polygon_update_rebuilds_selection() {
        let surface = FlatSurface::with_points(&[(2.0, 2.0), (12.0, 2.0)]);
        let mut engine = SelectionEngine::new();
        let small = vec![LngLat::new(0.0, 0.0), LngLat::new(5.0, 0.0), LngLat::new(5.0, 5.0), LngLat::new(0.0, 5.0)];
        engine.handle(SelectionEvent::Draw(DrawEvent::Create(small)), &surface);
        assert_eq!(engine.selected_keys(), urls(&["u0"]).as_slice());

        let wide = vec![LngLat::new(10.0, 0.0), LngLat::new(15.0, 0.0), LngLat::new(15.0, 5.0), LngLat::new(10.0, 5.0)];
        engine.handle(SelectionEvent::Draw(DrawEvent::Update(wide)), &surface);
        assert_eq!(engine.selected_keys(), urls(&["u1"]).as_slice());
    }

    #[test]
    fn test_degenerate_polygon_selects_nothing() {
        let surface = FlatSurface::with_points(&[(2.0, 2.0)]);
        let mut engine = SelectionEngine::new();
        let effects = engine.handle(SelectionEvent::Draw(DrawEvent::Create(Vec::new())), &surface);
        assert_eq!(effects, vec![Effect::SetFilter(HighlightFilter::none())]);
    }

    #[test]
    fn test_polygon_delete_and_mode_change_clear_filter() {
        let surface = FlatSurface::with_points(&[(2.0, 2.0)]);
        let mut engine = SelectionEngine::new();
        let ring = vec![LngLat::new(0.0, 0.0), LngLat::new(5.0, 0.0), LngLat::new(0.0, 5.0)];

        engine.handle(SelectionEvent::Draw(DrawEvent::Create(ring.clone())), &surface);
        assert!(!engine.filter().is_empty());
        engine.handle(SelectionEvent::Draw(DrawEvent::Delete), &surface);
        assert!(engine.filter().is_empty());

        engine.handle(SelectionEvent::Draw(DrawEvent::Create(ring)), &surface);
        engine.handle(SelectionEvent::Draw(DrawEvent::ModeChange(DrawMode::DrawPolygon)), &surface);
        assert!(engine.filter().is_empty());
        assert_eq!(engine.state(), SelectionState::Drawing);
    }

    #[test]
    fn test_drawing_mode_ignores_modifier_drag() {
        let surface = FlatSurface::with_points(&[(1.0, -1.0)]);
        let mut engine = SelectionEngine::new();
        engine.handle(SelectionEvent::Draw(DrawEvent::ModeChange(DrawMode::DrawPolygon)), &surface);
        assert!(engine.handle(down(0.0, 0.0), &surface).is_empty());
        assert_eq!(engine.state(), SelectionState::Drawing);

        let ring = vec![LngLat::new(0.0, 0.0), LngLat::new(5.0, 0.0), LngLat::new(0.0, 5.0)];
        engine.handle(SelectionEvent::Draw(DrawEvent::Create(ring)), &surface);
        assert_eq!(engine.state(), SelectionState::Idle);
    }

    #[test]
    fn test_mode_change_mid_drag_cleans_up() {
        let surface = FlatSurface::with_points(&[]);
        let mut engine = SelectionEngine::new();
        engine.handle(down(0.0, 0.0), &surface);
        engine.handle(SelectionEvent::PointerMove(ScreenPoint::new(3.0, 3.0)), &surface);
        let effects = engine.handle(
            SelectionEvent::Draw(DrawEvent::ModeChange(DrawMode::DrawPolygon)),
            &surface,
        );
        assert_eq!(
            effects,
            vec![
                Effect::RemoveBox,
                Effect::EnablePan,
                Effect::SetFilter(HighlightFilter::none())
            ]
        );
        assert!(!engine.is_capturing());
    }

    #[test]
    fn test_repeated_gestures_do_not_accumulate_state() {
        let surface = FlatSurface::with_points(&[(1.0, -1.0)]);
        let mut engine = SelectionEngine::new();
        for _ in 0..3 {
            let effects = drag(&mut engine, &surface, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(2.0, 2.0));
            assert_eq!(effects.iter().filter(|e| **e == Effect::EnablePan).count(), 1);
            assert_eq!(engine.state(), SelectionState::Idle);
        }
        assert_eq!(engine.selected_keys(), urls(&["u0"]).as_slice());
    }

    #[test]
    fn test_drag_selects_only_listing_a() {
        let fc = scenario_collection();
        let scene = scenario_scene(&fc);
        let a = scene.project(LngLat::new(-71.10, 42.36));
        let mut engine = SelectionEngine::new();
        drag(
            &mut engine,
            &scene,
            ScreenPoint::new(a.x - 8.0, a.y - 8.0),
            ScreenPoint::new(a.x + 8.0, a.y + 8.0),
        );
        assert_eq!(engine.selected_keys(), urls(&["a"]).as_slice());
        assert_eq!(engine.filter().to_expression(), serde_json::json!(["in", "listing_url", "a"]));
        assert!(engine.filter().matches("a"));
        assert!(!engine.filter().matches("b"));
    }

    #[test]
    fn test_selection_ignores_hidden_circles() {
        let fc = scenario_collection();
        let mut scene = scenario_scene(&fc);
        scene.layers.toggle();
        let mut engine = SelectionEngine::new();
        drag(&mut engine, &scene, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(800.0, 600.0));
        assert!(engine.selected_keys().is_empty());
    }
}
