use crate::layers::LayerId;
use crate::models::{Feature, LngLat, ScreenPoint};
use crate::surface::MapSurface;

/// Popup offset from the anchored coordinate, in pixels.
pub const POPUP_OFFSET: (f64, f64) = (0.0, -15.0);

pub const HOVER_LAYER: LayerId = LayerId::Circles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    pub fn css(self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub anchor: LngLat,
    pub title: String,
    pub price_line: String,
    pub rating_line: String,
}

impl Popup {
    pub fn for_feature(feature: &Feature) -> Self {
        let props = &feature.properties;
        let rating = match props.rating {
            Some(r) => format!("{r}"),
            None => "N/A".to_string(),
        };
        // The price cell already carries its currency symbol.
        let price = props.price.trim_start_matches('$');
        Popup {
            anchor: feature.coordinates,
            title: props.name.clone(),
            price_line: format!("Price: ${price}"),
            rating_line: format!("Rating: {rating}"),
        }
    }

    /// Screen position of the popup tip for the given projection.
    pub fn position(&self, surface: &dyn MapSurface) -> ScreenPoint {
        let p = surface.project(self.anchor);
        ScreenPoint::new(p.x + POPUP_OFFSET.0, p.y + POPUP_OFFSET.1)
    }
}

/// Hover popup over the circles layer. Holds at most one popup.
#[derive(Debug, Clone, Default)]
pub struct TooltipController {
    popup: Option<Popup>,
    cursor: Cursor,
    hovering: bool,
}

impl TooltipController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Pointer entered the layer: show the top-most feature under it, if any.
    pub fn on_pointer_enter(&mut self, point: ScreenPoint, surface: &dyn MapSurface) {
        self.hovering = true;
        let hits = surface.query_rendered_point(point, HOVER_LAYER);
        let Some(feature) = hits.first() else {
            return;
        };
        self.cursor = Cursor::Pointer;
        self.popup = Some(Popup::for_feature(feature));
    }

    /// Pointer left the layer. A no-op for the popup when none is shown.
    pub fn on_pointer_leave(&mut self) {
        self.hovering = false;
        self.cursor = Cursor::Default;
        if let Some(popup) = self.popup.take() {
            tracing::trace!(title = %popup.title, "Removed listing popup");
        }
    }

    /// Derive enter/leave from raw pointer movement over the map.
    pub fn on_pointer_move(&mut self, point: ScreenPoint, surface: &dyn MapSurface) {
        let over = !surface.query_rendered_point(point, HOVER_LAYER).is_empty();
        match (self.hovering, over) {
            (false, true) => self.on_pointer_enter(point, surface),
            (true, false) => self.on_pointer_leave(),
            _ => {}
        }
    }
}
