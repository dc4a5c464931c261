use crate::filter::HighlightFilter;
use crate::layers::{heatmap_radius, LayerId, LayerManager, LayerStyles, HEATMAP_MAX_ZOOM};
use crate::models::{Feature, FeatureCollection, LngLat, ScreenBox, ScreenPoint};
use crate::projection::Viewport;

/// What the selection and tooltip logic needs from the map renderer.
pub trait MapSurface {
    fn project(&self, ll: LngLat) -> ScreenPoint;

    /// Rendered features of `layer` whose position falls inside `bbox`,
    /// in render order (bottom-most first).
    fn query_rendered_features(&self, bbox: ScreenBox, layer: LayerId) -> Vec<&Feature>;

    /// Rendered features of `layer` drawn under `point`, top-most first.
    fn query_rendered_point(&self, point: ScreenPoint, layer: LayerId) -> Vec<&Feature>;
}

/// A frame of the listings source as drawn through a [`Viewport`].
///
/// A feature counts as rendered for a layer when the layer is visible, the
/// feature passes the layer's filter, and it projects inside the viewport.
pub struct RenderedScene<'a> {
    pub viewport: Viewport,
    pub styles: LayerStyles,
    pub layers: LayerManager,
    features: &'a FeatureCollection,
    highlight: Option<&'a HighlightFilter>,
}

impl<'a> RenderedScene<'a> {
    pub fn new(
        viewport: Viewport,
        styles: LayerStyles,
        layers: LayerManager,
        features: &'a FeatureCollection,
    ) -> Self {
        RenderedScene {
            viewport,
            styles,
            layers,
            features,
            highlight: None,
        }
    }

    /// Attach the overlay filter. Without one, the highlight layer renders nothing.
    pub fn with_highlight(mut self, filter: &'a HighlightFilter) -> Self {
        self.highlight = Some(filter);
        self
    }

    fn layer_drawn(&self, layer: LayerId) -> bool {
        if !self.layers.is_visible(layer) {
            return false;
        }
        !(layer == LayerId::Heatmap && self.viewport.zoom >= HEATMAP_MAX_ZOOM)
    }

    fn passes_filter(&self, layer: LayerId, feature: &Feature) -> bool {
        match layer {
            LayerId::Highlighted => self
                .highlight
                .is_some_and(|f| f.matches(&feature.properties.listing_url)),
            LayerId::Heatmap | LayerId::Circles => true,
        }
    }

    fn hit_radius(&self, layer: LayerId, feature: &Feature) -> f64 {
        match layer {
            LayerId::Heatmap => heatmap_radius(self.viewport.zoom),
            LayerId::Circles | LayerId::Highlighted => {
                self.styles.circle_radius(feature.properties.rating)
            }
        }
    }

    /// Every rendered feature of `layer` with its screen position, in render order.
    pub fn rendered(&self, layer: LayerId) -> Vec<(ScreenPoint, &'a Feature)> {
        if !self.layer_drawn(layer) {
            return Vec::new();
        }
        let features: &'a FeatureCollection = self.features;
        features
            .features
            .iter()
            .filter(|f| self.passes_filter(layer, f))
            .map(|f| (self.viewport.project(f.coordinates), f))
            .filter(|(p, _)| self.viewport.contains(*p))
            .collect()
    }
}

impl MapSurface for RenderedScene<'_> {
    fn project(&self, ll: LngLat) -> ScreenPoint {
        self.viewport.project(ll)
    }

    fn query_rendered_features(&self, bbox: ScreenBox, layer: LayerId) -> Vec<&Feature> {
        self.rendered(layer)
            .into_iter()
            .filter(|(p, _)| bbox.contains(*p))
            .map(|(_, f)| f)
            .collect()
    }

    fn query_rendered_point(&self, point: ScreenPoint, layer: LayerId) -> Vec<&Feature> {
        let mut hits: Vec<&Feature> = self
            .rendered(layer)
            .into_iter()
            .filter(|(p, f)| p.distance(point) <= self.hit_radius(layer, f))
            .map(|(_, f)| f)
            .collect();
        hits.reverse();
        hits
    }
}
