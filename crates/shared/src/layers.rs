//! The three listing layers, their style documents, and the evaluators the
//! SVG renderer uses to draw them.

use serde_json::json;

use crate::data::DatasetStats;

pub const SOURCE_ID: &str = "listings";

/// Heatmap is not drawn at or above this zoom.
pub const HEATMAP_MAX_ZOOM: f64 = 15.0;

pub const CIRCLE_MIN_RADIUS: f64 = 2.0;
pub const CIRCLE_MAX_RADIUS: f64 = 10.0;
pub const CIRCLE_OPACITY: f64 = 0.8;
pub const HIGHLIGHT_STROKE_WIDTH: f64 = 1.0;

pub const PRICE_LOW_COLOR: Rgba = Rgba::rgb(0xff, 0xf7, 0xec);
pub const PRICE_HIGH_COLOR: Rgba = Rgba::rgb(0x7f, 0x00, 0x00);
pub const HIGHLIGHT_STROKE_COLOR: Rgba = Rgba::rgb(0x7f, 0x00, 0x00);

/// Heatmap color ramp over density [0, 1].
pub const HEATMAP_RAMP: [(f64, Rgba); 6] = [
    (0.0, Rgba::new(33, 102, 172, 0.0)),
    (0.2, Rgba::rgb(103, 169, 207)),
    (0.4, Rgba::rgb(209, 229, 240)),
    (0.6, Rgba::rgb(253, 219, 199)),
    (0.8, Rgba::rgb(239, 138, 98)),
    (1.0, Rgba::rgb(178, 24, 43)),
];

const HEATMAP_INTENSITY_STOPS: [(f64, f64); 2] = [(0.0, 1.0), (15.0, 3.0)];
const HEATMAP_RADIUS_STOPS: [(f64, f64); 2] = [(0.0, 2.0), (15.0, 20.0)];
const HEATMAP_OPACITY_STOPS: [(f64, f64); 2] = [(14.0, 1.0), (15.0, 0.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Heatmap,
    Circles,
    Highlighted,
}

impl LayerId {
    pub const ALL: [LayerId; 3] = [LayerId::Heatmap, LayerId::Circles, LayerId::Highlighted];

    pub fn id(self) -> &'static str {
        match self {
            LayerId::Heatmap => "listings-heatmap",
            LayerId::Circles => "listings-circles",
            LayerId::Highlighted => "listings-circles-highlighted",
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    None,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::None => "none",
        }
    }
}

/// Which encoding is on screen. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveLayer {
    Heatmap,
    #[default]
    Points,
}

/// Owns the heatmap / points toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerManager {
    active: ActiveLayer,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ActiveLayer {
        self.active
    }

    /// Flip between heatmap and points; returns the new state.
    pub fn toggle(&mut self) -> ActiveLayer {
        self.active = match self.active {
            ActiveLayer::Heatmap => ActiveLayer::Points,
            ActiveLayer::Points => ActiveLayer::Heatmap,
        };
        tracing::debug!(active = ?self.active, "Toggled listing layers");
        self.active
    }

    pub fn visibility(&self, layer: LayerId) -> Visibility {
        let visible = match (self.active, layer) {
            (ActiveLayer::Heatmap, LayerId::Heatmap) => true,
            (ActiveLayer::Points, LayerId::Circles | LayerId::Highlighted) => true,
            _ => false,
        };
        if visible {
            Visibility::Visible
        } else {
            Visibility::None
        }
    }

    pub fn is_visible(&self, layer: LayerId) -> bool {
        self.visibility(layer) == Visibility::Visible
    }

    /// `(layer, visibility)` for every layer, in declaration order.
    pub fn layout(&self) -> [(LayerId, Visibility); 3] {
        LayerId::ALL.map(|l| (l, self.visibility(l)))
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn css(&self) -> String {
        if (self.a - 1.0).abs() < f64::EPSILON {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

// ---------------------------------------------------------------------------
// Style function evaluation
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolation over sorted stops, clamped at both ends.
/// Non-finite input evaluates to the first stop.
pub fn interpolate_stops(stops: &[(f64, f64)], x: f64) -> f64 {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return 0.0;
    };
    if !x.is_finite() || x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    for pair in stops.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let t = (x - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    last.1
}

fn interpolate_colors(stops: &[(f64, Rgba)], x: f64) -> Rgba {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgba::new(0, 0, 0, 0.0);
    };
    if !x.is_finite() || x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    for pair in stops.windows(2) {
        let (x0, c0) = pair[0];
        let (x1, c1) = pair[1];
        if x <= x1 {
            return c0.lerp(c1, (x - x0) / (x1 - x0));
        }
    }
    last.1
}

pub fn heatmap_color(density: f64) -> Rgba {
    interpolate_colors(&HEATMAP_RAMP, density)
}

pub fn heatmap_intensity(zoom: f64) -> f64 {
    interpolate_stops(&HEATMAP_INTENSITY_STOPS, zoom)
}

pub fn heatmap_radius(zoom: f64) -> f64 {
    interpolate_stops(&HEATMAP_RADIUS_STOPS, zoom)
}

/// Fades out between zoom 14 and 15, where the circles take over.
pub fn heatmap_opacity(zoom: f64) -> f64 {
    if zoom >= HEATMAP_MAX_ZOOM {
        return 0.0;
    }
    interpolate_stops(&HEATMAP_OPACITY_STOPS, zoom)
}

/// Dataset-dependent style, built once per load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyles {
    pub min_rating: f64,
    pub max_rating: f64,
    pub min_price_log: f64,
    pub max_price_log: f64,
}

impl LayerStyles {
    pub fn from_stats(stats: &DatasetStats) -> Self {
        let (min_rating, max_rating) = stats.rating_domain();
        let (min_price_log, max_price_log) = stats.price_log_domain();
        LayerStyles {
            min_rating,
            max_rating,
            min_price_log,
            max_price_log,
        }
    }

    /// Heatmap weight for a feature. Absent rating weighs nothing.
    pub fn heatmap_weight(&self, rating: Option<f64>) -> f64 {
        match rating {
            Some(r) => interpolate_stops(&[(0.0, 0.0), (self.max_rating, 1.0)], r),
            None => 0.0,
        }
    }

    /// Circle radius in pixels, shared by the circles and highlight layers.
    pub fn circle_radius(&self, rating: Option<f64>) -> f64 {
        match rating {
            Some(r) => interpolate_stops(
                &[
                    (self.min_rating, CIRCLE_MIN_RADIUS),
                    (self.max_rating, CIRCLE_MAX_RADIUS),
                ],
                r,
            ),
            None => CIRCLE_MIN_RADIUS,
        }
    }

    pub fn circle_color(&self, price_log: f64) -> Rgba {
        interpolate_colors(
            &[
                (self.min_price_log, PRICE_LOW_COLOR),
                (self.max_price_log, PRICE_HIGH_COLOR),
            ],
            price_log,
        )
    }

    /// Paint properties for `layer` in the map-style JSON vocabulary.
    pub fn paint_json(&self, layer: LayerId) -> serde_json::Value {
        let radius = json!({
            "property": "rating",
            "stops": [[self.min_rating, CIRCLE_MIN_RADIUS], [self.max_rating, CIRCLE_MAX_RADIUS]],
        });
        match layer {
            LayerId::Heatmap => {
                let mut ramp = vec![json!("interpolate"), json!(["linear"]), json!(["heatmap-density"])];
                for (stop, color) in HEATMAP_RAMP {
                    ramp.push(json!(stop));
                    ramp.push(json!(color.css()));
                }
                json!({
                    "heatmap-weight": {
                        "property": "rating",
                        "type": "exponential",
                        "stops": [[0.0, 0.0], [self.max_rating, 1.0]],
                    },
                    "heatmap-intensity": { "stops": HEATMAP_INTENSITY_STOPS },
                    "heatmap-color": ramp,
                    "heatmap-radius": { "stops": HEATMAP_RADIUS_STOPS },
                    "heatmap-opacity": { "default": 1, "stops": HEATMAP_OPACITY_STOPS },
                })
            }
            LayerId::Circles => json!({
                "circle-radius": radius,
                "circle-color": [
                    "interpolate", ["linear"], ["get", "price_log_num"],
                    self.min_price_log, PRICE_LOW_COLOR.hex(),
                    self.max_price_log, PRICE_HIGH_COLOR.hex(),
                ],
                "circle-opacity": CIRCLE_OPACITY,
            }),
            LayerId::Highlighted => json!({
                "circle-radius": radius,
                "circle-color": "rgba(255, 255, 255, 0)",
                "circle-stroke-color": HIGHLIGHT_STROKE_COLOR.hex(),
                "circle-stroke-width": HIGHLIGHT_STROKE_WIDTH,
                "circle-opacity": CIRCLE_OPACITY,
            }),
        }
    }

    /// Full layer declaration bound to the `listings` source.
    pub fn layer_json(&self, layer: LayerId, manager: &LayerManager) -> serde_json::Value {
        let kind = match layer {
            LayerId::Heatmap => "heatmap",
            LayerId::Circles | LayerId::Highlighted => "circle",
        };
        let mut decl = json!({
            "id": layer.id(),
            "type": kind,
            "source": SOURCE_ID,
            "paint": self.paint_json(layer),
            "layout": { "visibility": manager.visibility(layer).as_str() },
        });
        if layer == LayerId::Heatmap {
            decl["maxzoom"] = json!(HEATMAP_MAX_ZOOM);
        }
        decl
    }
}
