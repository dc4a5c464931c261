use serde::{Deserialize, Serialize};

/// One row of the listings dataset, with the derived log-price.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub listing_url: String,
    pub name: String,
    /// Raw price cell as it appears in the dataset, e.g. `"$1,250.00"`.
    pub price: String,
    /// Natural log of the numeric price. `NaN` when the price is not numeric.
    pub price_log: f64,
    pub rating: Option<f64>,
    pub longitude: f64,
    pub latitude: f64,
}

impl Listing {
    pub fn lng_lat(&self) -> LngLat {
        LngLat {
            lng: self.longitude,
            lat: self.latitude,
        }
    }
}

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        LngLat { lng, lat }
    }
}

/// Pixel position relative to the top-left corner of the map container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        ScreenPoint { x, y }
    }

    pub fn distance(self, other: ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle in screen space. Always normalized so that
/// `min` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenBox {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl ScreenBox {
    /// Build a box from two arbitrary corners, in any order.
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        ScreenBox {
            min: ScreenPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: ScreenPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// CSS for the rubber-band overlay element.
    pub fn css(&self) -> String {
        format!(
            "transform: translate({}px, {}px); width: {}px; height: {}px;",
            self.min.x,
            self.min.y,
            self.width(),
            self.height()
        )
    }
}

/// The five properties carried by every rendered listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureProperties {
    pub listing_url: String,
    pub name: String,
    pub price: String,
    pub price_log_num: f64,
    pub rating: Option<f64>,
}

/// A point feature derived from one [`Listing`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub coordinates: LngLat,
    pub properties: FeatureProperties,
}

/// Read-only projection of the whole dataset, backing the `listings` source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// GeoJSON representation. Non-finite numbers become `null`.
    pub fn to_geojson(&self) -> serde_json::Value {
        let features: Vec<serde_json::Value> = self
            .features
            .iter()
            .map(|f| {
                let price_log = if f.properties.price_log_num.is_finite() {
                    serde_json::json!(f.properties.price_log_num)
                } else {
                    serde_json::Value::Null
                };
                serde_json::json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [f.coordinates.lng, f.coordinates.lat],
                    },
                    "properties": {
                        "listing_url": f.properties.listing_url,
                        "name": f.properties.name,
                        "price": f.properties.price,
                        "price_log_num": price_log,
                        "rating": f.properties.rating,
                    },
                })
            })
            .collect();
        serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}
