//! Web Mercator viewport math.
//!
//! The world is `TILE_SIZE * 2^zoom` pixels wide, matching vector-tile map
//! renderers, so zoom levels line up with the style tile API.

use std::f64::consts::PI;

use crate::models::{LngLat, ScreenPoint};

pub const TILE_SIZE: f64 = 512.0;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Initial camera: central Boston.
pub const DEFAULT_CENTER: LngLat = LngLat::new(-71.104081, 42.365554);
pub const DEFAULT_ZOOM: f64 = 12.0;

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Geographic coordinate to world pixels at `zoom`.
pub fn lnglat_to_world(ll: LngLat, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = ll.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (ll.lng + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * PI)) * size;
    (x, y)
}

/// World pixels at `zoom` back to a geographic coordinate.
pub fn world_to_lnglat(x: f64, y: f64, zoom: f64) -> LngLat {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    LngLat { lng, lat }
}

/// A raster tile and where it lands on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub z: u32,
    pub x: u32,
    pub y: u32,
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

/// Camera over a fixed-size container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LngLat,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        Viewport {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    pub fn project(&self, ll: LngLat) -> ScreenPoint {
        let (cx, cy) = lnglat_to_world(self.center, self.zoom);
        let (x, y) = lnglat_to_world(ll, self.zoom);
        ScreenPoint::new(x - cx + self.width / 2.0, y - cy + self.height / 2.0)
    }

    pub fn unproject(&self, p: ScreenPoint) -> LngLat {
        let (cx, cy) = lnglat_to_world(self.center, self.zoom);
        world_to_lnglat(
            p.x - self.width / 2.0 + cx,
            p.y - self.height / 2.0 + cy,
            self.zoom,
        )
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Move the content by `(dx, dy)` screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = lnglat_to_world(self.center, self.zoom);
        self.center = world_to_lnglat(cx - dx, cy - dy, self.zoom);
    }

    /// Change zoom while keeping the geographic point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: ScreenPoint, new_zoom: f64) {
        let new_zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let pinned = self.unproject(anchor);
        self.zoom = new_zoom;
        let moved = self.project(pinned);
        self.pan_by(anchor.x - moved.x, anchor.y - moved.y);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Tiles covering the viewport at the integer zoom below `self.zoom`.
    pub fn visible_tiles(&self) -> Vec<TilePlacement> {
        let z = self.zoom.floor().clamp(MIN_ZOOM, MAX_ZOOM) as u32;
        let scale = 2f64.powf(self.zoom - z as f64);
        let size = TILE_SIZE * scale;
        let count = 1u64 << z;

        let (cx, cy) = lnglat_to_world(self.center, z as f64);
        let left = cx - self.width / 2.0 / scale;
        let top = cy - self.height / 2.0 / scale;
        let right = cx + self.width / 2.0 / scale;
        let bottom = cy + self.height / 2.0 / scale;

        let x0 = (left / TILE_SIZE).floor() as i64;
        let x1 = (right / TILE_SIZE).ceil() as i64 - 1;
        let y0 = ((top / TILE_SIZE).floor() as i64).max(0);
        let y1 = ((bottom / TILE_SIZE).ceil() as i64 - 1).min(count as i64 - 1);

        let mut tiles = Vec::new();
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                tiles.push(TilePlacement {
                    z,
                    x: tx.rem_euclid(count as i64) as u32,
                    y: ty as u32,
                    left: (tx as f64 * TILE_SIZE - left) * scale,
                    top: (ty as f64 * TILE_SIZE - top) * scale,
                    size,
                });
            }
        }
        tiles
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(DEFAULT_CENTER, DEFAULT_ZOOM, 960.0, 640.0)
    }
}
