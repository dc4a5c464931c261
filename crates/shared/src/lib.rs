pub mod data;
pub mod features;
pub mod filter;
pub mod geometry;
pub mod heatmap;
pub mod layers;
pub mod models;
pub mod projection;
pub mod selection;
pub mod surface;
pub mod tooltip;
