pub mod draw_toolbar;
pub mod help_overlay;
pub mod layer_toggle;
pub mod map_view;
