use dioxus::html::geometry::WheelDelta;
use listing_map_shared::models::ScreenPoint;

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> ScreenPoint {
    ScreenPoint::new(client_x - rect_left, client_y - rect_top)
}

/// Get the bounding client rect of an element by id.
pub fn element_rect(element_id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(element_id)?;
    Some(element.get_bounding_client_rect())
}

/// Container-relative position of a pointer event, using the live layout.
pub fn pointer_in_container(client_x: f64, client_y: f64, container_id: &str) -> Option<ScreenPoint> {
    let rect = element_rect(container_id)?;
    Some(client_to_container(client_x, client_y, rect.left(), rect.top()))
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
pub fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Zoom change for one wheel delta. 500 pixels of scroll is one zoom level.
pub fn wheel_zoom_delta(delta_y: f64) -> f64 {
    -delta_y / 500.0
}
