use picker_shared::models::MAX_LONGITUDE;

/// Bring a longitude from a wrapped world copy back into [-180, 180].
///
/// Leaflet reports clicks on the repeated copies of the world as e.g. 200.0
/// or -370.0. Values already in range are returned unchanged, so 180.0 and
/// -180.0 both survive.
pub fn wrap_longitude(lng: f64) -> f64 {
    if (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lng) {
        return lng;
    }
    let span = 2.0 * MAX_LONGITUDE;
    (lng + MAX_LONGITUDE).rem_euclid(span) - MAX_LONGITUDE
}

/// The page's address split the way the picker needs it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLocation {
    /// Origin plus path, without query or fragment.
    pub base_url: String,
    /// Raw query string including its leading `?`, or empty.
    pub query: String,
}

/// Read the current page location from the browser.
pub fn page_location() -> PageLocation {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return PageLocation::default();
    };
    let origin = location.origin().unwrap_or_default();
    let path = location.pathname().unwrap_or_default();
    PageLocation {
        base_url: format!("{origin}{path}"),
        query: location.search().unwrap_or_default(),
    }
}

/// Origin of the page, used to reach the backend on the same host.
pub fn page_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}
