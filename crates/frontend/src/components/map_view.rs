use dioxus::logger::tracing;
use picker_shared::{Coordinate, MapView};
use wasm_bindgen::prelude::*;

use crate::coords;

// ---------------------------------------------------------------------------
// Leaflet bindings (the `L` global from leaflet.js)
// ---------------------------------------------------------------------------

mod leaflet {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        pub type Map;
        pub type Marker;
        pub type TileLayer;
        pub type LatLng;
        pub type MouseEvent;
        pub type AttributionControl;
        pub type LayerOptions;

        #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
        pub fn create_map(container_id: &str) -> Result<Map, JsValue>;

        #[wasm_bindgen(method, js_name = setView)]
        pub fn set_view(this: &Map, center: &LatLng, zoom: u8);

        #[wasm_bindgen(method, js_name = setMaxZoom)]
        pub fn set_max_zoom(this: &Map, zoom: u8);

        #[wasm_bindgen(method, getter, js_name = attributionControl)]
        pub fn attribution_control(this: &Map) -> AttributionControl;

        #[wasm_bindgen(method, js_name = addAttribution)]
        pub fn add_attribution(this: &AttributionControl, text: &str);

        #[wasm_bindgen(method)]
        pub fn on(this: &Map, event: &str, handler: &JsValue);

        #[wasm_bindgen(method)]
        pub fn off(this: &Map, event: &str, handler: &JsValue);

        #[wasm_bindgen(method)]
        pub fn remove(this: &Map);

        #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
        pub fn tile_layer(url_template: &str) -> TileLayer;

        #[wasm_bindgen(method, getter)]
        pub fn options(this: &TileLayer) -> LayerOptions;

        #[wasm_bindgen(method, setter, js_name = maxZoom)]
        pub fn set_max_zoom(this: &LayerOptions, zoom: u8);

        #[wasm_bindgen(method, js_name = addTo)]
        pub fn add_layer_to(this: &TileLayer, map: &Map);

        #[wasm_bindgen(js_namespace = L, js_name = marker)]
        pub fn marker(at: &LatLng) -> Marker;

        #[wasm_bindgen(method, js_name = addTo)]
        pub fn add_marker_to(this: &Marker, map: &Map);

        #[wasm_bindgen(method, js_name = setLatLng)]
        pub fn set_lat_lng(this: &Marker, at: &LatLng);

        #[wasm_bindgen(js_namespace = L, js_name = latLng)]
        pub fn lat_lng(lat: f64, lng: f64) -> LatLng;

        #[wasm_bindgen(method, getter)]
        pub fn lat(this: &LatLng) -> f64;

        #[wasm_bindgen(method, getter)]
        pub fn lng(this: &LatLng) -> f64;

        #[wasm_bindgen(method, getter)]
        pub fn latlng(this: &MouseEvent) -> LatLng;
    }
}

// ---------------------------------------------------------------------------
// Map defaults
// ---------------------------------------------------------------------------

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Initial view and tile source for a freshly mounted map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDefaults {
    pub center: Coordinate,
    pub zoom: u8,
    pub max_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl MapDefaults {
    /// Picker page: Nyeri, Kenya.
    pub fn picker() -> Self {
        MapDefaults {
            center: Coordinate {
                lat: -0.398221,
                lng: 36.960749,
            },
            zoom: 13,
            max_zoom: 19,
            tile_url: OSM_TILE_URL.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }

    /// Map-only page: London.
    pub fn map_only() -> Self {
        MapDefaults {
            center: Coordinate {
                lat: 51.505,
                lng: -0.09,
            },
            ..Self::picker()
        }
    }

    /// Options for the tile layer. Its zoom ceiling follows the map's.
    pub fn tile_settings(&self) -> TileSettings<'_> {
        TileSettings {
            url: &self.tile_url,
            max_zoom: self.max_zoom,
            attribution: &self.attribution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSettings<'a> {
    pub url: &'a str,
    pub max_zoom: u8,
    pub attribution: &'a str,
}

/// Store `new` in `slot`, unbinding whatever was there first.
fn replace_listener<T>(slot: &mut Option<T>, new: T, unbind: impl FnOnce(&T)) {
    if let Some(old) = slot.take() {
        unbind(&old);
    }
    *slot = Some(new);
}

// ---------------------------------------------------------------------------
// LeafletMap
// ---------------------------------------------------------------------------

/// A Leaflet map mounted into a DOM element, with at most one marker.
pub struct LeafletMap {
    map: leaflet::Map,
    marker: Option<leaflet::Marker>,
    click_handler: Option<Closure<dyn FnMut(leaflet::MouseEvent)>>,
    destroyed: bool,
}

impl LeafletMap {
    /// Create the map inside the element with id `container_id`.
    ///
    /// Fails if Leaflet is not loaded or the element does not exist.
    pub fn mount(container_id: &str, defaults: &MapDefaults) -> Result<Self, JsValue> {
        let map = leaflet::create_map(container_id)?;
        let center = leaflet::lat_lng(defaults.center.lat, defaults.center.lng);
        map.set_view(&center, defaults.zoom);
        map.set_max_zoom(defaults.max_zoom);

        let tiles = defaults.tile_settings();
        let layer = leaflet::tile_layer(tiles.url);
        // Leaflet tile layers stop at zoom 18 unless told otherwise
        layer.options().set_max_zoom(tiles.max_zoom);
        layer.add_layer_to(&map);
        map.attribution_control().add_attribution(tiles.attribution);

        tracing::debug!("Mounted map in #{container_id}");
        Ok(LeafletMap {
            map,
            marker: None,
            click_handler: None,
            destroyed: false,
        })
    }

    /// Call `handler` with the clicked point on every map click.
    ///
    /// Longitudes from wrapped world copies are brought back into range.
    /// A second call replaces the first handler.
    pub fn on_click(&mut self, mut handler: impl FnMut(Coordinate) + 'static) {
        if self.destroyed {
            return;
        }
        let closure = Closure::<dyn FnMut(leaflet::MouseEvent)>::new(
            move |event: leaflet::MouseEvent| {
                let at = event.latlng();
                match Coordinate::new(at.lat(), coords::wrap_longitude(at.lng())) {
                    Some(coordinate) => handler(coordinate),
                    None => tracing::debug!("Ignoring click outside valid coordinates"),
                }
            },
        );
        let map = &self.map;
        replace_listener(&mut self.click_handler, closure, |old| {
            map.off("click", old.as_ref())
        });
        if let Some(current) = &self.click_handler {
            map.on("click", current.as_ref());
        }
    }
}

impl MapView for LeafletMap {
    fn place_marker(&mut self, coordinate: Coordinate) {
        if self.destroyed {
            return;
        }
        let at = leaflet::lat_lng(coordinate.lat, coordinate.lng);
        match &self.marker {
            Some(marker) => marker.set_lat_lng(&at),
            None => {
                let marker = leaflet::marker(&at);
                marker.add_marker_to(&self.map);
                self.marker = Some(marker);
            }
        }
    }

    fn recenter(&mut self, coordinate: Coordinate, zoom: u8) {
        if self.destroyed {
            return;
        }
        self.map
            .set_view(&leaflet::lat_lng(coordinate.lat, coordinate.lng), zoom);
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        // remove() also unbinds listeners, so the closure can go after it
        self.map.remove();
        self.marker = None;
        self.click_handler = None;
        tracing::debug!("Map destroyed");
    }
}

impl Drop for LeafletMap {
    fn drop(&mut self) {
        self.destroy();
    }
}
