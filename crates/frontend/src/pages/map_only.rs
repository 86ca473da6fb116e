use dioxus::logger::tracing;
use dioxus::prelude::*;
use picker_shared::MapView;

use crate::components::map_view::{LeafletMap, MapDefaults};

const MAP_CONTAINER_ID: &str = "plain-map";

/// Just the map, no picking.
#[component]
pub fn MapOnly() -> Element {
    let mut map = use_signal(|| None::<LeafletMap>);

    use_drop(move || {
        if let Ok(mut slot) = map.try_write() {
            if let Some(mut mounted) = slot.take() {
                mounted.destroy();
            }
        }
    });

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "map-container full",
            onmounted: move |_| {
                if map.peek().is_some() {
                    return;
                }
                match LeafletMap::mount(MAP_CONTAINER_ID, &MapDefaults::map_only()) {
                    Ok(mounted) => map.set(Some(mounted)),
                    Err(e) => tracing::error!("Failed to create map: {e:?}"),
                }
            },
        }
    }
}
