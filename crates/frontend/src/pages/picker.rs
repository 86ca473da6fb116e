use dioxus::logger::tracing;
use dioxus::prelude::*;
use picker_shared::{CompletedLookup, LocationSession, LookupTicket, MapView, ShareLinkCodec};

use crate::api::{self, GraphQlGeocoder};
use crate::components::location_panel::LocationPanel;
use crate::components::map_view::{LeafletMap, MapDefaults};
use crate::coords;

const MAP_CONTAINER_ID: &str = "picker-map";

type Session = Signal<Option<LocationSession<LeafletMap>>>;

/// Resolve `ticket` off the click path and hand the result back to the
/// session, which ignores it if a newer pick or teardown got there first.
fn spawn_lookup(ticket: LookupTicket, geocoder: GraphQlGeocoder, mut session: Session) {
    wasm_bindgen_futures::spawn_local(async move {
        let done = ticket.resolve(&geocoder).await;
        let sequence = done.sequence;
        let Ok(mut slot) = session.try_write() else {
            tracing::debug!("Session gone before lookup #{sequence} finished");
            return;
        };
        deliver_lookup(&mut *slot, done);
    });
}

/// Hand a finished lookup to the session in `slot`, if there still is one.
/// Returns whether the address changed.
fn deliver_lookup<M: MapView>(
    slot: &mut Option<LocationSession<M>>,
    done: CompletedLookup,
) -> bool {
    match slot.as_mut() {
        Some(active) => active.complete_lookup(done),
        None => {
            tracing::debug!("No session for lookup #{}", done.sequence);
            false
        }
    }
}

/// Take the session out of `slot` and tear it down. Later calls do nothing.
fn close_session<M: MapView>(slot: &mut Option<LocationSession<M>>) {
    if let Some(mut active) = slot.take() {
        active.teardown();
    }
}

#[component]
pub fn Picker() -> Element {
    let mut session: Session = use_signal(|| None);
    let geocoder = use_hook(|| GraphQlGeocoder::new(api::graphql_url(&coords::page_origin())));
    let mut map_error = use_signal(|| None::<String>);

    use_drop(move || {
        if let Ok(mut slot) = session.try_write() {
            close_session(&mut *slot);
        }
    });

    let location = session
        .read()
        .as_ref()
        .and_then(|active| active.location().cloned());

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "Coordinates Picker" }
            }

            div { class: "sidebar",
                if let Some(err) = &*map_error.read() {
                    div { class: "panel error", "{err}" }
                }
                LocationPanel { location }
            }

            div {
                id: MAP_CONTAINER_ID,
                class: "map-container",
                onmounted: move |_| {
                    if session.peek().is_some() {
                        return;
                    }
                    let mut map = match LeafletMap::mount(MAP_CONTAINER_ID, &MapDefaults::picker()) {
                        Ok(map) => map,
                        Err(e) => {
                            tracing::error!("Failed to create map: {e:?}");
                            map_error.set(Some("The map could not be loaded.".to_string()));
                            return;
                        }
                    };

                    let click_geocoder = geocoder.clone();
                    map.on_click(move |coordinate| {
                        let ticket = session
                            .write()
                            .as_mut()
                            .and_then(|active| active.select_coordinate(coordinate));
                        if let Some(ticket) = ticket {
                            spawn_lookup(ticket, click_geocoder.clone(), session);
                        }
                    });

                    let page = coords::page_location();
                    let mut active = LocationSession::new(map, ShareLinkCodec::new(page.base_url));
                    let seeded = active.seed_from_query(&page.query);
                    session.set(Some(active));
                    if let Some(ticket) = seeded {
                        spawn_lookup(ticket, geocoder.clone(), session);
                    }
                },
            }
        }
    }
}
