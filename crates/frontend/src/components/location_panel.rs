use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use picker_shared::{AddressState, Location};

const COPIED_LABEL_MS: u32 = 1500;

#[component]
pub fn LocationPanel(location: Option<Location>) -> Element {
    let Some(location) = location else {
        return rsx! {
            div { class: "panel location-panel",
                p { class: "hint", "Click anywhere on the map to pick a location." }
            }
        };
    };

    let address_class = match location.address {
        AddressState::Pending => "address pending",
        AddressState::Resolved(_) => "address",
        AddressState::NotFound | AddressState::Failed => "address muted",
    };
    let address = location.address.display_text().to_string();
    let lat = location.coordinate.lat;
    let lng = location.coordinate.lng;

    rsx! {
        div { class: "panel location-panel",
            h3 { "Address" }
            p { class: address_class, "{address}" }

            div { class: "field-grid",
                ReadonlyField { label: "Latitude", value: lat.to_string() }
                ReadonlyField { label: "Longitude", value: lng.to_string() }
                ReadonlyField { label: "Latitude (DMS)", value: location.dms.latitude.clone() }
                ReadonlyField { label: "Longitude (DMS)", value: location.dms.longitude.clone() }
            }

            ShareLinkField { url: location.share_link.clone() }
        }
    }
}

#[component]
fn ReadonlyField(label: &'static str, value: String) -> Element {
    rsx! {
        label { class: "field",
            span { "{label}" }
            input { r#type: "text", readonly: true, value: "{value}" }
        }
    }
}

#[component]
fn ShareLinkField(url: String) -> Element {
    let mut copied = use_signal(|| false);

    rsx! {
        div { class: "share-link",
            h3 { "Share" }
            input {
                r#type: "text",
                readonly: true,
                value: "{url}",
            }
            button {
                class: "secondary",
                onclick: {
                    let url = url.clone();
                    move |_| {
                        let url = url.clone();
                        spawn(async move {
                            let Some(window) = web_sys::window() else {
                                return;
                            };
                            let clipboard = window.navigator().clipboard();
                            if wasm_bindgen_futures::JsFuture::from(clipboard.write_text(&url))
                                .await
                                .is_ok()
                            {
                                copied.set(true);
                                TimeoutFuture::new(COPIED_LABEL_MS).await;
                                copied.set(false);
                            }
                        });
                    }
                },
                if copied() { "Copied" } else { "Copy" }
            }
        }
    }
}
