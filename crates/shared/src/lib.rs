pub mod dms;
pub mod geocode;
pub mod models;
pub mod session;
pub mod share;

pub use dms::{to_dms, DmsPair};
pub use models::{AddressResult, Axis, Coordinate};
pub use session::{
    AddressState, CompletedLookup, GeocodingClient, Location, LocationSession, LookupTicket,
    MapView,
};
pub use share::ShareLinkCodec;
