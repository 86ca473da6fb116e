//! Picker session: the single current coordinate plus everything derived
//! from it, and the ordering rule for asynchronous address lookups.

use std::future::Future;

use crate::dms::DmsPair;
use crate::models::{AddressResult, Coordinate};
use crate::share::{self, ShareLinkCodec};

/// Zoom level applied when the map recenters on a picked coordinate.
pub const MARKER_ZOOM: u8 = 13;

pub const PENDING_TEXT: &str = "Looking up address...";
pub const NOT_FOUND_TEXT: &str = "Address not found";
pub const FETCH_ERROR_TEXT: &str = "Error fetching address";

/// The map widget the session drives. Rendering and tiles are the
/// implementor's business.
pub trait MapView {
    fn place_marker(&mut self, coordinate: Coordinate);
    fn recenter(&mut self, coordinate: Coordinate, zoom: u8);
    /// Release the widget. Called at most once per session.
    fn destroy(&mut self);
}

/// Reverse geocoder. Failures are reported as values, never as panics.
pub trait GeocodingClient {
    fn lookup(&self, coordinate: Coordinate) -> impl Future<Output = AddressResult>;
}

/// What the address field currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressState {
    Pending,
    Resolved(String),
    NotFound,
    Failed,
}

impl AddressState {
    pub fn display_text(&self) -> &str {
        match self {
            AddressState::Pending => PENDING_TEXT,
            AddressState::Resolved(text) => text,
            AddressState::NotFound => NOT_FOUND_TEXT,
            AddressState::Failed => FETCH_ERROR_TEXT,
        }
    }
}

impl From<AddressResult> for AddressState {
    fn from(result: AddressResult) -> Self {
        match result {
            AddressResult::Resolved(text) => AddressState::Resolved(text),
            AddressResult::NotFound => AddressState::NotFound,
            AddressResult::FetchError => AddressState::Failed,
        }
    }
}

/// Everything shown for the current coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub coordinate: Coordinate,
    pub dms: DmsPair,
    pub share_link: String,
    pub address: AddressState,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Located(Location),
    Closed,
}

/// An address lookup the session has issued but not yet seen complete.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use = "a ticket does nothing until it is resolved"]
pub struct LookupTicket {
    sequence: u64,
    coordinate: Coordinate,
}

impl LookupTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Run the lookup. The result still has to be handed back through
    /// [`LocationSession::complete_lookup`], which drops it if superseded.
    pub async fn resolve<G: GeocodingClient>(self, client: &G) -> CompletedLookup {
        let result = client.lookup(self.coordinate).await;
        CompletedLookup {
            sequence: self.sequence,
            coordinate: self.coordinate,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedLookup {
    pub sequence: u64,
    pub coordinate: Coordinate,
    pub result: AddressResult,
}

/// Owns the map widget for its whole life and the picked location.
///
/// The map is destroyed exactly once, by [`teardown`](Self::teardown) or on
/// drop, whichever comes first. After that no lookup result is accepted.
pub struct LocationSession<M: MapView> {
    map: Option<M>,
    codec: ShareLinkCodec,
    phase: Phase,
    issued: u64,
}

impl<M: MapView> LocationSession<M> {
    pub fn new(map: M, codec: ShareLinkCodec) -> Self {
        LocationSession {
            map: Some(map),
            codec,
            phase: Phase::Idle,
            issued: 0,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match &self.phase {
            Phase::Located(location) => Some(location),
            Phase::Idle | Phase::Closed => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn codec(&self) -> &ShareLinkCodec {
        &self.codec
    }

    /// Adopt `coordinate` as the current location. Returns the lookup to run,
    /// or `None` once the session has been torn down.
    pub fn select_coordinate(&mut self, coordinate: Coordinate) -> Option<LookupTicket> {
        if self.is_closed() {
            return None;
        }

        self.phase = Phase::Located(Location {
            coordinate,
            dms: DmsPair::from_coordinate(coordinate),
            share_link: self.codec.encode(coordinate),
            address: AddressState::Pending,
        });

        if let Some(map) = self.map.as_mut() {
            map.place_marker(coordinate);
            map.recenter(coordinate, MARKER_ZOOM);
        }

        self.issued += 1;
        tracing::debug!(sequence = self.issued, %coordinate, "Issued address lookup");
        Some(LookupTicket {
            sequence: self.issued,
            coordinate,
        })
    }

    /// Seed from the page's query string. Missing or malformed parameters
    /// leave the session as it was.
    pub fn seed_from_query(&mut self, query: &str) -> Option<LookupTicket> {
        let coordinate = share::decode(query)?;
        self.select_coordinate(coordinate)
    }

    /// Apply a finished lookup if it is the most recent one issued.
    /// Returns whether the address field changed.
    pub fn complete_lookup(&mut self, done: CompletedLookup) -> bool {
        let latest = self.issued;
        let Phase::Located(location) = &mut self.phase else {
            tracing::debug!(sequence = done.sequence, "Dropped lookup for inactive session");
            return false;
        };
        if done.sequence != latest {
            tracing::debug!(
                sequence = done.sequence,
                latest,
                "Dropped superseded address lookup"
            );
            return false;
        }

        if done.result == AddressResult::FetchError {
            tracing::warn!(coordinate = %done.coordinate, "Address lookup failed");
        }
        location.address = done.result.into();
        true
    }

    /// End the session. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(mut map) = self.map.take() {
            map.destroy();
        }
        self.phase = Phase::Closed;
    }
}

impl<M: MapView> Drop for LocationSession<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;

    const BASE: &str = "https://picker.example.com/";

    #[derive(Debug, Clone, PartialEq)]
    enum MapCall {
        Marker(Coordinate),
        Recenter(Coordinate, u8),
        Destroy,
    }

    #[derive(Clone, Default)]
    struct FakeMap {
        calls: Rc<RefCell<Vec<MapCall>>>,
    }

    impl FakeMap {
        fn destroy_count(&self) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| **c == MapCall::Destroy)
                .count()
        }
    }

    impl MapView for FakeMap {
        fn place_marker(&mut self, coordinate: Coordinate) {
            self.calls.borrow_mut().push(MapCall::Marker(coordinate));
        }

        fn recenter(&mut self, coordinate: Coordinate, zoom: u8) {
            self.calls.borrow_mut().push(MapCall::Recenter(coordinate, zoom));
        }

        fn destroy(&mut self) {
            self.calls.borrow_mut().push(MapCall::Destroy);
        }
    }

    /// Answers by latitude; unknown latitudes get no results.
    #[derive(Default)]
    struct FakeGeocoder {
        answers: HashMap<u64, (AddressResult, Duration)>,
    }

    impl FakeGeocoder {
        fn answer(mut self, lat: f64, result: AddressResult, delay_ms: u64) -> Self {
            self.answers
                .insert(lat.to_bits(), (result, Duration::from_millis(delay_ms)));
            self
        }
    }

    impl GeocodingClient for FakeGeocoder {
        fn lookup(&self, coordinate: Coordinate) -> impl Future<Output = AddressResult> {
            let (result, delay) = self
                .answers
                .get(&coordinate.lat.to_bits())
                .cloned()
                .unwrap_or((AddressResult::NotFound, Duration::ZERO));
            async move {
                tokio::time::sleep(delay).await;
                result
            }
        }
    }

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    fn new_session() -> (LocationSession<FakeMap>, FakeMap) {
        let map = FakeMap::default();
        let session = LocationSession::new(map.clone(), ShareLinkCodec::new(BASE));
        (session, map)
    }

    #[test]
    fn test_new_session_is_idle() {
        let (session, map) = new_session();
        assert!(session.location().is_none());
        assert!(!session.is_closed());
        assert!(map.calls.borrow().is_empty());
    }

    #[test]
    fn test_select_sets_derived_fields_synchronously() {
        let (mut session, _map) = new_session();
        let ticket = session.select_coordinate(coord(-0.398221, 36.960749)).unwrap();
        assert_eq!(ticket.sequence(), 1);

        let loc = session.location().unwrap();
        assert_eq!(loc.dms.latitude, "0° 23' 53.596\" S");
        assert_eq!(loc.dms.longitude, "36° 57' 38.696\" E");
        assert_eq!(
            loc.share_link,
            "https://picker.example.com/?lat=-0.398221&lng=36.960749"
        );
        assert_eq!(loc.address, AddressState::Pending);
    }

    #[test]
    fn test_select_moves_marker_and_recenters() {
        let (mut session, map) = new_session();
        let c = coord(1.0, 2.0);
        let _ = session.select_coordinate(c);
        assert_eq!(
            *map.calls.borrow(),
            vec![MapCall::Marker(c), MapCall::Recenter(c, MARKER_ZOOM)]
        );
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let (mut session, _map) = new_session();
        let a = session.select_coordinate(coord(1.0, 1.0)).unwrap();
        let b = session.select_coordinate(coord(2.0, 2.0)).unwrap();
        assert!(b.sequence() > a.sequence());
    }

    #[tokio::test]
    async fn test_resolved_address_lands() {
        let (mut session, _map) = new_session();
        let geocoder =
            FakeGeocoder::default().answer(1.0, AddressResult::Resolved("Nairobi".into()), 0);
        let ticket = session.select_coordinate(coord(1.0, 1.0)).unwrap();
        let done = ticket.resolve(&geocoder).await;
        assert!(session.complete_lookup(done));
        assert_eq!(
            session.location().unwrap().address.display_text(),
            "Nairobi"
        );
    }

    #[tokio::test]
    async fn test_zero_results_shows_not_found_sentinel() {
        let (mut session, _map) = new_session();
        let geocoder = FakeGeocoder::default();
        let ticket = session.select_coordinate(coord(5.0, 5.0)).unwrap();
        assert!(session.complete_lookup(ticket.resolve(&geocoder).await));
        let address = &session.location().unwrap().address;
        assert_eq!(*address, AddressState::NotFound);
        assert_eq!(address.display_text(), "Address not found");
    }

    #[tokio::test]
    async fn test_fetch_error_shows_error_sentinel() {
        let (mut session, _map) = new_session();
        let geocoder = FakeGeocoder::default().answer(3.0, AddressResult::FetchError, 0);
        let ticket = session.select_coordinate(coord(3.0, 3.0)).unwrap();
        assert!(session.complete_lookup(ticket.resolve(&geocoder).await));
        assert_eq!(
            session.location().unwrap().address.display_text(),
            "Error fetching address"
        );
    }

    #[tokio::test]
    async fn test_stale_lookup_does_not_overwrite_newer_click() {
        let (mut session, _map) = new_session();
        let geocoder = FakeGeocoder::default()
            .answer(-0.398221, AddressResult::Resolved("Nairobi".into()), 30)
            .answer(1.0, AddressResult::Resolved("Gulf of Guinea".into()), 5);

        let first = session.select_coordinate(coord(-0.398221, 36.960749)).unwrap();
        let second = session.select_coordinate(coord(1.0, 1.0)).unwrap();

        // #1 settles while #2 is still in flight.
        let early_first = first.resolve(&geocoder).await;
        assert!(!session.complete_lookup(early_first.clone()));
        assert_eq!(session.location().unwrap().address, AddressState::Pending);

        let done_second = second.resolve(&geocoder).await;
        assert!(session.complete_lookup(done_second));
        assert!(!session.complete_lookup(early_first));
        assert_eq!(
            session.location().unwrap().address.display_text(),
            "Gulf of Guinea"
        );
    }

    #[tokio::test]
    async fn test_latest_wins_regardless_of_arrival_order() {
        let (mut session, _map) = new_session();
        let geocoder = FakeGeocoder::default()
            .answer(10.0, AddressResult::Resolved("old".into()), 1)
            .answer(20.0, AddressResult::Resolved("new".into()), 20);

        let old = session.select_coordinate(coord(10.0, 0.0)).unwrap();
        let new = session.select_coordinate(coord(20.0, 0.0)).unwrap();
        let (done_old, done_new) = tokio::join!(old.resolve(&geocoder), new.resolve(&geocoder));

        // The newer request completes after the older one here.
        assert!(session.complete_lookup(done_new));
        assert!(!session.complete_lookup(done_old));
        assert_eq!(session.location().unwrap().address.display_text(), "new");
    }

    #[test]
    fn test_seed_from_query_enters_located_without_click() {
        let (mut session, map) = new_session();
        let ticket = session.seed_from_query("?lat=-1.5&lng=37.0").unwrap();
        assert_eq!(ticket.coordinate(), coord(-1.5, 37.0));
        assert_eq!(session.location().unwrap().coordinate, coord(-1.5, 37.0));
        assert_eq!(map.calls.borrow()[0], MapCall::Marker(coord(-1.5, 37.0)));
    }

    #[test]
    fn test_seed_from_malformed_query_stays_idle() {
        let (mut session, map) = new_session();
        assert!(session.seed_from_query("?lat=abc&lng=1.0").is_none());
        assert!(session.seed_from_query("?lat=1.0").is_none());
        assert!(session.location().is_none());
        assert!(map.calls.borrow().is_empty());
    }

    #[test]
    fn test_teardown_destroys_map_once() {
        let (mut session, map) = new_session();
        session.teardown();
        session.teardown();
        assert_eq!(map.destroy_count(), 1);
        assert!(session.is_closed());
        assert!(session.map().is_none());
        drop(session);
        assert_eq!(map.destroy_count(), 1);
    }

    #[test]
    fn test_drop_destroys_map() {
        let (session, map) = new_session();
        drop(session);
        assert_eq!(map.destroy_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_after_teardown_is_ignored() {
        let (mut session, _map) = new_session();
        let geocoder =
            FakeGeocoder::default().answer(1.0, AddressResult::Resolved("late".into()), 0);
        let ticket = session.select_coordinate(coord(1.0, 1.0)).unwrap();
        session.teardown();
        assert!(!session.complete_lookup(ticket.resolve(&geocoder).await));
        assert!(session.location().is_none());
    }

    #[test]
    fn test_select_after_teardown_is_refused() {
        let (mut session, map) = new_session();
        session.teardown();
        assert!(session.select_coordinate(coord(1.0, 1.0)).is_none());
        assert_eq!(*map.calls.borrow(), vec![MapCall::Destroy]);
    }
}
