use url::form_urlencoded;

use crate::models::Coordinate;

pub const LAT_PARAM: &str = "lat";
pub const LNG_PARAM: &str = "lng";

/// Builds and parses share links for a fixed page base URL
/// (origin plus path, no query).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinkCodec {
    base_url: String,
}

impl ShareLinkCodec {
    pub fn new(base_url: impl Into<String>) -> Self {
        ShareLinkCodec {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn encode(&self, coordinate: Coordinate) -> String {
        encode(&self.base_url, coordinate)
    }

    pub fn decode(query: &str) -> Option<Coordinate> {
        decode(query)
    }
}

/// Append `?lat=..&lng=..` to `origin`, using the shortest decimal form
/// that parses back to the same `f64`.
pub fn encode(origin: &str, coordinate: Coordinate) -> String {
    format!(
        "{}?{}={}&{}={}",
        origin, LAT_PARAM, coordinate.lat, LNG_PARAM, coordinate.lng
    )
}

/// Extract a coordinate from a query string such as `?lat=-1.5&lng=37.0`.
///
/// The leading `?` is optional and anything after `#` is ignored. The first
/// occurrence of each key wins. Returns `None` when either key is missing or
/// its value is not a finite, in-range number.
pub fn decode(query: &str) -> Option<Coordinate> {
    let query = query.split('#').next().unwrap_or_default();
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut lat = None;
    let mut lng = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            LAT_PARAM if lat.is_none() => lat = Some(value.into_owned()),
            LNG_PARAM if lng.is_none() => lng = Some(value.into_owned()),
            _ => {}
        }
    }

    let lat = parse_degrees(lat.as_deref()?)?;
    let lng = parse_degrees(lng.as_deref()?)?;
    Coordinate::new(lat, lng)
}

fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
