use serde::{Deserialize, Serialize};

use crate::models::{Axis, Coordinate};

const ROLLOVER_SECONDS: &str = "60.000";

/// Both axes of a coordinate rendered as DMS strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmsPair {
    pub latitude: String,
    pub longitude: String,
}

impl DmsPair {
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        DmsPair {
            latitude: to_dms(coordinate.lat, Axis::Latitude),
            longitude: to_dms(coordinate.lng, Axis::Longitude),
        }
    }
}

/// Format a signed decimal-degree value as `D° M' S.sss" H`.
///
/// Seconds are rounded half away from zero to three decimals. When that
/// rounding produces `60.000` the overflow is carried into the minutes (and
/// from there into the degrees), so `10.99999999` renders as `11° 0' 0.000" N`
/// rather than `10° 59' 60.000" N`.
///
/// NaN and infinite inputs produce unspecified output.
pub fn to_dms(value: f64, axis: Axis) -> String {
    let absolute = value.abs();
    let whole_degrees = absolute.floor();
    let minutes_raw = (absolute - whole_degrees) * 60.0;
    let whole_minutes = minutes_raw.floor();
    let seconds = (minutes_raw - whole_minutes) * 60.0;

    let mut degrees = whole_degrees as u64;
    let mut minutes = whole_minutes as u64;
    let mut seconds_text = format_seconds(seconds);

    if seconds_text == ROLLOVER_SECONDS {
        seconds_text = format_seconds(0.0);
        minutes += 1;
        if minutes == 60 {
            minutes = 0;
            degrees += 1;
        }
    }

    format!(
        "{}° {}' {}\" {}",
        degrees,
        minutes,
        seconds_text,
        axis.hemisphere(value)
    )
}

/// Render seconds with exactly three decimals, ties rounded away from zero.
fn format_seconds(seconds: f64) -> String {
    // `{:.3}` breaks exact ties toward even. An f64 can only sit exactly on a
    // thousandths midpoint when it is a multiple of 1/16, where `* 1000.0` is exact.
    if (seconds * 16.0).fract() == 0.0 {
        format!("{:.3}", (seconds * 1000.0).round() / 1000.0)
    } else {
        format!("{:.3}", seconds)
    }
}
