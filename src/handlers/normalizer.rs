use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound, Utc};

use crate::config::ReferenceZone;
use crate::models::error::ValidationError;
use crate::models::location::NormalizedLocation;
use crate::models::raw_location::RawLocationItem;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// Layouts devices are expected to send, tried in order. Fractions are cut to
/// milliseconds.
const STRICT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.3f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.3f",
    "%Y/%m/%d %H:%M:%S",
];

const LENIENT_FORMATS: [&str; 9] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DATE_ONLY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Turns a posted item into a checked location, reading its timestamp as
/// wall-clock time in `zone`.
pub fn normalize(
    item: Option<&RawLocationItem>,
    zone: &ReferenceZone,
) -> Result<NormalizedLocation, ValidationError> {
    let item = item.ok_or(ValidationError::NullItem)?;

    let latitude = parse_coordinate(item.latitude.as_deref())
        .ok_or_else(|| ValidationError::InvalidLatitude(raw_text(&item.latitude)))?;
    let longitude = parse_coordinate(item.longitude.as_deref())
        .ok_or_else(|| ValidationError::InvalidLongitude(raw_text(&item.longitude)))?;
    check_range("latitude", latitude, MAX_LATITUDE)?;
    check_range("longitude", longitude, MAX_LONGITUDE)?;

    let original = item.datetime.as_deref().unwrap_or_default().trim();
    let datetime_local = parse_datetime(original, zone)
        .ok_or_else(|| ValidationError::InvalidDateTime(original.to_string()))?;

    Ok(NormalizedLocation {
        device_id: trimmed(&item.device_id),
        alias: trimmed(&item.alias),
        latitude,
        longitude,
        datetime_utc: datetime_local.with_timezone(&Utc),
        datetime_local,
        datetime_original: original.to_string(),
    })
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

fn raw_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok()
}

fn check_range(axis: &'static str, value: f64, limit: f64) -> Result<(), ValidationError> {
    if (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::CoordinateOutOfRange { axis, value, limit })
    }
}

fn parse_datetime(value: &str, zone: &ReferenceZone) -> Option<DateTime<FixedOffset>> {
    if value.is_empty() {
        return None;
    }

    if let Some(naive) = STRICT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return zone.localize(&naive.trunc_subsecs(3));
    }

    parse_fallback(value, zone)
}

/// Anything that isn't one of the device layouts. An explicit offset is kept
/// as an instant; otherwise the text is wall-clock time in `zone`.
fn parse_fallback(value: &str, zone: &ReferenceZone) -> Option<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        let utc = instant.with_timezone(&Utc).trunc_subsecs(3);
        return Some(zone.wall_clock(&utc));
    }

    let naive = LENIENT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_ONLY_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    zone.localize(&naive.trunc_subsecs(3))
}
