//! Response shaping
//!
//! Pure functions that reduce a decoded payload to a bounded-size document.
//! Truncation metadata (`_total`, `_showing`, `_hint`, `_total_regions`,
//! `_showing_regions`) is only added when elements were actually dropped, so
//! shaping an already-shaped document with the same or a larger limit is a
//! no-op.

use serde_json::{Map, Value};
use tracing::debug;

use crate::types::Limit;

/// Metadata keys added by the shaper
pub const METADATA_KEYS: &[&str] = &[
    "_total",
    "_showing",
    "_hint",
    "_total_regions",
    "_showing_regions",
];

/// Hourly forecast arrays are cut to this many entries
pub const FORECAST_HOURS: usize = 24;

/// Daily forecast arrays are cut to this many entries
pub const FORECAST_DAYS: usize = 5;

/// Per-hour fields dropped from the primary forecast block
const FORECAST_DROP_FIELDS: &[&str] = &[
    "icon1h",
    "cloudCoverTotal",
    "temperatureStd",
    "surfacePressure",
    "dewPoint2m",
    "isDay",
];

/// True for `{"error": "<message>"}` documents, which are never shaped
pub fn is_error_document(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("error"))
        .is_some_and(Value::is_string)
}

/// Keep the first `limit` elements of the array at `doc[field]`.
///
/// Returns true if elements were dropped, in which case `_total`, `_showing`
/// and `_hint` are set on `doc`. A missing or non-array field is left alone.
pub fn limit_list(doc: &mut Map<String, Value>, field: &str, limit: Limit) -> bool {
    let Some(Value::Array(items)) = doc.get_mut(field) else {
        return false;
    };

    let total = items.len();
    let limit = limit.get();
    if total <= limit {
        return false;
    }

    items.truncate(limit);
    debug!(field, total, limit, "Truncated list");

    doc.insert("_total".to_string(), Value::from(total));
    doc.insert("_showing".to_string(), Value::from(limit));
    doc.insert(
        "_hint".to_string(),
        Value::from(format!(
            "Showing {} of {}. Use --limit N for more.",
            limit, total
        )),
    );
    true
}

/// Remove `keys` from every object in `items`; other elements are untouched
pub fn strip_keys(items: &mut [Value], keys: &[&str]) {
    for item in items.iter_mut() {
        if let Value::Object(obj) = item {
            strip_object(obj, keys);
        }
    }
}

/// Remove `keys` from one object, keeping the order of the rest
pub fn strip_object(obj: &mut Map<String, Value>, keys: &[&str]) {
    obj.retain(|k, _| !keys.contains(&k.as_str()));
}

/// Truncate every object-valued member of `doc` (except those in `skip`)
/// to its first `limit` entries.
///
/// Keyed maps have no ordering contract upstream; entries are kept in the
/// order they arrived. Sets `_total_regions`/`_showing_regions` when any
/// map was cut.
pub fn limit_keyed_maps(doc: &mut Map<String, Value>, limit: Limit, skip: &[&str]) -> bool {
    let limit = limit.get();
    let mut truncated_total = None;

    for (key, value) in doc.iter_mut() {
        if skip.contains(&key.as_str()) || METADATA_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Value::Object(map) = value else {
            continue;
        };
        let total = map.len();
        if total <= limit {
            continue;
        }
        let kept: Map<String, Value> = std::mem::take(map).into_iter().take(limit).collect();
        *map = kept;
        debug!(key = %key, total, limit, "Truncated keyed map");
        truncated_total = Some(total);
    }

    match truncated_total {
        Some(total) => {
            doc.insert("_total_regions".to_string(), Value::from(total));
            doc.insert("_showing_regions".to_string(), Value::from(limit));
            true
        }
        None => false,
    }
}

/// Reduce a station-keyed forecast payload.
///
/// For each station: the secondary `forecast2` block is dropped, bulky
/// per-hour fields are removed from `forecast1`, its arrays are cut to
/// [`FORECAST_HOURS`] entries, and `days` is cut to [`FORECAST_DAYS`].
pub fn trim_forecast(doc: &mut Value) {
    let Value::Object(stations) = doc else {
        return;
    };

    for station in stations.values_mut() {
        let Value::Object(station) = station else {
            continue;
        };

        strip_object(station, &["forecast2"]);

        if let Some(Value::Object(forecast)) = station.get_mut("forecast1") {
            strip_object(forecast, FORECAST_DROP_FIELDS);
            for series in forecast.values_mut() {
                if let Value::Array(values) = series {
                    values.truncate(FORECAST_HOURS);
                }
            }
        }

        if let Some(Value::Array(days)) = station.get_mut("days") {
            days.truncate(FORECAST_DAYS);
        }
    }
}
