//! Helpers that put raw backend series into the chart's display time domain.

use std::collections::BTreeMap;

use pairdash_types::Timed;

/// Raw timestamps whose magnitude exceeds this value are milliseconds.
pub const MILLIS_THRESHOLD: f64 = 1e10;

/// Convert a raw timestamp that may be in seconds or milliseconds to epoch seconds.
///
/// Values above [`MILLIS_THRESHOLD`] in magnitude are divided by 1000 first.
/// Fractional seconds are floored.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn epoch_seconds(raw: f64) -> i64 {
    let secs = if raw.abs() > MILLIS_THRESHOLD {
        raw / 1000.0
    } else {
        raw
    };
    secs.floor() as i64
}

/// Add `offset_secs` to the time of every element.
///
/// Not reversible and not idempotent: each raw payload must be shifted exactly once.
pub fn shift_times<T: Timed>(items: &mut [T], offset_secs: i64) {
    if offset_secs == 0 {
        return;
    }
    for item in items {
        item.set_time(item.time().saturating_add(offset_secs));
    }
}

/// Sort ascending by time, keeping the last element seen for each timestamp.
pub fn sort_dedup_by_time<T: Timed>(items: Vec<T>) -> Vec<T> {
    let total = items.len();
    let mut map: BTreeMap<i64, T> = BTreeMap::new();
    for item in items {
        map.insert(item.time(), item);
    }
    #[cfg(feature = "tracing")]
    if map.len() < total {
        tracing::debug!(
            dropped = total - map.len(),
            "dropped points with duplicate timestamps"
        );
    }
    #[cfg(not(feature = "tracing"))]
    let _ = total;
    map.into_values().collect()
}
