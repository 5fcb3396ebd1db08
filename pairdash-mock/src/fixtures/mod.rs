//! Static payloads served by `MockTransport`.

pub mod bars;
pub mod catalog;
pub mod confidence;
pub mod prediction;

use chrono::NaiveDate;

/// Epoch seconds of 2024-01-02 00:00 UTC, the first fixture candle.
pub fn origin() -> i64 {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(0, |dt| dt.and_utc().timestamp())
}

/// One hour, the fixture candle spacing.
pub const STEP: i64 = 3_600;

/// Base price for a fixture pair.
pub fn base_price(pair: &str) -> Option<f64> {
    match pair {
        "BTCUSD" => Some(42_000.0),
        "ETHUSD" => Some(2_300.0),
        "SOLUSD" => Some(98.5),
        "ADAUSD" => Some(0.52),
        _ => None,
    }
}
