//! Chart payloads: candles, prediction points and confidence markers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A point on the chart's time axis, in epoch seconds.
///
/// Implemented by every series element so the shared time-series helpers can
/// shift, sort and de-duplicate them uniformly.
pub trait Timed {
    /// Display time in epoch seconds.
    fn time(&self) -> i64;
    /// Overwrite the display time.
    fn set_time(&mut self, time: i64);
}

/// Read an epoch-seconds timestamp sent as any JSON number.
///
/// Fractional seconds are floored.
#[allow(clippy::cast_possible_truncation)]
fn de_epoch_seconds<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    Ok(match Number::deserialize(d)? {
        Number::Int(secs) => secs,
        Number::Float(secs) => secs.floor() as i64,
    })
}

/// One OHLC candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Epoch seconds.
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub time: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
}

/// A prediction point as served by `GET /prediction/{pair}`.
///
/// The backend reports the predicted price under `close`; `value` is accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    /// Epoch seconds.
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub time: i64,
    /// Predicted price.
    #[serde(alias = "value")]
    pub close: f64,
}

/// One point of the prediction overlay line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    /// Epoch seconds, same domain as [`Bar::time`].
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub time: i64,
    /// Predicted price.
    pub value: f64,
}

impl From<RawPrediction> for PredictionPoint {
    fn from(raw: RawPrediction) -> Self {
        Self {
            time: raw.time,
            value: raw.close,
        }
    }
}

/// A confidence value: the backend may send a number or a preformatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfidenceValue {
    /// Numeric confidence.
    Number(f64),
    /// Free-form confidence label.
    Text(String),
}

impl fmt::Display for ConfidenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One element of `GET /confidences/{pair}`.
///
/// `t` may be expressed in seconds or in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConfidence {
    /// Raw timestamp, seconds or milliseconds.
    pub t: f64,
    /// Confidence at `t`.
    pub value: ConfidenceValue,
}

/// Where a marker is drawn relative to its candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    /// Below the candle.
    #[default]
    BelowBar,
    /// Above the candle.
    AboveBar,
}

/// Marker glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    /// Filled circle.
    #[default]
    Circle,
    /// Square.
    Square,
}

/// A confidence marker ready for the chart widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceMarker {
    /// Display time in epoch seconds.
    pub time: i64,
    /// Confidence shown as the marker label.
    pub value: ConfidenceValue,
    /// Placement relative to the candle.
    pub position: MarkerPosition,
    /// Glyph.
    pub shape: MarkerShape,
    /// CSS colour.
    pub color: String,
}

impl ConfidenceMarker {
    /// Label rendered next to the marker.
    #[must_use]
    pub fn text(&self) -> String {
        self.value.to_string()
    }
}

/// A list response that is either a bare JSON array or wrapped as `{ "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    /// `[...]`
    Bare(Vec<T>),
    /// `{ "data": [...] }`
    Wrapped {
        /// Wrapped elements.
        data: Vec<T>,
    },
}

impl<T> Envelope<T> {
    /// Unwrap into the element list regardless of shape.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(v) | Self::Wrapped { data: v } => v,
        }
    }
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self::Bare(Vec::new())
    }
}

macro_rules! impl_timed {
    ($($ty:ty),*) => {
        $(impl Timed for $ty {
            fn time(&self) -> i64 {
                self.time
            }
            fn set_time(&mut self, time: i64) {
                self.time = time;
            }
        })*
    };
}

impl_timed!(Bar, RawPrediction, PredictionPoint, ConfidenceMarker);
