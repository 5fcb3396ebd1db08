//! Pairdash data transfer objects and configuration primitives.
//!
//! Everything here is plain data: serializable, cloneable and free of any
//! runtime dependency, so that every other pairdash crate can share it.
#![warn(missing_docs)]

mod config;
mod error;
mod market;
mod pair;
mod theme;

pub use config::{DashConfig, ReconnectConfig, RefreshPolicy};
pub use error::DashError;
pub use market::{
    Bar, ConfidenceMarker, ConfidenceValue, Envelope, MarkerPosition, MarkerShape,
    PredictionPoint, RawConfidence, RawPrediction, Timed,
};
pub use pair::{Pair, normalize_pair};
pub use theme::Theme;
