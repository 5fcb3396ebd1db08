//! pairdash-core
//!
//! Collaborator contracts and shared utilities for the pairdash dashboard core.
//!
//! - `transport`: the `DashTransport` REST seam and the `LogStreamConnector` socket seam.
//! - `widget`: the `ChartWidget`/`WidgetHost` rendering seam and chart styling options.
//! - `persistence`: the `PersistenceStore` key/value seam plus JSON helpers.
//! - `clock`: the `UtcOffsetSource` seam used for display-time shifting.
//! - `timeseries`: offset shifting, millisecond detection and sort/de-duplicate helpers.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `stream::StreamHandle` wraps `tokio::task::JoinHandle<()>` and uses
//! `tokio::sync::oneshot::Sender<()>` for cooperative shutdown, and
//! `LogStreamConnector::open` returns `(StreamHandle, tokio::sync::mpsc::Receiver<String>)`.
//! Code that opens log streams must therefore run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Time source for the local UTC offset.
pub mod clock;
/// Key/value persistence contract.
pub mod persistence;
/// Stream handle and its drop-time helpers.
pub mod stream;
/// Time-series helpers shared by the data client and sessions.
pub mod timeseries;
/// REST and socket collaborator traits.
pub mod transport;
/// Chart rendering contract.
pub mod widget;

pub use clock::{FixedOffset, LocalOffset, UtcOffsetSource};
pub use persistence::{PersistenceStore, load_json, store_json};
pub use stream::StreamHandle;
pub use timeseries::{epoch_seconds, shift_times, sort_dedup_by_time};
pub use transport::{DashTransport, LogStreamConnector};
pub use widget::{ChartOptions, ChartWidget, Dimensions, SeriesHandle, SeriesStyle, WidgetHost};

pub use pairdash_types::{
    Bar, ConfidenceMarker, ConfidenceValue, DashConfig, DashError, Envelope, MarkerPosition,
    MarkerShape, Pair, PredictionPoint, RawConfidence, RawPrediction, ReconnectConfig,
    RefreshPolicy, Theme, Timed, normalize_pair,
};
