//! Pairdash keeps a set of live market-data charts in sync with a selection
//! of trading pairs, and streams inference logs with bounded reconnection.
//!
//! Overview
//! - `SessionManager` owns the persisted selection and one `ChartSession` per
//!   selected pair, ordered by the backend catalog.
//! - Each `ChartSession` pulls bars, predictions and confidence markers through
//!   the `DataSyncClient` as three independent fetches; each result is applied
//!   as soon as it arrives and a failure only leaves its own series unset.
//! - `ResizeCoordinator` debounces viewport resizes before they reach charts.
//! - `StreamChannel` holds one log socket and reconnects a fixed number of
//!   times with a fixed delay before giving up.
//!
//! Key behaviors and trade-offs
//! - Single owner: a `SessionManager` is never shared. Fetches run on spawned
//!   tasks and report back over channels; the owner applies them in `pump`,
//!   `settle`, or automatically when driven by `spawn_dashboard`.
//! - Display times: every fetched payload is shifted once by the local UTC
//!   offset read at call time. The shift is never undone.
//! - Catalog refresh: `RefreshPolicy::Incremental` keeps surviving charts;
//!   `RefreshPolicy::Rebuild` refetches everything.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use pairdash::{DashboardBuilder, spawn_dashboard};
//!
//! let manager = DashboardBuilder::new()
//!     .with_transport(transport)
//!     .with_widget_host(Box::new(host))
//!     .with_store(store)
//!     .build()?;
//! let dash = spawn_dashboard(manager);
//! dash.refresh_catalog().await?;
//! dash.toggle(pairdash::Pair::parse("BTCUSD").unwrap()).await?;
//! ```
//!
//! Streaming inference logs:
//! ```rust,ignore
//! use pairdash::{LogView, StreamChannel};
//!
//! let channel = StreamChannel::spawn(connector, cfg.reconnect);
//! let mut view = LogView::open(channel, pair);
//! while let Some(line) = view.next_line().await {
//!     println!("{line}");
//! }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
/// Log stream channel and its reconnect state machine.
pub mod channel;
mod inference;
mod logview;
/// Chart sessions, selection and their owner.
pub mod session;
mod sync;

pub use crate::core::DashboardBuilder;
pub use channel::{ChannelSnapshot, ChannelState, StreamChannel, completed_pair};
pub use inference::{InferenceLauncher, LaunchOutcome};
pub use logview::LogView;
pub use session::chart::{ChartSession, Lifecycle};
pub use session::driver::{DashboardCommand, DashboardHandle, DashboardSnapshot, spawn_dashboard};
pub use session::manager::{SelectionChange, SessionManager};
pub use session::resize::ResizeCoordinator;
pub use session::selection::SelectionState;
pub use sync::DataSyncClient;

pub use pairdash_core::{
    Bar, ChartOptions, ChartWidget, ConfidenceMarker, ConfidenceValue, DashConfig, DashError,
    DashTransport, Dimensions, FixedOffset, LocalOffset, LogStreamConnector, MarkerPosition,
    MarkerShape, Pair, PersistenceStore, PredictionPoint, ReconnectConfig, RefreshPolicy,
    SeriesHandle, SeriesStyle, StreamHandle, Theme, UtcOffsetSource, WidgetHost, normalize_pair,
};
