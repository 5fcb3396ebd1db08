//! Deterministic pairdash collaborators for tests and demos.
//!
//! - [`MockTransport`]: static fixture backend. Requests for the pair `FAIL`
//!   always fail; ADAUSD is listed but has no candles.
//! - [`MockLogConnector`]: replays a short inference log for any pair.
//! - [`DynamicMockTransport`] / [`DynamicLogConnector`]: behavior scripted at
//!   runtime through a controller, with request logs.
//! - [`MockWidgetHost`]: records every widget operation for inspection.
//! - [`MemoryStore`]: in-memory key/value store.

use std::time::Duration;

use async_trait::async_trait;
use pairdash_core::{
    Bar, ConfidenceValue, DashError, DashTransport, Envelope, LogStreamConnector, Pair,
    RawConfidence, RawPrediction, StreamHandle,
};
use tokio::sync::{mpsc, oneshot};

mod dynamic;
mod fixtures;
mod store;
mod widget;

pub use dynamic::{
    DynamicLogConnector, DynamicMockController, DynamicMockTransport, LogStreamController,
    MockBehavior, StreamBehavior,
};
pub use store::MemoryStore;
pub use widget::{MockWidgetHost, WidgetProbe, WidgetSnapshot};

/// Fixture backend for CI-safe demos. Serves deterministic data for
/// BTCUSD, ETHUSD, SOLUSD and ADAUSD.
pub struct MockTransport;

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create the fixture transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn not_found(what: &str) -> DashError {
        DashError::not_found(what.to_string())
    }

    fn maybe_fail(pair: &Pair, capability: &'static str) -> Result<(), DashError> {
        if pair.as_str() == "FAIL" {
            return Err(DashError::transport(
                "pairdash-mock",
                format!("forced failure: {capability}"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DashTransport for MockTransport {
    fn name(&self) -> &'static str {
        "pairdash-mock"
    }

    async fn dumps(&self) -> Result<Vec<Option<String>>, DashError> {
        Ok(fixtures::catalog::dumps())
    }

    async fn confidence(&self, pair: &Pair) -> Result<ConfidenceValue, DashError> {
        Self::maybe_fail(pair, "confidence")?;
        fixtures::confidence::latest(pair.as_str())
            .ok_or_else(|| Self::not_found(&format!("confidence for {pair}")))
    }

    async fn confidences(&self, pair: &Pair) -> Result<Vec<RawConfidence>, DashError> {
        Self::maybe_fail(pair, "confidences")?;
        fixtures::confidence::history(pair.as_str())
            .ok_or_else(|| Self::not_found(&format!("confidences for {pair}")))
    }

    async fn bars(&self, pair: &Pair, limit: u32) -> Result<Envelope<Bar>, DashError> {
        Self::maybe_fail(pair, "bars")?;
        fixtures::bars::by_pair(pair.as_str(), limit)
            .ok_or_else(|| Self::not_found(&format!("bars for {pair}")))
    }

    async fn prediction(&self, pair: &Pair) -> Result<Envelope<RawPrediction>, DashError> {
        Self::maybe_fail(pair, "prediction")?;
        fixtures::prediction::by_pair(pair.as_str())
            .ok_or_else(|| Self::not_found(&format!("prediction for {pair}")))
    }

    async fn trigger_inference(&self, pair: &Pair) -> Result<(), DashError> {
        Self::maybe_fail(pair, "inference")
    }
}

/// Log connector that replays a scripted inference run.
///
/// Each line is sent after `pace`; the socket then stays open until stopped.
pub struct MockLogConnector {
    pace: Duration,
}

impl Default for MockLogConnector {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl MockLogConnector {
    /// Create a connector emitting one line every `pace`.
    #[must_use]
    pub const fn new(pace: Duration) -> Self {
        Self { pace }
    }

    fn script(pair: &Pair) -> Vec<String> {
        vec![
            format!("Loading model for pair {pair}"),
            format!("Fetched 2000 bars for {pair}"),
            "Running inference".to_string(),
            format!("Inference completed for pair `{pair}`"),
        ]
    }
}

#[async_trait]
impl LogStreamConnector for MockLogConnector {
    fn name(&self) -> &'static str {
        "pairdash-mock"
    }

    async fn open(
        &self,
        pair: &Pair,
    ) -> Result<(StreamHandle, mpsc::Receiver<String>), DashError> {
        if pair.as_str() == "FAIL" {
            return Err(DashError::Socket("forced failure: open".into()));
        }
        let lines = Self::script(pair);
        let pace = self.pace;
        let (tx, rx) = mpsc::channel::<String>(64);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            for line in lines {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => return,
                    () = tokio::time::sleep(pace) => {}
                }
                if tx.send(line).await.is_err() {
                    return;
                }
            }
            let _ = stop_rx.await;
        });

        Ok((StreamHandle::new(join, stop_tx), rx))
    }
}
