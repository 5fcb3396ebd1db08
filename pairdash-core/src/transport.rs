use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::stream::StreamHandle;
use pairdash_types::{Bar, ConfidenceValue, DashError, Envelope, Pair, RawConfidence, RawPrediction};

/// Typed access to the dashboard REST backend.
///
/// Implementations attach authentication transparently and return payloads
/// exactly as served: no timestamp adjustment, no caching, no retry.
#[async_trait]
pub trait DashTransport: Send + Sync {
    /// A stable identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// `GET /dumps`: raw pair identifiers. Entries may be null.
    async fn dumps(&self) -> Result<Vec<Option<String>>, DashError>;

    /// `GET /confidence/{pair}`: the latest confidence value.
    async fn confidence(&self, pair: &Pair) -> Result<ConfidenceValue, DashError>;

    /// `GET /confidences/{pair}`: timestamped confidence history.
    async fn confidences(&self, pair: &Pair) -> Result<Vec<RawConfidence>, DashError>;

    /// `GET /bars/{pair}/{limit}`: candles, bare or wrapped in `data`.
    async fn bars(&self, pair: &Pair, limit: u32) -> Result<Envelope<Bar>, DashError>;

    /// `GET /prediction/{pair}`: prediction points, bare or wrapped in `data`.
    async fn prediction(&self, pair: &Pair) -> Result<Envelope<RawPrediction>, DashError>;

    /// `POST /inference/{pair}`: start a remote inference job.
    async fn trigger_inference(&self, pair: &Pair) -> Result<(), DashError>;
}

/// Opens the plain-text log socket scoped to one pair.
#[async_trait]
pub trait LogStreamConnector: Send + Sync {
    /// A stable identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Open one physical connection.
    ///
    /// The receiver yields one item per inbound text line and closes when the
    /// socket closes for any reason. Dropping or stopping the handle closes the socket.
    async fn open(
        &self,
        pair: &Pair,
    ) -> Result<(StreamHandle, mpsc::Receiver<String>), DashError>;
}
