use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, oneshot};

use pairdash_core::{
    Bar, ConfidenceValue, DashError, DashTransport, Envelope, LogStreamConnector, Pair,
    RawConfidence, RawPrediction, StreamHandle,
};

/// Instruction for how a method should behave for a given input.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after a delay (Tokio time, so it can be paused).
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(DashError),
    /// Hang indefinitely.
    Hang,
}

impl<T> MockBehavior<T> {
    async fn run(self) -> Result<T, DashError> {
        match self {
            Self::Return(v) => Ok(v),
            Self::Delay(d, v) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Self::Fail(e) => Err(e),
            Self::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
struct TransportState {
    catalog: Option<MockBehavior<Vec<Option<String>>>>,
    bars: HashMap<Pair, MockBehavior<Envelope<Bar>>>,
    prediction: HashMap<Pair, MockBehavior<Envelope<RawPrediction>>>,
    confidences: HashMap<Pair, MockBehavior<Vec<RawConfidence>>>,
    confidence: HashMap<Pair, MockBehavior<ConfidenceValue>>,
    inference: HashMap<Pair, MockBehavior<()>>,
    requests: Vec<String>,
}

/// Controller handle used by tests to drive a [`DynamicMockTransport`].
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<TransportState>>,
}

impl DynamicMockController {
    /// Set the behavior of `GET /dumps`.
    pub async fn set_catalog_behavior(&self, behavior: MockBehavior<Vec<Option<String>>>) {
        self.state.lock().await.catalog = Some(behavior);
    }

    /// Set the behavior of `GET /bars/{pair}/{limit}`.
    pub async fn set_bars_behavior(&self, pair: Pair, behavior: MockBehavior<Envelope<Bar>>) {
        self.state.lock().await.bars.insert(pair, behavior);
    }

    /// Set the behavior of `GET /prediction/{pair}`.
    pub async fn set_prediction_behavior(
        &self,
        pair: Pair,
        behavior: MockBehavior<Envelope<RawPrediction>>,
    ) {
        self.state.lock().await.prediction.insert(pair, behavior);
    }

    /// Set the behavior of `GET /confidences/{pair}`.
    pub async fn set_confidences_behavior(
        &self,
        pair: Pair,
        behavior: MockBehavior<Vec<RawConfidence>>,
    ) {
        self.state.lock().await.confidences.insert(pair, behavior);
    }

    /// Set the behavior of `GET /confidence/{pair}`.
    pub async fn set_confidence_behavior(&self, pair: Pair, behavior: MockBehavior<ConfidenceValue>) {
        self.state.lock().await.confidence.insert(pair, behavior);
    }

    /// Set the behavior of `POST /inference/{pair}`.
    pub async fn set_inference_behavior(&self, pair: Pair, behavior: MockBehavior<()>) {
        self.state.lock().await.inference.insert(pair, behavior);
    }

    /// Paths requested so far, e.g. `bars/BTCUSD/2000`, in call order.
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        *self.state.lock().await = TransportState::default();
    }
}

/// A transport that defers all behavior to an external controller.
///
/// Requests without a configured behavior fail with `NotFound`.
pub struct DynamicMockTransport {
    name: &'static str,
    state: Arc<Mutex<TransportState>>,
}

impl DynamicMockTransport {
    /// Create a new dynamic transport and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn DashTransport>, DynamicMockController) {
        let state = Arc::new(Mutex::new(TransportState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn DashTransport>, controller)
    }

    /// Log `path` and snapshot the behavior chosen by `pick`, without holding
    /// the lock across the behavior's await points.
    async fn behavior<T: Clone>(
        &self,
        path: String,
        pick: impl FnOnce(&TransportState) -> Option<&MockBehavior<T>>,
    ) -> Result<T, DashError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(path.clone());
            pick(&*guard).cloned()
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(DashError::not_found(path)),
        }
    }
}

#[async_trait]
impl DashTransport for DynamicMockTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn dumps(&self) -> Result<Vec<Option<String>>, DashError> {
        self.behavior("dumps".into(), |s| s.catalog.as_ref()).await
    }

    async fn confidence(&self, pair: &Pair) -> Result<ConfidenceValue, DashError> {
        self.behavior(format!("confidence/{pair}"), |s| s.confidence.get(pair))
            .await
    }

    async fn confidences(&self, pair: &Pair) -> Result<Vec<RawConfidence>, DashError> {
        self.behavior(format!("confidences/{pair}"), |s| s.confidences.get(pair))
            .await
    }

    async fn bars(&self, pair: &Pair, limit: u32) -> Result<Envelope<Bar>, DashError> {
        self.behavior(format!("bars/{pair}/{limit}"), |s| s.bars.get(pair))
            .await
    }

    async fn prediction(&self, pair: &Pair) -> Result<Envelope<RawPrediction>, DashError> {
        self.behavior(format!("prediction/{pair}"), |s| s.prediction.get(pair))
            .await
    }

    async fn trigger_inference(&self, pair: &Pair) -> Result<(), DashError> {
        self.behavior(format!("inference/{pair}"), |s| s.inference.get(pair))
            .await
    }
}

/// Instruction for how the next socket opens should behave.
#[derive(Clone, Debug)]
pub enum StreamBehavior {
    /// Open, send these lines, then stay open until stopped or killed.
    Success(Vec<String>),
    /// Fail the `open` call immediately.
    Fail(DashError),
    /// Hang the `open` call (simulate a stalled handshake).
    Hang,
    /// Open and forward lines pushed via the controller.
    Manual,
}

#[derive(Default)]
struct StreamState {
    behavior: Option<StreamBehavior>,
    kill_switch: Option<oneshot::Sender<()>>,
    manual_tx: Option<mpsc::Sender<String>>,
    open_requests: Vec<Pair>,
    stops: usize,
}

async fn note_stop(state: &Mutex<StreamState>) {
    state.lock().await.stops += 1;
}

/// Controller handle used by tests to drive a [`DynamicLogConnector`].
#[derive(Clone)]
pub struct LogStreamController {
    state: Arc<Mutex<StreamState>>,
}

impl LogStreamController {
    /// Set the behavior for subsequent opens.
    pub async fn set_behavior(&self, behavior: StreamBehavior) {
        self.state.lock().await.behavior = Some(behavior);
    }

    /// Remotely close the active socket, as if the server dropped it.
    pub async fn fail_stream(&self) {
        let tx = self.state.lock().await.kill_switch.take();
        if let Some(tx) = tx {
            let _ = tx.send(());
        }
    }

    /// Push one line into the active Manual socket.
    ///
    /// Returns `true` if the line was queued, `false` if no Manual socket is open.
    pub async fn push_line(&self, line: impl Into<String>) -> bool {
        // Extract a sender clone without holding the lock across await
        let tx = self.state.lock().await.manual_tx.clone();
        match tx {
            Some(tx) => tx.send(line.into()).await.is_ok(),
            None => false,
        }
    }

    /// Pairs passed to `open`, in call order.
    pub async fn open_requests(&self) -> Vec<Pair> {
        self.state.lock().await.open_requests.clone()
    }

    /// Sockets that exited on their stop signal rather than being killed or aborted.
    pub async fn graceful_closes(&self) -> usize {
        self.state.lock().await.stops
    }

    /// Clear the behavior and request log.
    pub async fn clear(&self) {
        *self.state.lock().await = StreamState::default();
    }
}

/// A log connector that defers all behavior to an external controller.
///
/// Opens without a configured behavior fail with `Socket`.
pub struct DynamicLogConnector {
    name: &'static str,
    state: Arc<Mutex<StreamState>>,
}

impl DynamicLogConnector {
    /// Create a new dynamic log connector and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn LogStreamConnector>, LogStreamController) {
        let state = Arc::new(Mutex::new(StreamState::default()));
        let controller = LogStreamController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn LogStreamConnector>, controller)
    }
}

#[async_trait]
impl LogStreamConnector for DynamicLogConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn open(
        &self,
        pair: &Pair,
    ) -> Result<(StreamHandle, mpsc::Receiver<String>), DashError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.open_requests.push(pair.clone());
            guard.behavior.clone()
        };

        let scripted = match behavior {
            Some(StreamBehavior::Fail(e)) => return Err(e),
            Some(StreamBehavior::Hang) => return std::future::pending().await,
            None => return Err(DashError::Socket(format!("no stream behavior for {pair}"))),
            Some(StreamBehavior::Success(lines)) => Some(lines),
            Some(StreamBehavior::Manual) => None,
        };

        let (tx, rx) = mpsc::channel::<String>(1024);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let (kill_tx, mut kill_rx) = oneshot::channel::<()>();
        let (in_tx, mut in_rx) = mpsc::channel::<String>(1024);

        // Publish kill switch and manual sender for remote control
        {
            let mut guard = self.state.lock().await;
            guard.kill_switch = Some(kill_tx);
            guard.manual_tx = scripted.is_none().then(|| in_tx.clone());
        }
        drop(in_tx);

        let state = Arc::clone(&self.state);
        let join = tokio::spawn(async move {
            for line in scripted.unwrap_or_default() {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => return note_stop(&state).await,
                    _ = &mut kill_rx => return,
                    res = tx.send(line) => {
                        if res.is_err() {
                            return;
                        }
                    }
                }
            }
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => return note_stop(&state).await,
                    _ = &mut kill_rx => return,
                    maybe_line = in_rx.recv() => match maybe_line {
                        Some(line) => {
                            if tx.send(line).await.is_err() {
                                return;
                            }
                        }
                        None => {
                            // No manual sender left; wait for stop/kill to avoid a busy loop
                            tokio::select! {
                                _ = &mut stop_rx => note_stop(&state).await,
                                _ = &mut kill_rx => {}
                            }
                            return;
                        }
                    },
                }
            }
        });

        Ok((StreamHandle::new(join, stop_tx), rx))
    }
}
