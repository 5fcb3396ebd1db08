use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use pairdash_core::{DashError, LogStreamConnector, Pair, ReconnectConfig, StreamHandle};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Sleep;

use super::classify::completed_pair;
use super::state_machine::{Action, ChannelState, Event, Machine};

const BROADCAST_CAPACITY: usize = 1024;

/// Observable state of a [`StreamChannel`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelSnapshot {
    /// Current state.
    pub state: ChannelState,
    /// Automatic reconnect attempts since the last explicit connect or successful open.
    pub attempt: u32,
    /// Pair of the current or last connection.
    pub pair: Option<Pair>,
}

#[derive(Debug)]
enum Command {
    Connect(Pair),
    Disconnect,
}

type OpenResult = Result<(StreamHandle, mpsc::Receiver<String>), DashError>;

/// A log stream with bounded fixed-delay reconnection.
///
/// All connection state lives in a driver task that owns at most one socket
/// at a time. Every inbound line is broadcast verbatim to
/// [`subscribe_logs`](Self::subscribe_logs); completion lines are additionally
/// broadcast to [`completions`](Self::completions). Dropping the channel
/// closes the command queue: the driver handles the commands already queued,
/// stops the socket and exits.
#[derive(Debug)]
pub struct StreamChannel {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ChannelSnapshot>,
    logs_tx: broadcast::Sender<String>,
    completions_tx: broadcast::Sender<Pair>,
}

impl StreamChannel {
    /// Spawn an idle channel. Must be called within a Tokio runtime.
    #[must_use]
    pub fn spawn(connector: Arc<dyn LogStreamConnector>, cfg: ReconnectConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ChannelSnapshot::default());
        let (logs_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (completions_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        tokio::spawn(drive(
            connector,
            Machine::new(cfg),
            cmd_rx,
            state_tx,
            logs_tx.clone(),
            completions_tx.clone(),
        ));

        Self {
            cmd_tx,
            state_rx,
            logs_tx,
            completions_tx,
        }
    }

    /// Connect to the log stream of `pair`, replacing any current connection
    /// and resetting the reconnect counter.
    pub fn connect(&self, pair: Pair) {
        let _ = self.cmd_tx.send(Command::Connect(pair));
    }

    /// Close the connection and cancel any pending reconnect.
    pub fn disconnect(&self) {
        let _ = self.cmd_tx.send(Command::Disconnect);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.state_rx.borrow().state
    }

    /// Current state, attempt counter and pair.
    #[must_use]
    pub fn snapshot(&self) -> ChannelSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Watch state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ChannelSnapshot> {
        self.state_rx.clone()
    }

    /// Receive every inbound log line.
    #[must_use]
    pub fn subscribe_logs(&self) -> broadcast::Receiver<String> {
        self.logs_tx.subscribe()
    }

    /// Receive the pair of every "Inference completed" line.
    #[must_use]
    pub fn completions(&self) -> broadcast::Receiver<Pair> {
        self.completions_tx.subscribe()
    }
}

enum Wake {
    Command(Option<Command>),
    OpenFinished(u64, OpenResult),
    Line(Option<String>),
    ReconnectDue,
}

#[allow(clippy::too_many_lines)]
async fn drive(
    connector: Arc<dyn LogStreamConnector>,
    mut machine: Machine,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<ChannelSnapshot>,
    logs_tx: broadcast::Sender<String>,
    completions_tx: broadcast::Sender<Pair>,
) {
    let (open_tx, mut open_rx) = mpsc::unbounded_channel::<(u64, OpenResult)>();

    // Bumped on every open and close so results of superseded opens are discarded.
    let mut epoch: u64 = 0;
    let mut pending_open: Option<JoinHandle<()>> = None;
    let mut socket: Option<StreamHandle> = None;
    let mut lines: Option<mpsc::Receiver<String>> = None;
    let mut reconnect_timer: Option<Pin<Box<Sleep>>> = None;

    loop {
        let wake = tokio::select! {
            cmd = cmd_rx.recv() => Wake::Command(cmd),
            Some((ep, res)) = open_rx.recv() => Wake::OpenFinished(ep, res),
            line = next_line(&mut lines), if lines.is_some() => Wake::Line(line),
            () = timer_due(&mut reconnect_timer), if reconnect_timer.is_some() => Wake::ReconnectDue,
        };

        let event = match wake {
            Wake::Command(Some(Command::Connect(pair))) => Event::ConnectRequested { pair },
            Wake::Command(Some(Command::Disconnect)) => Event::DisconnectRequested,
            Wake::Command(None) => {
                if let Some(h) = pending_open.take() {
                    h.abort();
                }
                if let Some(h) = socket.take() {
                    h.stop().await;
                }
                return;
            }
            Wake::OpenFinished(ep, _) if ep != epoch => continue,
            Wake::OpenFinished(_, Ok((handle, rx))) => {
                pending_open = None;
                socket = Some(handle);
                lines = Some(rx);
                Event::Opened
            }
            Wake::OpenFinished(_, Err(_e)) => {
                pending_open = None;
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    connector = connector.name(),
                    pair = ?machine.pair,
                    error = %_e,
                    "log stream open failed"
                );
                Event::Dropped
            }
            Wake::Line(Some(line)) => {
                if let Some(pair) = completed_pair(&line) {
                    let _ = completions_tx.send(pair);
                }
                let _ = logs_tx.send(line);
                continue;
            }
            Wake::Line(None) => {
                lines = None;
                socket = None;
                Event::Dropped
            }
            Wake::ReconnectDue => {
                reconnect_timer = None;
                Event::ReconnectTimerFired
            }
        };

        #[cfg(feature = "tracing")]
        let prev = machine.state;
        let (next, actions) = machine.handle(event);
        machine = next;

        for action in actions {
            match action {
                Action::OpenSocket { pair } => {
                    epoch = epoch.wrapping_add(1);
                    let ep = epoch;
                    let connector = Arc::clone(&connector);
                    let open_tx = open_tx.clone();
                    if let Some(h) = pending_open.take() {
                        h.abort();
                    }
                    pending_open = Some(tokio::spawn(async move {
                        let res = connector.open(&pair).await;
                        let _ = open_tx.send((ep, res));
                    }));
                }
                Action::CloseSocket => {
                    epoch = epoch.wrapping_add(1);
                    if let Some(h) = pending_open.take() {
                        h.abort();
                    }
                    lines = None;
                    if let Some(h) = socket.take() {
                        tokio::spawn(h.stop());
                    }
                }
                Action::ScheduleReconnect { delay_ms } => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        pair = ?machine.pair,
                        attempt = machine.attempt,
                        delay_ms,
                        "scheduling log stream reconnect"
                    );
                    reconnect_timer =
                        Some(Box::pin(tokio::time::sleep(Duration::from_millis(delay_ms))));
                }
                Action::CancelReconnect => reconnect_timer = None,
            }
        }

        #[cfg(feature = "tracing")]
        if prev != machine.state {
            match machine.state {
                ChannelState::Failed => tracing::info!(
                    pair = ?machine.pair,
                    attempts = machine.attempt,
                    "log stream gave up reconnecting"
                ),
                state => tracing::info!(pair = ?machine.pair, from = ?prev, to = ?state, "log stream state"),
            }
        }
        state_tx.send_replace(ChannelSnapshot {
            state: machine.state,
            attempt: machine.attempt,
            pair: machine.pair.clone(),
        });
    }
}

async fn next_line(lines: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match lines {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn timer_due(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(t) => t.await,
        None => std::future::pending().await,
    }
}
