use pairdash_core::{Pair, ReconnectConfig};

/// Externally visible state of a [`StreamChannel`](super::StreamChannel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    /// Never connected.
    #[default]
    Idle,
    /// A socket open is in flight.
    Connecting,
    /// Connected and receiving lines.
    Open,
    /// Waiting for the reconnect timer.
    Reconnecting,
    /// Reconnect attempts exhausted; only an explicit connect recovers.
    Failed,
    /// Explicitly disconnected.
    Closed,
}

/// Inputs to the channel state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// `connect(pair)` was called.
    ConnectRequested {
        /// Pair the new connection is scoped to.
        pair: Pair,
    },
    /// The pending socket open succeeded.
    Opened,
    /// The open attempt failed, or an open socket closed without being asked to.
    Dropped,
    /// The reconnect delay elapsed.
    ReconnectTimerFired,
    /// `disconnect()` was called.
    DisconnectRequested,
}

/// Side effects requested by a transition, executed by the channel driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Start opening a socket for `pair`.
    OpenSocket {
        /// Pair to connect to.
        pair: Pair,
    },
    /// Drop the current socket and any pending open.
    CloseSocket,
    /// Arm the reconnect timer.
    ScheduleReconnect {
        /// Delay before the next attempt.
        delay_ms: u64,
    },
    /// Disarm the reconnect timer.
    CancelReconnect,
}

/// Pure reconnect state machine: `handle` consumes the machine and returns the
/// next one together with the actions to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Machine {
    /// Current state.
    pub state: ChannelState,
    /// Automatic reconnect attempts made since the last explicit connect or successful open.
    pub attempt: u32,
    /// Pair of the current or last connection.
    pub pair: Option<Pair>,
    /// Attempts allowed before entering `Failed`.
    pub max_attempts: u32,
    /// Fixed reconnect delay.
    pub delay_ms: u64,
}

impl Machine {
    /// Idle machine configured from `cfg`.
    #[must_use]
    pub const fn new(cfg: ReconnectConfig) -> Self {
        Self {
            state: ChannelState::Idle,
            attempt: 0,
            pair: None,
            max_attempts: cfg.max_attempts,
            delay_ms: cfg.delay_ms,
        }
    }

    /// Apply one event.
    #[must_use]
    pub fn handle(mut self, event: Event) -> (Self, Vec<Action>) {
        use ChannelState as S;
        match (self.state, event) {
            (prev, Event::ConnectRequested { pair }) => {
                let mut actions = vec![Action::CancelReconnect];
                if matches!(prev, S::Connecting | S::Open) {
                    actions.push(Action::CloseSocket);
                }
                actions.push(Action::OpenSocket { pair: pair.clone() });
                self.pair = Some(pair);
                self.attempt = 0;
                self.state = S::Connecting;
                (self, actions)
            }
            (S::Connecting, Event::Opened) => {
                self.state = S::Open;
                self.attempt = 0;
                (self, Vec::new())
            }
            (S::Connecting | S::Open, Event::Dropped) => {
                if self.attempt < self.max_attempts {
                    self.attempt += 1;
                    self.state = S::Reconnecting;
                    let delay_ms = self.delay_ms;
                    (self, vec![Action::ScheduleReconnect { delay_ms }])
                } else {
                    self.state = S::Failed;
                    (self, vec![Action::CloseSocket])
                }
            }
            (S::Reconnecting, Event::ReconnectTimerFired) => match self.pair.clone() {
                Some(pair) => {
                    self.state = S::Connecting;
                    (self, vec![Action::OpenSocket { pair }])
                }
                None => {
                    self.state = S::Failed;
                    (self, Vec::new())
                }
            },
            (_, Event::DisconnectRequested) => {
                self.state = S::Closed;
                self.attempt = 0;
                (self, vec![Action::CancelReconnect, Action::CloseSocket])
            }
            // Stale completions and timer ticks for states that no longer expect them.
            (_, Event::Opened | Event::Dropped | Event::ReconnectTimerFired) => (self, Vec::new()),
        }
    }
}
