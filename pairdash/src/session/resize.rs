use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Trailing debounce for viewport resize notifications.
///
/// A background task waits for `window` of silence after the last
/// [`signal`](Self::signal) and then emits one fire event. Fire events are
/// coalesced: while one is pending, further fires are dropped.
#[derive(Debug)]
pub struct ResizeCoordinator {
    signal_tx: mpsc::UnboundedSender<()>,
    fired_rx: mpsc::Receiver<()>,
    task: JoinHandle<()>,
}

impl ResizeCoordinator {
    /// Spawn the debounce task. Must be called within a Tokio runtime.
    #[must_use]
    pub fn spawn(window: Duration) -> Self {
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<()>();
        let (fired_tx, fired_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            loop {
                if signal_rx.recv().await.is_none() {
                    return;
                }
                loop {
                    tokio::select! {
                        biased;
                        msg = signal_rx.recv() => {
                            if msg.is_none() {
                                return;
                            }
                        }
                        () = tokio::time::sleep(window) => break,
                    }
                }
                match fired_tx.try_send(()) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                    Err(mpsc::error::TrySendError::Closed(())) => return,
                }
            }
        });

        Self {
            signal_tx,
            fired_rx,
            task,
        }
    }

    /// Record one viewport resize notification; restarts the quiet window.
    pub fn signal(&self) {
        let _ = self.signal_tx.send(());
    }

    /// Wait for the next fire event. Returns `false` once the task has ended.
    pub async fn fired(&mut self) -> bool {
        self.fired_rx.recv().await.is_some()
    }

    /// Consume a pending fire event without waiting.
    pub fn try_fired(&mut self) -> bool {
        self.fired_rx.try_recv().is_ok()
    }
}

impl Drop for ResizeCoordinator {
    fn drop(&mut self) {
        self.task.abort();
    }
}
