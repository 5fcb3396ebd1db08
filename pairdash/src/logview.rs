use pairdash_core::Pair;
use tokio::sync::broadcast;

use crate::channel::{ChannelState, StreamChannel};

/// Consumer side of a log stream: an ordered, clearable buffer of lines.
///
/// The view owns its [`StreamChannel`], so there is exactly one live
/// connection per open view. Closing or dropping the view disconnects it.
#[derive(Debug)]
pub struct LogView {
    channel: StreamChannel,
    rx: broadcast::Receiver<String>,
    lines: Vec<String>,
}

impl LogView {
    /// Subscribe to `channel` and connect it to `pair`.
    #[must_use]
    pub fn open(channel: StreamChannel, pair: Pair) -> Self {
        let rx = channel.subscribe_logs();
        channel.connect(pair);
        Self {
            channel,
            rx,
            lines: Vec::new(),
        }
    }

    /// Buffered lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drop every buffered line. The connection is unaffected.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Connection state of the underlying channel.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }

    /// The underlying channel, e.g. to reconnect after `Failed`.
    #[must_use]
    pub const fn channel(&self) -> &StreamChannel {
        &self.channel
    }

    /// Buffer every line already received, without waiting. Returns how many were added.
    pub fn drain(&mut self) -> usize {
        let mut added = 0;
        loop {
            match self.rx.try_recv() {
                Ok(line) => {
                    self.lines.push(line);
                    added += 1;
                }
                Err(broadcast::error::TryRecvError::Lagged(_n)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(skipped = _n, "log view fell behind");
                }
                Err(_) => return added,
            }
        }
    }

    /// Wait for the next line and buffer it. Returns `None` once the channel is gone.
    pub async fn next_line(&mut self) -> Option<&str> {
        loop {
            match self.rx.recv().await {
                Ok(line) => {
                    self.lines.push(line);
                    return self.lines.last().map(String::as_str);
                }
                Err(broadcast::error::RecvError::Lagged(_n)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(skipped = _n, "log view fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Disconnect and hand back the buffered lines.
    #[must_use]
    pub fn close(mut self) -> Vec<String> {
        self.channel.disconnect();
        std::mem::take(&mut self.lines)
    }
}

impl Drop for LogView {
    fn drop(&mut self) {
        self.channel.disconnect();
    }
}
