use std::collections::HashSet;

use pairdash_core::{DashError, Pair};

use crate::sync::DataSyncClient;

/// Outcome of [`InferenceLauncher::launch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The job was requested; open the log view for the pair.
    Started,
    /// A job for the pair is already running; re-open its log view.
    AlreadyRunning,
}

/// Gate in front of `POST /inference/{pair}`.
///
/// Tracks which pairs have a job in flight so that a second launch re-opens
/// the log view instead of starting another job. Feed it completion events
/// from a [`StreamChannel`](crate::StreamChannel) via [`complete`](Self::complete).
#[derive(Clone)]
pub struct InferenceLauncher {
    client: DataSyncClient,
    running: HashSet<Pair>,
}

impl InferenceLauncher {
    /// Create a launcher issuing requests through `client`.
    #[must_use]
    pub fn new(client: DataSyncClient) -> Self {
        Self {
            client,
            running: HashSet::new(),
        }
    }

    /// Start an inference job for `pair` unless one is already running.
    ///
    /// # Errors
    /// Returns the request error; the pair is then no longer marked running.
    pub async fn launch(&mut self, pair: &Pair) -> Result<LaunchOutcome, DashError> {
        if !self.running.insert(pair.clone()) {
            return Ok(LaunchOutcome::AlreadyRunning);
        }
        match self.client.trigger_inference(pair).await {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::info!(pair = %pair, "inference started");
                Ok(LaunchOutcome::Started)
            }
            Err(e) => {
                self.running.remove(pair);
                #[cfg(feature = "tracing")]
                tracing::warn!(pair = %pair, error = %e, "inference request failed");
                Err(e)
            }
        }
    }

    /// Mark the job for `pair` finished. Returns `false` if none was running.
    pub fn complete(&mut self, pair: &Pair) -> bool {
        self.running.remove(pair)
    }

    /// True while a job for `pair` is marked running.
    #[must_use]
    pub fn is_running(&self, pair: &Pair) -> bool {
        self.running.contains(pair)
    }
}
