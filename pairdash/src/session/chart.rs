use std::sync::Arc;

use pairdash_core::{
    Bar, ChartOptions, ChartWidget, ConfidenceMarker, DashError, Dimensions, Pair,
    PredictionPoint, SeriesHandle, SeriesStyle, Theme,
};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;

use crate::sync::DataSyncClient;

/// Lifecycle of a [`ChartSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Widget and series exist, nothing requested yet.
    Created,
    /// Feeds are in flight; the primary series has not been set.
    Loading,
    /// The primary series has been set at least once.
    Populated,
    /// Widget destroyed, feeds cancelled. Terminal.
    Disposed,
}

impl Lifecycle {
    /// True while the session owns a widget that accepts resizes.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Loading | Self::Populated)
    }
}

/// Completion of one of the three feeds, addressed to the session that issued it.
#[derive(Debug)]
pub(crate) enum FeedEvent {
    Bars(Result<Vec<Bar>, DashError>),
    Prediction(Result<Vec<PredictionPoint>, DashError>),
    Confidence(Result<Vec<ConfidenceMarker>, DashError>),
}

/// One chart bound to one selected pair.
///
/// The session exclusively owns its widget. Feeds are fetched by spawned tasks
/// that report back over a channel private to the current load; dropping that
/// channel on dispose or reload is what discards late responses.
pub struct ChartSession {
    pair: Pair,
    widget: Option<Box<dyn ChartWidget>>,
    primary: SeriesHandle,
    overlay: SeriesHandle,
    state: Lifecycle,
    theme: Theme,
    size: Dimensions,
    bars_limit: u32,
    client: DataSyncClient,
    wake: Arc<Notify>,
    feeds: Vec<JoinHandle<()>>,
    feed_rx: Option<mpsc::UnboundedReceiver<FeedEvent>>,
    markers: Vec<ConfidenceMarker>,
}

impl ChartSession {
    /// Bind `widget` to `pair` and create its candle and prediction series.
    ///
    /// `wake` is notified every time a feed completes so the owner knows to
    /// call [`poll_feeds`](Self::poll_feeds).
    pub fn new(
        pair: Pair,
        mut widget: Box<dyn ChartWidget>,
        client: DataSyncClient,
        theme: Theme,
        size: Dimensions,
        bars_limit: u32,
        wake: Arc<Notify>,
    ) -> Self {
        let primary = widget.add_series(&SeriesStyle::candles());
        let overlay = widget.add_series(&SeriesStyle::prediction_line());
        Self {
            pair,
            widget: Some(widget),
            primary,
            overlay,
            state: Lifecycle::Created,
            theme,
            size,
            bars_limit,
            client,
            wake,
            feeds: Vec::new(),
            feed_rx: None,
            markers: Vec::new(),
        }
    }

    /// The pair this session renders.
    #[must_use]
    pub const fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    /// Markers currently applied to the widget.
    #[must_use]
    pub fn markers(&self) -> &[ConfidenceMarker] {
        &self.markers
    }

    /// True while at least one feed has not reported back.
    #[must_use]
    pub const fn has_pending_feeds(&self) -> bool {
        self.feed_rx.is_some()
    }

    /// Start the bars, prediction and confidence fetches.
    ///
    /// Only acts on a `Created` session: a second call while loading or
    /// populated, or any call after dispose, is a no-op. Feed failures never
    /// surface here; they are logged when applied.
    pub fn load(&mut self) {
        if self.state != Lifecycle::Created {
            return;
        }
        self.state = Lifecycle::Loading;
        self.start_feeds();
    }

    fn start_feeds(&mut self) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feed_rx = Some(rx);

        let pair = self.pair.clone();
        let client = self.client.clone();
        let limit = self.bars_limit;
        self.feeds.push(spawn_feed(&tx, &self.wake, async move {
            FeedEvent::Bars(client.get_bars(&pair, limit).await)
        }));

        let pair = self.pair.clone();
        let client = self.client.clone();
        self.feeds.push(spawn_feed(&tx, &self.wake, async move {
            FeedEvent::Prediction(client.get_prediction(&pair).await)
        }));

        let pair = self.pair.clone();
        let client = self.client.clone();
        let theme = self.theme;
        self.feeds.push(spawn_feed(&tx, &self.wake, async move {
            FeedEvent::Confidence(client.get_confidence_markers(&pair, theme).await)
        }));

        #[cfg(feature = "tracing")]
        tracing::debug!(pair = %self.pair, "chart feeds requested");
    }

    /// Apply every feed result that has already arrived, without waiting.
    ///
    /// Returns the number of results applied.
    pub fn poll_feeds(&mut self) -> usize {
        let Some(mut rx) = self.feed_rx.take() else {
            return 0;
        };
        let mut applied = 0;
        loop {
            match rx.try_recv() {
                Ok(ev) => {
                    self.apply(ev);
                    applied += 1;
                }
                Err(mpsc::error::TryRecvError::Empty) => {
                    self.feed_rx = Some(rx);
                    break;
                }
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.feeds.clear();
                    break;
                }
            }
        }
        applied
    }

    /// Wait for every in-flight feed and apply the results.
    pub async fn settle(&mut self) {
        let Some(mut rx) = self.feed_rx.take() else {
            return;
        };
        while let Some(ev) = rx.recv().await {
            self.apply(ev);
        }
        self.feeds.clear();
    }

    /// Forward a new container size to the widget while loading or populated.
    pub fn resize(&mut self, size: Dimensions) {
        if !self.state.is_live() {
            return;
        }
        self.size = size;
        if let Some(widget) = self.widget.as_mut() {
            widget.resize(size);
        }
    }

    /// Re-style the widget and recolour the applied markers in place. No refetch.
    pub fn apply_theme(&mut self, theme: Theme) {
        if self.state == Lifecycle::Disposed {
            return;
        }
        self.theme = theme;
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        widget.apply_options(&ChartOptions::themed(theme, self.size));
        if !self.markers.is_empty() {
            for m in &mut self.markers {
                m.color = theme.marker().to_string();
            }
            widget.set_markers(self.primary, &self.markers);
        }
    }

    /// Cancel in-flight feeds and request everything again.
    ///
    /// Data already on the widget stays until the new results replace it,
    /// so a populated session stays `Populated` even if the new bars fail.
    pub fn reload(&mut self) {
        if self.state == Lifecycle::Disposed {
            return;
        }
        self.cancel_feeds();
        if self.state == Lifecycle::Created {
            self.state = Lifecycle::Loading;
        }
        self.start_feeds();
    }

    /// Cancel feeds, destroy the widget and enter `Disposed`.
    ///
    /// Returns `false` if the session was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.state == Lifecycle::Disposed {
            return false;
        }
        self.cancel_feeds();
        if let Some(widget) = self.widget.take() {
            widget.destroy();
        }
        self.markers.clear();
        self.state = Lifecycle::Disposed;
        #[cfg(feature = "tracing")]
        tracing::debug!(pair = %self.pair, "chart session disposed");
        true
    }

    fn cancel_feeds(&mut self) {
        self.feed_rx = None;
        for task in self.feeds.drain(..) {
            task.abort();
        }
    }

    fn apply(&mut self, ev: FeedEvent) {
        if self.state == Lifecycle::Disposed {
            #[cfg(feature = "tracing")]
            tracing::debug!(pair = %self.pair, "dropping feed result for disposed session");
            return;
        }
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        match ev {
            FeedEvent::Bars(Ok(bars)) => {
                widget.set_bars(self.primary, &bars);
                self.state = Lifecycle::Populated;
            }
            FeedEvent::Prediction(Ok(points)) => {
                widget.set_line(self.overlay, &points);
            }
            FeedEvent::Confidence(Ok(mut markers)) => {
                if markers.is_empty() {
                    return;
                }
                for m in &mut markers {
                    m.color = self.theme.marker().to_string();
                }
                widget.set_markers(self.primary, &markers);
                self.markers = markers;
            }
            FeedEvent::Bars(Err(e)) => self.log_feed_failure("bars", &e),
            FeedEvent::Prediction(Err(e)) => self.log_feed_failure("prediction", &e),
            FeedEvent::Confidence(Err(e)) => self.log_feed_failure("confidence", &e),
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables, clippy::unused_self))]
    fn log_feed_failure(&self, feed: &'static str, e: &DashError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(pair = %self.pair, feed, error = %e, "chart feed failed");
    }
}

impl Drop for ChartSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ChartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSession")
            .field("pair", &self.pair)
            .field("state", &self.state)
            .field("theme", &self.theme)
            .field("markers", &self.markers.len())
            .finish_non_exhaustive()
    }
}

fn spawn_feed<F>(
    tx: &mpsc::UnboundedSender<FeedEvent>,
    wake: &Arc<Notify>,
    fut: F,
) -> JoinHandle<()>
where
    F: Future<Output = FeedEvent> + Send + 'static,
{
    let tx = tx.clone();
    let wake = Arc::clone(wake);
    tokio::spawn(async move {
        let ev = fut.await;
        if tx.send(ev).is_ok() {
            wake.notify_one();
        }
    })
}
