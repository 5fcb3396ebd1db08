use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pairdash_core::{
    Bar, ChartOptions, ChartWidget, ConfidenceMarker, Dimensions, Pair, PredictionPoint,
    SeriesHandle, SeriesStyle, WidgetHost,
};

const DEFAULT_SIZE: Dimensions = Dimensions::new(800, 400);

/// Everything a mock widget has been asked to do.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSnapshot {
    /// Pair whose container holds the widget.
    pub pair: Pair,
    /// Options at creation, replaced by every `apply_options`.
    pub options: ChartOptions,
    /// Series in creation order.
    pub series: Vec<SeriesStyle>,
    /// Last candle set.
    pub bars: Vec<Bar>,
    /// Last line set.
    pub line: Vec<PredictionPoint>,
    /// Last marker set.
    pub markers: Vec<ConfidenceMarker>,
    /// Number of `set_markers` calls.
    pub marker_sets: usize,
    /// Number of `apply_options` calls.
    pub option_updates: usize,
    /// Every size passed to `resize`.
    pub resizes: Vec<Dimensions>,
    /// Whether `destroy` was called.
    pub destroyed: bool,
}

#[derive(Debug)]
struct HostState {
    attached: bool,
    order: Vec<Pair>,
    sizes: HashMap<Pair, Dimensions>,
    refused: HashSet<Pair>,
    widgets: Vec<WidgetSnapshot>,
    moves: usize,
}

type Shared = Arc<Mutex<HostState>>;

fn lock(state: &Shared) -> MutexGuard<'_, HostState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Widget host that records containers and widget calls in memory.
///
/// Containers default to 800x400; adjust them through the [`WidgetProbe`].
pub struct MockWidgetHost {
    state: Shared,
}

/// Test-side view into a [`MockWidgetHost`].
#[derive(Clone)]
pub struct WidgetProbe {
    state: Shared,
}

impl MockWidgetHost {
    /// Create an attached host and its probe.
    #[must_use]
    pub fn new() -> (Self, WidgetProbe) {
        let state = Arc::new(Mutex::new(HostState {
            attached: true,
            order: Vec::new(),
            sizes: HashMap::new(),
            refused: HashSet::new(),
            widgets: Vec::new(),
            moves: 0,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            WidgetProbe { state },
        )
    }
}

impl WidgetHost for MockWidgetHost {
    fn insert_container(&mut self, pair: &Pair, before: Option<&Pair>) -> bool {
        let mut st = lock(&self.state);
        if !st.attached {
            return false;
        }
        st.order.retain(|p| p != pair);
        let at = before
            .and_then(|b| st.order.iter().position(|p| p == b))
            .unwrap_or(st.order.len());
        st.order.insert(at, pair.clone());
        st.sizes.entry(pair.clone()).or_insert(DEFAULT_SIZE);
        true
    }

    fn move_container(&mut self, pair: &Pair, before: Option<&Pair>) {
        let mut st = lock(&self.state);
        let Some(from) = st.order.iter().position(|p| p == pair) else {
            return;
        };
        let moved = st.order.remove(from);
        let at = before
            .and_then(|b| st.order.iter().position(|p| p == b))
            .unwrap_or(st.order.len());
        st.order.insert(at, moved);
        st.moves += 1;
    }

    fn remove_container(&mut self, pair: &Pair) {
        let mut st = lock(&self.state);
        st.order.retain(|p| p != pair);
        st.sizes.remove(pair);
    }

    fn container_size(&self, pair: &Pair) -> Option<Dimensions> {
        lock(&self.state).sizes.get(pair).copied()
    }

    fn create_widget(&mut self, pair: &Pair, options: &ChartOptions) -> Option<Box<dyn ChartWidget>> {
        let mut st = lock(&self.state);
        if !st.order.contains(pair) || st.refused.contains(pair) {
            return None;
        }
        st.widgets.push(WidgetSnapshot {
            pair: pair.clone(),
            options: options.clone(),
            series: Vec::new(),
            bars: Vec::new(),
            line: Vec::new(),
            markers: Vec::new(),
            marker_sets: 0,
            option_updates: 0,
            resizes: Vec::new(),
            destroyed: false,
        });
        let id = st.widgets.len() - 1;
        drop(st);
        Some(Box::new(MockWidget {
            id,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockWidget {
    id: usize,
    state: Shared,
}

impl MockWidget {
    fn with<R>(&self, f: impl FnOnce(&mut WidgetSnapshot) -> R) -> R {
        let mut st = lock(&self.state);
        f(&mut st.widgets[self.id])
    }
}

impl ChartWidget for MockWidget {
    fn add_series(&mut self, style: &SeriesStyle) -> SeriesHandle {
        self.with(|w| {
            w.series.push(style.clone());
            SeriesHandle(w.series.len() as u64 - 1)
        })
    }

    fn set_bars(&mut self, _series: SeriesHandle, bars: &[Bar]) {
        self.with(|w| w.bars = bars.to_vec());
    }

    fn set_line(&mut self, _series: SeriesHandle, points: &[PredictionPoint]) {
        self.with(|w| w.line = points.to_vec());
    }

    fn set_markers(&mut self, _series: SeriesHandle, markers: &[ConfidenceMarker]) {
        self.with(|w| {
            w.markers = markers.to_vec();
            w.marker_sets += 1;
        });
    }

    fn apply_options(&mut self, options: &ChartOptions) {
        self.with(|w| {
            w.options = options.clone();
            w.option_updates += 1;
        });
    }

    fn resize(&mut self, size: Dimensions) {
        self.with(|w| w.resizes.push(size));
    }

    fn destroy(self: Box<Self>) {
        self.with(|w| w.destroyed = true);
    }
}

impl WidgetProbe {
    /// Container pairs in on-screen order.
    #[must_use]
    pub fn container_order(&self) -> Vec<Pair> {
        lock(&self.state).order.clone()
    }

    /// Widgets that were created and not yet destroyed.
    #[must_use]
    pub fn live_widgets(&self) -> Vec<WidgetSnapshot> {
        lock(&self.state)
            .widgets
            .iter()
            .filter(|w| !w.destroyed)
            .cloned()
            .collect()
    }

    /// The most recent widget created for `pair`.
    #[must_use]
    pub fn widget(&self, pair: &Pair) -> Option<WidgetSnapshot> {
        lock(&self.state)
            .widgets
            .iter()
            .rev()
            .find(|w| &w.pair == pair)
            .cloned()
    }

    /// Total number of widgets ever created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        lock(&self.state).widgets.len()
    }

    /// Number of `move_container` calls that moved a container.
    #[must_use]
    pub fn move_count(&self) -> usize {
        lock(&self.state).moves
    }

    /// Change the size reported for the container of `pair`.
    pub fn set_container_size(&self, pair: &Pair, size: Dimensions) {
        let mut st = lock(&self.state);
        if st.order.contains(pair) {
            st.sizes.insert(pair.clone(), size);
        }
    }

    /// Detach the host: new containers are rejected until re-attached.
    pub fn set_attached(&self, attached: bool) {
        lock(&self.state).attached = attached;
    }

    /// Refuse to create widgets for `pair`, as if its container had no canvas.
    pub fn refuse_widgets(&self, pair: Pair) {
        lock(&self.state).refused.insert(pair);
    }
}
