use std::collections::HashMap;
use std::sync::Arc;

use pairdash_core::{
    ChartOptions, DashConfig, DashError, Pair, PersistenceStore, RefreshPolicy, Theme, WidgetHost,
};
use tokio::sync::Notify;

use super::chart::{ChartSession, Lifecycle};
use super::resize::ResizeCoordinator;
use super::selection::SelectionState;
use crate::sync::DataSyncClient;

/// Result of [`SessionManager::toggle_selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// The pair was added and its chart created.
    Selected,
    /// The pair was removed and its chart disposed.
    Deselected,
    /// The pair is not in the catalog; nothing changed.
    Ignored,
}

/// Root owner of the selection, the chart sessions and the resize debouncer.
///
/// A `SessionManager` has exactly one owner at a time: the caller, or the
/// dashboard task started by [`spawn_dashboard`](crate::spawn_dashboard).
/// Feed results are applied only when the owner calls [`pump`](Self::pump)
/// or [`settle`](Self::settle).
pub struct SessionManager {
    cfg: DashConfig,
    client: DataSyncClient,
    host: Box<dyn WidgetHost>,
    store: Arc<dyn PersistenceStore>,
    catalog: Vec<Pair>,
    catalog_loaded: bool,
    selection: SelectionState,
    sessions: HashMap<Pair, ChartSession>,
    // Containers in on-screen order, as last arranged on the host.
    placed: Vec<Pair>,
    theme: Theme,
    resize: ResizeCoordinator,
    wake: Arc<Notify>,
}

impl SessionManager {
    pub(crate) fn new(
        cfg: DashConfig,
        client: DataSyncClient,
        host: Box<dyn WidgetHost>,
        store: Arc<dyn PersistenceStore>,
    ) -> Self {
        let selection = SelectionState::load(store.as_ref(), &cfg.selection_key);
        let theme = match store.get(&cfg.theme_key) {
            Ok(v) => Theme::from_stored(v.as_deref()),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_e, "failed to read persisted theme");
                Theme::default()
            }
        };
        let resize = ResizeCoordinator::spawn(cfg.resize_debounce());
        Self {
            cfg,
            client,
            host,
            store,
            catalog: Vec::new(),
            catalog_loaded: false,
            selection,
            sessions: HashMap::new(),
            placed: Vec::new(),
            theme,
            resize,
            wake: Arc::new(Notify::new()),
        }
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &DashConfig {
        &self.cfg
    }

    /// The data client shared by every session.
    #[must_use]
    pub const fn client(&self) -> &DataSyncClient {
        &self.client
    }

    /// Current catalog, in backend order.
    #[must_use]
    pub fn catalog(&self) -> &[Pair] {
        &self.catalog
    }

    /// False until a catalog has been applied.
    #[must_use]
    pub const fn is_catalog_loaded(&self) -> bool {
        self.catalog_loaded
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Current theme.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Session rendering `pair`, if any.
    #[must_use]
    pub fn session(&self, pair: &Pair) -> Option<&ChartSession> {
        self.sessions.get(pair)
    }

    /// Mutable access to the session rendering `pair`, e.g. to `reload` it.
    pub fn session_mut(&mut self, pair: &Pair) -> Option<&mut ChartSession> {
        self.sessions.get_mut(pair)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Pairs with a chart, in catalog order. This is the container order.
    #[must_use]
    pub fn display_order(&self) -> Vec<Pair> {
        self.catalog
            .iter()
            .filter(|p| self.sessions.contains_key(*p))
            .cloned()
            .collect()
    }

    /// Notifier signalled whenever a feed result is ready to be pumped.
    #[must_use]
    pub fn feed_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    /// Fetch the catalog and apply it.
    ///
    /// The first successful call behaves like [`initialize`](Self::initialize),
    /// later ones like [`refresh_catalog`](Self::refresh_catalog). On failure
    /// nothing changes and the error is returned; there is no retry.
    ///
    /// # Errors
    /// Returns the transport error from `GET /dumps`.
    pub async fn load_catalog(&mut self) -> Result<(), DashError> {
        match self.client.get_catalog().await {
            Ok(catalog) => {
                if self.catalog_loaded {
                    self.refresh_catalog(catalog);
                } else {
                    self.initialize(catalog);
                }
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, loaded = self.catalog_loaded, "catalog fetch failed");
                Err(e)
            }
        }
    }

    /// Apply the first catalog: drop persisted pairs it does not contain, then
    /// create a chart for every remaining selected pair, in catalog order.
    pub fn initialize(&mut self, catalog: Vec<Pair>) {
        self.set_catalog(catalog);
        self.catalog_loaded = true;
        self.sync_sessions();
    }

    /// Apply a changed catalog.
    ///
    /// With [`RefreshPolicy::Incremental`] only membership is recomputed and
    /// surviving charts keep their data. With [`RefreshPolicy::Rebuild`] every
    /// chart is disposed and the surviving ones are recreated.
    pub fn refresh_catalog(&mut self, catalog: Vec<Pair>) {
        self.set_catalog(catalog);
        self.catalog_loaded = true;
        if self.cfg.refresh_policy == RefreshPolicy::Rebuild {
            let pairs: Vec<Pair> = self.sessions.keys().cloned().collect();
            for pair in pairs {
                self.destroy_session(&pair);
            }
        }
        self.sync_sessions();
    }

    /// Select `pair` if unselected, otherwise deselect it.
    ///
    /// The selection is persisted after every change. Pairs missing from the
    /// catalog are ignored.
    pub fn toggle_selection(&mut self, pair: &Pair) -> SelectionChange {
        if !self.catalog.contains(pair) {
            #[cfg(feature = "tracing")]
            tracing::debug!(pair = %pair, "ignoring toggle for pair outside the catalog");
            return SelectionChange::Ignored;
        }
        let change = if self.selection.remove(pair) {
            self.destroy_session(pair);
            SelectionChange::Deselected
        } else {
            self.selection.insert(pair.clone());
            self.create_session(pair);
            SelectionChange::Selected
        };
        self.persist_selection();
        change
    }

    /// Persist `theme` and restyle every chart in place.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(_e) = self.store.set(&self.cfg.theme_key, theme.as_str()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "failed to persist theme");
        }
        for session in self.sessions.values_mut() {
            session.apply_theme(theme);
        }
    }

    /// Record a viewport resize notification. Charts are resized once the
    /// debounce window elapses and [`fan_out_resize`](Self::fan_out_resize) runs.
    pub fn on_viewport_resized(&self) {
        self.resize.signal();
    }

    /// Wait for the resize debouncer to fire. Returns `false` if it stopped.
    pub async fn next_resize(&mut self) -> bool {
        self.resize.fired().await
    }

    /// Resize every live chart to the current size of its own container.
    ///
    /// Returns the number of charts resized.
    pub fn fan_out_resize(&mut self) -> usize {
        let mut resized = 0;
        for (pair, session) in &mut self.sessions {
            if !session.lifecycle().is_live() {
                continue;
            }
            if let Some(size) = self.host.container_size(pair) {
                session.resize(size);
                resized += 1;
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(resized, "resize fan-out");
        resized
    }

    /// Fan out a pending debounced resize without waiting. Returns `true` if one fired.
    pub fn poll_resize(&mut self) -> bool {
        if self.resize.try_fired() {
            self.fan_out_resize();
            true
        } else {
            false
        }
    }

    /// Apply every feed result that has arrived. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        self.sessions.values_mut().map(ChartSession::poll_feeds).sum()
    }

    /// Wait until every in-flight feed has been applied.
    pub async fn settle(&mut self) {
        futures::future::join_all(self.sessions.values_mut().map(ChartSession::settle)).await;
    }

    /// Dispose every chart and remove its container. The selection is kept.
    pub fn teardown(&mut self) {
        let pairs: Vec<Pair> = self.sessions.keys().cloned().collect();
        for pair in pairs {
            self.destroy_session(&pair);
        }
    }

    /// Lifecycle of every session, in display order.
    #[must_use]
    pub fn lifecycles(&self) -> Vec<(Pair, Lifecycle)> {
        self.display_order()
            .into_iter()
            .filter_map(|p| {
                let state = self.sessions.get(&p)?.lifecycle();
                Some((p, state))
            })
            .collect()
    }

    fn set_catalog(&mut self, catalog: Vec<Pair>) {
        let mut deduped: Vec<Pair> = Vec::with_capacity(catalog.len());
        for p in catalog {
            if !deduped.contains(&p) {
                deduped.push(p);
            }
        }
        self.catalog = deduped;
    }

    /// Reconcile the selection against the catalog and converge sessions on it.
    fn sync_sessions(&mut self) {
        let dropped = self.selection.reconcile(&self.catalog);
        if !dropped.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::info!(dropped = ?dropped, "dropped selected pairs missing from catalog");
            self.persist_selection();
        }

        let stale: Vec<Pair> = self
            .sessions
            .keys()
            .filter(|p| !self.selection.contains(p))
            .cloned()
            .collect();
        for pair in stale {
            self.destroy_session(&pair);
        }
        self.arrange_containers();

        let wanted: Vec<Pair> = self
            .catalog
            .iter()
            .filter(|p| self.selection.contains(p) && !self.sessions.contains_key(*p))
            .cloned()
            .collect();
        for pair in wanted {
            self.create_session(&pair);
        }
    }

    /// Move surviving containers so their on-screen order follows the catalog.
    ///
    /// Walks the wanted order back to front so every suffix is already in
    /// place when the pair before it is checked. Widgets are not recreated.
    fn arrange_containers(&mut self) {
        let wanted = self.display_order();
        if self.placed == wanted {
            return;
        }
        for (i, pair) in wanted.iter().enumerate().rev() {
            let before = wanted.get(i + 1);
            let Some(from) = self.placed.iter().position(|p| p == pair) else {
                continue;
            };
            if self.placed.get(from + 1) == before {
                continue;
            }
            self.host.move_container(pair, before);
            let moved = self.placed.remove(from);
            self.place(moved, before);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(order = ?self.placed, "chart containers rearranged");
    }

    fn place(&mut self, pair: Pair, before: Option<&Pair>) {
        let at = before
            .and_then(|b| self.placed.iter().position(|p| p == b))
            .unwrap_or(self.placed.len());
        self.placed.insert(at, pair);
    }

    /// First selected pair after `pair` in catalog order that already has a chart.
    fn insertion_anchor(&self, pair: &Pair) -> Option<Pair> {
        let pos = self.catalog.iter().position(|p| p == pair)?;
        self.catalog[pos + 1..]
            .iter()
            .find(|p| self.sessions.contains_key(*p))
            .cloned()
    }

    fn create_session(&mut self, pair: &Pair) {
        if self.sessions.contains_key(pair) {
            return;
        }
        let anchor = self.insertion_anchor(pair);
        if !self.host.insert_container(pair, anchor.as_ref()) {
            #[cfg(feature = "tracing")]
            tracing::debug!(pair = %pair, "no container host attached; skipping chart");
            return;
        }
        let size = self.host.container_size(pair).unwrap_or_default();
        let Some(widget) = self
            .host
            .create_widget(pair, &ChartOptions::themed(self.theme, size))
        else {
            #[cfg(feature = "tracing")]
            tracing::debug!(pair = %pair, "container vanished before widget creation");
            self.host.remove_container(pair);
            return;
        };
        self.place(pair.clone(), anchor.as_ref());
        let mut session = ChartSession::new(
            pair.clone(),
            widget,
            self.client.clone(),
            self.theme,
            size,
            self.cfg.bars_limit,
            Arc::clone(&self.wake),
        );
        session.load();
        #[cfg(feature = "tracing")]
        tracing::debug!(pair = %pair, before = ?anchor, "chart session created");
        self.sessions.insert(pair.clone(), session);
    }

    fn destroy_session(&mut self, pair: &Pair) {
        if let Some(mut session) = self.sessions.remove(pair) {
            session.dispose();
            self.host.remove_container(pair);
            self.placed.retain(|p| p != pair);
        }
    }

    fn persist_selection(&self) {
        if let Err(_e) = self
            .selection
            .persist(self.store.as_ref(), &self.cfg.selection_key)
        {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "failed to persist selection");
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("catalog", &self.catalog)
            .field("selection", &self.selection)
            .field("sessions", &self.display_order())
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}
