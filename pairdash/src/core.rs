use std::sync::Arc;
use std::time::Duration;

use pairdash_core::{
    DashConfig, DashError, DashTransport, LocalOffset, PersistenceStore, ReconnectConfig,
    RefreshPolicy, UtcOffsetSource, WidgetHost,
};

use crate::session::manager::SessionManager;
use crate::sync::DataSyncClient;

/// Builder for a [`SessionManager`] and its collaborators.
pub struct DashboardBuilder {
    cfg: DashConfig,
    transport: Option<Arc<dyn DashTransport>>,
    host: Option<Box<dyn WidgetHost>>,
    store: Option<Arc<dyn PersistenceStore>>,
    clock: Arc<dyn UtcOffsetSource>,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardBuilder {
    /// Create a builder with default configuration.
    ///
    /// Behavior and trade-offs:
    /// - A transport, a widget host and a persistence store are required; `build`
    ///   fails without them.
    /// - The local UTC offset is read from the host time zone on every fetch
    ///   unless [`with_clock`](Self::with_clock) pins it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: DashConfig::default(),
            transport: None,
            host: None,
            store: None,
            clock: Arc::new(LocalOffset),
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: DashConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Register the REST transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn DashTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Register the widget host that owns chart containers.
    #[must_use]
    pub fn with_widget_host(mut self, host: Box<dyn WidgetHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Register the key/value store for the selection and theme.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the UTC offset source.
    ///
    /// Behavior and trade-offs:
    /// - Display times are shifted by this offset once per fetched payload.
    /// - A fixed offset makes rendered times reproducible but ignores DST.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn UtcOffsetSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Choose what a catalog refresh does to surviving charts.
    ///
    /// Behavior and trade-offs:
    /// - `Incremental` keeps already fetched data; charts of pairs that stay
    ///   selected are not touched.
    /// - `Rebuild` refetches everything, at the cost of three requests per chart.
    #[must_use]
    pub const fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.cfg.refresh_policy = policy;
        self
    }

    /// Number of candles requested per chart.
    #[must_use]
    pub const fn bars_limit(mut self, limit: u32) -> Self {
        self.cfg.bars_limit = limit;
        self
    }

    /// Debounce window for viewport resizes.
    #[must_use]
    pub fn resize_debounce(mut self, window: Duration) -> Self {
        self.cfg.resize_debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Log stream reconnect settings, kept in the config for channels built from it.
    #[must_use]
    pub const fn reconnect(mut self, cfg: ReconnectConfig) -> Self {
        self.cfg.reconnect = cfg;
        self
    }

    /// Build the manager. Must be called within a Tokio runtime.
    ///
    /// The persisted selection and theme are read here; no request is made
    /// until [`SessionManager::load_catalog`] or [`SessionManager::initialize`].
    ///
    /// # Errors
    /// Returns `InvalidArg` if a collaborator is missing or the configuration
    /// holds a zero limit, attempt count, delay or debounce window.
    pub fn build(self) -> Result<SessionManager, DashError> {
        validate(&self.cfg)?;
        let transport = self.transport.ok_or_else(|| {
            DashError::invalid_arg("no transport registered; add one via with_transport(...)")
        })?;
        let host = self.host.ok_or_else(|| {
            DashError::invalid_arg("no widget host registered; add one via with_widget_host(...)")
        })?;
        let store = self.store.ok_or_else(|| {
            DashError::invalid_arg("no persistence store registered; add one via with_store(...)")
        })?;

        let client = DataSyncClient::new(transport, self.clock);
        Ok(SessionManager::new(self.cfg, client, host, store))
    }
}

fn validate(cfg: &DashConfig) -> Result<(), DashError> {
    if cfg.bars_limit == 0 {
        return Err(DashError::invalid_arg("bars_limit must be positive"));
    }
    if cfg.reconnect.max_attempts == 0 {
        return Err(DashError::invalid_arg("reconnect.max_attempts must be positive"));
    }
    if cfg.reconnect.delay_ms == 0 {
        return Err(DashError::invalid_arg("reconnect.delay_ms must be positive"));
    }
    if cfg.resize_debounce_ms == 0 {
        return Err(DashError::invalid_arg("resize_debounce_ms must be positive"));
    }
    if cfg.selection_key.is_empty() || cfg.theme_key.is_empty() {
        return Err(DashError::invalid_arg("persistence keys must not be empty"));
    }
    Ok(())
}
