use pairdash_core::{DashError, Pair, Theme};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::chart::Lifecycle;
use super::manager::{SelectionChange, SessionManager};

/// Commands accepted by the dashboard task.
#[derive(Debug)]
#[non_exhaustive]
pub enum DashboardCommand {
    /// Toggle one pair; the outcome is reported on the optional reply channel.
    ToggleSelection(Pair, Option<oneshot::Sender<SelectionChange>>),
    /// Refetch the catalog and apply it.
    RefreshCatalog(Option<oneshot::Sender<Result<(), DashError>>>),
    /// Persist and apply a theme.
    SetTheme(Theme),
    /// A viewport resize notification, debounced before fan-out.
    ViewportResized,
    /// Report the current state.
    Snapshot(oneshot::Sender<DashboardSnapshot>),
    /// Dispose every chart and stop the task.
    Shutdown,
}

/// Point-in-time view of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    /// Whether a catalog has been applied.
    pub catalog_loaded: bool,
    /// Selected pairs in insertion order.
    pub selection: Vec<Pair>,
    /// Pairs with a chart, in container order.
    pub display_order: Vec<Pair>,
    /// Lifecycle of each chart, in container order.
    pub sessions: Vec<(Pair, Lifecycle)>,
    /// Current theme.
    pub theme: Theme,
}

impl DashboardSnapshot {
    fn capture(m: &SessionManager) -> Self {
        Self {
            catalog_loaded: m.is_catalog_loaded(),
            selection: m.selection().pairs().to_vec(),
            display_order: m.display_order(),
            sessions: m.lifecycles(),
            theme: m.theme(),
        }
    }
}

/// Client side of a running dashboard task.
#[derive(Debug)]
pub struct DashboardHandle {
    tx: mpsc::Sender<DashboardCommand>,
    join: Option<JoinHandle<()>>,
}

impl DashboardHandle {
    /// Toggle `pair` and wait for the outcome.
    ///
    /// # Errors
    /// Returns `DashError::Closed` if the dashboard task has stopped.
    pub async fn toggle(&self, pair: Pair) -> Result<SelectionChange, DashError> {
        let (tx, rx) = oneshot::channel();
        self.send(DashboardCommand::ToggleSelection(pair, Some(tx)))
            .await?;
        rx.await.map_err(|_| DashError::Closed)
    }

    /// Refetch and apply the catalog, waiting for the result.
    ///
    /// # Errors
    /// Returns the catalog fetch error, or `DashError::Closed` if the task has stopped.
    pub async fn refresh_catalog(&self) -> Result<(), DashError> {
        let (tx, rx) = oneshot::channel();
        self.send(DashboardCommand::RefreshCatalog(Some(tx))).await?;
        rx.await.map_err(|_| DashError::Closed)?
    }

    /// Switch theme.
    ///
    /// # Errors
    /// Returns `DashError::Closed` if the dashboard task has stopped.
    pub async fn set_theme(&self, theme: Theme) -> Result<(), DashError> {
        self.send(DashboardCommand::SetTheme(theme)).await
    }

    /// Report a viewport resize.
    ///
    /// # Errors
    /// Returns `DashError::Closed` if the dashboard task has stopped.
    pub async fn viewport_resized(&self) -> Result<(), DashError> {
        self.send(DashboardCommand::ViewportResized).await
    }

    /// Capture the current state.
    ///
    /// # Errors
    /// Returns `DashError::Closed` if the dashboard task has stopped.
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, DashError> {
        let (tx, rx) = oneshot::channel();
        self.send(DashboardCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| DashError::Closed)
    }

    /// Stop the task after disposing every chart, and wait for it.
    pub async fn shutdown(mut self) {
        let _ = self.tx.send(DashboardCommand::Shutdown).await;
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }

    async fn send(&self, cmd: DashboardCommand) -> Result<(), DashError> {
        self.tx.send(cmd).await.map_err(|_| DashError::Closed)
    }
}

enum Wake {
    Command(Option<DashboardCommand>),
    Feeds,
    Resize(bool),
}

/// Run `manager` on its own task and return a handle to drive it.
///
/// The task is the single owner of the manager: it applies feed results as
/// soon as they are signalled, fans out debounced resizes, and tears every
/// chart down on `Shutdown` or once every handle is dropped.
#[must_use]
pub fn spawn_dashboard(mut manager: SessionManager) -> DashboardHandle {
    let (tx, mut rx) = mpsc::channel::<DashboardCommand>(64);
    let wake = manager.feed_notifier();

    let join = tokio::spawn(async move {
        let mut resize_alive = true;
        loop {
            let event = tokio::select! {
                cmd = rx.recv() => Wake::Command(cmd),
                () = wake.notified() => Wake::Feeds,
                fired = manager.next_resize(), if resize_alive => Wake::Resize(fired),
            };

            match event {
                Wake::Feeds => {
                    manager.pump();
                }
                Wake::Resize(true) => {
                    manager.fan_out_resize();
                }
                Wake::Resize(false) => resize_alive = false,
                Wake::Command(None | Some(DashboardCommand::Shutdown)) => {
                    manager.teardown();
                    #[cfg(feature = "tracing")]
                    tracing::debug!("dashboard task stopped");
                    return;
                }
                Wake::Command(Some(cmd)) => handle_command(&mut manager, cmd).await,
            }
        }
    });

    DashboardHandle {
        tx,
        join: Some(join),
    }
}

async fn handle_command(manager: &mut SessionManager, cmd: DashboardCommand) {
    match cmd {
        DashboardCommand::ToggleSelection(pair, reply) => {
            let change = manager.toggle_selection(&pair);
            if let Some(reply) = reply {
                let _ = reply.send(change);
            }
        }
        DashboardCommand::RefreshCatalog(reply) => {
            let res = manager.load_catalog().await;
            if let Some(reply) = reply {
                let _ = reply.send(res);
            }
        }
        DashboardCommand::SetTheme(theme) => manager.set_theme(theme),
        DashboardCommand::ViewportResized => manager.on_viewport_resized(),
        DashboardCommand::Snapshot(reply) => {
            manager.pump();
            let _ = reply.send(DashboardSnapshot::capture(manager));
        }
        DashboardCommand::Shutdown => manager.teardown(),
    }
}
