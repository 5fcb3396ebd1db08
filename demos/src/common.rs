use std::sync::Arc;
use std::time::Duration;

use pairdash_core::{DashConfig, DashTransport, LogStreamConnector, PersistenceStore};
use pairdash_mock::{MemoryStore, MockLogConnector, MockTransport};
use pairdash_native::{HttpTransport, JsonFileStore, WsLogConnector};

/// True when `PAIRDASH_DEMOS_USE_MOCK` is set.
#[must_use]
pub fn use_mock() -> bool {
    std::env::var("PAIRDASH_DEMOS_USE_MOCK").is_ok()
}

/// Install a human-friendly subscriber filtered by `RUST_LOG`.
///
/// Suggested: `RUST_LOG=info,pairdash=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

/// Configuration for the demos: defaults plus `PAIRDASH_API_URL`,
/// `PAIRDASH_WS_URL` and `PAIRDASH_TOKEN` when set.
#[must_use]
pub fn config() -> DashConfig {
    let mut cfg = DashConfig::default();
    if let Ok(url) = std::env::var("PAIRDASH_API_URL") {
        cfg.api_url = url;
    }
    if let Ok(url) = std::env::var("PAIRDASH_WS_URL") {
        cfg.ws_url = url;
    }
    cfg.access_token = std::env::var("PAIRDASH_TOKEN").ok();
    cfg
}

/// Return a REST transport for the demos.
///
/// # Panics
/// Panics if `cfg.api_url` is not a valid http(s) URL.
#[must_use]
pub fn get_transport(cfg: &DashConfig) -> Arc<dyn DashTransport> {
    if use_mock() {
        println!("--- (Using Mock Transport for CI) ---");
        Arc::new(MockTransport::new())
    } else {
        Arc::new(HttpTransport::from_config(cfg).expect("invalid api_url"))
    }
}

/// Return a log stream connector for the demos.
///
/// # Panics
/// Panics if `cfg.ws_url` is not a valid ws(s) URL.
#[must_use]
pub fn get_log_connector(cfg: &DashConfig) -> Arc<dyn LogStreamConnector> {
    if use_mock() {
        Arc::new(MockLogConnector::new(Duration::from_millis(50)))
    } else {
        Arc::new(WsLogConnector::from_config(cfg).expect("invalid ws_url"))
    }
}

/// Return the key/value store for the demos.
///
/// # Panics
/// Panics if the state file exists but is not a JSON object.
#[must_use]
pub fn get_store() -> Arc<dyn PersistenceStore> {
    if use_mock() {
        Arc::new(MemoryStore::new())
    } else {
        let path = std::env::temp_dir().join("pairdash-demos.json");
        Arc::new(JsonFileStore::open(path).expect("unreadable demo state file"))
    }
}
