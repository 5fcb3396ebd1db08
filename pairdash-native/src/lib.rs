//! pairdash-native
//!
//! Production collaborators for the pairdash core:
//! - [`HttpTransport`]: `DashTransport` over `reqwest`, with optional bearer auth.
//! - [`WsLogConnector`]: `LogStreamConnector` over `tokio-tungstenite`.
//! - [`JsonFileStore`]: `PersistenceStore` kept in one JSON file.
//!
//! All three can be built straight from a `DashConfig`:
//! ```rust,ignore
//! let cfg = DashConfig::default();
//! let transport = HttpTransport::from_config(&cfg)?;
//! let logs = WsLogConnector::from_config(&cfg)?;
//! let store = JsonFileStore::open("pairdash.json")?;
//! ```
#![warn(missing_docs)]

mod file_store;
mod http;
mod ws;

pub use file_store::JsonFileStore;
pub use http::HttpTransport;
pub use ws::WsLogConnector;
