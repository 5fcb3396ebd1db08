use serde::Serialize;
use serde::de::DeserializeOwned;

use pairdash_types::DashError;

/// String key/value store holding the persisted selection and theme.
pub trait PersistenceStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns `DashError::Persistence` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, DashError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns `DashError::Persistence` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), DashError>;
}

/// Read and decode a JSON value stored under `key`.
///
/// # Errors
/// Propagates store failures and returns `DashError::Decode` for malformed JSON.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn PersistenceStore,
    key: &str,
) -> Result<Option<T>, DashError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
/// Propagates store failures and returns `DashError::Decode` if encoding fails.
pub fn store_json<T: Serialize + ?Sized>(
    store: &dyn PersistenceStore,
    key: &str,
    value: &T,
) -> Result<(), DashError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
