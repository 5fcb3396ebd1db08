use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use pairdash_core::{DashError, PersistenceStore};
use serde_json::{Map, Value};

/// Key/value store kept in a single JSON object file.
///
/// The file is read once on open and rewritten in full on every `set`,
/// through a sibling temporary file that replaces it. Values are stored as
/// JSON strings.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    /// Returns `Persistence` if the file exists but cannot be read, and
    /// `Decode` if it does not hold a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DashError> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => Map::new(),
            Ok(raw) => match serde_json::from_slice::<Value>(&raw)? {
                Value::Object(map) => map,
                other => {
                    return Err(DashError::decode(format!(
                        "{}: expected a JSON object, found {}",
                        path.display(),
                        kind(&other)
                    )));
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(persistence(&path, &e)),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &Map<String, Value>) -> Result<(), DashError> {
        let raw = serde_json::to_vec_pretty(entries)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| persistence(dir, &e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, raw).map_err(|e| persistence(&tmp, &e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| persistence(&self.path, &e))
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DashError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.insert(key.to_string(), Value::String(value.to_string()));
        if let Err(e) = self.flush(&entries) {
            match previous {
                Some(v) => entries.insert(key.to_string(), v),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

fn persistence(path: &Path, e: &std::io::Error) -> DashError {
    DashError::Persistence(format!("{}: {e}", path.display()))
}

const fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
