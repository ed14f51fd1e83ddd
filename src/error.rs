//! Error types for save/load operations

use std::fmt;

/// Errors that can occur while reading, writing or committing saves.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error from a file-backed store (permission denied, disk full, etc.)
    Io(std::io::Error),
    /// A value could not be serialized.
    Encode(String),
    /// Persisted data could not be deserialized (corrupt or invalid payload).
    Decode(String),
    /// The backing medium rejected the operation (e.g. LocalStorage quota).
    Storage(String),
    /// A save-object key is already bound to a different type.
    KeyConflict {
        key: String,
        registered: &'static str,
        requested: &'static str,
    },
    /// The manager was used before `initialise` loaded a record.
    NotLoaded,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::Storage(msg) => write!(f, "Storage error: {msg}"),
            SaveError::KeyConflict {
                key,
                registered,
                requested,
            } => write!(
                f,
                "Save object key '{key}' is registered for {registered}, not {requested}"
            ),
            SaveError::NotLoaded => write!(f, "Save is not loaded yet"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}
