//! Persistent string-keyed preference stores
//!
//! All stores keep their table in memory; `commit()` makes it durable.
//! - `MemoryStore`: volatile, for tests and headless tools
//! - `FileStore`: JSON file written atomically (native only)
//! - `LocalStorageStore`: one browser LocalStorage item (WASM only)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SaveError;

pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;

#[cfg(target_arch = "wasm32")]
pub mod local_storage;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Contract of a persistent preference store.
///
/// Reads and writes are synchronous and only touch the in-memory table.
/// `commit` flushes the table to the backing medium.
pub trait KeyValueStore {
    fn has_key(&self, key: &str) -> bool;

    /// String stored at `key`, or `default` if missing or not a string
    fn get_string(&self, key: &str, default: &str) -> String;

    /// Integer stored at `key`, or `default` if missing or not an integer
    fn get_int(&self, key: &str, default: i32) -> i32;

    /// Float stored at `key`, or `default` if missing or not a float
    fn get_float(&self, key: &str, default: f32) -> f32;

    fn set_string(&mut self, key: &str, value: &str);
    fn set_int(&mut self, key: &str, value: i32);
    fn set_float(&mut self, key: &str, value: f32);
    fn delete_key(&mut self, key: &str);

    /// Durably flush every pending write to the backing medium
    fn commit(&mut self) -> Result<(), SaveError>;
}

/// A single stored preference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrefValue {
    Int(i32),
    Float(f32),
    String(String),
}

/// Ordered key/value table shared by every store implementation.
///
/// Serializes as a JSON object so the whole table can be written as one blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefsMap {
    entries: BTreeMap<String, PrefValue>,
}

impl PrefsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table previously produced by `to_json`
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string(self).map_err(|e| SaveError::Encode(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.entries.get(key) {
            Some(PrefValue::String(s)) => s.clone(),
            _ => default.to_string(),
        }
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.entries.get(key) {
            Some(PrefValue::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        match self.entries.get(key) {
            Some(PrefValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn set(&mut self, key: &str, value: PrefValue) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getters_return_default_on_missing_key() {
        let map = PrefsMap::new();
        assert_eq!(map.get_int("missing", 7), 7);
        assert_eq!(map.get_float("missing", 1.5), 1.5);
        assert_eq!(map.get_string("missing", "x"), "x");
    }

    #[test]
    fn test_getters_return_default_on_kind_mismatch() {
        let mut map = PrefsMap::new();
        assert!(map.is_empty());
        map.set("level", PrefValue::Int(3));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_float("level", -1.0), -1.0);
        assert_eq!(map.get_string("level", ""), "");
        assert_eq!(map.get_int("level", 0), 3);
    }

    #[test]
    fn test_json_keeps_value_kinds() {
        let mut map = PrefsMap::new();
        map.set("a", PrefValue::Int(5));
        map.set("b", PrefValue::Float(5.0));
        map.set("c", PrefValue::String("five".into()));

        let parsed = PrefsMap::from_json(&map.to_json().unwrap()).unwrap();
        assert_eq!(parsed, map);
        assert_eq!(parsed.get_int("a", 0), 5);
        assert_eq!(parsed.get_float("b", 0.0), 5.0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            PrefsMap::from_json("[1, 2"),
            Err(SaveError::Decode(_))
        ));
    }
}
