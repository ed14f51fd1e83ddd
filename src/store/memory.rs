//! Volatile in-memory store

use super::{KeyValueStore, PrefValue, PrefsMap};
use crate::SaveError;

/// Store with no backing medium.
///
/// Committing only bumps a counter, which lets callers observe how many
/// durable writes an operation performed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    prefs: PrefsMap,
    commits: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing table (e.g. a fixture or a corrupted payload)
    pub fn with_prefs(prefs: PrefsMap) -> Self {
        Self { prefs, commits: 0 }
    }

    /// Number of successful `commit` calls so far
    pub fn commit_count(&self) -> u32 {
        self.commits
    }

    pub fn prefs(&self) -> &PrefsMap {
        &self.prefs
    }
}

impl KeyValueStore for MemoryStore {
    fn has_key(&self, key: &str) -> bool {
        self.prefs.has_key(key)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.prefs.get_string(key, default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.prefs.get_int(key, default)
    }

    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.prefs.get_float(key, default)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.prefs.set(key, PrefValue::String(value.to_string()));
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.prefs.set(key, PrefValue::Int(value));
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.prefs.set(key, PrefValue::Float(value));
    }

    fn delete_key(&mut self, key: &str) {
        self.prefs.remove(key);
    }

    fn commit(&mut self) -> Result<(), SaveError> {
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let mut store = MemoryStore::new();
        store.set_int("level", 4);
        store.set_string("name", "ada");
        assert!(store.has_key("level"));
        assert_eq!(store.get_int("level", 0), 4);
        assert_eq!(store.get_string("name", ""), "ada");

        store.delete_key("level");
        assert!(!store.has_key("level"));
        assert_eq!(store.get_int("level", 9), 9);
    }

    #[test]
    fn test_commit_is_counted() {
        let mut store = MemoryStore::new();
        assert_eq!(store.commit_count(), 0);
        store.commit().unwrap();
        store.commit().unwrap();
        assert_eq!(store.commit_count(), 2);
    }
}
