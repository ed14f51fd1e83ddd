//! Save objects
//!
//! Secondary records stored outside the global record, each under its own
//! `SAVE_OBJ_name:{name}` or `SAVE_OBJ_id:{id}` entry, so a name and an id
//! never share storage. Callers always receive an independent copy.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::SaveError;
use crate::store::KeyValueStore;

/// Prefix of every save-object store key
pub const SAVE_OBJECT_PREFIX: &str = "SAVE_OBJ_";

/// A persisted value with a default used when nothing is stored yet
pub trait SaveObject: Serialize + DeserializeOwned + Default {}

impl<T> SaveObject for T where T: Serialize + DeserializeOwned + Default {}

/// Address of a save object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SaveObjectKey {
    Named(String),
    Id(i32),
}

impl SaveObjectKey {
    /// Store key this object is persisted under
    pub fn store_key(&self) -> String {
        format!("{SAVE_OBJECT_PREFIX}{self}")
    }
}

impl fmt::Display for SaveObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveObjectKey::Named(name) => write!(f, "name:{name}"),
            SaveObjectKey::Id(id) => write!(f, "id:{id}"),
        }
    }
}

impl From<&str> for SaveObjectKey {
    fn from(name: &str) -> Self {
        SaveObjectKey::Named(name.to_string())
    }
}

impl From<String> for SaveObjectKey {
    fn from(name: String) -> Self {
        SaveObjectKey::Named(name)
    }
}

impl From<i32> for SaveObjectKey {
    fn from(id: i32) -> Self {
        SaveObjectKey::Id(id)
    }
}

/// Binds each key to the Rust type that owns it
#[derive(Debug, Default)]
pub struct SaveObjectRegistry {
    types: HashMap<SaveObjectKey, &'static str>,
}

impl SaveObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` for `T`. A second registration of the same key is
    /// logged and ignored; returns whether this call registered it.
    pub fn register<T: SaveObject>(&mut self, key: SaveObjectKey) -> bool {
        if let Some(existing) = self.types.get(&key) {
            log::error!(
                "Save object key '{key}' registered twice (kept {existing}, ignored {})",
                type_name::<T>()
            );
            return false;
        }
        self.types.insert(key, type_name::<T>());
        true
    }

    /// Check `key` against `T`, registering it on first use
    pub fn resolve<T: SaveObject>(&mut self, key: &SaveObjectKey) -> Result<(), SaveError> {
        let requested = type_name::<T>();
        match self.types.get(key) {
            Some(&registered) if registered != requested => Err(SaveError::KeyConflict {
                key: key.to_string(),
                registered,
                requested,
            }),
            Some(_) => Ok(()),
            None => {
                self.types.insert(key.clone(), requested);
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, key: &SaveObjectKey) -> bool {
        self.types.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Read the object at `key`.
///
/// On a miss the default is persisted and committed before returning it.
/// A corrupt payload is logged and the default returned, leaving the stored
/// payload untouched.
pub fn get_save_object<T, S>(store: &mut S, key: &SaveObjectKey) -> Result<T, SaveError>
where
    T: SaveObject,
    S: KeyValueStore + ?Sized,
{
    let store_key = key.store_key();
    if store.has_key(&store_key) {
        let json = store.get_string(&store_key, "");
        return match serde_json::from_str(&json) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("Corrupt save object '{store_key}', using default: {e}");
                Ok(T::default())
            }
        };
    }

    let value = T::default();
    save_object(store, &value, key)?;
    Ok(value)
}

/// Serialize `value` under `key` and commit
pub fn save_object<T, S>(store: &mut S, value: &T, key: &SaveObjectKey) -> Result<(), SaveError>
where
    T: SaveObject,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| SaveError::Encode(e.to_string()))?;
    store.set_string(&key.store_key(), &json);
    store.commit()
}
