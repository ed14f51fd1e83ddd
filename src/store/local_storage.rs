//! Browser LocalStorage store (WASM only)
//!
//! The table is mirrored into a single LocalStorage item as JSON.

use web_sys::Storage;

use super::{KeyValueStore, PrefValue, PrefsMap};
use crate::SaveError;

pub struct LocalStorageStore {
    storage: Storage,
    item_key: String,
    prefs: PrefsMap,
}

fn js_error(context: &str, err: wasm_bindgen::JsValue) -> SaveError {
    SaveError::Storage(format!("{context}: {err:?}"))
}

impl LocalStorageStore {
    /// Open the table stored under `item_key` in `window.localStorage`
    pub fn open(item_key: &str) -> Result<Self, SaveError> {
        let storage = web_sys::window()
            .ok_or_else(|| SaveError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(|e| js_error("localStorage unavailable", e))?
            .ok_or_else(|| SaveError::Storage("localStorage disabled".to_string()))?;

        let prefs = match storage
            .get_item(item_key)
            .map_err(|e| js_error("get_item failed", e))?
        {
            Some(json) => {
                let prefs = PrefsMap::from_json(&json)?;
                log::info!("Loaded {} prefs from LocalStorage", prefs.len());
                prefs
            }
            None => {
                log::info!("No prefs in LocalStorage, starting empty");
                PrefsMap::new()
            }
        };

        Ok(Self {
            storage,
            item_key: item_key.to_string(),
            prefs,
        })
    }
}

impl KeyValueStore for LocalStorageStore {
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
        let json = self.prefs.to_json()?;
        self.storage
            .set_item(&self.item_key, &json)
            .map_err(|e| js_error("set_item failed", e))
    }
}
