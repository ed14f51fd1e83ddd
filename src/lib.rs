//! Savekit - key-value game save persistence
//!
//! Core modules:
//! - `store`: Preference store contract and memory/file/LocalStorage backends
//! - `record`: Global save record (level, play time, last exit time)
//! - `objects`: Typed, independently keyed save objects
//! - `manager`: Save manager with dirty-flag batching and autosave
//! - `autosave`: Cooperative periodic timer
//! - `config`: Serializable save configuration
//! - `platform`: Browser/native platform abstraction

pub mod autosave;
pub mod config;
pub mod error;
pub mod manager;
pub mod objects;
pub mod platform;
pub mod record;
pub mod store;

pub use autosave::AutosaveTimer;
pub use config::SaveConfig;
pub use error::SaveError;
pub use manager::{SaveManager, SaveState};
pub use objects::{SaveObject, SaveObjectKey, SaveObjectRegistry};
pub use record::{GlobalSaveRecord, GlobalSaveSnapshot};
pub use store::{KeyValueStore, MemoryStore, PrefValue, PrefsMap};

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;

#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
