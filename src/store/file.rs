//! JSON file store (native)
//!
//! The whole table is written on `commit()` using write-rename: data goes
//! to `{path}.tmp`, is synced, then renamed over the final path, so a crash
//! mid-write leaves the previous file intact.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{KeyValueStore, PrefValue, PrefsMap};
use crate::SaveError;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    prefs: PrefsMap,
}

impl FileStore {
    /// Open the store at `path`. A missing file yields an empty store;
    /// an unreadable or corrupt file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let path = path.into();
        let prefs = match fs::read_to_string(&path) {
            Ok(json) => {
                let prefs = PrefsMap::from_json(&json)?;
                log::info!("Loaded {} prefs from {}", prefs.len(), path.display());
                prefs
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No prefs file at {}, starting empty", path.display());
                PrefsMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, prefs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)
}

impl KeyValueStore for FileStore {
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
        atomic_write(&self.path, json.as_bytes())?;
        Ok(())
    }
}
