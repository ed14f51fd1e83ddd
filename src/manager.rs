//! Save manager
//!
//! Owns the store, the global record, the dirty flag and the autosave timer.
//! The host creates one per process, registers `on_save_loaded` listeners,
//! calls `initialise`, then drives `update(dt)` from its frame loop.
//!
//! Mutations made through the manager mark the save dirty themselves;
//! collaborators that keep their own persisted state call `mark_dirty`.

use time::OffsetDateTime;

use crate::SaveError;
use crate::autosave::AutosaveTimer;
use crate::config::SaveConfig;
use crate::objects::{self, SaveObject, SaveObjectKey, SaveObjectRegistry};
use crate::record::{
    GlobalSaveRecord, GlobalSaveSnapshot, KEY_GAME_TIME, KEY_LAST_EXIT_TIME, KEY_LEVEL_ID,
};
use crate::store::KeyValueStore;

/// Lifecycle of the manager within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// `initialise` has not run yet
    Uninitialized,
    /// A global record is loaded (or freshly created)
    Loaded,
}

type LoadedListener = Box<dyn FnOnce(&GlobalSaveRecord)>;

pub struct SaveManager<S: KeyValueStore> {
    store: S,
    config: SaveConfig,
    record: Option<GlobalSaveRecord>,
    dirty: bool,
    /// Engine time since session start
    clock: f64,
    autosave: AutosaveTimer,
    registry: SaveObjectRegistry,
    listeners: Vec<LoadedListener>,
    /// Set once `on_save_loaded` listeners have been notified
    load_notified: bool,
}

fn encode_snapshot(snapshot: &GlobalSaveSnapshot) -> Result<String, SaveError> {
    serde_json::to_string(snapshot).map_err(|e| SaveError::Encode(e.to_string()))
}

impl<S: KeyValueStore> SaveManager<S> {
    pub fn new(store: S, config: SaveConfig) -> Self {
        let autosave = AutosaveTimer::new(config.autosave_interval);
        Self {
            store,
            config,
            record: None,
            dirty: false,
            clock: 0.0,
            autosave,
            registry: SaveObjectRegistry::new(),
            listeners: Vec::new(),
            load_notified: false,
        }
    }

    /// Load the existing save (or start a clear one) and optionally enable
    /// autosave. `override_clock` replaces the current session clock.
    pub fn initialise(
        &mut self,
        autosave_enabled: bool,
        clear_existing: bool,
        override_clock: Option<f64>,
    ) {
        if let Some(clock) = override_clock.filter(|c| c.is_finite()) {
            self.clock = clock;
        }

        if clear_existing {
            self.create_clear();
        } else {
            self.load_existing();
        }

        if autosave_enabled {
            self.autosave.start();
        }
    }

    fn create_clear(&mut self) {
        let mut record = GlobalSaveRecord::new();
        record.begin_session(self.clock);
        self.record = Some(record);
        self.dirty = false;

        log::info!("[save] Clear save created");
    }

    fn load_existing(&mut self) {
        let key = self.config.save_key.as_str();
        let mut corrupt = false;

        let mut record = if self.store.has_key(key) {
            let json = self.store.get_string(key, "");
            match serde_json::from_str::<GlobalSaveSnapshot>(&json) {
                Ok(snapshot) => GlobalSaveRecord::from(snapshot),
                Err(e) => {
                    log::warn!("[save] Corrupt save under '{key}', starting fresh: {e}");
                    corrupt = true;
                    GlobalSaveRecord::new()
                }
            }
        } else {
            GlobalSaveRecord::new()
        };

        record.init(&self.store, self.clock);
        self.dirty = corrupt;

        log::info!("[save] Save loaded (level {})", record.level_id());
        let record = self.record.insert(record);

        self.load_notified = true;
        for listener in self.listeners.drain(..) {
            listener(record);
        }
    }

    /// Run `listener` once the existing save has been loaded. If that
    /// already happened it runs immediately. Clear saves do not notify.
    pub fn on_save_loaded<F>(&mut self, listener: F)
    where
        F: FnOnce(&GlobalSaveRecord) + 'static,
    {
        match &self.record {
            Some(record) if self.load_notified => listener(record),
            _ => self.listeners.push(Box::new(listener)),
        }
    }

    /// Advance the session clock by `dt` seconds and run autosave.
    /// Returns whether an autosave wrote the store. Non-finite `dt` is
    /// ignored.
    pub fn update(&mut self, dt: f64) -> Result<bool, SaveError> {
        if !dt.is_finite() {
            log::warn!("[save] Ignoring non-finite frame time {dt}");
            return Ok(false);
        }
        self.clock += dt;
        if let Some(record) = self.record.as_mut() {
            record.set_clock(self.clock);
        }

        if self.autosave.tick(dt) {
            return self.save();
        }
        Ok(false)
    }

    /// Save if anything changed since the last save. Returns whether the
    /// store was written.
    pub fn save(&mut self) -> Result<bool, SaveError> {
        if !self.dirty {
            return Ok(false);
        }
        self.write_canonical()?;
        log::info!("[save] Game saved");
        Ok(true)
    }

    /// Save unconditionally
    pub fn force_save(&mut self) -> Result<(), SaveError> {
        self.write_canonical()?;
        log::info!("[save] Game force-saved");
        Ok(())
    }

    fn write_canonical(&mut self) -> Result<(), SaveError> {
        let record = self.record.as_mut().ok_or(SaveError::NotLoaded)?;
        record.persist_fields(&mut self.store)?;

        let json = encode_snapshot(&record.snapshot())?;
        self.store.set_string(&self.config.save_key, &json);
        self.store.commit()?;

        self.dirty = false;
        Ok(())
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Remove the canonical save and the global record's fields.
    ///
    /// Save objects and named slots are left in place.
    pub fn delete_save(&mut self) -> Result<(), SaveError> {
        self.store.delete_key(&self.config.save_key);
        self.store.delete_key(KEY_LEVEL_ID);
        self.store.delete_key(KEY_GAME_TIME);
        self.store.delete_key(KEY_LAST_EXIT_TIME);
        self.store.commit()?;

        log::info!("[save] Save deleted");
        Ok(())
    }

    /// Flush the global record and store a copy of it under `slot_key`
    pub fn save_to_named_slot(&mut self, slot_key: &str) -> Result<(), SaveError> {
        let Some(record) = self.record.as_mut() else {
            log::warn!("[save] Can't save slot '{slot_key}', save is not loaded");
            return Err(SaveError::NotLoaded);
        };
        record.persist_fields(&mut self.store)?;

        let json = encode_snapshot(&record.snapshot())?;
        self.store.set_string(slot_key, &json);
        self.store.commit()?;

        log::info!("[save] Slot saved under '{slot_key}'");
        Ok(())
    }

    /// Snapshot stored under `slot_key`, if any
    pub fn read_named_slot(
        &self,
        slot_key: &str,
    ) -> Result<Option<GlobalSaveSnapshot>, SaveError> {
        if !self.store.has_key(slot_key) {
            return Ok(None);
        }
        let json = self.store.get_string(slot_key, "");
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Flush a record other than the managed one into the store
    pub fn save_custom(&mut self, record: &mut GlobalSaveRecord) -> Result<(), SaveError> {
        record.flush(&mut self.store)?;
        log::info!("[save] Custom save flushed");
        Ok(())
    }

    /// Bind `key` to `T`; a duplicate is logged and the first kept
    pub fn register_save_object<T: SaveObject>(&mut self, key: impl Into<SaveObjectKey>) -> bool {
        self.registry.register::<T>(key.into())
    }

    /// Independent copy of the object at `key` (default persisted on miss)
    pub fn get_save_object<T: SaveObject>(
        &mut self,
        key: impl Into<SaveObjectKey>,
    ) -> Result<T, SaveError> {
        let key = key.into();
        self.registry.resolve::<T>(&key)?;
        objects::get_save_object(&mut self.store, &key)
    }

    /// Persist `value` at `key`
    pub fn save_object<T: SaveObject>(
        &mut self,
        value: &T,
        key: impl Into<SaveObjectKey>,
    ) -> Result<(), SaveError> {
        let key = key.into();
        self.registry.resolve::<T>(&key)?;
        objects::save_object(&mut self.store, value, &key)?;
        self.mark_dirty();
        Ok(())
    }

    pub fn level_id(&self) -> Option<i32> {
        self.record.as_ref().map(GlobalSaveRecord::level_id)
    }

    /// Set the level id; written to the store immediately
    pub fn set_level_id(&mut self, level_id: i32) -> Result<(), SaveError> {
        let record = self.record.as_mut().ok_or(SaveError::NotLoaded)?;
        record.set_level_id(&mut self.store, level_id)?;
        self.mark_dirty();
        Ok(())
    }

    pub fn game_time(&self) -> Option<f64> {
        self.record.as_ref().map(GlobalSaveRecord::game_time)
    }

    pub fn last_exit_time(&self) -> Option<OffsetDateTime> {
        self.record.as_ref().map(GlobalSaveRecord::last_exit_time)
    }

    pub fn global_save(&self) -> Option<&GlobalSaveRecord> {
        self.record.as_ref()
    }

    pub fn is_save_loaded(&self) -> bool {
        self.record.is_some()
    }

    pub fn state(&self) -> SaveState {
        if self.record.is_some() {
            SaveState::Loaded
        } else {
            SaveState::Uninitialized
        }
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    pub fn autosave(&self) -> &AutosaveTimer {
        &self.autosave
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, e.g. to hand it to the next session
    pub fn into_store(self) -> S {
        self.store
    }
}
