//! Global save record
//!
//! Canonical progress snapshot for a session: level reached, cumulative
//! play time and the wall-clock time of the last flush. The level is written
//! through on every change; play time and exit time only on `flush`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::SaveError;
use crate::platform::now_utc;
use crate::store::KeyValueStore;

/// Store key of the level id
pub const KEY_LEVEL_ID: &str = "global_level_id";
/// Store key of the accumulated play time (seconds)
pub const KEY_GAME_TIME: &str = "global_game_time";
/// Store key of the last exit time (RFC 3339)
pub const KEY_LAST_EXIT_TIME: &str = "global_last_exit_time";

/// Serialized form of the record, written under the canonical save key
/// and under named slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSaveSnapshot {
    pub level_id: i32,
    pub game_time: f32,
    #[serde(with = "time::serde::rfc3339")]
    pub last_exit_time: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct GlobalSaveRecord {
    level_id: i32,
    /// Play time already reconciled with the store. Kept wide and only
    /// narrowed to `f32` when written.
    accumulated_play_time: f64,
    last_exit_time: OffsetDateTime,
    /// Engine time of the current frame
    session_clock: f64,
    /// Value of `session_clock` at the last flush
    last_flush_clock: f64,
}

impl Default for GlobalSaveRecord {
    fn default() -> Self {
        Self {
            level_id: 0,
            accumulated_play_time: 0.0,
            last_exit_time: now_utc(),
            session_clock: 0.0,
            last_flush_clock: 0.0,
        }
    }
}

impl From<GlobalSaveSnapshot> for GlobalSaveRecord {
    fn from(snapshot: GlobalSaveSnapshot) -> Self {
        Self {
            level_id: snapshot.level_id,
            accumulated_play_time: f64::from(snapshot.game_time),
            last_exit_time: snapshot.last_exit_time,
            ..Self::default()
        }
    }
}

impl GlobalSaveRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load stored fields and start the session baseline at `clock`.
    ///
    /// Missing fields keep the record's current values. Calling this again
    /// resets the baseline, dropping unflushed play time.
    pub fn init<S: KeyValueStore + ?Sized>(&mut self, store: &S, clock: f64) {
        self.level_id = store.get_int(KEY_LEVEL_ID, self.level_id);
        if store.has_key(KEY_GAME_TIME) {
            self.accumulated_play_time = f64::from(store.get_float(KEY_GAME_TIME, 0.0));
        }

        let exit = store.get_string(KEY_LAST_EXIT_TIME, "");
        if !exit.is_empty() {
            match OffsetDateTime::parse(&exit, &Rfc3339) {
                Ok(t) => self.last_exit_time = t,
                Err(e) => log::warn!("Ignoring unreadable last exit time {exit:?}: {e}"),
            }
        }

        self.begin_session(clock);
    }

    /// Start the session baseline at `clock` without reading the store
    pub fn begin_session(&mut self, clock: f64) {
        self.session_clock = clock;
        self.last_flush_clock = clock;
    }

    /// Advance the session clock (engine time of the current frame)
    pub fn set_clock(&mut self, clock: f64) {
        self.session_clock = clock;
    }

    pub fn clock(&self) -> f64 {
        self.session_clock
    }

    /// Play time not yet reconciled. Never negative, so a clock moving
    /// backwards cannot decrease total play time.
    fn unflushed(&self) -> f64 {
        (self.session_clock - self.last_flush_clock).max(0.0)
    }

    /// Total play time in seconds, including the unflushed part
    pub fn game_time(&self) -> f64 {
        self.accumulated_play_time + self.unflushed()
    }

    pub fn last_exit_time(&self) -> OffsetDateTime {
        self.last_exit_time
    }

    pub fn level_id(&self) -> i32 {
        self.level_id
    }

    /// Set the level id and persist it immediately
    pub fn set_level_id<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        level_id: i32,
    ) -> Result<(), SaveError> {
        self.level_id = level_id;
        store.set_int(KEY_LEVEL_ID, level_id);
        store.commit()
    }

    /// Reconcile play time, stamp the exit time and write every field,
    /// without committing.
    pub fn persist_fields<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<(), SaveError> {
        self.accumulated_play_time += self.unflushed();
        self.last_flush_clock = self.session_clock;
        self.last_exit_time = now_utc();

        let exit = self
            .last_exit_time
            .format(&Rfc3339)
            .map_err(|e| SaveError::Encode(e.to_string()))?;

        store.set_int(KEY_LEVEL_ID, self.level_id);
        store.set_float(KEY_GAME_TIME, self.accumulated_play_time as f32);
        store.set_string(KEY_LAST_EXIT_TIME, &exit);
        Ok(())
    }

    /// `persist_fields` followed by a commit
    pub fn flush<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), SaveError> {
        self.persist_fields(store)?;
        store.commit()
    }

    pub fn snapshot(&self) -> GlobalSaveSnapshot {
        GlobalSaveSnapshot {
            level_id: self.level_id,
            game_time: self.accumulated_play_time as f32,
            last_exit_time: self.last_exit_time,
        }
    }

    /// Log the record's fields
    pub fn info(&self) {
        log::info!("Level ID: {}", self.level_id);
        log::info!("Game Time: {:.2}", self.game_time());
        log::info!("Last Exit Time: {}", self.last_exit_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_init_on_empty_store_uses_defaults() {
        let store = MemoryStore::new();
        let before = now_utc();
        let mut record = GlobalSaveRecord::new();
        record.init(&store, 2.0);

        assert_eq!(record.level_id(), 0);
        assert_eq!(record.game_time(), 0.0);
        assert!(record.last_exit_time() >= before);
        assert_eq!(record.clock(), 2.0);
    }

    #[test]
    fn test_flush_accumulates_elapsed_clock() {
        let mut store = MemoryStore::new();
        let mut record = GlobalSaveRecord::new();
        record.init(&store, 1.0);

        record.set_clock(11.0);
        assert_eq!(record.game_time(), 10.0);

        record.flush(&mut store).unwrap();
        assert_eq!(store.get_float(KEY_GAME_TIME, -1.0), 10.0);
        assert_eq!(store.commit_count(), 1);
        // Baseline moved: nothing unflushed remains
        assert_eq!(record.game_time(), 10.0);

        record.set_clock(13.5);
        record.flush(&mut store).unwrap();
        assert_eq!(store.get_float(KEY_GAME_TIME, -1.0), 12.5);
    }

    #[test]
    fn test_flush_writes_parseable_exit_time() {
        let mut store = MemoryStore::new();
        let mut record = GlobalSaveRecord::new();
        record.init(&store, 0.0);
        record.flush(&mut store).unwrap();

        let stored = store.get_string(KEY_LAST_EXIT_TIME, "");
        let parsed = OffsetDateTime::parse(&stored, &Rfc3339).unwrap();
        assert_eq!(parsed, record.last_exit_time());
    }

    #[test]
    fn test_level_id_writes_through() {
        let mut store = MemoryStore::new();
        let mut record = GlobalSaveRecord::new();
        record.init(&store, 0.0);

        record.set_level_id(&mut store, 7).unwrap();
        assert_eq!(store.get_int(KEY_LEVEL_ID, 0), 7);
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn test_init_reads_stored_fields() {
        let mut store = MemoryStore::new();
        store.set_int(KEY_LEVEL_ID, 3);
        store.set_float(KEY_GAME_TIME, 42.0);
        store.set_string(KEY_LAST_EXIT_TIME, "2024-05-01T10:00:00Z");

        let mut record = GlobalSaveRecord::new();
        record.init(&store, 100.0);
        assert_eq!(record.level_id(), 3);
        assert_eq!(record.game_time(), 42.0);
        assert_eq!(record.last_exit_time().year(), 2024);
    }

    #[test]
    fn test_unreadable_exit_time_is_ignored() {
        let mut store = MemoryStore::new();
        store.set_string(KEY_LAST_EXIT_TIME, "yesterday-ish");
        let mut record = GlobalSaveRecord::new();
        let before = record.last_exit_time();
        record.init(&store, 0.0);
        assert_eq!(record.last_exit_time(), before);
    }

    #[test]
    fn test_clock_moving_backwards_adds_nothing() {
        let mut store = MemoryStore::new();
        let mut record = GlobalSaveRecord::new();
        record.init(&store, 50.0);
        record.set_clock(20.0);
        assert_eq!(record.game_time(), 0.0);
        record.flush(&mut store).unwrap();
        assert_eq!(store.get_float(KEY_GAME_TIME, -1.0), 0.0);
    }

    #[test]
    fn test_snapshot_json_field_names() {
        let mut record = GlobalSaveRecord::new();
        record.level_id = 4;
        let json = serde_json::to_string(&record.snapshot()).unwrap();
        assert!(json.contains("\"levelId\":4"), "got: {json}");
        assert!(json.contains("\"gameTime\""), "got: {json}");
        assert!(json.contains("\"lastExitTime\""), "got: {json}");
    }

    #[test]
    fn test_large_clock_keeps_frame_precision() {
        let mut store = MemoryStore::new();
        let mut record = GlobalSaveRecord::new();
        let start = 262_144.0;
        record.init(&store, start);

        let mut clock = start;
        for _ in 0..600 {
            clock += 1.0 / 60.0;
            record.set_clock(clock);
        }
        record.flush(&mut store).unwrap();

        let stored = store.get_float(KEY_GAME_TIME, -1.0);
        assert!((stored - 10.0).abs() < 1e-3, "got: {stored}");
    }

    proptest! {
        #[test]
        fn prop_play_time_is_sum_of_steps(
            steps in prop::collection::vec((0.0f64..5.0, any::<bool>()), 1..40)
        ) {
            let mut store = MemoryStore::new();
            let mut record = GlobalSaveRecord::new();
            record.init(&store, 0.0);

            let mut clock = 0.0f64;
            let mut last_total = 0.0f64;
            for (dt, flush) in steps {
                clock += dt;
                record.set_clock(clock);
                if flush {
                    record.flush(&mut store).unwrap();
                }
                let total = record.game_time();
                prop_assert!(total >= last_total);
                last_total = total;
            }

            record.flush(&mut store).unwrap();
            let stored = f64::from(store.get_float(KEY_GAME_TIME, -1.0));
            prop_assert!((stored - clock).abs() < 1e-2, "stored {} vs clock {}", stored, clock);
        }
    }
}
