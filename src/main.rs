//! Savekit demo entry point
//!
//! Runs a short headless session against the platform store: loads the
//! save, plays a few simulated levels on a fixed timestep with autosave
//! enabled, then force-saves on exit.

use serde::{Deserialize, Serialize};

use savekit::{KeyValueStore, SaveConfig, SaveError, SaveManager};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Fixed frame step of the simulated session (seconds)
const FRAME_DT: f64 = 0.5;
/// Simulated frames per level
const FRAMES_PER_LEVEL: u32 = 50;
/// Levels played per demo run
const LEVELS_PER_RUN: i32 = 3;

/// Per-player run statistics, stored as a save object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RunStats {
    runs: u32,
    best_level: i32,
}

const RUN_STATS_KEY: &str = "run_stats";

fn run_session<S: KeyValueStore>(manager: &mut SaveManager<S>) -> Result<(), SaveError> {
    manager.on_save_loaded(|record| {
        log::info!(
            "Save available: level {}, {:.1}s played",
            record.level_id(),
            record.game_time()
        );
    });
    manager.initialise(true, false, None);
    manager.register_save_object::<RunStats>(RUN_STATS_KEY);

    let mut stats: RunStats = manager.get_save_object(RUN_STATS_KEY)?;
    stats.runs += 1;

    let start_level = manager.level_id().unwrap_or(0);
    for level in start_level + 1..=start_level + LEVELS_PER_RUN {
        for _ in 0..FRAMES_PER_LEVEL {
            if manager.update(FRAME_DT)? {
                log::info!("Autosaved at {:.1}s", manager.clock());
            }
        }
        manager.set_level_id(level)?;
        stats.best_level = stats.best_level.max(level);
    }

    manager.save_object(&stats, RUN_STATS_KEY)?;
    manager.force_save()?;

    if let Some(record) = manager.global_save() {
        record.info();
    }
    log::info!("Runs so far: {}, best level: {}", stats.runs, stats.best_level);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }

    log::info!("Savekit starting...");
    let config = SaveConfig::default();
    let store = match savekit::LocalStorageStore::open(&config.local_storage_key) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Storage unavailable: {e}");
            return;
        }
    };

    let mut manager = SaveManager::new(store, config);
    if let Err(e) = run_session(&mut manager) {
        log::error!("Session failed: {e}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> Result<SaveConfig, SaveError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            log::info!("Using config {path}");
            SaveConfig::from_json(&json)
        }
        None => Ok(SaveConfig::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_native() -> Result<(), SaveError> {
    let config = load_config()?;
    let path = config
        .store_path
        .clone()
        .unwrap_or_else(|| "savekit_prefs.json".into());

    let store = savekit::FileStore::open(path)?;
    let mut manager = SaveManager::new(store, config);
    run_session(&mut manager)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Savekit (native) starting...");

    if let Err(e) = run_native() {
        log::error!("Session failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
