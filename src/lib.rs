//! Blink Type - terminal typing game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (word motion, spawning, matching, health)
//! - `words`: Vocabulary loading and random draw
//! - `records`: Append-only run history with best/trend queries
//! - `settings`: Tunable gameplay parameters
//! - `driver`: Fixed-cadence tick thread and single-writer command queue

pub mod driver;
pub mod records;
pub mod settings;
pub mod sim;
pub mod words;

pub use records::{GameRecord, RecordStore};
pub use settings::{GameMode, Settings};
pub use sim::GameEngine;
pub use words::{Word, WordCatalog};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Tick driver cadence (~60 Hz)
    pub const TICK_PERIOD: Duration = Duration::from_millis(16);

    /// Smallest play area the engine accepts
    pub const MIN_AREA_WIDTH: u32 = 10;
    pub const MIN_AREA_HEIGHT: u32 = 1;

    /// Minimum gap between the spawn-interval bounds (seconds)
    pub const SPAWN_RANGE_GAP: f32 = 0.2;

    /// Default file locations, relative to the working directory
    pub const WORDS_FILE: &str = "data/words.txt";
    pub const RECORDS_FILE: &str = "data/records.csv";
    pub const CONFIG_FILE: &str = "data/config.json";
}
