//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, settings, catalog,
//! clock readings and inputs, a run plays out identically:
//! - Seeded RNG only
//! - Time comes from an injected [`Clock`]
//! - Stable iteration order (spawn order)
//! - No rendering or terminal dependencies

pub mod clock;
pub mod input;
pub mod ramp;
pub mod state;
pub mod stats;
pub mod tick;
pub mod word;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use input::SubmitOutcome;
pub use ramp::{DifficultyRamp, RampParams};
pub use state::{GameEngine, GamePhase};
pub use stats::GameStats;
pub use word::ActiveWord;
