//! Difficulty ramp
//!
//! Pure function of in-game seconds. Every value decreases linearly and
//! stops at a floor, so the game gets harder without jumps.

use crate::consts::SPAWN_RANGE_GAP;
use crate::settings::Settings;

/// Parameters in force at one moment of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampParams {
    /// Seconds a word rests between teleports
    pub teleport_interval: f32,
    /// Lower bound of the next-spawn delay
    pub spawn_min: f32,
    /// Upper bound of the next-spawn delay
    pub spawn_max: f32,
}

/// Ramp coefficients extracted from [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyRamp {
    base_teleport: f32,
    min_teleport: f32,
    teleport_decrease: f32,
    spawn_min: f32,
    spawn_max: f32,
    spawn_decrease: f32,
    spawn_floor: f32,
}

impl DifficultyRamp {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_teleport: settings.base_teleport_interval,
            min_teleport: settings.min_teleport_interval,
            teleport_decrease: settings.teleport_interval_decrease,
            spawn_min: settings.spawn_interval_min,
            spawn_max: settings.spawn_interval_max,
            spawn_decrease: settings.spawn_interval_decrease,
            spawn_floor: settings.min_spawn_interval,
        }
    }

    pub fn teleport_interval(&self, elapsed: f32) -> f32 {
        (self.base_teleport - self.teleport_decrease * elapsed.max(0.0)).max(self.min_teleport)
    }

    pub fn spawn_interval_min(&self, elapsed: f32) -> f32 {
        (self.spawn_min - self.spawn_decrease * elapsed.max(0.0)).max(self.spawn_floor)
    }

    /// Upper spawn bound; always at least [`SPAWN_RANGE_GAP`] above the lower
    /// bound so the range never collapses or inverts
    pub fn spawn_interval_max(&self, elapsed: f32) -> f32 {
        let raw = self.spawn_max - self.spawn_decrease * elapsed.max(0.0);
        let floor = (self.spawn_floor + SPAWN_RANGE_GAP).max(self.spawn_interval_min(elapsed) + SPAWN_RANGE_GAP);
        raw.max(floor)
    }

    /// All parameters at `elapsed` in-game seconds
    pub fn at(&self, elapsed: f32) -> RampParams {
        RampParams {
            teleport_interval: self.teleport_interval(elapsed),
            spawn_min: self.spawn_interval_min(elapsed),
            spawn_max: self.spawn_interval_max(elapsed),
        }
    }
}
