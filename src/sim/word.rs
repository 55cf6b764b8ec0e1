//! On-screen word entity
//!
//! Words do not slide. A word sits still until its teleport timer runs out,
//! then jumps right by a fixed fraction of the play-area width. The typing
//! window is therefore independent of the frame rate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::{ColorThresholds, WordColor};
use crate::words::Word;

/// A word currently in the play area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveWord {
    pub id: u32,
    pub word: Word,
    /// Column (x, only ever increases) and row (y) in play-area cells
    pub pos: Vec2,
    pub is_active: bool,
    /// `x / area_width` clamped to `[0, 1]`
    pub life_progress: f32,
    /// In-game seconds of the last teleport (spawn time before the first)
    pub last_teleport_time: f32,
    pub teleport_interval: f32,
    pub teleport_count: u32,
}

impl ActiveWord {
    /// New word at the left edge on row `y`
    pub fn new(id: u32, word: Word, y: f32, now: f32, teleport_interval: f32) -> Self {
        Self {
            id,
            word,
            pos: Vec2::new(0.0, y),
            is_active: true,
            life_progress: 0.0,
            last_teleport_time: now,
            teleport_interval,
            teleport_count: 0,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    /// Advance one tick. Teleports when the timer has run out, then
    /// re-derives progress and deactivates once past the right edge.
    ///
    /// Returns true if the word teleported.
    pub fn advance(&mut self, now: f32, teleport_interval: f32, area_width: f32, step_ratio: f32) -> bool {
        if !self.is_active {
            return false;
        }

        self.teleport_interval = teleport_interval;
        let teleported = now - self.last_teleport_time >= self.teleport_interval;
        if teleported {
            self.pos.x += step_ratio * area_width;
            self.last_teleport_time = now;
            self.teleport_count += 1;
        }

        self.refresh(area_width);
        teleported
    }

    /// Recompute progress for the current width; also used after a resize
    pub fn refresh(&mut self, area_width: f32) {
        self.life_progress = if area_width > 0.0 {
            (self.pos.x / area_width).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if self.pos.x > area_width {
            self.is_active = false;
        }
    }

    /// Matchable and drawable
    pub fn is_visible(&self, area_width: f32) -> bool {
        self.is_active && self.pos.x >= 0.0 && self.pos.x < area_width
    }

    pub fn color(&self, thresholds: &ColorThresholds) -> WordColor {
        thresholds.color_for(self.life_progress)
    }
}
