//! Run statistics: counters, combo and health

use serde::{Deserialize, Serialize};

/// Counters mutated by the three gameplay outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub correct_words: u32,
    pub missed_words: u32,
    pub wrong_attempts: u32,
    pub current_combo: u32,
    /// Running maximum of `current_combo`
    pub max_combo: u32,
    pub health: f32,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::with_health(100.0)
    }
}

impl GameStats {
    pub fn with_health(health: f32) -> Self {
        Self {
            correct_words: 0,
            missed_words: 0,
            wrong_attempts: 0,
            current_combo: 0,
            max_combo: 0,
            health,
        }
    }

    /// A word was typed correctly; restores `gain` health up to `cap`
    pub fn on_correct(&mut self, gain: f32, cap: f32) {
        self.correct_words += 1;
        self.current_combo += 1;
        self.max_combo = self.max_combo.max(self.current_combo);
        self.health = (self.health + gain).clamp(0.0, cap);
    }

    /// A word left the play area; costs `loss` health
    pub fn on_miss(&mut self, loss: f32) {
        self.missed_words += 1;
        self.current_combo = 0;
        self.health = (self.health - loss).max(0.0);
    }

    /// A submit matched nothing
    pub fn on_wrong(&mut self) {
        self.wrong_attempts += 1;
        self.current_combo = 0;
    }

    pub fn total_attempts(&self) -> u32 {
        self.correct_words + self.missed_words + self.wrong_attempts
    }

    /// Percentage of attempts that were correct; 100 before any attempt
    pub fn accuracy(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            return 100.0;
        }
        f64::from(self.correct_words) * 100.0 / f64::from(total)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}
