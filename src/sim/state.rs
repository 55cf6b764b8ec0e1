//! Engine state and lifecycle
//!
//! `GameEngine` owns everything that changes during a run. Per-tick logic
//! lives in `tick.rs`, keyboard handling in `input.rs`.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, MonotonicClock};
use super::ramp::{DifficultyRamp, RampParams};
use super::stats::GameStats;
use super::word::ActiveWord;
use crate::consts::{MIN_AREA_HEIGHT, MIN_AREA_WIDTH};
use crate::records::GameRecord;
use crate::settings::{GameMode, Settings};
use crate::words::WordCatalog;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    Running,
    Paused,
    Over,
}

/// Simulation core: active words, input buffer, stats and spawn schedule
pub struct GameEngine {
    pub(super) settings: Settings,
    pub(super) ramp: DifficultyRamp,
    /// Parameters computed at the last tick
    pub(super) ramp_params: RampParams,
    pub(super) catalog: WordCatalog,
    clock: Box<dyn Clock>,
    pub(super) rng: Pcg32,

    pub(super) phase: GamePhase,
    pub(super) area_width: u32,
    pub(super) area_height: u32,

    /// Clock reading at `start`
    start_time: Duration,
    /// Clock reading when the current pause began
    pause_started: Option<Duration>,
    total_paused: Duration,
    /// Elapsed seconds frozen at game over
    final_elapsed: f32,

    pub(super) words: Vec<ActiveWord>,
    /// Seconds until the next spawn attempt
    pub(super) next_spawn_in: f32,
    pub(super) input: String,
    pub(super) stats: GameStats,
    /// In-game second the red border flash began
    pub(super) flash_started: Option<f32>,
    next_id: u32,
}

impl GameEngine {
    /// Engine driven by the wall clock
    pub fn new(catalog: WordCatalog, settings: Settings, seed: u64) -> Self {
        Self::with_clock(catalog, settings, seed, Box::new(MonotonicClock::new()))
    }

    pub fn with_clock(catalog: WordCatalog, settings: Settings, seed: u64, clock: Box<dyn Clock>) -> Self {
        let settings = settings.sanitized();
        let ramp = DifficultyRamp::new(&settings);
        Self {
            ramp_params: ramp.at(0.0),
            ramp,
            catalog,
            clock,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            area_width: MIN_AREA_WIDTH,
            area_height: settings.game_area_height.max(MIN_AREA_HEIGHT),
            start_time: Duration::ZERO,
            pause_started: None,
            total_paused: Duration::ZERO,
            final_elapsed: 0.0,
            words: Vec::new(),
            next_spawn_in: 0.0,
            input: String::new(),
            stats: GameStats::with_health(settings.max_health),
            flash_started: None,
            next_id: 1,
            settings,
        }
    }

    /// Reset everything and begin a run on an area `area_width` cells wide
    pub fn start(&mut self, area_width: u32) {
        self.area_width = area_width.max(MIN_AREA_WIDTH);
        self.area_height = self.settings.game_area_height.max(MIN_AREA_HEIGHT);

        self.start_time = self.clock.now();
        self.pause_started = None;
        self.total_paused = Duration::ZERO;
        self.final_elapsed = 0.0;

        self.words.clear();
        self.input.clear();
        self.stats = GameStats::with_health(self.settings.max_health);
        self.flash_started = None;
        self.next_id = 1;

        self.ramp_params = self.ramp.at(0.0);
        self.next_spawn_in = self.roll_spawn_interval();
        self.phase = GamePhase::Running;

        log::info!(
            "Game started: mode={}, area={}x{}, first spawn in {:.2}s",
            self.settings.mode.as_str(),
            self.area_width,
            self.area_height,
            self.next_spawn_in
        );
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Running {
            self.pause_started = Some(self.clock.now());
            self.phase = GamePhase::Paused;
            log::info!("Paused at {:.2}s", self.elapsed_time());
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            if let Some(paused_at) = self.pause_started.take() {
                self.total_paused += self.clock.now().saturating_sub(paused_at);
            }
            self.phase = GamePhase::Running;
            log::info!("Resumed, {:.2}s paused in total", self.total_paused.as_secs_f32());
        }
    }

    /// End the run immediately. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            self.finish("stopped");
        }
    }

    /// Freeze elapsed time and move to `Over`. Timed runs never record more
    /// than their limit, even when the last tick lands past it.
    pub(super) fn finish(&mut self, reason: &str) {
        let elapsed = self.elapsed_time();
        self.final_elapsed = match self.settings.mode.duration() {
            Some(limit) => elapsed.min(limit),
            None => elapsed,
        };
        self.pause_started = None;
        self.phase = GamePhase::Over;
        log::info!(
            "Game over ({reason}) after {:.1}s: {} correct, {} missed, {} wrong",
            self.final_elapsed,
            self.stats.correct_words,
            self.stats.missed_words,
            self.stats.wrong_attempts
        );
    }

    /// In-game seconds since `start`, excluding paused time
    pub fn elapsed_time(&self) -> f32 {
        let until = match self.phase {
            GamePhase::NotStarted => return 0.0,
            GamePhase::Over => return self.final_elapsed,
            GamePhase::Paused => self.pause_started.unwrap_or_else(|| self.clock.now()),
            GamePhase::Running => self.clock.now(),
        };
        until
            .saturating_sub(self.start_time)
            .saturating_sub(self.total_paused)
            .as_secs_f32()
    }

    /// Seconds left in a timed run; `None` in endless mode
    pub fn time_remaining(&self) -> Option<f32> {
        self.settings
            .mode
            .duration()
            .map(|limit| (limit - self.elapsed_time()).max(0.0))
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Running | GamePhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        !self.is_running() || self.stats.is_dead() || self.time_remaining() == Some(0.0)
    }

    /// Health as a percentage of the cap
    pub fn health_percentage(&self) -> f32 {
        (self.stats.health / self.settings.health_cap * 100.0).clamp(0.0, 100.0)
    }

    pub fn falling_words(&self) -> &[ActiveWord] {
        &self.words
    }

    pub fn current_input(&self) -> &str {
        &self.input
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> GameMode {
        self.settings.mode
    }

    pub fn ramp_params(&self) -> RampParams {
        self.ramp_params
    }

    pub fn area_width(&self) -> u32 {
        self.area_width
    }

    pub fn area_height(&self) -> u32 {
        self.area_height
    }

    pub fn should_flash_red_border(&self) -> bool {
        self.flash_started.is_some()
    }

    /// Whether the combo counter is worth showing
    pub fn should_show_combo(&self) -> bool {
        self.stats.current_combo >= self.settings.min_combo_display
    }

    /// Renderer reports the usable area each frame
    pub fn update_visible_area(&mut self, width: u32, height: u32) {
        let width = width.max(MIN_AREA_WIDTH);
        let height = height.max(MIN_AREA_HEIGHT);
        if width == self.area_width && height == self.area_height {
            return;
        }

        self.area_width = width;
        self.area_height = height;
        let max_row = (height - 1) as f32;
        for word in &mut self.words {
            word.pos.y = word.pos.y.min(max_row);
            word.refresh(width as f32);
        }
    }

    /// Snapshot of the run so far
    pub fn result(&self) -> GameRecord {
        let elapsed = self.elapsed_time();
        let minutes = elapsed / 60.0;
        let wpm = if minutes > 0.0 {
            (self.stats.correct_words as f32 / minutes).round() as u32
        } else {
            0
        };

        GameRecord {
            wpm,
            accuracy: self.stats.accuracy(),
            survival_time: elapsed,
            date: GameRecord::timestamp_now(),
            correct_words: self.stats.correct_words,
            missed_words: self.stats.missed_words,
            wrong_attempts: self.stats.wrong_attempts,
            max_combo: self.stats.max_combo,
            mode: self.settings.mode,
        }
    }

    pub(super) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniform draw over the current spawn bounds
    pub(super) fn roll_spawn_interval(&mut self) -> f32 {
        let RampParams { spawn_min, spawn_max, .. } = self.ramp_params;
        self.rng.random_range(spawn_min..=spawn_max)
    }

    /// Uniform row inside the play area
    pub(super) fn roll_row(&mut self) -> f32 {
        let max_row = (self.area_height.max(MIN_AREA_HEIGHT) - 1) as f32;
        self.rng.random_range(0.0..=max_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ManualClock;
    use crate::words::Word;

    fn engine(settings: Settings) -> (GameEngine, ManualClock) {
        let clock = ManualClock::new();
        let catalog = WordCatalog::from_words(vec![Word::new("alpha", ""), Word::new("beta", "")]);
        let engine = GameEngine::with_clock(catalog, settings, 42, Box::new(clock.clone()));
        (engine, clock)
    }

    #[test]
    fn test_not_started_counts_as_over() {
        let (engine, _) = engine(Settings::default());
        assert_eq!(engine.phase(), GamePhase::NotStarted);
        assert!(engine.is_game_over());
        assert_eq!(engine.elapsed_time(), 0.0);
    }

    #[test]
    fn test_start_resets_state() {
        let (mut engine, clock) = engine(Settings::default());
        engine.start(100);
        engine.handle_char_input('x');
        clock.advance_secs(3.0);
        engine.handle_space();
        assert_eq!(engine.stats().wrong_attempts, 1);

        engine.start(80);
        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.stats(), &GameStats::with_health(100.0));
        assert!(engine.current_input().is_empty());
        assert!(engine.falling_words().is_empty());
        assert!(!engine.should_flash_red_border());
        assert_eq!(engine.area_width(), 80);
        assert_eq!(engine.elapsed_time(), 0.0);
        let p = engine.ramp_params();
        assert!(engine.next_spawn_in >= p.spawn_min && engine.next_spawn_in <= p.spawn_max);
    }

    #[test]
    fn test_elapsed_excludes_paused_time() {
        let (mut engine, clock) = engine(Settings::default());
        engine.start(100);
        clock.advance_secs(2.0);
        engine.pause();
        clock.advance_secs(5.0);
        assert!((engine.elapsed_time() - 2.0).abs() < 1e-3, "frozen while paused");
        engine.resume();
        clock.advance_secs(1.0);
        assert!((engine.elapsed_time() - 3.0).abs() < 1e-3);

        engine.pause();
        clock.advance_secs(0.5);
        engine.resume();
        assert!((engine.elapsed_time() - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_pause_resume_only_in_matching_phase() {
        let (mut engine, _) = engine(Settings::default());
        engine.pause();
        assert_eq!(engine.phase(), GamePhase::NotStarted);
        engine.start(100);
        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Running);
        engine.pause();
        engine.pause();
        assert!(engine.is_paused());
        assert!(engine.is_running());
        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Running);
    }

    #[test]
    fn test_stop_is_idempotent_and_freezes_time() {
        let (mut engine, clock) = engine(Settings::default());
        engine.start(100);
        clock.advance_secs(4.0);
        engine.stop();
        engine.stop();
        assert_eq!(engine.phase(), GamePhase::Over);
        assert!(engine.is_game_over());
        clock.advance_secs(10.0);
        assert!((engine.elapsed_time() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_stop_while_paused_keeps_pre_pause_time() {
        let (mut engine, clock) = engine(Settings::default());
        engine.start(100);
        clock.advance_secs(1.0);
        engine.pause();
        clock.advance_secs(9.0);
        engine.stop();
        assert!((engine.elapsed_time() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_time_remaining_for_timed_modes() {
        let (mut engine, clock) = engine(Settings::with_mode(GameMode::Thirty));
        engine.start(100);
        clock.advance_secs(10.0);
        let remaining = engine.time_remaining().unwrap();
        assert!((remaining - 20.0).abs() < 1e-3);
        assert!(!engine.is_game_over());
        clock.advance_secs(25.0);
        assert_eq!(engine.time_remaining(), Some(0.0));
        assert!(engine.is_game_over());

        let (endless, _) = self::engine(Settings::default());
        assert_eq!(endless.time_remaining(), None);
    }

    #[test]
    fn test_stop_after_time_limit_records_exact_limit() {
        let (mut engine, clock) = engine(Settings::with_mode(GameMode::Thirty));
        engine.start(100);
        clock.advance_secs(30.4);
        assert!(engine.is_game_over());
        engine.stop();
        assert_eq!(engine.elapsed_time(), 30.0);

        let record = engine.result();
        assert_eq!(record.survival_time, 30.0);
        assert_eq!(record.mode, GameMode::Thirty);
    }

    #[test]
    fn test_visible_area_is_clamped() {
        let (mut engine, _) = engine(Settings::default());
        engine.start(3);
        assert_eq!(engine.area_width(), MIN_AREA_WIDTH);
        engine.update_visible_area(0, 0);
        assert_eq!(engine.area_width(), MIN_AREA_WIDTH);
        assert_eq!(engine.area_height(), MIN_AREA_HEIGHT);
        engine.update_visible_area(120, 20);
        assert_eq!((engine.area_width(), engine.area_height()), (120, 20));
    }

    #[test]
    fn test_result_wpm_and_accuracy() {
        let (mut engine, clock) = engine(Settings::default());
        engine.start(100);
        assert_eq!(engine.result().wpm, 0);

        engine.stats.correct_words = 7;
        engine.stats.missed_words = 2;
        engine.stats.wrong_attempts = 1;
        engine.stats.max_combo = 4;
        clock.advance_secs(30.0);

        let record = engine.result();
        assert_eq!(record.wpm, 14);
        assert!((record.accuracy - 70.0).abs() < 1e-9);
        assert!((record.survival_time - 30.0).abs() < 1e-3);
        assert_eq!(record.max_combo, 4);
        assert_eq!(record.date.len(), 19);
    }

    #[test]
    fn test_health_percentage_uses_cap() {
        let settings = Settings {
            max_health: 40.0,
            health_cap: 80.0,
            ..Settings::default()
        };
        let (mut engine, _) = engine(settings);
        engine.start(100);
        assert!((engine.health_percentage() - 50.0).abs() < 1e-4);
    }
}
