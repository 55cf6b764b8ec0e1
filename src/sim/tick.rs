//! Per-tick simulation step
//!
//! Called by the tick driver at a fixed cadence. Order matters:
//! ramp, word motion and misses, spawning, flash expiry, end-of-run check.

use super::state::{GameEngine, GamePhase};
use super::word::ActiveWord;

impl GameEngine {
    /// Advance the run by `dt` seconds. No-op unless running.
    pub fn update(&mut self, dt: f32) {
        if self.phase != GamePhase::Running {
            return;
        }

        let now = self.elapsed_time();
        self.ramp_params = self.ramp.at(now);

        self.update_falling_words(now);

        self.next_spawn_in -= dt.max(0.0);
        if self.next_spawn_in <= 0.0 && self.words.len() < self.settings.max_concurrent_words {
            self.spawn_word();
            self.next_spawn_in = self.roll_spawn_interval();
        }

        if let Some(started) = self.flash_started {
            if now - started >= self.settings.border_flash_duration {
                self.flash_started = None;
            }
        }

        if self.stats.is_dead() {
            self.finish("out of health");
        } else if self.time_remaining() == Some(0.0) {
            self.finish("time limit");
        }
    }

    /// Teleport due words and drop the ones that left the area
    fn update_falling_words(&mut self, now: f32) {
        let width = self.area_width as f32;
        let interval = self.ramp_params.teleport_interval;
        let step = self.settings.teleport_step_ratio;

        let mut missed = 0;
        self.words.retain_mut(|word| {
            if word.advance(now, interval, width, step) {
                log::debug!(
                    "'{}' teleported to x={:.1} ({} jumps)",
                    word.word.text,
                    word.x(),
                    word.teleport_count
                );
            }
            if word.is_active {
                true
            } else {
                log::debug!("'{}' escaped", word.word.text);
                missed += 1;
                false
            }
        });

        for _ in 0..missed {
            self.on_word_missed();
        }
    }

    fn on_word_missed(&mut self) {
        self.stats.on_miss(self.settings.health_loss);
    }

    /// Draw a word from the catalog and place it at the left edge
    fn spawn_word(&mut self) {
        if self.catalog.is_empty() {
            return;
        }

        let word = self.catalog.draw_random(&mut self.rng);
        let y = self.roll_row();
        let id = self.next_entity_id();
        let now = self.elapsed_time();
        log::debug!("Spawned '{}' on row {:.0}", word.text, y);
        self.words
            .push(ActiveWord::new(id, word, y, now, self.ramp_params.teleport_interval));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{GameMode, Settings};
    use crate::sim::clock::ManualClock;
    use crate::words::{Word, WordCatalog};

    const DT: f32 = 0.05;

    fn catalog() -> WordCatalog {
        WordCatalog::from_words(vec![
            Word::new("comet", "icy body"),
            Word::new("nebula", "gas cloud"),
            Word::new("quasar", "bright core"),
        ])
    }

    fn engine_with(settings: Settings, seed: u64) -> (GameEngine, ManualClock) {
        let clock = ManualClock::new();
        let engine = GameEngine::with_clock(catalog(), settings, seed, Box::new(clock.clone()));
        (engine, clock)
    }

    /// Advance clock and engine together for `secs` seconds
    fn run(engine: &mut GameEngine, clock: &ManualClock, secs: f32) {
        let steps = (secs / DT).round() as u32;
        for _ in 0..steps {
            clock.advance_secs(DT);
            engine.update(DT);
        }
    }

    #[test]
    fn test_update_ignored_unless_running() {
        let (mut engine, clock) = engine_with(Settings::default(), 1);
        run(&mut engine, &clock, 10.0);
        assert!(engine.falling_words().is_empty());

        engine.start(100);
        engine.pause();
        run(&mut engine, &clock, 10.0);
        assert!(engine.falling_words().is_empty());
        assert_eq!(engine.elapsed_time(), 0.0);
    }

    #[test]
    fn test_single_word_teleport_scenario() {
        let settings = Settings {
            max_concurrent_words: 1,
            ..Settings::default()
        };
        let (mut engine, clock) = engine_with(settings, 7);
        engine.start(100);
        engine.spawn_word();

        run(&mut engine, &clock, 1.6);
        let word = &engine.falling_words()[0];
        assert_eq!(word.teleport_count, 1);
        assert!((word.x() - 15.0).abs() < 1e-3);
        assert!((word.life_progress - 0.15).abs() < 1e-4);

        run(&mut engine, &clock, 9.9);
        assert_eq!(engine.stats().missed_words, 1);
        assert_eq!(engine.stats().health, 85.0);
        assert_eq!(engine.stats().current_combo, 0);
        assert!(engine.falling_words().iter().all(|w| w.id != 1));
    }

    #[test]
    fn test_spawns_respect_concurrency_cap() {
        let settings = Settings {
            max_concurrent_words: 3,
            spawn_interval_min: 0.1,
            spawn_interval_max: 0.3,
            min_spawn_interval: 0.1,
            base_teleport_interval: 100.0,
            ..Settings::default()
        };
        let (mut engine, clock) = engine_with(settings, 3);
        engine.start(100);
        for _ in 0..200 {
            clock.advance_secs(DT);
            engine.update(DT);
            assert!(engine.falling_words().len() <= 3);
        }
        assert_eq!(engine.falling_words().len(), 3);
        for word in engine.falling_words() {
            assert!(word.y() >= 0.0 && word.y() <= 14.0);
            assert_eq!(word.x(), 0.0);
        }
    }

    #[test]
    fn test_first_spawn_within_ramp_bounds() {
        let (mut engine, clock) = engine_with(Settings::default(), 11);
        engine.start(100);
        run(&mut engine, &clock, 1.9);
        assert!(engine.falling_words().is_empty());
        run(&mut engine, &clock, 2.15);
        assert!(!engine.falling_words().is_empty());
    }

    #[test]
    fn test_empty_catalog_never_spawns() {
        let clock = ManualClock::new();
        let mut engine = GameEngine::with_clock(
            WordCatalog::new(),
            Settings::default(),
            5,
            Box::new(clock.clone()),
        );
        engine.start(100);
        run(&mut engine, &clock, 20.0);
        assert!(engine.falling_words().is_empty());
        assert_eq!(engine.phase(), GamePhase::Running);
    }

    #[test]
    fn test_health_depletion_ends_game() {
        let settings = Settings {
            health_loss: 60.0,
            spawn_interval_min: 0.1,
            spawn_interval_max: 0.3,
            min_spawn_interval: 0.1,
            base_teleport_interval: 0.2,
            min_teleport_interval: 0.1,
            teleport_step_ratio: 0.5,
            ..Settings::default()
        };
        let (mut engine, clock) = engine_with(settings, 9);
        engine.start(100);
        run(&mut engine, &clock, 10.0);
        assert_eq!(engine.phase(), GamePhase::Over);
        assert!(engine.is_game_over());
        assert_eq!(engine.stats().health, 0.0);
        assert!(engine.stats().missed_words >= 2);

        let frozen = engine.elapsed_time();
        run(&mut engine, &clock, 1.0);
        assert_eq!(engine.elapsed_time(), frozen);
    }

    #[test]
    fn test_timed_mode_ends_at_limit() {
        let settings = Settings {
            spawn_interval_min: 100.0,
            spawn_interval_max: 200.0,
            ..Settings::with_mode(GameMode::Thirty)
        };
        let (mut engine, clock) = engine_with(settings, 2);
        engine.start(100);
        run(&mut engine, &clock, 29.0);
        assert_eq!(engine.phase(), GamePhase::Running);
        run(&mut engine, &clock, 1.5);
        assert_eq!(engine.phase(), GamePhase::Over);
        assert!((engine.elapsed_time() - 30.0).abs() < 0.1);
    }

    #[test]
    fn test_words_do_not_teleport_during_pause() {
        let (mut engine, clock) = engine_with(Settings::default(), 4);
        engine.start(100);
        engine.spawn_word();
        run(&mut engine, &clock, 1.0);
        engine.pause();
        clock.advance_secs(30.0);
        engine.resume();
        run(&mut engine, &clock, 0.2);
        assert_eq!(engine.falling_words()[0].teleport_count, 0);
        assert_eq!(engine.stats().missed_words, 0);
    }

    #[test]
    fn test_shrinking_area_counts_miss_on_next_tick() {
        let (mut engine, clock) = engine_with(Settings::default(), 4);
        engine.start(100);
        engine.spawn_word();
        run(&mut engine, &clock, 1.6);
        engine.update_visible_area(12, 15);
        assert!(!engine.falling_words()[0].is_active);
        run(&mut engine, &clock, DT);
        assert_eq!(engine.stats().missed_words, 1);
        assert!(engine.falling_words().iter().all(|w| w.is_active));
    }

    #[test]
    fn test_same_seed_same_run() {
        let settings = Settings {
            spawn_interval_min: 0.5,
            spawn_interval_max: 1.5,
            min_spawn_interval: 0.5,
            ..Settings::default()
        };
        let (mut a, clock_a) = engine_with(settings.clone(), 1234);
        let (mut b, clock_b) = engine_with(settings, 1234);
        a.start(100);
        b.start(100);
        run(&mut a, &clock_a, 12.0);
        run(&mut b, &clock_b, 12.0);

        let snapshot = |e: &GameEngine| {
            e.falling_words()
                .iter()
                .map(|w| (w.word.text.clone(), w.x(), w.y(), w.teleport_count))
                .collect::<Vec<_>>()
        };
        assert!(!a.falling_words().is_empty());
        assert_eq!(snapshot(&a), snapshot(&b));
        assert_eq!(a.stats(), b.stats());
    }
}
