//! Tick driver and command queue
//!
//! The engine has exactly one writer: whoever owns it and drains the
//! [`CommandQueue`]. The background [`TickDriver`] thread and any input
//! source only post [`EngineCommand`]s, so ticks and keystrokes are applied
//! in arrival order without locking the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::sim::{GameEngine, SubmitOutcome};

/// A mutation to apply to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    /// Advance by this many seconds
    Tick(f32),
    Char(char),
    Backspace,
    Submit,
    Pause,
    Resume,
    Stop,
    Resize { width: u32, height: u32 },
}

impl EngineCommand {
    /// Apply to `engine`. Returns the outcome for `Submit`.
    pub fn apply(self, engine: &mut GameEngine) -> Option<SubmitOutcome> {
        match self {
            EngineCommand::Tick(dt) => engine.update(dt),
            EngineCommand::Char(c) => engine.handle_char_input(c),
            EngineCommand::Backspace => engine.handle_backspace(),
            EngineCommand::Submit => return Some(engine.handle_space()),
            EngineCommand::Pause => engine.pause(),
            EngineCommand::Resume => engine.resume(),
            EngineCommand::Stop => engine.stop(),
            EngineCommand::Resize { width, height } => engine.update_visible_area(width, height),
        }
        None
    }
}

/// What a drain pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    pub applied: usize,
    pub ticks: usize,
    pub submits: Vec<SubmitOutcome>,
}

/// Receiving end of the single-writer queue
pub struct CommandQueue {
    tx: Sender<EngineCommand>,
    rx: Receiver<EngineCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Handle for a producer (tick thread, input reader, ...)
    pub fn sender(&self) -> Sender<EngineCommand> {
        self.tx.clone()
    }

    /// Apply every pending command in arrival order
    pub fn drain(&self, engine: &mut GameEngine) -> DrainReport {
        let mut report = DrainReport::default();
        while let Ok(command) = self.rx.try_recv() {
            Self::apply_into(command, engine, &mut report);
        }
        report
    }

    /// Block up to `timeout` for the first command, then drain the rest
    pub fn wait_and_drain(&self, engine: &mut GameEngine, timeout: Duration) -> DrainReport {
        let mut report = DrainReport::default();
        match self.rx.recv_timeout(timeout) {
            Ok(command) => Self::apply_into(command, engine, &mut report),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return report,
        }
        let rest = self.drain(engine);
        report.applied += rest.applied;
        report.ticks += rest.ticks;
        report.submits.extend(rest.submits);
        report
    }

    fn apply_into(command: EngineCommand, engine: &mut GameEngine, report: &mut DrainReport) {
        report.applied += 1;
        if matches!(command, EngineCommand::Tick(_)) {
            report.ticks += 1;
        }
        if let Some(outcome) = command.apply(engine) {
            report.submits.push(outcome);
        }
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Background thread posting `Tick(dt)` at a fixed cadence
pub struct TickDriver {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn spawn(tx: Sender<EngineCommand>, period: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::spawn(move || {
            let mut last = Instant::now();
            while flag.load(Ordering::Acquire) {
                thread::sleep(period);
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;
                if !flag.load(Ordering::Acquire) || tx.send(EngineCommand::Tick(dt)).is_err() {
                    break;
                }
            }
            log::debug!("Tick driver exited");
        });

        log::debug!("Tick driver started ({}ms period)", period.as_millis());
        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop posting ticks and join the thread. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Tick driver thread panicked");
            }
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{GamePhase, ManualClock};
    use crate::words::{Word, WordCatalog};

    fn engine() -> (GameEngine, ManualClock) {
        let clock = ManualClock::new();
        let catalog = WordCatalog::from_words(vec![Word::new("lantern", "light")]);
        let engine = GameEngine::with_clock(catalog, Settings::default(), 8, Box::new(clock.clone()));
        (engine, clock)
    }

    #[test]
    fn test_commands_apply_in_order() {
        let (mut engine, _) = engine();
        engine.start(100);
        let queue = CommandQueue::new();
        let tx = queue.sender();
        for command in [
            EngineCommand::Char('a'),
            EngineCommand::Char('b'),
            EngineCommand::Backspace,
            EngineCommand::Submit,
            EngineCommand::Resize { width: 60, height: 10 },
            EngineCommand::Tick(0.016),
        ] {
            tx.send(command).unwrap();
        }

        let report = queue.drain(&mut engine);
        assert_eq!(report.applied, 6);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.submits, vec![SubmitOutcome::Wrong]);
        assert_eq!(engine.stats().wrong_attempts, 1);
        assert_eq!(engine.area_width(), 60);
        assert_eq!(engine.current_input(), "");
    }

    #[test]
    fn test_tick_after_stop_is_noop() {
        let (mut engine, clock) = engine();
        engine.start(100);
        clock.advance_secs(1.0);
        EngineCommand::Stop.apply(&mut engine);
        EngineCommand::Stop.apply(&mut engine);
        clock.advance_secs(5.0);
        assert_eq!(EngineCommand::Tick(5.0).apply(&mut engine), None);
        assert_eq!(engine.phase(), GamePhase::Over);
        assert!((engine.elapsed_time() - 1.0).abs() < 1e-3);
        assert!(engine.falling_words().is_empty());
    }

    #[test]
    fn test_pause_resume_commands() {
        let (mut engine, _) = engine();
        engine.start(100);
        EngineCommand::Pause.apply(&mut engine);
        assert!(engine.is_paused());
        EngineCommand::Char('z').apply(&mut engine);
        assert_eq!(engine.current_input(), "");
        EngineCommand::Resume.apply(&mut engine);
        assert!(!engine.is_paused());
    }

    #[test]
    fn test_driver_posts_ticks_until_stopped() {
        let queue = CommandQueue::new();
        let mut driver = TickDriver::spawn(queue.sender(), Duration::from_millis(1));
        assert!(driver.is_running());

        let (mut engine, _) = engine();
        engine.start(100);
        let report = queue.wait_and_drain(&mut engine, Duration::from_secs(2));
        assert!(report.ticks >= 1);

        driver.stop();
        driver.stop();
        assert!(!driver.is_running());

        queue.drain(&mut engine);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(queue.drain(&mut engine).ticks, 0);
    }

    #[test]
    fn test_wait_times_out_without_commands() {
        let queue = CommandQueue::new();
        let (mut engine, _) = engine();
        let report = queue.wait_and_drain(&mut engine, Duration::from_millis(5));
        assert_eq!(report, DrainReport::default());
    }
}
