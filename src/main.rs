//! Blink Type headless runner
//!
//! Plays one game with a scripted typist, feeding keystrokes and ticks
//! through the same command queue a terminal front end would use, then
//! records the result.

use std::env;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use blink_type::consts::{CONFIG_FILE, RECORDS_FILE, TICK_PERIOD, WORDS_FILE};
use blink_type::driver::{CommandQueue, EngineCommand, TickDriver};
use blink_type::records::{DEFAULT_HISTORY_LEN, MOVING_AVERAGE_WINDOW, RecordError, moving_average};
use blink_type::sim::{ActiveWord, SubmitOutcome};
use blink_type::words::CatalogError;
use blink_type::{GameEngine, GameMode, RecordStore, Settings, WordCatalog};

/// Play-area width used without a terminal
const DEMO_AREA_WIDTH: u32 = 100;
/// Endless runs are cut off here
const MAX_DEMO_SECONDS: f32 = 90.0;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Records(#[from] RecordError),
    #[error("failed to send command: tick queue closed")]
    QueueClosed,
    #[error("unknown game mode {0:?} (expected endless, 30, 60 or 120)")]
    UnknownMode(String),
}

/// Types the most urgent visible word at a fixed speed, with the odd typo
struct Typist {
    tx: Sender<EngineCommand>,
    rng: Pcg32,
    secs_per_char: f32,
    typo_chance: f64,
    busy_until: Instant,
}

impl Typist {
    fn new(tx: Sender<EngineCommand>, seed: u64) -> Self {
        Self {
            tx,
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            secs_per_char: 0.18,
            typo_chance: 0.1,
            busy_until: Instant::now(),
        }
    }

    fn act(&mut self, engine: &GameEngine) -> Result<(), AppError> {
        let now = Instant::now();
        if now < self.busy_until || !engine.current_input().is_empty() {
            return Ok(());
        }

        let width = engine.area_width() as f32;
        let Some(target) = engine
            .falling_words()
            .iter()
            .filter(|w| w.is_visible(width))
            .max_by(|a, b| a.x().total_cmp(&b.x()))
        else {
            return Ok(());
        };

        let text = self.attempt(target);
        for c in text.chars() {
            self.send(EngineCommand::Char(c))?;
        }
        self.send(EngineCommand::Submit)?;
        self.busy_until = now + Duration::from_secs_f32(self.secs_per_char * (text.len() + 1) as f32);
        Ok(())
    }

    /// The word as typed, possibly with one wrong letter
    fn attempt(&mut self, target: &ActiveWord) -> String {
        let mut chars: Vec<char> = target.word.text.to_lowercase().chars().collect();
        if !chars.is_empty() && self.rng.random_bool(self.typo_chance) {
            let i = self.rng.random_range(0..chars.len());
            chars[i] = if chars[i] == 'x' { 'q' } else { 'x' };
        }
        chars.into_iter().collect()
    }

    fn send(&self, command: EngineCommand) -> Result<(), AppError> {
        self.tx.send(command).map_err(|_| AppError::QueueClosed)
    }
}

fn run() -> Result<(), AppError> {
    let mut args = env::args().skip(1);
    let words_path = args.next().unwrap_or_else(|| WORDS_FILE.to_string());
    let mut settings = Settings::load_or_default(CONFIG_FILE);
    if let Some(arg) = args.next() {
        settings.mode = GameMode::from_str(&arg).ok_or(AppError::UnknownMode(arg))?;
    }
    log::info!("Mode: {}", settings.mode.as_str());

    let mut catalog = WordCatalog::new();
    catalog.load_file(&words_path)?;

    let mut store = RecordStore::new(RECORDS_FILE);
    store.load()?;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    log::info!("Seed {seed}");

    let mut engine = GameEngine::new(catalog, settings, seed);
    engine.start(DEMO_AREA_WIDTH);

    let queue = CommandQueue::new();
    let mut driver = TickDriver::spawn(queue.sender(), TICK_PERIOD);
    let mut typist = Typist::new(queue.sender(), seed);

    while !engine.is_game_over() {
        let report = queue.wait_and_drain(&mut engine, TICK_PERIOD * 4);
        for outcome in report.submits {
            match outcome {
                SubmitOutcome::Correct(word) => log::info!(
                    "+ {} (combo {}, health {:.0}%)",
                    word.word.text,
                    engine.stats().current_combo,
                    engine.health_percentage()
                ),
                SubmitOutcome::Wrong => log::info!("x miss-typed (health {:.0}%)", engine.health_percentage()),
                SubmitOutcome::Ignored => {}
            }
        }

        if engine.mode().duration().is_none() && engine.elapsed_time() >= MAX_DEMO_SECONDS {
            engine.stop();
            break;
        }
        typist.act(&engine)?;
    }

    driver.stop();
    engine.stop();

    let record = engine.result();
    let is_new = store.is_new_record(&record);
    store.save(record.clone())?;

    println!("WPM {}  accuracy {:.1}%  survived {:.1}s", record.wpm, record.accuracy, record.survival_time);
    println!(
        "correct {}  missed {}  wrong {}  best combo {}",
        record.correct_words, record.missed_words, record.wrong_attempts, record.max_combo
    );
    if is_new {
        println!("New best!");
    }

    let best = store.best_record_for(record.mode);
    let longest = store.longest_survival_record();
    println!(
        "Best {} WPM on {} ({}), longest run {:.1}s",
        best.wpm,
        best.date_prefix(),
        best.mode.as_str(),
        longest.survival_time
    );

    let wpm = store.recent_wpm(DEFAULT_HISTORY_LEN);
    if let Some(trend) = moving_average(&wpm, MOVING_AVERAGE_WINDOW).last() {
        println!("Trend over last {} runs: {:.1} WPM", wpm.len(), trend);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Blink Type (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
