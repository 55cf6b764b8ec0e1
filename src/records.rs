//! Run history
//!
//! Append-only CSV log of finished runs, loaded fully into memory at
//! startup and kept sorted by date.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::GameMode;

/// First line of every record log
pub const CSV_HEADER: &str =
    "WPM,Accuracy,SurvivalTime,Date,CorrectWords,MissedWords,WrongAttempts,MaxCombo,Mode";

/// Fields every record line must carry. `Mode` is optional and defaults to
/// endless for logs written without it.
pub const FIELD_COUNT: usize = 8;

/// Window of the WPM trend line
pub const MOVING_AVERAGE_WINDOW: usize = 50;

/// Records shown by default in the history view
pub const DEFAULT_HISTORY_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read records {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write records {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create records directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRecordError {
    #[error("expected 8 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Summary of one finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameRecord {
    pub wpm: u32,
    /// Percent, `[0, 100]`
    pub accuracy: f64,
    /// In-game seconds survived
    pub survival_time: f32,
    /// Local time, `YYYY-MM-DDTHH:MM:SS`
    pub date: String,
    pub correct_words: u32,
    pub missed_words: u32,
    pub wrong_attempts: u32,
    pub max_combo: u32,
    pub mode: GameMode,
}

impl GameRecord {
    /// Current local time in the log's date format
    pub fn timestamp_now() -> String {
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Serialize as one log line (no trailing newline)
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{:.1},{},{},{},{},{},{},{}",
            self.wpm,
            self.accuracy,
            self.survival_time,
            self.date,
            self.correct_words,
            self.missed_words,
            self.wrong_attempts,
            self.max_combo,
            self.mode.code()
        )
    }

    /// Parse one log line. Fields past `Mode` are ignored.
    pub fn from_csv_line(line: &str) -> Result<Self, ParseRecordError> {
        let fields: Vec<&str> = line.trim_end().split(',').map(str::trim).collect();
        if fields.len() < FIELD_COUNT {
            return Err(ParseRecordError::FieldCount(fields.len()));
        }

        let accuracy: f64 = parse_field("Accuracy", fields[1])?;
        if !(0.0..=100.0).contains(&accuracy) {
            return Err(invalid("Accuracy", fields[1]));
        }
        let survival_time: f32 = parse_field("SurvivalTime", fields[2])?;
        if !(survival_time.is_finite() && survival_time >= 0.0) {
            return Err(invalid("SurvivalTime", fields[2]));
        }
        let mode = match fields.get(FIELD_COUNT).filter(|f| !f.is_empty()) {
            Some(code) => {
                GameMode::from_code(parse_field("Mode", code)?).ok_or_else(|| invalid("Mode", code))?
            }
            None => GameMode::Endless,
        };

        Ok(Self {
            wpm: parse_field("WPM", fields[0])?,
            accuracy,
            survival_time,
            date: fields[3].to_string(),
            correct_words: parse_field("CorrectWords", fields[4])?,
            missed_words: parse_field("MissedWords", fields[5])?,
            wrong_attempts: parse_field("WrongAttempts", fields[6])?,
            max_combo: parse_field("MaxCombo", fields[7])?,
            mode,
        })
    }

    /// Date part of `date` (first 10 characters)
    pub fn date_prefix(&self) -> &str {
        match self.date.char_indices().nth(10) {
            Some((i, _)) => &self.date[..i],
            None => &self.date,
        }
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ParseRecordError> {
    value.parse().map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &str) -> ParseRecordError {
    ParseRecordError::InvalidField {
        field,
        value: value.to_string(),
    }
}

/// In-memory run history backed by an append-only log
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<GameRecord>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory history with the contents of the log.
    ///
    /// A missing log is not an error (it is created on the first save).
    /// Lines that fail to parse are skipped. Returns the number of records.
    pub fn load(&mut self) -> Result<usize, RecordError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No records at {}, starting fresh", self.path.display());
                self.records.clear();
                return Ok(0);
            }
            Err(source) => {
                return Err(RecordError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        self.records.clear();
        let mut skipped = 0;
        // First line is the header
        for (line_no, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match GameRecord::from_csv_line(line) {
                Ok(record) => self.records.push(record),
                Err(e) => {
                    skipped += 1;
                    log::warn!("{}:{}: skipping record: {e}", self.path.display(), line_no + 1);
                }
            }
        }

        self.sort_by_date();
        log::info!(
            "Loaded {} records from {} ({} skipped)",
            self.records.len(),
            self.path.display(),
            skipped
        );
        Ok(self.records.len())
    }

    /// Append a record to the log and to memory. Prior lines are never
    /// rewritten.
    pub fn save(&mut self, record: GameRecord) -> Result<(), RecordError> {
        self.ensure_log_exists()?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;
        writeln!(file, "{}", record.to_csv_line()).map_err(|source| self.write_error(source))?;

        log::info!("Saved record: {} WPM, {:.1}% accuracy", record.wpm, record.accuracy);
        self.records.push(record);
        Ok(())
    }

    /// Create the parent directory and a header-only log if absent
    fn ensure_log_exists(&self) -> Result<(), RecordError> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RecordError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, format!("{CSV_HEADER}\n")).map_err(|source| self.write_error(source))
    }

    fn write_error(&self, source: std::io::Error) -> RecordError {
        RecordError::Write {
            path: self.path.clone(),
            source,
        }
    }

    fn sort_by_date(&mut self) {
        // Stable, so same-second records keep log order
        self.records.sort_by(|a, b| a.date.cmp(&b.date));
    }

    pub fn all_records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest WPM; the first of equal maxima wins. Zero-WPM default when
    /// there is no history.
    pub fn best_record(&self) -> GameRecord {
        highest_wpm(self.records.iter()).cloned().unwrap_or_default()
    }

    /// Highest WPM among runs of one mode; zero-WPM default when there are
    /// none. Timed and endless runs are not comparable.
    pub fn best_record_for(&self, mode: GameMode) -> GameRecord {
        let best = highest_wpm(self.records.iter().filter(|r| r.mode == mode));
        best.cloned().unwrap_or_else(|| GameRecord {
            mode,
            ..GameRecord::default()
        })
    }

    /// Longest survival time; zero default when there is no history
    pub fn longest_survival_record(&self) -> GameRecord {
        let mut longest: Option<&GameRecord> = None;
        for record in &self.records {
            if longest.is_none_or(|l| record.survival_time > l.survival_time) {
                longest = Some(record);
            }
        }
        longest.cloned().unwrap_or_default()
    }

    /// Whether `candidate` beats the best WPM so far in its mode
    pub fn is_new_record(&self, candidate: &GameRecord) -> bool {
        candidate.wpm > self.best_record_for(candidate.mode).wpm
    }

    fn recent(&self, last_n: usize) -> &[GameRecord] {
        let start = self.records.len().saturating_sub(last_n);
        &self.records[start..]
    }

    /// WPM of the last `last_n` records, oldest first
    pub fn recent_wpm(&self, last_n: usize) -> Vec<f64> {
        self.recent(last_n).iter().map(|r| f64::from(r.wpm)).collect()
    }

    /// `(date, wpm)` of the last `last_n` records, oldest first
    pub fn wpm_time_series(&self, last_n: usize) -> Vec<(String, f64)> {
        self.recent(last_n)
            .iter()
            .map(|r| (r.date_prefix().to_string(), f64::from(r.wpm)))
            .collect()
    }
}

/// First record with the maximum WPM
fn highest_wpm<'a>(records: impl Iterator<Item = &'a GameRecord>) -> Option<&'a GameRecord> {
    let mut best: Option<&GameRecord> = None;
    for record in records {
        if best.is_none_or(|b| record.wpm > b.wpm) {
            best = Some(record);
        }
    }
    best
}

/// Trailing moving average. The first `window - 1` points average over
/// however many values exist so far.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            sum += v;
            if i >= window {
                sum -= values[i - window];
            }
            sum / (window.min(i + 1)) as f64
        })
        .collect()
}
