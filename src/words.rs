//! Word catalog
//!
//! Vocabulary loaded once at startup from a line-oriented list:
//! `word definition text...`, one entry per line.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text returned by [`WordCatalog::draw_random`] when nothing is loaded
pub const SENTINEL_TEXT: &str = "ERROR";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read word list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("word list {path} contains no words")]
    Empty { path: PathBuf },
}

/// A vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub definition: String,
    /// Character count of `text`
    pub length: usize,
}

impl Word {
    pub fn new(text: impl Into<String>, definition: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self {
            text,
            definition: definition.into(),
            length,
        }
    }

    /// Placeholder handed out by an empty catalog
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_TEXT, "No words loaded")
    }

    pub fn is_sentinel(&self) -> bool {
        self.text == SENTINEL_TEXT
    }

    /// Difficulty tier 1-5 from word length
    pub fn difficulty(&self) -> u8 {
        match self.length {
            0..=4 => 1,
            5..=6 => 2,
            7..=8 => 3,
            9..=10 => 4,
            _ => 5,
        }
    }

    /// Parse one list line. Returns `None` for blank lines.
    fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_start();
        let mut parts = line.splitn(2, char::is_whitespace);
        let text = parts.next().filter(|t| !t.is_empty())?;
        let definition = parts.next().map(str::trim).unwrap_or_default();
        Some(Self::new(text, definition))
    }
}

/// Loaded vocabulary with uniform random draw
#[derive(Debug, Clone, Default)]
pub struct WordCatalog {
    words: Vec<Word>,
}

impl WordCatalog {
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Replace the catalog with the entries parsed from `source`.
    ///
    /// Lines without a word token are skipped. The previous contents are kept
    /// when nothing could be parsed. Returns whether any word was loaded.
    pub fn load_str(&mut self, source: &str) -> bool {
        let parsed: Vec<Word> = source.lines().filter_map(Word::parse_line).collect();
        if parsed.is_empty() {
            return false;
        }
        self.words = parsed;
        true
    }

    /// Load a word list file. A missing or empty list is an error because the
    /// game cannot run without vocabulary.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if !self.load_str(&source) {
            return Err(CatalogError::Empty {
                path: path.to_path_buf(),
            });
        }

        log::info!("Loaded {} words from {}", self.words.len(), path.display());
        Ok(self.words.len())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Uniformly pick a word.
    ///
    /// An empty catalog yields [`Word::sentinel`] instead of failing, so the
    /// spawner only has to check [`is_empty`](Self::is_empty) up front.
    pub fn draw_random<R: Rng>(&self, rng: &mut R) -> Word {
        if self.words.is_empty() {
            return Word::sentinel();
        }
        let index = rng.random_range(0..self.words.len());
        self.words[index].clone()
    }
}
