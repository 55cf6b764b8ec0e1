//! Keyboard handling and match resolution

use super::state::{GameEngine, GamePhase};
use super::word::ActiveWord;

/// What a submit did
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Not running, or the buffer was empty
    Ignored,
    /// The buffer matched this word, which is now gone
    Correct(ActiveWord),
    /// Nothing on screen matched
    Wrong,
}

impl GameEngine {
    fn accepts_input(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Append a letter to the buffer. Anything but ASCII letters is dropped.
    pub fn handle_char_input(&mut self, c: char) {
        if !self.accepts_input() {
            return;
        }
        if c.is_ascii_alphabetic() {
            self.input.push(c.to_ascii_lowercase());
        }
    }

    pub fn handle_backspace(&mut self) {
        if !self.accepts_input() {
            return;
        }
        self.input.pop();
    }

    /// Submit the buffer. The buffer is cleared whatever the outcome.
    pub fn handle_space(&mut self) -> SubmitOutcome {
        if !self.accepts_input() || self.input.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let typed = std::mem::take(&mut self.input);
        match self.take_match(&typed) {
            Some(word) => {
                self.on_correct_match();
                log::debug!("Matched '{}' (combo {})", word.word.text, self.stats.current_combo);
                SubmitOutcome::Correct(word)
            }
            None => {
                self.on_wrong_match();
                log::debug!("No word matches '{typed}'");
                SubmitOutcome::Wrong
            }
        }
    }

    /// Remove and return the first visible word whose text equals `typed`,
    /// ignoring case. Duplicate texts resolve to the oldest spawn.
    fn take_match(&mut self, typed: &str) -> Option<ActiveWord> {
        let width = self.area_width as f32;
        let index = self
            .words
            .iter()
            .position(|w| w.is_visible(width) && w.word.text.eq_ignore_ascii_case(typed))?;
        Some(self.words.remove(index))
    }

    fn on_correct_match(&mut self) {
        self.stats
            .on_correct(self.settings.health_gain, self.settings.health_cap);
    }

    fn on_wrong_match(&mut self) {
        self.stats.on_wrong();
        self.flash_started = Some(self.elapsed_time());
    }
}
