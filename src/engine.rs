use crate::metrics;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Policy for what happens to the cursor on a mistyped character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display, strum_macros::EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StopOnError {
    #[default]
    Off,
    Word,
    Letter,
}

/// Failure rules layered on top of normal typing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display, strum_macros::EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Normal,
    /// Fail the session when a word containing an error is left behind.
    Expert,
    /// Fail the session on any single incorrect keystroke.
    Master,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Untyped,
    Correct,
    Incorrect,
    Missed,
}

/// Per-position record of what was expected and what was typed there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharSlot {
    pub expected: char,
    pub typed: Option<char>,
    pub state: CharState,
}

impl CharSlot {
    fn new(expected: char) -> Self {
        Self {
            expected,
            typed: None,
            state: CharState::Untyped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailReason {
    WrongCharacter,
    WrongWord,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::WrongCharacter => write!(f, "wrong character"),
            FailReason::WrongWord => write!(f, "wrong word"),
        }
    }
}

/// One typing session against a fixed target string.
///
/// Owns all mutable per-session state: slot states, cursor, counters,
/// per-word extra characters and the per-second WPM samples. Driven by a
/// serialized stream of key / backspace / tick events from the caller.
#[derive(Debug)]
pub struct Session {
    slots: Vec<CharSlot>,
    // (start, end) offsets of each word in `slots`, end exclusive of the separator
    word_bounds: Vec<(usize, usize)>,
    cursor: usize,
    current_word: usize,
    extras: HashMap<usize, Vec<char>>,

    total_keystrokes: usize,
    correct_chars: usize,
    incorrect_chars: usize,
    extra_chars: usize,
    missed_chars: usize,
    wpm_samples: Vec<f64>,

    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    finished: bool,
    failed: Option<FailReason>,

    stop_on_error: StopOnError,
    freedom_mode: bool,
    difficulty: Difficulty,
}

impl Session {
    pub fn new(
        target: &str,
        stop_on_error: StopOnError,
        freedom_mode: bool,
        difficulty: Difficulty,
    ) -> Self {
        let slots: Vec<CharSlot> = target.chars().map(CharSlot::new).collect();

        let mut word_bounds = Vec::new();
        let mut pos = 0;
        for word in target.split(' ') {
            let len = word.chars().count();
            word_bounds.push((pos, pos + len));
            pos += len + 1; // skip the separator
        }

        Self {
            slots,
            word_bounds,
            cursor: 0,
            current_word: 0,
            extras: HashMap::new(),
            total_keystrokes: 0,
            correct_chars: 0,
            incorrect_chars: 0,
            extra_chars: 0,
            missed_chars: 0,
            wpm_samples: Vec::new(),
            started_at: None,
            ended_at: None,
            finished: false,
            failed: None,
            stop_on_error,
            freedom_mode,
            difficulty,
        }
    }

    /// Central state transition for a single typed character.
    pub fn handle_key(&mut self, key: char) {
        if self.is_terminal() {
            return;
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }

        self.total_keystrokes += 1;

        if self.cursor >= self.slots.len() {
            // Over-typing past the end of the target; attach to the last word.
            self.push_extra(self.current_word, key);
            return;
        }

        let expected = self.slots[self.cursor].expected;

        if expected == ' ' {
            if key == ' ' {
                self.miss_remaining_in_word(self.current_word);
                self.mark(self.cursor, key, CharState::Correct);
                self.cursor += 1;
                self.current_word += 1;
            } else {
                // Non-separator where the separator was expected.
                self.push_extra(self.current_word, key);
                if self.difficulty == Difficulty::Master {
                    self.fail(FailReason::WrongCharacter);
                }
            }
        } else if key == ' ' {
            // Early separator: skip the rest of the current word.
            let skipped = self.current_word;
            if let Some(&(_, end)) = self.word_bounds.get(skipped) {
                self.miss_remaining_in_word(skipped);
                if end < self.slots.len() {
                    self.mark(end, ' ', CharState::Correct);
                    self.cursor = end + 1;
                }
            }
            self.current_word += 1;
            if self.difficulty == Difficulty::Expert && self.word_has_error(skipped) {
                self.fail(FailReason::WrongWord);
            }
        } else if key == expected {
            self.mark(self.cursor, key, CharState::Correct);
            self.cursor += 1;
        } else {
            if self.stop_on_error == StopOnError::Letter {
                // Rejected outright; still counted in total keystrokes.
                return;
            }
            self.mark(self.cursor, key, CharState::Incorrect);
            if self.stop_on_error != StopOnError::Word {
                self.cursor += 1;
            }
            if self.difficulty == Difficulty::Master {
                self.fail(FailReason::WrongCharacter);
            }
        }

        if self.failed.is_none() && self.cursor >= self.slots.len() {
            self.finished = true;
            self.ended_at = Some(Instant::now());
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.is_terminal() || self.started_at.is_none() {
            return;
        }

        // Extras in the current word undo before anything else.
        if let Some(extras) = self.extras.get_mut(&self.current_word) {
            if extras.pop().is_some() {
                self.extra_chars -= 1;
                self.total_keystrokes = self.total_keystrokes.saturating_sub(1);
                return;
            }
        }

        if self.cursor == 0 {
            return;
        }

        if let Some(&(start, _)) = self.word_bounds.get(self.current_word) {
            if self.cursor == start {
                // Crossing the word boundary backwards needs freedom mode.
                if !self.freedom_mode || self.current_word == 0 {
                    return;
                }
                self.current_word -= 1;
                self.cursor -= 1;
                self.unmark(self.cursor);
                return;
            }
        }

        self.cursor -= 1;
        self.unmark(self.cursor);
    }

    /// Discards all progress within the current word, extras included.
    pub fn handle_ctrl_backspace(&mut self) {
        if self.is_terminal() || self.started_at.is_none() {
            return;
        }

        let Some(&(start, _)) = self.word_bounds.get(self.current_word) else {
            return;
        };

        if let Some(extras) = self.extras.remove(&self.current_word) {
            self.extra_chars -= extras.len();
        }

        while self.cursor > start {
            self.cursor -= 1;
            // Freedom mode can re-enter a word whose slots were marked
            // missed by a skip; those revert here too.
            self.unmark(self.cursor);
        }
    }

    /// Appends the current raw WPM to the sample series. Intended to be
    /// driven by an external ~1 Hz timer; the cadence is the caller's job.
    pub fn sample_wpm(&mut self) {
        if self.started_at.is_none() || self.is_terminal() {
            return;
        }
        let elapsed = self.elapsed_seconds();
        if elapsed <= 0.0 {
            return;
        }
        self.wpm_samples
            .push(metrics::raw_wpm(self.total_keystrokes, elapsed));
    }

    /// External termination (timer expiry, quit). Idempotent; everything
    /// still untyped becomes missed.
    pub fn finish(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.finished = true;
        self.ended_at = Some(Instant::now());
        for slot in &mut self.slots {
            if slot.state == CharState::Untyped {
                slot.state = CharState::Missed;
                self.missed_chars += 1;
            }
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        match self.started_at {
            None => 0.0,
            Some(start) => match self.ended_at {
                Some(end) => end.duration_since(start).as_secs_f64(),
                None => start.elapsed().as_secs_f64(),
            },
        }
    }

    pub fn raw_wpm(&self) -> f64 {
        metrics::raw_wpm(self.total_keystrokes, self.elapsed_seconds())
    }

    pub fn net_wpm(&self) -> f64 {
        metrics::net_wpm(self.correct_chars, self.elapsed_seconds())
    }

    pub fn accuracy(&self) -> f64 {
        metrics::accuracy(self.correct_chars, self.incorrect_chars, self.extra_chars)
    }

    pub fn consistency(&self) -> f64 {
        metrics::consistency(&self.wpm_samples)
    }

    /// Fraction of the target the cursor has passed, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }
        self.cursor as f64 / self.slots.len() as f64
    }

    /// (current word index, total word count)
    pub fn word_progress(&self) -> (usize, usize) {
        (self.current_word, self.word_bounds.len())
    }

    pub fn slots(&self) -> &[CharSlot] {
        &self.slots
    }

    pub fn word_bounds(&self) -> &[(usize, usize)] {
        &self.word_bounds
    }

    pub fn extras_for(&self, word: usize) -> &[char] {
        self.extras.get(&word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_word(&self) -> usize {
        self.current_word
    }

    pub fn total_keystrokes(&self) -> usize {
        self.total_keystrokes
    }

    pub fn correct_chars(&self) -> usize {
        self.correct_chars
    }

    pub fn incorrect_chars(&self) -> usize {
        self.incorrect_chars
    }

    pub fn extra_chars(&self) -> usize {
        self.extra_chars
    }

    pub fn missed_chars(&self) -> usize {
        self.missed_chars
    }

    pub fn wpm_samples(&self) -> &[f64] {
        &self.wpm_samples
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.finished
    }

    pub fn fail_reason(&self) -> Option<FailReason> {
        self.failed
    }

    pub fn is_terminal(&self) -> bool {
        self.finished || self.failed.is_some()
    }

    fn fail(&mut self, reason: FailReason) {
        self.failed = Some(reason);
        self.ended_at = Some(Instant::now());
    }

    fn push_extra(&mut self, word: usize, key: char) {
        self.extras.entry(word).or_default().push(key);
        self.extra_chars += 1;
    }

    fn mark(&mut self, idx: usize, typed: char, state: CharState) {
        // Revert whatever the slot previously contributed so re-marking
        // (frozen cursor under stop-on-word) cannot double count.
        let slot = &mut self.slots[idx];
        match slot.state {
            CharState::Correct => self.correct_chars -= 1,
            CharState::Incorrect => self.incorrect_chars -= 1,
            CharState::Missed => self.missed_chars -= 1,
            CharState::Untyped => {}
        }
        slot.typed = Some(typed);
        slot.state = state;
        match state {
            CharState::Correct => self.correct_chars += 1,
            CharState::Incorrect => self.incorrect_chars += 1,
            _ => {}
        }
    }

    fn unmark(&mut self, idx: usize) {
        let slot = &mut self.slots[idx];
        match slot.state {
            CharState::Correct => self.correct_chars -= 1,
            CharState::Incorrect => self.incorrect_chars -= 1,
            CharState::Missed => self.missed_chars -= 1,
            CharState::Untyped => {}
        }
        slot.state = CharState::Untyped;
        slot.typed = None;
    }

    fn miss_remaining_in_word(&mut self, word: usize) {
        let Some(&(_, end)) = self.word_bounds.get(word) else {
            return;
        };
        for i in self.cursor..end.min(self.slots.len()) {
            if self.slots[i].state == CharState::Untyped {
                self.slots[i].state = CharState::Missed;
                self.missed_chars += 1;
            }
        }
    }

    fn word_has_error(&self, word: usize) -> bool {
        let Some(&(start, end)) = self.word_bounds.get(word) else {
            return false;
        };
        self.slots[start..end.min(self.slots.len())]
            .iter()
            .any(|s| matches!(s.state, CharState::Incorrect | CharState::Missed))
    }
}
