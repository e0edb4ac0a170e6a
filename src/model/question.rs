use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::guessers::GuesserId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuestionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(QuestionId)
    }
}

/// Token position inside a question, ordered sentence-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub sentence: u32,
    pub token: u32,
}

/// One scored candidate from the raw guess table.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessRow {
    pub position: Position,
    pub guesser: String,
    pub guess: String,
    pub score: f64,
}

/// Top candidate of every known guesser at every position of one question.
///
/// Indexed `[guesser][position]`; `None` marks a position where the guesser
/// produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuesserTable {
    sequences: Vec<Vec<Option<String>>>,
}

impl GuesserTable {
    pub fn new(sequences: Vec<Vec<Option<String>>>) -> Self {
        Self { sequences }
    }

    pub fn sequence(&self, guesser: GuesserId) -> &[Option<String>] {
        self.sequences
            .get(guesser.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn guess(&self, guesser: GuesserId, position: usize) -> Option<&str> {
        self.sequences
            .get(guesser.0)
            .and_then(|s| s.get(position))
            .and_then(|g| g.as_deref())
    }

    /// Lengths of every guesser sequence that holds at least one slot.
    pub fn populated_lengths(&self) -> impl Iterator<Item = (GuesserId, usize)> + '_ {
        self.sequences
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(idx, s)| (GuesserId(idx), s.len()))
    }

    pub fn first_correct(&self, guesser: GuesserId, answer: &str) -> Option<usize> {
        self.sequence(guesser)
            .iter()
            .position(|g| g.as_deref() == Some(answer))
    }

    pub fn is_correct(&self, guesser: GuesserId, position: usize, answer: &str) -> bool {
        self.guess(guesser, position) == Some(answer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buzz(GuesserId),
    Wait,
}

impl Action {
    /// Index of the first maximal score; the slot at `n_guessers` is "wait".
    /// NaN never wins, and an all-NaN vector waits.
    pub fn from_scores(scores: &[f64], n_guessers: usize) -> Self {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &v) in scores.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((idx, v)),
            }
        }
        match best {
            Some((idx, _)) if idx < n_guessers => Action::Buzz(GuesserId(idx)),
            _ => Action::Wait,
        }
    }

    pub fn guesser(self) -> Option<GuesserId> {
        match self {
            Action::Buzz(g) => Some(g),
            Action::Wait => None,
        }
    }
}

/// Per-position action-score vectors produced by the buzzer for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuzzSequence {
    scores: Vec<Vec<f64>>,
}

impl BuzzSequence {
    pub fn new(scores: Vec<Vec<f64>>) -> Self {
        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn scores(&self) -> &[Vec<f64>] {
        &self.scores
    }

    pub fn actions(&self, n_guessers: usize) -> Vec<Action> {
        self.scores
            .iter()
            .map(|s| Action::from_scores(s, n_guessers))
            .collect()
    }
}

/// One alternative buzzer configuration evaluated by the sweep report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SweepEntry {
    #[serde(default)]
    pub config: serde_json::Value,
    pub buzzes: BTreeMap<QuestionId, BuzzSequence>,
}

/// Canonical answer form shared by gold answers and guesses.
///
/// Whitespace runs collapse to a single `_`, so `"a  b"` becomes `"a_b"`
/// rather than one underscore per space.
pub fn normalize_answer(raw: &str) -> String {
    raw.replace([':', '|'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/question.rs"]
mod tests;
