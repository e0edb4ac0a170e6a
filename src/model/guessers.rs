use std::fmt;

use serde::Serialize;

use crate::model::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GuesserId(pub usize);

impl fmt::Display for GuesserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed, ordered set of known guessers shared by every question of a run.
///
/// Action-score vectors carry one slot per guesser in this order, followed by
/// the "wait" slot at index `len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GuesserSet {
    names: Vec<String>,
}

impl GuesserSet {
    pub fn new(names: Vec<String>) -> Result<Self, ConfigError> {
        let names = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>();
        if names.is_empty() {
            return Err(ConfigError::EmptyGuesserSet);
        }
        for (idx, name) in names.iter().enumerate() {
            if names[..idx].contains(name) {
                return Err(ConfigError::DuplicateGuesser(name.clone()));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Width of a well-formed action-score vector.
    pub fn action_width(&self) -> usize {
        self.names.len() + 1
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, id: GuesserId) -> &str {
        self.names.get(id.0).map(String::as_str).unwrap_or("?")
    }

    pub fn index_of(&self, name: &str) -> Option<GuesserId> {
        self.names.iter().position(|n| n == name).map(GuesserId)
    }

    pub fn ids(&self) -> impl Iterator<Item = GuesserId> + '_ {
        (0..self.names.len()).map(GuesserId)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/guessers.rs"]
mod tests;
