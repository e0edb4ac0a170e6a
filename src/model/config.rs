use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("guesser set is empty")]
    EmptyGuesserSet,
    #[error("duplicate guesser name: {0}")]
    DuplicateGuesser(String),
    #[error("checkpoint list is empty")]
    EmptyCheckpoints,
    #[error("checkpoint {0} is outside [0, 1]")]
    CheckpointOutOfRange(f64),
    #[error("checkpoints must be strictly increasing ({prev} then {next})")]
    CheckpointOrder { prev: f64, next: f64 },
}

/// Rewards assigned to the buzzer's single final decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardProfile {
    /// Buzz at or after the chosen guesser's first-correct position.
    pub honest: i32,
    /// Buzz before the chosen guesser was ever correct.
    pub premature: i32,
    pub silent: i32,
}

impl RewardProfile {
    pub fn default_v1() -> Self {
        Self {
            honest: 10,
            premature: -5,
            silent: 0,
        }
    }

    pub fn is_valid_reward(&self, reward: i32, buzzed: bool) -> bool {
        if buzzed {
            reward == self.honest || reward == self.premature
        } else {
            reward == self.silent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Drop the failing question from every aggregate and report it.
    Skip,
    /// Fail the whole run on the failing question with the smallest qnum.
    Abort,
}

/// Fractions of question length at which histogram stats are taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Checkpoints(Vec<f64>);

impl Checkpoints {
    pub fn new(values: Vec<f64>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptyCheckpoints);
        }
        for &v in &values {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::CheckpointOutOfRange(v));
            }
        }
        for pair in values.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ConfigError::CheckpointOrder {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self(values))
    }

    pub fn default_v1() -> Self {
        Self(vec![0.0, 0.25, 0.5, 0.75, 1.0])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Exclusive prefix end for a question of `length` positions.
    pub fn prefix_end(ratio: f64, length: usize) -> usize {
        ((length as f64) * ratio).floor() as usize
    }
}

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub checkpoints: Checkpoints,
    pub rewards: RewardProfile,
    pub mismatch: MismatchPolicy,
    pub threads: usize,
}

impl EvalConfig {
    pub fn default_v1() -> Self {
        Self {
            checkpoints: Checkpoints::default_v1(),
            rewards: RewardProfile::default_v1(),
            mismatch: MismatchPolicy::Skip,
            threads: 0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/config.rs"]
mod tests;
