use serde::Serialize;

use crate::model::guessers::{GuesserId, GuesserSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EopScalarKey {
    Buzz,
    ChooseBest,
    ChooseHopeful,
    Rush,
    Late,
    NotBuzzingWhenShouldnt,
    AppropriateSilence,
    Reward,
    Hopeful,
    Correct,
}

impl EopScalarKey {
    pub fn name(self) -> &'static str {
        match self {
            EopScalarKey::Buzz => "buzz",
            EopScalarKey::ChooseBest => "choose_best",
            EopScalarKey::ChooseHopeful => "choose_hopeful",
            EopScalarKey::Rush => "rush",
            EopScalarKey::Late => "late",
            EopScalarKey::NotBuzzingWhenShouldnt => "not_buzzing_when_shouldnt",
            EopScalarKey::AppropriateSilence => "appropriate_silence",
            EopScalarKey::Reward => "reward",
            EopScalarKey::Hopeful => "hopeful",
            EopScalarKey::Correct => "correct",
        }
    }
}

pub fn eop_scalar_order() -> &'static [EopScalarKey] {
    &[
        EopScalarKey::Buzz,
        EopScalarKey::ChooseBest,
        EopScalarKey::ChooseHopeful,
        EopScalarKey::Rush,
        EopScalarKey::Late,
        EopScalarKey::NotBuzzingWhenShouldnt,
        EopScalarKey::AppropriateSilence,
        EopScalarKey::Reward,
        EopScalarKey::Hopeful,
        EopScalarKey::Correct,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EopCategoricalKey {
    ChooseGuesser,
    BestGuesser,
}

impl EopCategoricalKey {
    pub fn name(self) -> &'static str {
        match self {
            EopCategoricalKey::ChooseGuesser => "choose_guesser",
            EopCategoricalKey::BestGuesser => "best_guesser",
        }
    }
}

pub fn eop_categorical_order() -> &'static [EopCategoricalKey] {
    &[EopCategoricalKey::ChooseGuesser, EopCategoricalKey::BestGuesser]
}

/// End-of-pipeline outcome of one question. `None` means the field does not
/// apply to the branch the question took and must stay out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EopRecord {
    pub buzz: bool,
    pub buzz_position: Option<usize>,
    pub reward: i32,
    pub hopeful: bool,
    pub correct: usize,
    pub best_guesser: Option<GuesserId>,
    pub choose_guesser: Option<GuesserId>,
    pub choose_hopeful: Option<bool>,
    pub choose_best: Option<bool>,
    pub rush: Option<usize>,
    pub late: Option<usize>,
    pub appropriate_silence: Option<bool>,
    pub not_buzzing_when_shouldnt: Option<bool>,
}

impl EopRecord {
    pub fn scalar(&self, key: EopScalarKey) -> Option<i64> {
        match key {
            EopScalarKey::Buzz => Some(self.buzz as i64),
            EopScalarKey::ChooseBest => self.choose_best.map(i64::from),
            EopScalarKey::ChooseHopeful => self.choose_hopeful.map(i64::from),
            EopScalarKey::Rush => self.rush.map(|v| v as i64),
            EopScalarKey::Late => self.late.map(|v| v as i64),
            EopScalarKey::NotBuzzingWhenShouldnt => self.not_buzzing_when_shouldnt.map(i64::from),
            EopScalarKey::AppropriateSilence => self.appropriate_silence.map(i64::from),
            EopScalarKey::Reward => Some(self.reward as i64),
            EopScalarKey::Hopeful => Some(self.hopeful as i64),
            EopScalarKey::Correct => Some(self.correct as i64),
        }
    }

    pub fn category(&self, key: EopCategoricalKey) -> Option<GuesserId> {
        match key {
            EopCategoricalKey::ChooseGuesser => self.choose_guesser,
            EopCategoricalKey::BestGuesser => self.best_guesser,
        }
    }
}

/// Mutually exclusive buzzer outcome inside a question prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    WrongHopeful,
    WrongHopeless,
}

impl Outcome {
    pub fn classify(buzzer_correct: bool, any_guesser_correct: bool) -> Self {
        if buzzer_correct {
            Outcome::Correct
        } else if any_guesser_correct {
            Outcome::WrongHopeful
        } else {
            Outcome::WrongHopeless
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointStats {
    pub acc: bool,
    pub buzz: bool,
    pub acc_by_guesser: Vec<bool>,
    pub buzz_by_guesser: Vec<bool>,
    pub outcome: Outcome,
}

impl CheckpointStats {
    pub fn value(&self, key: HistogramKey) -> bool {
        match key {
            HistogramKey::Acc => self.acc,
            HistogramKey::Buzz => self.buzz,
            HistogramKey::AccBy(g) => self.acc_by_guesser.get(g.0).copied().unwrap_or(false),
            HistogramKey::BuzzBy(g) => self.buzz_by_guesser.get(g.0).copied().unwrap_or(false),
            HistogramKey::Correct => self.outcome == Outcome::Correct,
            HistogramKey::WrongHopeful => self.outcome == Outcome::WrongHopeful,
            HistogramKey::WrongHopeless => self.outcome == Outcome::WrongHopeless,
        }
    }
}

/// Histogram stats of one question, one entry per configured checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramRecord {
    pub checkpoints: Vec<CheckpointStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistogramKey {
    Acc,
    Buzz,
    AccBy(GuesserId),
    BuzzBy(GuesserId),
    Correct,
    WrongHopeful,
    WrongHopeless,
}

impl HistogramKey {
    /// Accuracy and buzz-rate keys, drawn as lines.
    pub fn rate_keys(guessers: &GuesserSet) -> Vec<HistogramKey> {
        let mut keys = vec![HistogramKey::Acc, HistogramKey::Buzz];
        keys.extend(guessers.ids().map(HistogramKey::AccBy));
        keys.extend(guessers.ids().map(HistogramKey::BuzzBy));
        keys
    }

    pub fn outcome_keys() -> [HistogramKey; 3] {
        [
            HistogramKey::Correct,
            HistogramKey::WrongHopeful,
            HistogramKey::WrongHopeless,
        ]
    }

    pub fn ordered(guessers: &GuesserSet) -> Vec<HistogramKey> {
        let mut keys = Self::rate_keys(guessers);
        keys.extend(Self::outcome_keys());
        keys
    }

    pub fn name(self, guessers: &GuesserSet) -> String {
        match self {
            HistogramKey::Acc => "acc".to_string(),
            HistogramKey::Buzz => "buzz".to_string(),
            HistogramKey::AccBy(g) => format!("acc_{}", guessers.name(g)),
            HistogramKey::BuzzBy(g) => format!("buzz_{}", guessers.name(g)),
            HistogramKey::Correct => "correct".to_string(),
            HistogramKey::WrongHopeful => "wrong_hopeful".to_string(),
            HistogramKey::WrongHopeless => "wrong_hopeless".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/stats.rs"]
mod tests;
