use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::config::{Checkpoints, RewardProfile};
use crate::model::guessers::{GuesserId, GuesserSet};
use crate::model::question::QuestionId;
use crate::model::stats::{
    EopRecord, HistogramKey, HistogramRecord, Outcome, eop_categorical_order, eop_scalar_order,
};
use crate::model::summary::{
    CategoricalStat, CorpusSummary, GuesserCount, HistogramSeries, HistogramSummary, ScalarStat,
};
use crate::pipeline::driver::Driver;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    #[error("question {qnum}: inconsistent stat record: {message}")]
    InvariantViolation { qnum: QuestionId, message: String },
}

/// Exact integer mean; a key with no applicable questions reports 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanAccumulator {
    pub sum: i64,
    pub n: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: Option<i64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    pub fn merge(&mut self, other: &MeanAccumulator) {
        self.sum += other.sum;
        self.n += other.n;
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum as f64 / self.n as f64
        }
    }
}

/// Order-independent fold state for end-of-pipeline records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EopAccumulator {
    n_questions: usize,
    scalars: Vec<MeanAccumulator>,
    // [categorical key][guesser]
    counts: Vec<Vec<usize>>,
}

impl EopAccumulator {
    pub fn new(guessers: &GuesserSet) -> Self {
        Self {
            n_questions: 0,
            scalars: vec![MeanAccumulator::default(); eop_scalar_order().len()],
            counts: vec![vec![0; guessers.len()]; eop_categorical_order().len()],
        }
    }

    pub fn add(&mut self, record: &EopRecord) {
        self.n_questions += 1;
        for (acc, key) in self.scalars.iter_mut().zip(eop_scalar_order()) {
            acc.push(record.scalar(*key));
        }
        for (counts, key) in self.counts.iter_mut().zip(eop_categorical_order()) {
            if let Some(g) = record.category(*key) {
                if let Some(slot) = counts.get_mut(g.0) {
                    *slot += 1;
                }
            }
        }
    }

    pub fn merge(&mut self, other: &EopAccumulator) {
        self.n_questions += other.n_questions;
        for (a, b) in self.scalars.iter_mut().zip(&other.scalars) {
            a.merge(b);
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            for (x, y) in a.iter_mut().zip(b) {
                *x += *y;
            }
        }
    }

    pub fn finish(&self, guessers: &GuesserSet) -> CorpusSummary {
        let scalars = eop_scalar_order()
            .iter()
            .zip(&self.scalars)
            .map(|(key, acc)| ScalarStat {
                key: key.name(),
                mean: acc.mean(),
                n: acc.n,
            })
            .collect();
        let categoricals = eop_categorical_order()
            .iter()
            .zip(&self.counts)
            .map(|(key, counts)| CategoricalStat {
                key: key.name(),
                counts: guessers
                    .ids()
                    .map(|g| GuesserCount {
                        guesser: guessers.name(g).to_string(),
                        count: counts.get(g.0).copied().unwrap_or(0),
                    })
                    .collect(),
            })
            .collect();
        CorpusSummary {
            n_questions: self.n_questions,
            scalars,
            categoricals,
        }
    }
}

/// Order-independent fold state for histogram records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramAccumulator {
    keys: Vec<HistogramKey>,
    n_questions: usize,
    // [key][checkpoint]
    cells: Vec<Vec<MeanAccumulator>>,
}

impl HistogramAccumulator {
    pub fn new(guessers: &GuesserSet, checkpoints: &Checkpoints) -> Self {
        let keys = HistogramKey::ordered(guessers);
        let cells = vec![vec![MeanAccumulator::default(); checkpoints.len()]; keys.len()];
        Self {
            keys,
            n_questions: 0,
            cells,
        }
    }

    pub fn add(&mut self, record: &HistogramRecord) {
        self.n_questions += 1;
        for (key, row) in self.keys.iter().zip(self.cells.iter_mut()) {
            for (cell, stats) in row.iter_mut().zip(&record.checkpoints) {
                cell.push(Some(stats.value(*key) as i64));
            }
        }
    }

    pub fn merge(&mut self, other: &HistogramAccumulator) {
        self.n_questions += other.n_questions;
        for (a, b) in self.cells.iter_mut().zip(&other.cells) {
            for (x, y) in a.iter_mut().zip(b) {
                x.merge(y);
            }
        }
    }

    pub fn finish(&self, guessers: &GuesserSet, checkpoints: &Checkpoints) -> HistogramSummary {
        let series = self
            .keys
            .iter()
            .zip(&self.cells)
            .map(|(key, row)| HistogramSeries {
                key: key.name(guessers),
                values: row.iter().map(MeanAccumulator::mean).collect(),
            })
            .collect();
        HistogramSummary {
            n_questions: self.n_questions,
            checkpoints: checkpoints.values().to_vec(),
            series,
        }
    }
}

/// Checks every record in qnum order, then sums them on the worker pool.
pub fn reduce_eop(
    driver: &Driver,
    records: &BTreeMap<QuestionId, EopRecord>,
    guessers: &GuesserSet,
    rewards: &RewardProfile,
) -> Result<CorpusSummary, ReduceError> {
    for (qnum, record) in records {
        check_eop_record(*qnum, record, guessers, rewards)?;
    }
    let acc = driver.fold(
        records,
        || EopAccumulator::new(guessers),
        |mut acc, record| {
            acc.add(record);
            acc
        },
        |mut left, right| {
            left.merge(&right);
            left
        },
    );
    Ok(acc.finish(guessers))
}

pub fn reduce_histogram(
    driver: &Driver,
    records: &BTreeMap<QuestionId, HistogramRecord>,
    guessers: &GuesserSet,
    checkpoints: &Checkpoints,
) -> Result<HistogramSummary, ReduceError> {
    for (qnum, record) in records {
        check_histogram_record(*qnum, record, guessers, checkpoints)?;
    }
    let acc = driver.fold(
        records,
        || HistogramAccumulator::new(guessers, checkpoints),
        |mut acc, record| {
            acc.add(record);
            acc
        },
        |mut left, right| {
            left.merge(&right);
            left
        },
    );
    Ok(acc.finish(guessers, checkpoints))
}

fn violation(qnum: QuestionId, message: impl Into<String>) -> ReduceError {
    ReduceError::InvariantViolation {
        qnum,
        message: message.into(),
    }
}

/// Branch consistency of one record: silent questions carry only the
/// silence flags, buzzed questions only the choice fields.
pub fn check_eop_record(
    qnum: QuestionId,
    record: &EopRecord,
    guessers: &GuesserSet,
    rewards: &RewardProfile,
) -> Result<(), ReduceError> {
    if !rewards.is_valid_reward(record.reward, record.buzz) {
        return Err(violation(
            qnum,
            format!("reward {} with buzz={}", record.reward, record.buzz),
        ));
    }
    if record.hopeful != (record.correct > 0) || record.hopeful != record.best_guesser.is_some() {
        return Err(violation(qnum, "hopeful disagrees with correct/best_guesser"));
    }
    if record.correct > guessers.len() {
        return Err(violation(qnum, "more correct guessers than known guessers"));
    }
    let in_range = |g: Option<GuesserId>| g.is_none_or(|g| g.0 < guessers.len());
    if !in_range(record.best_guesser) || !in_range(record.choose_guesser) {
        return Err(violation(qnum, "guesser index outside the known set"));
    }

    if record.buzz {
        if record.choose_guesser.is_none()
            || record.choose_hopeful.is_none()
            || record.buzz_position.is_none()
        {
            return Err(violation(qnum, "buzzed record without a chosen guesser"));
        }
        if record.appropriate_silence.is_some() || record.not_buzzing_when_shouldnt.is_some() {
            return Err(violation(qnum, "buzzed record carries silence flags"));
        }
        let timing_set = [
            record.choose_best.is_some(),
            record.rush.is_some(),
            record.late.is_some(),
        ];
        if timing_set.iter().any(|&s| s != record.hopeful) {
            return Err(violation(qnum, "timing fields must be set iff hopeful"));
        }
        if record.rush.unwrap_or(0) > 0 && record.late.unwrap_or(0) > 0 {
            return Err(violation(qnum, "both rush and late are nonzero"));
        }
    } else {
        if record.choose_guesser.is_some()
            || record.choose_hopeful.is_some()
            || record.choose_best.is_some()
            || record.rush.is_some()
            || record.late.is_some()
            || record.buzz_position.is_some()
        {
            return Err(violation(qnum, "silent record carries choice fields"));
        }
        if record.appropriate_silence != Some(!record.hopeful)
            || record.not_buzzing_when_shouldnt != Some(record.hopeful)
        {
            return Err(violation(qnum, "silence flags disagree with hopeful"));
        }
    }
    Ok(())
}

pub fn check_histogram_record(
    qnum: QuestionId,
    record: &HistogramRecord,
    guessers: &GuesserSet,
    checkpoints: &Checkpoints,
) -> Result<(), ReduceError> {
    if record.checkpoints.len() != checkpoints.len() {
        return Err(violation(
            qnum,
            format!(
                "{} checkpoint entries, expected {}",
                record.checkpoints.len(),
                checkpoints.len()
            ),
        ));
    }
    for stats in &record.checkpoints {
        if stats.acc_by_guesser.len() != guessers.len()
            || stats.buzz_by_guesser.len() != guessers.len()
        {
            return Err(violation(qnum, "per-guesser histogram width mismatch"));
        }
        let consistent = match stats.outcome {
            Outcome::Correct => stats.acc && stats.buzz,
            Outcome::WrongHopeful => stats.acc,
            Outcome::WrongHopeless => !stats.acc,
        };
        if !consistent {
            return Err(violation(qnum, "outcome disagrees with accuracy/buzz"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/reduce.rs"]
mod tests;
