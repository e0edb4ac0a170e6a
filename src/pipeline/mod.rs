use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

pub mod driver;
pub mod reduce;
pub mod stage1_aggregate;
pub mod stage2_eop;
pub mod stage3_histogram;
pub mod stage4_report;
pub mod sweep;

use driver::{Driver, SkippedQuestion};
use reduce::ReduceError;
use stage1_aggregate::run_stage1;
use stage2_eop::run_stage2;
use stage3_histogram::run_stage3;
use sweep::{SweepPoint, run_sweep};

use crate::input::FoldInputs;
use crate::model::config::EvalConfig;
use crate::model::guessers::GuesserSet;
use crate::model::question::{BuzzSequence, GuesserTable, QuestionId};
use crate::model::stats::EopRecord;
use crate::model::summary::{CorpusSummary, HistogramSummary};

/// Per-question failure. Handled by the driver according to the configured
/// mismatch policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("question {qnum}: buzz sequence has {buzzes} positions but guesses have {guesses}")]
    LengthMismatch {
        qnum: QuestionId,
        buzzes: usize,
        guesses: usize,
    },
    #[error(
        "question {qnum}: action vector at position {position} has {found} entries, expected {expected}"
    )]
    ActionWidth {
        qnum: QuestionId,
        position: usize,
        expected: usize,
        found: usize,
    },
    #[error("question {0}: no buzz decisions")]
    MissingBuzzes(QuestionId),
    #[error("question {0}: no gold answer")]
    MissingAnswer(QuestionId),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("aborting run: {0}")]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Reduce(#[from] ReduceError),
}

/// Read-only inputs shared by every per-question worker of one fold.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub guessers: &'a GuesserSet,
    pub buzzes: &'a BTreeMap<QuestionId, BuzzSequence>,
    pub answers: &'a BTreeMap<QuestionId, String>,
}

impl<'a> ScoringContext<'a> {
    pub fn question<'t>(
        &self,
        qnum: QuestionId,
        table: &'t GuesserTable,
    ) -> Result<QuestionInput<'t>, ScoreError>
    where
        'a: 't,
    {
        let buzzes = self
            .buzzes
            .get(&qnum)
            .ok_or(ScoreError::MissingBuzzes(qnum))?;
        let answer = self
            .answers
            .get(&qnum)
            .ok_or(ScoreError::MissingAnswer(qnum))?;
        Ok(QuestionInput {
            qnum,
            table,
            buzzes,
            answer: answer.as_str(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuestionInput<'a> {
    pub qnum: QuestionId,
    pub table: &'a GuesserTable,
    pub buzzes: &'a BuzzSequence,
    pub answer: &'a str,
}

impl QuestionInput<'_> {
    /// Question length, after checking the buzz sequence against every
    /// populated guesser sequence and every action vector's width.
    pub fn aligned_length(&self, guessers: &GuesserSet) -> Result<usize, ScoreError> {
        let length = self.buzzes.len();
        for (_, guesses) in self.table.populated_lengths() {
            if guesses != length {
                return Err(ScoreError::LengthMismatch {
                    qnum: self.qnum,
                    buzzes: length,
                    guesses,
                });
            }
        }
        let expected = guessers.action_width();
        for (position, scores) in self.buzzes.scores().iter().enumerate() {
            if scores.len() != expected {
                return Err(ScoreError::ActionWidth {
                    qnum: self.qnum,
                    position,
                    expected,
                    found: scores.len(),
                });
            }
        }
        Ok(length)
    }
}

/// Everything computed for one fold.
#[derive(Debug, Clone, Serialize)]
pub struct FoldEvaluation {
    pub fold: String,
    pub n_questions: usize,
    pub unknown_guesser_rows: usize,
    pub eop: CorpusSummary,
    pub histogram: HistogramSummary,
    pub sweep: Vec<SweepPoint>,
    pub skipped: Vec<SkippedQuestion>,
    #[serde(skip)]
    pub eop_records: BTreeMap<QuestionId, EopRecord>,
}

pub fn evaluate_fold(
    driver: &Driver,
    guessers: &GuesserSet,
    answers: &BTreeMap<QuestionId, String>,
    inputs: &FoldInputs,
    config: &EvalConfig,
) -> Result<FoldEvaluation, PipelineError> {
    let fold = inputs.fold.as_str();
    let started = Instant::now();

    let stage1 = run_stage1(driver, &inputs.guess_rows, guessers);
    crate::info!(
        "[{}] top guesses aggregated for {} questions in {:.2?}",
        fold,
        stage1.tables.len(),
        started.elapsed()
    );

    let ctx = ScoringContext {
        guessers,
        buzzes: &inputs.buzzes,
        answers,
    };

    crate::info!("[{}] end-of-pipeline reporting", fold);
    let stage2 = run_stage2(driver, &ctx, &stage1.tables, config)?;

    crate::info!("[{}] histogram reporting", fold);
    let stage3 = run_stage3(driver, &ctx, &stage1.tables, config)?;

    let sweep = if inputs.sweep.is_empty() {
        Vec::new()
    } else {
        crate::info!("[{}] configuration sweep reporting", fold);
        run_sweep(driver, guessers, answers, &stage1.tables, &inputs.sweep, config)?
    };

    let mut skipped: BTreeMap<QuestionId, SkippedQuestion> = BTreeMap::new();
    for s in stage2.skipped.iter().chain(stage3.skipped.iter()) {
        skipped.entry(s.qnum).or_insert_with(|| s.clone());
    }

    crate::info!(
        "[{}] evaluated {} questions ({} skipped) in {:.2?}",
        fold,
        stage2.records.len(),
        skipped.len(),
        started.elapsed()
    );

    Ok(FoldEvaluation {
        fold: fold.to_string(),
        n_questions: stage1.tables.len(),
        unknown_guesser_rows: stage1.unknown_rows,
        eop: stage2.summary,
        histogram: stage3.summary,
        sweep,
        skipped: skipped.into_values().collect(),
        eop_records: stage2.records,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
