use std::collections::BTreeMap;

use crate::model::config::{Checkpoints, EvalConfig};
use crate::model::guessers::GuesserSet;
use crate::model::question::{Action, GuesserTable, QuestionId};
use crate::model::stats::{CheckpointStats, HistogramRecord, Outcome};
use crate::model::summary::HistogramSummary;
use crate::pipeline::driver::{Driver, SkippedQuestion, collect_outcomes};
use crate::pipeline::reduce::reduce_histogram;
use crate::pipeline::{PipelineError, QuestionInput, ScoreError, ScoringContext};

#[derive(Debug, Clone)]
pub struct Stage3Output {
    pub skipped: Vec<SkippedQuestion>,
    pub summary: HistogramSummary,
}

pub fn run_stage3(
    driver: &Driver,
    ctx: &ScoringContext<'_>,
    tables: &BTreeMap<QuestionId, GuesserTable>,
    config: &EvalConfig,
) -> Result<Stage3Output, PipelineError> {
    let results = driver.map("histogram stats", tables, |qnum, table| {
        ctx.question(qnum, table)
            .and_then(|q| score_histogram(&q, ctx.guessers, &config.checkpoints))
    });
    let collected = collect_outcomes(results, config.mismatch)?;
    let summary = reduce_histogram(driver, &collected.records, ctx.guessers, &config.checkpoints)?;
    Ok(Stage3Output {
        skipped: collected.skipped,
        summary,
    })
}

/// Evaluates accuracy, buzz activity and buzzer outcome on the prefix
/// `[0, floor(length * r))` for every checkpoint `r`.
pub fn score_histogram(
    question: &QuestionInput<'_>,
    guessers: &GuesserSet,
    checkpoints: &Checkpoints,
) -> Result<HistogramRecord, ScoreError> {
    let length = question.aligned_length(guessers)?;
    let n_guessers = guessers.len();
    let actions = question.buzzes.actions(n_guessers);

    // [position][guesser]
    let guesser_correct: Vec<Vec<bool>> = (0..length)
        .map(|pos| {
            guessers
                .ids()
                .map(|g| question.table.is_correct(g, pos, question.answer))
                .collect()
        })
        .collect();
    let buzzer_correct: Vec<bool> = actions
        .iter()
        .enumerate()
        .map(|(pos, action)| match action {
            Action::Buzz(g) => guesser_correct[pos][g.0],
            Action::Wait => false,
        })
        .collect();

    let mut out = Vec::with_capacity(checkpoints.len());
    for &ratio in checkpoints.values() {
        let end = Checkpoints::prefix_end(ratio, length).min(length);

        let mut acc_by_guesser = vec![false; n_guessers];
        let mut buzz_by_guesser = vec![false; n_guessers];
        let mut buzzer_right = false;
        for pos in 0..end {
            for (g, &right) in guesser_correct[pos].iter().enumerate() {
                acc_by_guesser[g] |= right;
            }
            if let Action::Buzz(g) = actions[pos] {
                buzz_by_guesser[g.0] = true;
            }
            buzzer_right |= buzzer_correct[pos];
        }
        let acc = acc_by_guesser.iter().any(|&v| v);
        let buzz = buzz_by_guesser.iter().any(|&v| v);

        out.push(CheckpointStats {
            acc,
            buzz,
            acc_by_guesser,
            buzz_by_guesser,
            outcome: Outcome::classify(buzzer_right, acc),
        });
    }

    Ok(HistogramRecord { checkpoints: out })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_histogram.rs"]
mod tests;
