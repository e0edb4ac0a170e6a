use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::config::EvalConfig;
use crate::model::guessers::GuesserSet;
use crate::model::question::{GuesserTable, QuestionId, SweepEntry};
use crate::model::stats::EopScalarKey;
use crate::pipeline::driver::Driver;
use crate::pipeline::stage2_eop::run_stage2;
use crate::pipeline::{PipelineError, ScoringContext};

/// Rush/late profile of one alternative buzzer configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub index: usize,
    pub config: serde_json::Value,
    pub rush: f64,
    pub late: f64,
    pub reward: f64,
    pub n_questions: usize,
    pub skipped: usize,
}

pub fn run_sweep(
    driver: &Driver,
    guessers: &GuesserSet,
    answers: &BTreeMap<QuestionId, String>,
    tables: &BTreeMap<QuestionId, GuesserTable>,
    entries: &[SweepEntry],
    config: &EvalConfig,
) -> Result<Vec<SweepPoint>, PipelineError> {
    let mut points = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        // a configuration is scored on the questions it covers
        let covered: BTreeMap<QuestionId, GuesserTable> = tables
            .iter()
            .filter(|(qnum, _)| entry.buzzes.contains_key(qnum))
            .map(|(qnum, table)| (*qnum, table.clone()))
            .collect();
        let ctx = ScoringContext {
            guessers,
            buzzes: &entry.buzzes,
            answers,
        };
        let stage = run_stage2(driver, &ctx, &covered, config)?;
        crate::debug!(
            "sweep config {}: rush={:.3} late={:.3}",
            index,
            stage.summary.mean(EopScalarKey::Rush.name()),
            stage.summary.mean(EopScalarKey::Late.name())
        );
        points.push(SweepPoint {
            index,
            config: entry.config.clone(),
            rush: stage.summary.mean(EopScalarKey::Rush.name()),
            late: stage.summary.mean(EopScalarKey::Late.name()),
            reward: stage.summary.mean(EopScalarKey::Reward.name()),
            n_questions: stage.records.len(),
            skipped: stage.skipped.len(),
        });
    }
    Ok(points)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/sweep.rs"]
mod tests;
