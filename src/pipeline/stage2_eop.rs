use std::collections::BTreeMap;

use crate::model::config::{EvalConfig, RewardProfile};
use crate::model::guessers::{GuesserId, GuesserSet};
use crate::model::question::{Action, GuesserTable, QuestionId};
use crate::model::stats::EopRecord;
use crate::model::summary::CorpusSummary;
use crate::pipeline::driver::{Driver, SkippedQuestion, collect_outcomes};
use crate::pipeline::reduce::reduce_eop;
use crate::pipeline::{PipelineError, QuestionInput, ScoreError, ScoringContext};

#[derive(Debug, Clone)]
pub struct Stage2Output {
    pub records: BTreeMap<QuestionId, EopRecord>,
    pub skipped: Vec<SkippedQuestion>,
    pub summary: CorpusSummary,
}

pub fn run_stage2(
    driver: &Driver,
    ctx: &ScoringContext<'_>,
    tables: &BTreeMap<QuestionId, GuesserTable>,
    config: &EvalConfig,
) -> Result<Stage2Output, PipelineError> {
    let results = driver.map("end-of-pipeline stats", tables, |qnum, table| {
        ctx.question(qnum, table)
            .and_then(|q| score_eop(&q, ctx.guessers, &config.rewards))
    });
    let collected = collect_outcomes(results, config.mismatch)?;
    let summary = reduce_eop(driver, &collected.records, ctx.guessers, &config.rewards)?;
    Ok(Stage2Output {
        records: collected.records,
        skipped: collected.skipped,
        summary,
    })
}

/// Scores the buzzer's first committed decision on one question.
pub fn score_eop(
    question: &QuestionInput<'_>,
    guessers: &GuesserSet,
    rewards: &RewardProfile,
) -> Result<EopRecord, ScoreError> {
    question.aligned_length(guessers)?;

    let first_correct: Vec<Option<usize>> = guessers
        .ids()
        .map(|g| question.table.first_correct(g, question.answer))
        .collect();
    let correct = first_correct.iter().filter(|p| p.is_some()).count();
    let hopeful = correct > 0;
    // strict `<` keeps the lowest guesser index on ties
    let mut best: Option<(GuesserId, usize)> = None;
    for (idx, pos) in first_correct.iter().enumerate() {
        if let Some(pos) = *pos {
            if best.is_none_or(|(_, b)| pos < b) {
                best = Some((GuesserId(idx), pos));
            }
        }
    }

    let buzz = question
        .buzzes
        .scores()
        .iter()
        .enumerate()
        .find_map(|(pos, scores)| {
            Action::from_scores(scores, guessers.len())
                .guesser()
                .map(|g| (pos, g))
        });

    let mut record = EopRecord {
        buzz: buzz.is_some(),
        buzz_position: None,
        reward: rewards.silent,
        hopeful,
        correct,
        best_guesser: best.map(|(g, _)| g),
        choose_guesser: None,
        choose_hopeful: None,
        choose_best: None,
        rush: None,
        late: None,
        appropriate_silence: None,
        not_buzzing_when_shouldnt: None,
    };

    match buzz {
        None => {
            record.appropriate_silence = Some(!hopeful);
            record.not_buzzing_when_shouldnt = Some(hopeful);
        }
        Some((pos, chosen)) => {
            let chosen_first = first_correct[chosen.0];
            record.buzz_position = Some(pos);
            record.choose_guesser = Some(chosen);
            record.choose_hopeful = Some(chosen_first.is_some());
            record.reward = match chosen_first {
                Some(first) if pos >= first => rewards.honest,
                _ => rewards.premature,
            };
            if let Some((best_guesser, best_pos)) = best {
                record.choose_best = Some(chosen == best_guesser);
                record.late = Some(pos.saturating_sub(best_pos));
                record.rush = Some(best_pos.saturating_sub(pos));
            }
        }
    }

    Ok(record)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_eop.rs"]
mod tests;
