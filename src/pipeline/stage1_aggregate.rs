use std::collections::BTreeMap;

use crate::model::guessers::GuesserSet;
use crate::model::question::{GuessRow, GuesserTable, Position, QuestionId};
use crate::pipeline::driver::Driver;

#[derive(Debug, Clone)]
pub struct AggregatedQuestion {
    pub table: GuesserTable,
    pub unknown_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub tables: BTreeMap<QuestionId, GuesserTable>,
    pub unknown_rows: usize,
}

pub fn run_stage1(
    driver: &Driver,
    rows_by_question: &BTreeMap<QuestionId, Vec<GuessRow>>,
    guessers: &GuesserSet,
) -> Stage1Output {
    let aggregated = driver.map("top guesses", rows_by_question, |_, rows| {
        aggregate_question(rows, guessers)
    });

    let mut unknown_rows = 0usize;
    let mut tables = BTreeMap::new();
    for (qnum, question) in aggregated {
        unknown_rows += question.unknown_rows;
        tables.insert(qnum, question.table);
    }
    if unknown_rows > 0 {
        crate::debug!(
            "ignored {} guess rows from guessers outside the known set",
            unknown_rows
        );
    }
    Stage1Output {
        tables,
        unknown_rows,
    }
}

/// Condenses one question's rows into the top candidate of every known
/// guesser at every position that appears in the rows.
///
/// Among equal scores the earliest row wins; a NaN score only wins an empty
/// slot and loses to any later comparable score.
pub fn aggregate_question(rows: &[GuessRow], guessers: &GuesserSet) -> AggregatedQuestion {
    let n_guessers = guessers.len();
    let mut by_position: BTreeMap<Position, Vec<Option<(f64, &str)>>> = BTreeMap::new();
    let mut unknown_rows = 0usize;

    for row in rows {
        let slots = by_position
            .entry(row.position)
            .or_insert_with(|| vec![None; n_guessers]);
        let Some(g) = guessers.index_of(&row.guesser) else {
            unknown_rows += 1;
            continue;
        };
        let slot = &mut slots[g.0];
        let replace = match slot {
            None => true,
            Some((best, _)) => (best.is_nan() && !row.score.is_nan()) || row.score > *best,
        };
        if replace {
            *slot = Some((row.score, row.guess.as_str()));
        }
    }

    let length = by_position.len();
    let mut sequences: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(length); n_guessers];
    for slots in by_position.into_values() {
        for (g, slot) in slots.into_iter().enumerate() {
            sequences[g].push(slot.map(|(_, guess)| guess.to_string()));
        }
    }

    AggregatedQuestion {
        table: GuesserTable::new(sequences),
        unknown_rows,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_aggregate.rs"]
mod tests;
