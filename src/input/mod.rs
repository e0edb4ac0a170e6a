use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod answers;
pub mod buzzes;
pub mod guesses;
pub mod io;

use answers::parse_answers;
use buzzes::{parse_buzzes, parse_sweep};
use guesses::parse_guesses;
use io::read_text;

use crate::model::config::ConfigError;
use crate::model::guessers::GuesserSet;
use crate::model::question::{BuzzSequence, GuessRow, QuestionId, SweepEntry};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("[{fold}] missing artifact: {} (also tried .gz)", path.display())]
    MissingArtifact { fold: String, path: PathBuf },
    #[error("parse error in {} line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything one fold needs besides the shared guesser set and answers.
#[derive(Debug, Clone)]
pub struct FoldInputs {
    pub fold: String,
    pub guess_rows: BTreeMap<QuestionId, Vec<GuessRow>>,
    pub buzzes: BTreeMap<QuestionId, BuzzSequence>,
    pub sweep: Vec<SweepEntry>,
}

const SHARED_SCOPE: &str = "shared";

/// Finds `<name>` or `<name>.gz` under `input_dir`.
pub fn find_artifact(input_dir: &Path, name: &str) -> Option<PathBuf> {
    let plain = input_dir.join(name);
    if plain.exists() {
        return Some(plain);
    }
    let gz = input_dir.join(format!("{name}.gz"));
    if gz.exists() {
        return Some(gz);
    }
    None
}

fn require_artifact(input_dir: &Path, name: &str, fold: &str) -> Result<PathBuf, InputError> {
    find_artifact(input_dir, name).ok_or_else(|| InputError::MissingArtifact {
        fold: fold.to_string(),
        path: input_dir.join(name),
    })
}

pub fn load_guessers(input_dir: &Path) -> Result<GuesserSet, InputError> {
    let path = require_artifact(input_dir, "guessers.txt", SHARED_SCOPE)?;
    let text = read_text(&path)?;
    let names = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect::<Vec<_>>();
    let set = GuesserSet::new(names)?;
    crate::info!(
        "loaded {} guessers from {}: {}",
        set.len(),
        path.display(),
        set.names().join(",")
    );
    Ok(set)
}

pub fn load_answers(input_dir: &Path) -> Result<BTreeMap<QuestionId, String>, InputError> {
    let path = require_artifact(input_dir, "answers.tsv", SHARED_SCOPE)?;
    let answers = parse_answers(&path)?;
    crate::info!("loaded {} gold answers from {}", answers.len(), path.display());
    Ok(answers)
}

pub fn load_fold(input_dir: &Path, fold: &str) -> Result<FoldInputs, InputError> {
    let guesses_path = require_artifact(input_dir, &format!("guesses_{fold}.tsv"), fold)?;
    let buzzes_path = require_artifact(input_dir, &format!("buzzes_{fold}.json"), fold)?;

    crate::info!(
        "[{}] discovered input files: guesses={}, buzzes={}",
        fold,
        guesses_path.display(),
        buzzes_path.display()
    );

    let guess_rows = parse_guesses(&guesses_path)?;
    let buzzes = parse_buzzes(&buzzes_path)?;
    crate::info!(
        "[{}] {} questions with guesses, {} with buzz decisions",
        fold,
        guess_rows.len(),
        buzzes.len()
    );

    let sweep = match find_artifact(input_dir, &format!("cfg_buzzes_{fold}.json")) {
        Some(path) => {
            let entries = parse_sweep(&path)?;
            crate::info!(
                "[{}] loaded {} sweep configurations from {}",
                fold,
                entries.len(),
                path.display()
            );
            entries
        }
        None => {
            crate::debug!("[{}] no sweep configurations found", fold);
            Vec::new()
        }
    };

    Ok(FoldInputs {
        fold: fold.to_string(),
        guess_rows,
        buzzes,
        sweep,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
