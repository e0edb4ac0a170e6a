use std::collections::BTreeMap;
use std::path::Path;

use crate::input::InputError;
use crate::input::io::read_artifact;
use crate::model::question::{BuzzSequence, QuestionId, SweepEntry};

/// Reads `{"<qnum>": [[score, ...], ...]}`.
pub fn parse_buzzes(path: &Path) -> Result<BTreeMap<QuestionId, BuzzSequence>, InputError> {
    let bytes = read_artifact(path)?;
    serde_json::from_slice(&bytes).map_err(|e| json_error(path, e))
}

/// Reads the optional list of alternative buzzer configurations.
pub fn parse_sweep(path: &Path) -> Result<Vec<SweepEntry>, InputError> {
    let bytes = read_artifact(path)?;
    serde_json::from_slice(&bytes).map_err(|e| json_error(path, e))
}

fn json_error(path: &Path, err: serde_json::Error) -> InputError {
    InputError::Parse {
        path: path.to_path_buf(),
        line: err.line(),
        message: err.to_string(),
    }
}
