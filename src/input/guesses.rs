use std::collections::BTreeMap;
use std::path::Path;

use crate::input::InputError;
use crate::input::io::{header_columns, read_text};
use crate::model::question::{GuessRow, Position, QuestionId, normalize_answer};

const REQUIRED_COLUMNS: [&str; 6] = ["qnum", "sentence", "token", "guesser", "guess", "score"];

/// Reads the guess score table, grouping rows by question while keeping the
/// file order inside each question.
pub fn parse_guesses(path: &Path) -> Result<BTreeMap<QuestionId, Vec<GuessRow>>, InputError> {
    let text = read_text(path)?;
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| InputError::Parse {
        path: path.to_path_buf(),
        line: 0,
        message: "guess table is empty".to_string(),
    })?;
    let cols = header_columns(path, header, &REQUIRED_COLUMNS)?;

    let mut out: BTreeMap<QuestionId, Vec<GuessRow>> = BTreeMap::new();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let field = |i: usize| -> Result<&str, InputError> {
            fields.get(cols[i]).map(|s| s.trim()).ok_or_else(|| InputError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("missing column '{}'", REQUIRED_COLUMNS[i]),
            })
        };
        let bad = |what: &str, raw: &str| InputError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            message: format!("invalid {what} '{raw}'"),
        };

        let qnum_raw = field(0)?;
        let qnum: QuestionId = qnum_raw.parse().map_err(|_| bad("qnum", qnum_raw))?;
        let sentence_raw = field(1)?;
        let sentence: u32 = sentence_raw
            .parse()
            .map_err(|_| bad("sentence", sentence_raw))?;
        let token_raw = field(2)?;
        let token: u32 = token_raw.parse().map_err(|_| bad("token", token_raw))?;
        let guesser = field(3)?.to_string();
        let guess = normalize_answer(field(4)?);
        let score_raw = field(5)?;
        let score: f64 = score_raw.parse().map_err(|_| bad("score", score_raw))?;

        out.entry(qnum).or_default().push(GuessRow {
            position: Position { sentence, token },
            guesser,
            guess,
            score,
        });
    }
    Ok(out)
}
