use std::collections::BTreeMap;
use std::path::Path;

use crate::input::InputError;
use crate::input::io::{header_columns, read_text};
use crate::model::question::{QuestionId, normalize_answer};

/// Reads `qnum<TAB>answer` rows. Duplicate qnums keep the first answer.
pub fn parse_answers(path: &Path) -> Result<BTreeMap<QuestionId, String>, InputError> {
    let text = read_text(path)?;
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| InputError::Parse {
        path: path.to_path_buf(),
        line: 0,
        message: "answers file is empty".to_string(),
    })?;
    let cols = header_columns(path, header, &["qnum", "answer"])?;
    let (qnum_col, answer_col) = (cols[0], cols[1]);

    let mut answers = BTreeMap::new();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let (Some(qnum_raw), Some(answer_raw)) = (fields.get(qnum_col), fields.get(answer_col))
        else {
            return Err(InputError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: "missing qnum or answer column".to_string(),
            });
        };
        let qnum: QuestionId = qnum_raw.parse().map_err(|_| InputError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            message: format!("invalid qnum '{qnum_raw}'"),
        })?;
        if answers.contains_key(&qnum) {
            crate::warn!(
                "duplicate answer for question {}; keeping first (line {})",
                qnum,
                line_no
            );
            continue;
        }
        answers.insert(qnum, normalize_answer(answer_raw));
    }
    Ok(answers)
}
