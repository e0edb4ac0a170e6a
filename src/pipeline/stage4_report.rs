use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::guessers::{GuesserId, GuesserSet};
use crate::model::question::QuestionId;
use crate::model::stats::EopRecord;
use crate::report::charts::{render_histogram_lines, render_histogram_stacked, render_rush_late};
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{ReportError, RunSummary, format_opt};

const EOP_COLUMNS: [&str; 14] = [
    "qnum",
    "buzz",
    "buzz_position",
    "reward",
    "hopeful",
    "correct",
    "best_guesser",
    "choose_guesser",
    "choose_hopeful",
    "choose_best",
    "rush",
    "late",
    "appropriate_silence",
    "not_buzzing_when_shouldnt",
];

/// Writes every report artifact of a run and returns the paths written.
pub fn write_reports(
    summary: &RunSummary,
    guessers: &GuesserSet,
    out_dir: &Path,
    charts: bool,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    let summary_path = out_dir.join("summary.json");
    write_text(&summary_path, &render_summary_json(summary)?)?;
    written.push(summary_path);

    let report_path = out_dir.join("report.txt");
    write_text(&report_path, &render_report_text(summary))?;
    written.push(report_path);

    for (fold, evaluation) in &summary.folds {
        let eop_path = out_dir.join(format!("eop_{fold}.tsv"));
        write_eop_tsv(&evaluation.eop_records, guessers, &eop_path)?;
        written.push(eop_path);

        if !charts {
            continue;
        }
        let lines_path = out_dir.join(format!("his_{fold}_lines.svg"));
        render_histogram_lines(fold, &evaluation.histogram, &lines_path)?;
        written.push(lines_path);

        let stacked_path = out_dir.join(format!("his_{fold}_stacked.svg"));
        render_histogram_stacked(fold, &evaluation.histogram, &stacked_path)?;
        written.push(stacked_path);

        if !evaluation.sweep.is_empty() {
            let sweep_path = out_dir.join(format!("rush_late_{fold}.svg"));
            render_rush_late(fold, &evaluation.sweep, &sweep_path)?;
            written.push(sweep_path);
        }
    }

    for path in &written {
        crate::info!("wrote {}", path.display());
    }
    Ok(written)
}

pub fn write_eop_tsv(
    records: &BTreeMap<QuestionId, EopRecord>,
    guessers: &GuesserSet,
    path: &Path,
) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    writeln!(w, "{}", EOP_COLUMNS.join("\t"))?;
    for (qnum, record) in records {
        writeln!(w, "{}", eop_row(*qnum, record, guessers).join("\t"))?;
    }
    w.flush()?;
    Ok(())
}

fn eop_row(qnum: QuestionId, r: &EopRecord, guessers: &GuesserSet) -> Vec<String> {
    let flag = |v: bool| u8::from(v).to_string();
    let opt_flag = |v: Option<bool>| format_opt(v.map(u8::from));
    let name = |g: Option<GuesserId>| g.map(|g| guessers.name(g).to_string()).unwrap_or_default();
    vec![
        qnum.to_string(),
        flag(r.buzz),
        format_opt(r.buzz_position),
        r.reward.to_string(),
        flag(r.hopeful),
        r.correct.to_string(),
        name(r.best_guesser),
        name(r.choose_guesser),
        opt_flag(r.choose_hopeful),
        opt_flag(r.choose_best),
        format_opt(r.rush),
        format_opt(r.late),
        opt_flag(r.appropriate_silence),
        opt_flag(r.not_buzzing_when_shouldnt),
    ]
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_report.rs"]
mod tests;
