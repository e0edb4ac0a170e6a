use crate::model::config::MismatchPolicy;
use crate::pipeline::FoldEvaluation;
use crate::report::{RunSummary, format_f64_2, format_f64_3};

pub fn render_report_text(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("Buzzer Evaluation Report\n");
    out.push_str("========================\n\n");
    out.push_str(&format!(
        "Tool: {} {}\n",
        summary.tool.name, summary.tool.version
    ));
    out.push_str(&format!("Guessers: {}\n", summary.guessers.join(", ")));
    out.push_str(&format!(
        "Checkpoints: {}\n",
        summary
            .checkpoints
            .iter()
            .map(|c| format_f64_2(*c))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str(&format!(
        "Rewards: honest={} premature={} silent={}\n",
        summary.rewards.honest, summary.rewards.premature, summary.rewards.silent
    ));
    out.push_str(&format!(
        "Mismatch policy: {}\n",
        match summary.on_mismatch {
            MismatchPolicy::Skip => "skip",
            MismatchPolicy::Abort => "abort",
        }
    ));

    for evaluation in summary.folds.values() {
        out.push('\n');
        render_fold(&mut out, evaluation);
    }

    out
}

fn render_fold(out: &mut String, evaluation: &FoldEvaluation) {
    let title = format!("Fold: {}", evaluation.fold);
    out.push_str(&title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
    out.push_str(&format!(
        "Questions: {} ({} scored, {} skipped)\n",
        evaluation.n_questions,
        evaluation.eop.n_questions,
        evaluation.skipped.len()
    ));
    if evaluation.unknown_guesser_rows > 0 {
        out.push_str(&format!(
            "Rows from unknown guessers ignored: {}\n",
            evaluation.unknown_guesser_rows
        ));
    }

    out.push_str("\nEnd-of-pipeline\n");
    for stat in &evaluation.eop.scalars {
        out.push_str(&format!("{} {}\n", stat.key, format_f64_3(stat.mean)));
    }
    for cat in &evaluation.eop.categoricals {
        let counts: Vec<String> = cat
            .counts
            .iter()
            .map(|c| format!("{}={}", c.guesser, c.count))
            .collect();
        out.push_str(&format!("{} {}\n", cat.key, counts.join(" ")));
    }

    out.push_str("\nHistogram\n");
    for (i, checkpoint) in evaluation.histogram.checkpoints.iter().enumerate() {
        let cells: Vec<String> = evaluation
            .histogram
            .series
            .iter()
            .map(|s| {
                let v = s.values.get(i).copied().unwrap_or(0.0);
                format!("{}={}", s.key, format_f64_2(v))
            })
            .collect();
        out.push_str(&format!("{} {}\n", format_f64_2(*checkpoint), cells.join(" ")));
    }

    if !evaluation.skipped.is_empty() {
        out.push_str("\nSkipped questions\n");
        for s in &evaluation.skipped {
            out.push_str(&format!("{} {}\n", s.qnum, s.reason));
        }
    }

    if !evaluation.sweep.is_empty() {
        out.push_str("\nConfiguration sweep\n");
        out.push_str("index\tquestions\trush\tlate\treward\tskipped\tconfig\n");
        for point in &evaluation.sweep {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                point.index,
                point.n_questions,
                format_f64_3(point.rush),
                format_f64_3(point.late),
                format_f64_3(point.reward),
                point.skipped,
                point.config
            ));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
