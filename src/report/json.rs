use crate::report::{ReportError, RunSummary};

pub fn render_summary_json(summary: &RunSummary) -> Result<String, ReportError> {
    let mut out = serde_json::to_string_pretty(summary)?;
    out.push('\n');
    Ok(out)
}
