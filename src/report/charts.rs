use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::model::summary::HistogramSummary;
use crate::pipeline::sweep::SweepPoint;
use crate::report::ReportError;

const SIZE: (u32, u32) = (1200, 700);
const OUTCOME_KEYS: [&str; 3] = ["correct", "wrong_hopeful", "wrong_hopeless"];

type ChartResult = Result<(), Box<dyn Error>>;

fn chart_error(path: &Path, err: Box<dyn Error>) -> ReportError {
    ReportError::Chart {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Accuracy and buzz rates over checkpoints, one line per rate key.
pub fn render_histogram_lines(
    fold: &str,
    histogram: &HistogramSummary,
    out_path: &Path,
) -> Result<(), ReportError> {
    draw_histogram_lines(fold, histogram, out_path).map_err(|e| chart_error(out_path, e))
}

fn draw_histogram_lines(fold: &str, histogram: &HistogramSummary, out_path: &Path) -> ChartResult {
    let root = SVGBackend::new(out_path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{fold}: accuracy and buzz rate"), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("fraction of question revealed")
        .y_desc("rate")
        .draw()?;

    let rate_series = histogram
        .series
        .iter()
        .filter(|s| !OUTCOME_KEYS.contains(&s.key.as_str()));
    for (i, series) in rate_series.enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        let points: Vec<(f64, f64)> = histogram
            .checkpoints
            .iter()
            .copied()
            .zip(series.values.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(points, &color))?
            .label(series.key.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Outcome shares over checkpoints as stacked bands summing to 1.
pub fn render_histogram_stacked(
    fold: &str,
    histogram: &HistogramSummary,
    out_path: &Path,
) -> Result<(), ReportError> {
    draw_histogram_stacked(fold, histogram, out_path).map_err(|e| chart_error(out_path, e))
}

fn draw_histogram_stacked(
    fold: &str,
    histogram: &HistogramSummary,
    out_path: &Path,
) -> ChartResult {
    let root = SVGBackend::new(out_path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{fold}: buzzer outcomes"), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("fraction of question revealed")
        .y_desc("share of questions")
        .draw()?;

    // cumulative[k][c] = sum of the first k+1 outcome shares at checkpoint c
    let mut cumulative: Vec<Vec<f64>> = Vec::with_capacity(OUTCOME_KEYS.len());
    let mut running = vec![0.0; histogram.checkpoints.len()];
    for key in OUTCOME_KEYS {
        if let Some(values) = histogram.series(key) {
            for (acc, v) in running.iter_mut().zip(values) {
                *acc += v;
            }
        }
        cumulative.push(running.clone());
    }

    let colors = [GREEN, YELLOW, RED];
    // tallest band first so lower bands paint over it
    for (k, key) in OUTCOME_KEYS.iter().enumerate().rev() {
        let color = colors[k].mix(0.6);
        let points: Vec<(f64, f64)> = histogram
            .checkpoints
            .iter()
            .copied()
            .zip(cumulative[k].iter().copied())
            .collect();
        chart
            .draw_series(AreaSeries::new(points, 0.0, color.filled()).border_style(BLACK))?
            .label(key.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Mean rush and late per sweep configuration as stacked bars.
pub fn render_rush_late(fold: &str, sweep: &[SweepPoint], out_path: &Path) -> Result<(), ReportError> {
    draw_rush_late(fold, sweep, out_path).map_err(|e| chart_error(out_path, e))
}

fn draw_rush_late(fold: &str, sweep: &[SweepPoint], out_path: &Path) -> ChartResult {
    let mut y_max = sweep
        .iter()
        .map(|p| p.rush + p.late)
        .fold(0.0f64, f64::max);
    if y_max <= 0.0 {
        y_max = 1.0;
    }
    let n = sweep.len().max(1) as f64;

    let root = SVGBackend::new(out_path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{fold}: rush and late per configuration"), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0.0f64..(y_max * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("configuration")
        .y_desc("mean positions")
        .x_labels(sweep.len().clamp(1, 20))
        .disable_x_mesh()
        .draw()?;

    let rush_color = BLUE.mix(0.7);
    let late_color = RED.mix(0.7);
    chart
        .draw_series(sweep.iter().map(|p| {
            let x = p.index as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, p.rush)], rush_color.filled())
        }))?
        .label("rush")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], rush_color.filled()));
    chart
        .draw_series(sweep.iter().map(|p| {
            let x = p.index as f64;
            Rectangle::new(
                [(x - 0.35, p.rush), (x + 0.35, p.rush + p.late)],
                late_color.filled(),
            )
        }))?
        .label("late")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], late_color.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/charts.rs"]
mod tests;
