use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarStat {
    pub key: &'static str,
    pub mean: f64,
    /// Questions for which the key was set.
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuesserCount {
    pub guesser: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalStat {
    pub key: &'static str,
    pub counts: Vec<GuesserCount>,
}

/// Corpus-level end-of-pipeline summary of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub n_questions: usize,
    pub scalars: Vec<ScalarStat>,
    pub categoricals: Vec<CategoricalStat>,
}

impl CorpusSummary {
    pub fn mean(&self, key: &str) -> f64 {
        self.scalars
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.mean)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub key: String,
    /// One mean per checkpoint.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSummary {
    pub n_questions: usize,
    pub checkpoints: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

impl HistogramSummary {
    pub fn series(&self, key: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.values.as_slice())
    }
}
