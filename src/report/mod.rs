use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::model::config::{EvalConfig, MismatchPolicy, RewardProfile};
use crate::model::guessers::GuesserSet;
use crate::pipeline::FoldEvaluation;

pub mod charts;
pub mod json;
pub mod text;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render chart {path}: {message}")]
    Chart { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

impl ToolMeta {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Everything one run writes to `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: ToolMeta,
    pub guessers: Vec<String>,
    pub checkpoints: Vec<f64>,
    pub rewards: RewardProfile,
    pub on_mismatch: MismatchPolicy,
    pub folds: BTreeMap<String, FoldEvaluation>,
}

impl RunSummary {
    pub fn new(guessers: &GuesserSet, config: &EvalConfig) -> Self {
        Self {
            tool: ToolMeta::current(),
            guessers: guessers.names().to_vec(),
            checkpoints: config.checkpoints.values().to_vec(),
            rewards: config.rewards,
            on_mismatch: config.mismatch,
            folds: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, evaluation: FoldEvaluation) {
        self.folds.insert(evaluation.fold.clone(), evaluation);
    }
}

pub fn format_f64_3(v: f64) -> String {
    format!("{:.3}", v)
}

pub fn format_f64_2(v: f64) -> String {
    format!("{:.2}", v)
}

/// Empty cell for values that do not apply.
pub fn format_opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
