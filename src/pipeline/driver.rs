use std::collections::BTreeMap;
use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::model::config::MismatchPolicy;
use crate::model::question::QuestionId;
use crate::pipeline::ScoreError;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedQuestion {
    pub qnum: QuestionId,
    pub reason: String,
}

/// Per-question results that survived the mismatch policy.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub records: BTreeMap<QuestionId, T>,
    pub skipped: Vec<SkippedQuestion>,
}

/// Fixed-size worker pool that maps a per-question function over a fold.
///
/// Workers only read their inputs; the progress bar is the single shared
/// sink and never feeds back into results.
pub struct Driver {
    pool: ThreadPool,
    show_progress: bool,
}

impl Driver {
    /// `threads == 0` lets rayon pick one worker per core.
    pub fn new(threads: usize, show_progress: bool) -> Result<Self, DriverError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("buzzstat-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            show_progress,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn map<K, I, T, F>(&self, label: &str, items: &BTreeMap<K, I>, worker: F) -> BTreeMap<K, T>
    where
        K: Ord + Copy + Send + Sync,
        I: Sync,
        T: Send,
        F: Fn(K, &I) -> T + Sync,
    {
        let progress = self.progress_bar(label, items.len());
        let entries: Vec<(K, &I)> = items.iter().map(|(k, v)| (*k, v)).collect();
        let pairs: Vec<(K, T)> = self.pool.install(|| {
            entries
                .par_iter()
                .map(|&(key, item)| {
                    let out = worker(key, item);
                    progress.inc(1);
                    (key, out)
                })
                .collect()
        });
        progress.finish_and_clear();
        pairs.into_iter().collect()
    }

    /// Parallel fold over a fold's records. Each worker folds its share into
    /// a fresh accumulator and the partials are combined with `merge`, so
    /// `merge` must be commutative and associative.
    pub fn fold<K, I, A, N, F, M>(&self, items: &BTreeMap<K, I>, init: N, add: F, merge: M) -> A
    where
        I: Sync,
        A: Send,
        N: Fn() -> A + Sync + Send,
        F: Fn(A, &I) -> A + Sync + Send,
        M: Fn(A, A) -> A + Sync + Send,
    {
        let entries: Vec<&I> = items.values().collect();
        self.pool.install(|| {
            entries
                .par_iter()
                .fold(&init, |acc, item| add(acc, item))
                .reduce(&init, &merge)
        })
    }

    fn progress_bar(&self, label: &str, len: usize) -> ProgressBar {
        if !self.show_progress || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec}) {msg}")
        {
            progress.set_style(style);
        }
        progress.set_message(label.to_string());
        progress
    }
}

/// Applies the mismatch policy to raw per-question results. Under `Abort`
/// the failure with the smallest qnum is returned, independent of worker
/// scheduling.
pub fn collect_outcomes<T>(
    results: BTreeMap<QuestionId, Result<T, ScoreError>>,
    policy: MismatchPolicy,
) -> Result<Collected<T>, ScoreError> {
    let mut records = BTreeMap::new();
    let mut skipped = Vec::new();
    for (qnum, result) in results {
        match result {
            Ok(record) => {
                records.insert(qnum, record);
            }
            Err(err) => match policy {
                MismatchPolicy::Abort => return Err(err),
                MismatchPolicy::Skip => {
                    crate::warn!("skipping question {}: {}", qnum, err);
                    skipped.push(SkippedQuestion {
                        qnum,
                        reason: err.to_string(),
                    });
                }
            },
        }
    }
    Ok(Collected { records, skipped })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/driver.rs"]
mod tests;
