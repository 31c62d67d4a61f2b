//! Reporter implementations.

use crate::error::PipelineError;
use crate::traits::{Reporter, Stage};
use data_loader::ItemId;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Forwards every report to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, stage: Stage, item_id: ItemId, error: &PipelineError) {
        warn!(%stage, item_id, "{}", error);
    }
}

/// One recorded report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub stage: Stage,
    pub item_id: ItemId,
    pub error: PipelineError,
}

/// Keeps every report in memory, optionally forwarding to `tracing` too.
///
/// Used by the batch build to print a summary at the end.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    issues: Mutex<Vec<Issue>>,
    forward: bool,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emit each report as a `tracing` warning
    pub fn forwarding() -> Self {
        Self {
            issues: Mutex::new(Vec::new()),
            forward: true,
        }
    }

    /// Snapshot of everything reported so far
    pub fn issues(&self) -> Vec<Issue> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of issues per stage
    pub fn counts_by_stage(&self) -> HashMap<Stage, usize> {
        let mut counts = HashMap::new();
        for issue in self.lock().iter() {
            *counts.entry(issue.stage).or_insert(0) += 1;
        }
        counts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Issue>> {
        // Issues stay readable after a panic in another report call.
        self.issues.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, stage: Stage, item_id: ItemId, error: &PipelineError) {
        if self.forward {
            TracingReporter.report(stage, item_id, error);
        }
        self.lock().push(Issue {
            stage,
            item_id,
            error: error.clone(),
        });
    }
}
