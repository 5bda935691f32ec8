use std::sync::Arc;

use serde::Serialize;

use crate::OutputShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Finished result spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub bytes: Arc<[u8]>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Progress of the current (or most recent) batch job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressState {
    phase: JobPhase,
    total: usize,
    completed: usize,
    cancel_requested: bool,
    error: Option<String>,
    shape: OutputShape,
    artifact: Option<Artifact>,
}

/// Read-only view handed to progress queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: JobPhase,
    pub running: bool,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub cancel_requested: bool,
    pub error: Option<String>,
    pub complete: bool,
    pub filename: Option<String>,
}

const TASK_VANISHED: &str = "background task stopped unexpectedly";
const NOT_RUNNING: &str = "processing not started or cancelled";

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn shape(&self) -> OutputShape {
        self.shape
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Snapshot for pollers. `task_alive` reconciles a dead task with a stale running phase.
    pub fn snapshot(&self, task_alive: bool) -> ProgressSnapshot {
        let mut phase = self.phase;
        let mut error = self.error.clone();
        if phase == JobPhase::Running && !task_alive {
            phase = JobPhase::Failed;
            error.get_or_insert_with(|| TASK_VANISHED.to_string());
        }

        let complete = phase == JobPhase::Completed && self.artifact.is_some();
        if matches!(phase, JobPhase::Idle | JobPhase::Cancelled) && error.is_none() {
            error = Some(NOT_RUNNING.to_string());
        }

        ProgressSnapshot {
            phase,
            running: phase == JobPhase::Running,
            completed: self.completed,
            total: self.total,
            percent: percent(self.completed, self.total),
            cancel_requested: self.cancel_requested,
            error,
            complete,
            filename: complete
                .then(|| self.artifact.as_ref().map(|a| a.filename.clone()))
                .flatten(),
        }
    }

    pub(crate) fn restart(&mut self, shape: OutputShape) {
        *self = Self {
            phase: JobPhase::Running,
            shape,
            ..Self::default()
        };
    }

    pub(crate) fn set_total(&mut self, total: usize) {
        self.total = total;
        self.completed = self.completed.min(total);
    }

    pub(crate) fn advance(&mut self) {
        if self.completed < self.total {
            self.completed += 1;
        }
    }

    pub(crate) fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub(crate) fn finish(&mut self, phase: JobPhase, artifact: Option<Artifact>, error: Option<String>) {
        self.phase = phase;
        self.artifact = artifact;
        self.error = error;
    }
}

/// `floor(completed / total * 100)`, or 0 for an empty job.
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let value = (completed.min(total) as u128 * 100) / total as u128;
    value as u8
}
