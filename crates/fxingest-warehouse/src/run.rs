//! Ingest-run lifecycle types.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::WarehouseError;

/// Identifier assigned by the `ingest_runs_id_seq` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(i64);

impl RunId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an ingest run.
///
/// `Running` is the only non-terminal state; a run moves to `Ok` or `Fail`
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Running,
    Ok,
    Fail,
}

impl RunStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Ok => "OK",
            Self::Fail => "FAIL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "RUNNING" => Some(Self::Running),
            "OK" => Some(Self::Ok),
            "FAIL" => Some(Self::Fail),
            _ => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Guarded transition into a terminal status.
    pub fn transition(self, run_id: RunId, target: RunStatus) -> Result<RunStatus, WarehouseError> {
        if self.is_terminal() {
            return Err(WarehouseError::RunAlreadyFinished {
                run_id,
                status: self,
            });
        }
        if !target.is_terminal() {
            return Err(WarehouseError::InvalidTransition {
                run_id,
                from: self,
                to: target,
            });
        }
        Ok(target)
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome recorded by [`crate::Warehouse::finish_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub rows_inserted: u64,
    pub error_message: Option<String>,
}

impl RunOutcome {
    pub fn ok(rows_inserted: u64) -> Self {
        Self {
            status: RunStatus::Ok,
            rows_inserted,
            error_message: None,
        }
    }

    pub fn fail(error_message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Fail,
            rows_inserted: 0,
            error_message: Some(error_message.into()),
        }
    }
}

/// Persisted audit record of one ingest attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestRun {
    pub id: RunId,
    pub command: String,
    pub args: Option<String>,
    pub status: RunStatus,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub rows_inserted: u64,
    pub error_message: Option<String>,
}
