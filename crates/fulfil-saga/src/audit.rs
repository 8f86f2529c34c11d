use std::fmt;
use std::time::{Duration, Instant};

/// Status of a step in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Step is executing.
    Running,
    /// Step executed successfully.
    Executed,
    /// Step failed during execution.
    Failed,
    /// Step was compensated successfully.
    Compensated,
    /// Step compensation failed.
    CompensationFailed,
}

impl StepStatus {
    /// Stable lowercase identifier, used by machine-readable reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Executed => "executed",
            Self::Failed => "failed",
            Self::Compensated => "compensated",
            Self::CompensationFailed => "compensation_failed",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Running => "…",
            Self::Executed => "✓",
            Self::Failed => "✗",
            Self::Compensated => "↩",
            Self::CompensationFailed => "⚠",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a step's execution in the saga.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Name of the step.
    pub name: String,
    /// Current status.
    pub status: StepStatus,
    /// When the step started executing.
    pub started_at: Instant,
    /// When the step completed (execution or compensation).
    pub completed_at: Option<Instant>,
    /// Description of compensation (if applicable).
    pub compensation_description: Option<String>,
}

impl StepRecord {
    /// Time between the step starting and its last recorded transition.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.completed_at
            .map(|completed| completed.saturating_duration_since(self.started_at))
    }
}

/// Audit log tracking all step executions in a saga run.
///
/// Records are kept in execution order, one per attempted step. Steps that
/// never ran because an earlier step failed have no record.
#[derive(Debug, Default, Clone)]
pub struct SagaAuditLog {
    records: Vec<StepRecord>,
}

impl SagaAuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step execution starting, returning the record's position.
    pub(crate) fn record_start(&mut self, name: &str) -> usize {
        self.records.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Running,
            started_at: Instant::now(),
            completed_at: None,
            compensation_description: None,
        });
        self.records.len() - 1
    }

    /// Mark the last step as failed.
    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Mark the last step as completed successfully.
    pub(crate) fn record_success(&mut self, compensation_description: String) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.compensation_description = Some(compensation_description);
        }
    }

    /// Record that the step at `position` was compensated.
    pub(crate) fn record_compensated(&mut self, position: usize) {
        self.transition(position, StepStatus::Compensated);
    }

    /// Record that the compensation of the step at `position` failed.
    pub(crate) fn record_compensation_failed(&mut self, position: usize) {
        self.transition(position, StepStatus::CompensationFailed);
    }

    fn transition(&mut self, position: usize, status: StepStatus) {
        if let Some(record) = self.records.get_mut(position) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Get all records in the audit log.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Number of records with the given status.
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Get a summary of the saga execution for display.
    #[must_use]
    pub fn summary(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{} {}", record.status.symbol(), record.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
