use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::audit::SagaAuditLog;
use crate::error::{CompensationError, SagaError};
use crate::step::{SagaStep, SharedStep};

/// Lifecycle of a saga run.
///
/// `Idle → Running → {Completed | Compensating → Failed}`. `Completed` and
/// `Failed` are terminal for a run; executing again starts a fresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SagaState {
    /// No run has started yet.
    #[default]
    Idle,
    /// Steps are being executed in order.
    Running,
    /// Every step executed successfully.
    Completed,
    /// A step failed and completed steps are being undone.
    Compensating,
    /// A step failed and compensation has finished.
    Failed,
}

impl SagaState {
    /// Whether the last run has finished, successfully or not.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// An ordered sequence of steps executed with compensating rollback.
///
/// Steps execute in registration order. If any step fails, the steps that
/// completed during this run are compensated in reverse order (LIFO) and the
/// original failure is returned.
///
/// ```
/// use std::cell::RefCell;
///
/// use fulfil_saga::{Saga, SagaStep};
///
/// struct Log(RefCell<Vec<String>>);
///
/// struct Record(&'static str);
///
/// impl SagaStep for Record {
///     type Context = Log;
///     type Error = String;
///
///     fn name(&self) -> &'static str {
///         self.0
///     }
///
///     fn execute(&self, ctx: &Log) -> Result<(), String> {
///         ctx.0.borrow_mut().push(format!("do {}", self.0));
///         Ok(())
///     }
///
///     fn compensate(&self, ctx: &Log) -> Result<(), String> {
///         ctx.0.borrow_mut().push(format!("undo {}", self.0));
///         Ok(())
///     }
/// }
///
/// struct Refuse;
///
/// impl SagaStep for Refuse {
///     type Context = Log;
///     type Error = String;
///
///     fn name(&self) -> &'static str {
///         "refuse"
///     }
///
///     fn execute(&self, _ctx: &Log) -> Result<(), String> {
///         Err("no".to_string())
///     }
/// }
///
/// let mut saga = Saga::new();
/// saga.add_step(Record("a")).add_step(Record("b")).add_step(Refuse);
///
/// let log = Log(RefCell::new(Vec::new()));
/// let err = saga.execute(&log).unwrap_err();
///
/// assert_eq!(err.failed_step(), "refuse");
/// assert_eq!(*log.0.borrow(), ["do a", "do b", "undo b", "undo a"]);
/// ```
pub struct Saga<Ctx, Err> {
    steps: Vec<SharedStep<Ctx, Err>>,
    // Positions into `steps`; always a prefix of the step order.
    completed: Vec<usize>,
    state: SagaState,
}

impl<Ctx, Err> Default for Saga<Ctx, Err> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx, Err> Saga<Ctx, Err> {
    /// Create a saga with no steps.
    #[must_use]
    pub fn new() -> Self {
        Self::from_steps(Vec::new())
    }

    pub(crate) fn from_steps(steps: Vec<SharedStep<Ctx, Err>>) -> Self {
        Self {
            steps,
            completed: Vec::new(),
            state: SagaState::Idle,
        }
    }

    /// Append a step to the execution sequence.
    ///
    /// Order is significant and duplicates are allowed.
    pub fn add_step<S>(&mut self, step: S) -> &mut Self
    where
        S: SagaStep<Context = Ctx, Error = Err> + 'static,
    {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append a step that is shared with other sagas.
    pub fn add_shared_step(&mut self, step: SharedStep<Ctx, Err>) -> &mut Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of all registered steps, in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Names of the steps that executed successfully during the last run.
    ///
    /// After a failed run these are the steps that were compensated.
    #[must_use]
    pub fn completed_steps(&self) -> Vec<&'static str> {
        self.completed
            .iter()
            .map(|&index| self.steps[index].name())
            .collect()
    }

    #[must_use]
    pub fn state(&self) -> SagaState {
        self.state
    }
}

impl<Ctx, Err> Saga<Ctx, Err>
where
    Err: Debug,
{
    /// Execute the saga.
    ///
    /// Every call is an independent run: the completed-step record of any
    /// previous run is discarded before the first step executes.
    ///
    /// # Errors
    ///
    /// Returns `SagaError::StepFailed` if a step fails and all compensations succeed.
    /// Returns `SagaError::CompensationFailed` if a step fails and some compensations also fail.
    pub fn execute(&mut self, ctx: &Ctx) -> Result<(), SagaError<Err>> {
        let (result, _audit_log) = self.execute_internal(ctx);
        result
    }

    /// Execute the saga and return both the result and an audit log.
    ///
    /// The audit log tracks all step executions and compensations.
    pub fn execute_with_audit(&mut self, ctx: &Ctx) -> (Result<(), SagaError<Err>>, SagaAuditLog) {
        self.execute_internal(ctx)
    }

    fn execute_internal(&mut self, ctx: &Ctx) -> (Result<(), SagaError<Err>>, SagaAuditLog) {
        let mut audit_log = SagaAuditLog::new();
        self.completed.clear();
        self.state = SagaState::Running;

        match self.run_forward(ctx, &mut audit_log) {
            None => {
                debug!(steps = self.steps.len(), "saga completed");
                self.state = SagaState::Completed;
                (Ok(()), audit_log)
            }
            Some((failed_step, step_error)) => {
                self.state = SagaState::Compensating;
                let saga_error = self.compensate(ctx, &mut audit_log, failed_step, step_error);
                self.state = SagaState::Failed;
                (Err(saga_error), audit_log)
            }
        }
    }

    /// Executes steps in order until one fails, returning the failure.
    fn run_forward(
        &mut self,
        ctx: &Ctx,
        audit_log: &mut SagaAuditLog,
    ) -> Option<(&'static str, Err)> {
        for (index, step) in self.steps.iter().enumerate() {
            debug!(step = step.name(), position = index, "executing step");
            let position = audit_log.record_start(step.name());
            debug_assert_eq!(position, index, "audit records must follow step order");

            match step.execute(ctx) {
                Ok(()) => {
                    audit_log.record_success(step.compensation_description());
                    self.completed.push(index);
                }
                Err(error) => {
                    audit_log.record_failure();
                    warn!(
                        step = step.name(),
                        error = ?error,
                        completed = self.completed.len(),
                        "step failed, compensating completed steps"
                    );
                    return Some((step.name(), error));
                }
            }
        }

        None
    }

    // Audit record positions equal step positions: one record is started per
    // attempted step, in order, and the run stops at the first failure.
    fn compensate(
        &self,
        ctx: &Ctx,
        audit_log: &mut SagaAuditLog,
        failed_step: &str,
        step_error: Err,
    ) -> SagaError<Err> {
        let mut compensation_errors = Vec::new();

        for &index in self.completed.iter().rev() {
            let step = &self.steps[index];
            let step_name = step.name();
            let description = step.compensation_description();

            debug!(step = step_name, %description, "compensating step");
            match step.compensate(ctx) {
                Ok(()) => {
                    audit_log.record_compensated(index);
                }
                Err(error) => {
                    warn!(step = step_name, error = ?error, "compensation failed");
                    audit_log.record_compensation_failed(index);
                    compensation_errors.push(CompensationError {
                        step: step_name.to_string(),
                        description,
                        error,
                    });
                }
            }
        }

        if compensation_errors.is_empty() {
            SagaError::StepFailed {
                step: failed_step.to_string(),
                source: step_error,
            }
        } else {
            SagaError::CompensationFailed {
                failed_step: failed_step.to_string(),
                step_error,
                compensation_errors,
            }
        }
    }
}
