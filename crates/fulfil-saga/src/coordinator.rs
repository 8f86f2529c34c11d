use std::fmt::Debug;

use tracing::{error, info};

use crate::audit::SagaAuditLog;
use crate::error::SagaError;
use crate::saga::Saga;

/// Terminal outcome of one coordinated saga run.
#[derive(Debug)]
pub enum SagaOutcome<Err: Debug> {
    /// Every step executed successfully.
    Succeeded,
    /// A step failed; completed steps were compensated before this was reported.
    Failed(SagaError<Err>),
}

impl<Err: Debug> SagaOutcome<Err> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// The saga error, if the run failed.
    #[must_use]
    pub fn error(&self) -> Option<&SagaError<Err>> {
        match self {
            Self::Succeeded => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// Outcome of a coordinated run together with its audit trail.
#[derive(Debug)]
pub struct SagaReport<Err: Debug> {
    pub outcome: SagaOutcome<Err>,
    pub audit_log: SagaAuditLog,
}

impl<Err: Debug> SagaReport<Err> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Runs a single saga and absorbs its failure.
///
/// The coordinator is the outermost boundary of a saga run: a failing step
/// never escapes [`SagaCoordinator::run`] as an error. Instead the run is
/// reported as a [`SagaOutcome`], after the saga has compensated.
pub struct SagaCoordinator<Ctx, Err> {
    saga: Saga<Ctx, Err>,
}

impl<Ctx, Err> SagaCoordinator<Ctx, Err> {
    #[must_use]
    pub fn new(saga: Saga<Ctx, Err>) -> Self {
        Self { saga }
    }

    /// The saga this coordinator runs.
    #[must_use]
    pub fn saga(&self) -> &Saga<Ctx, Err> {
        &self.saga
    }

    /// Release the saga, e.g. to inspect it after a run.
    #[must_use]
    pub fn into_saga(self) -> Saga<Ctx, Err> {
        self.saga
    }
}

impl<Ctx, Err> SagaCoordinator<Ctx, Err>
where
    Err: Debug,
{
    /// Run the saga exactly once and report how it ended.
    pub fn run(&mut self, ctx: &Ctx) -> SagaReport<Err> {
        let (result, audit_log) = self.saga.execute_with_audit(ctx);

        let outcome = match result {
            Ok(()) => {
                info!(steps = self.saga.len(), "saga executed successfully");
                SagaOutcome::Succeeded
            }
            Err(err) => {
                error!(
                    step = err.failed_step(),
                    cause = ?err.step_error(),
                    compensation_failures = err.compensation_errors().len(),
                    "saga execution failed: {err}"
                );
                SagaOutcome::Failed(err)
            }
        };

        SagaReport { outcome, audit_log }
    }
}
