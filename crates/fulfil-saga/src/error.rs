use std::fmt::Debug;

use thiserror::Error;

/// Error from a failed compensation operation.
#[derive(Debug, thiserror::Error)]
#[error("compensation failed for step '{step}': {description}")]
pub struct CompensationError<E> {
    /// Name of the step whose compensation failed.
    pub step: String,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The underlying error.
    #[source]
    pub error: E,
}

/// Error from saga execution.
///
/// Both variants carry the error of the step that halted the saga. By the
/// time a caller sees this error every completed step has been compensated
/// (or its compensation attempt has been recorded as failed).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SagaError<E: Debug> {
    /// A step failed and all compensations succeeded.
    #[error("step '{step}' failed")]
    StepFailed {
        /// Name of the step that failed.
        step: String,
        /// The error that caused the step to fail.
        #[source]
        source: E,
    },

    /// A step failed and some compensations also failed.
    #[error("step '{failed_step}' failed, and {} compensation(s) also failed", compensation_errors.len())]
    CompensationFailed {
        /// Name of the step that originally failed.
        failed_step: String,
        /// The error from the failed step.
        step_error: E,
        /// Errors from failed compensations, in the order they were attempted.
        compensation_errors: Vec<CompensationError<E>>,
    },
}

impl<E: Debug> SagaError<E> {
    /// Name of the step whose execution halted the saga.
    #[must_use]
    pub fn failed_step(&self) -> &str {
        match self {
            Self::StepFailed { step, .. } => step,
            Self::CompensationFailed { failed_step, .. } => failed_step,
        }
    }

    /// The original error returned by the failing step.
    #[must_use]
    pub fn step_error(&self) -> &E {
        match self {
            Self::StepFailed { source, .. } => source,
            Self::CompensationFailed { step_error, .. } => step_error,
        }
    }

    /// Compensations that failed during rollback. Empty for `StepFailed`.
    #[must_use]
    pub fn compensation_errors(&self) -> &[CompensationError<E>] {
        match self {
            Self::StepFailed { .. } => &[],
            Self::CompensationFailed {
                compensation_errors,
                ..
            } => compensation_errors,
        }
    }

    /// Consume the saga error, returning the original step error.
    #[must_use]
    pub fn into_step_error(self) -> E {
        match self {
            Self::StepFailed { source, .. } => source,
            Self::CompensationFailed { step_error, .. } => step_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0}")]
    struct TestError(&'static str);

    #[test]
    fn step_failed_message_names_step() {
        let err = SagaError::StepFailed {
            step: "payment".to_string(),
            source: TestError("declined"),
        };

        assert_eq!(err.to_string(), "step 'payment' failed");
        assert_eq!(err.failed_step(), "payment");
        assert_eq!(err.step_error(), &TestError("declined"));
        assert!(err.compensation_errors().is_empty());
    }

    #[test]
    fn step_failed_exposes_source_chain() {
        let err = SagaError::StepFailed {
            step: "payment".to_string(),
            source: TestError("declined"),
        };

        let source = std::error::Error::source(&err).map(ToString::to_string);

        assert_eq!(source.as_deref(), Some("declined"));
    }

    #[test]
    fn compensation_failed_counts_failures() {
        let err = SagaError::CompensationFailed {
            failed_step: "inventory".to_string(),
            step_error: TestError("out of stock"),
            compensation_errors: vec![CompensationError {
                step: "payment".to_string(),
                description: "refund payment".to_string(),
                error: TestError("gateway offline"),
            }],
        };

        assert_eq!(
            err.to_string(),
            "step 'inventory' failed, and 1 compensation(s) also failed"
        );
        assert_eq!(err.failed_step(), "inventory");
        assert_eq!(err.compensation_errors().len(), 1);
        assert_eq!(err.into_step_error(), TestError("out of stock"));
    }

    #[test]
    fn compensation_error_message_includes_description() {
        let err = CompensationError {
            step: "order".to_string(),
            description: "cancel order".to_string(),
            error: TestError("already shipped"),
        };

        assert_eq!(
            err.to_string(),
            "compensation failed for step 'order': cancel order"
        );
    }
}
