use std::path::PathBuf;

use fulfil_saga::SagaError;
use fulfil_steps::ExecutionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read scenario '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render JSON report")]
    Json(#[from] serde_json::Error),

    #[error("fulfillment saga failed at step '{step}'")]
    SagaFailed {
        step: String,
        #[source]
        source: ExecutionError,
    },

    #[error(
        "fulfillment saga failed at step '{step}' and {compensation_failures} compensation(s) also failed"
    )]
    SagaCompensationFailed {
        step: String,
        compensation_failures: usize,
        #[source]
        source: ExecutionError,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;

impl From<SagaError<ExecutionError>> for CliError {
    fn from(err: SagaError<ExecutionError>) -> Self {
        let step = err.failed_step().to_string();
        let compensation_failures = err.compensation_errors().len();
        let source = err.into_step_error();

        if compensation_failures == 0 {
            Self::SagaFailed { step, source }
        } else {
            Self::SagaCompensationFailed {
                step,
                compensation_failures,
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use fulfil_saga::CompensationError;
    use fulfil_steps::StepKind;

    use super::*;

    #[test]
    fn config_read_error_includes_path() {
        let err = CliError::ConfigRead {
            path: PathBuf::from("/scenarios/missing.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "test"),
        };

        let msg = err.to_string();

        assert!(msg.contains("/scenarios/missing.toml"));
    }

    #[test]
    fn step_failure_converts_to_saga_failed() {
        let saga_err = SagaError::StepFailed {
            step: "inventory".to_string(),
            source: ExecutionError::Injected {
                step: StepKind::Inventory,
            },
        };

        let cli_err: CliError = saga_err.into();

        assert!(matches!(cli_err, CliError::SagaFailed { ref step, .. } if step == "inventory"));
        assert!(std::error::Error::source(&cli_err).is_some());
    }

    #[test]
    fn compensation_failure_converts_with_count() {
        let saga_err = SagaError::CompensationFailed {
            failed_step: "delivery".to_string(),
            step_error: ExecutionError::Injected {
                step: StepKind::Delivery,
            },
            compensation_errors: vec![CompensationError {
                step: "order".to_string(),
                description: "cancel order 'ORD-1'".to_string(),
                error: ExecutionError::ReversalInjected {
                    step: StepKind::Order,
                },
            }],
        };

        let cli_err: CliError = saga_err.into();

        let msg = cli_err.to_string();
        assert!(msg.contains("'delivery'"));
        assert!(msg.contains("1 compensation(s)"));
    }
}
