//! Saga pattern for all-or-nothing multi-step operations.
//!
//! A [`Saga`] runs an ordered list of steps. Every step knows how to undo
//! itself; when a step fails, the steps that already completed are
//! compensated in reverse order and the original failure is returned.
//! A [`SagaCoordinator`] runs a saga once and turns its result into a
//! reported [`SagaOutcome`] instead of an error.

mod audit;
mod builder;
mod coordinator;
mod error;
mod saga;
mod step;

pub use audit::{SagaAuditLog, StepRecord, StepStatus};
pub use builder::SagaBuilder;
pub use coordinator::{SagaCoordinator, SagaOutcome, SagaReport};
pub use error::{CompensationError, SagaError};
pub use saga::{Saga, SagaState};
pub use step::{SagaStep, SharedStep};
