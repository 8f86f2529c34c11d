use std::sync::Arc;

use crate::saga::Saga;
use crate::step::{SagaStep, SharedStep};

/// Fluent builder for sagas whose steps are known up front.
///
/// Equivalent to calling [`Saga::add_step`] repeatedly, but usable as a
/// single expression. A builder with no steps produces an empty saga, which
/// completes immediately.
pub struct SagaBuilder<Ctx, Err> {
    steps: Vec<SharedStep<Ctx, Err>>,
}

impl<Ctx, Err> SagaBuilder<Ctx, Err> {
    /// Create a new saga builder with no steps.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the saga.
    #[must_use]
    pub fn then<S>(mut self, step: S) -> Self
    where
        S: SagaStep<Context = Ctx, Error = Err> + 'static,
    {
        self.steps.push(Arc::new(step));
        self
    }

    /// Add a step that is shared with other sagas.
    #[must_use]
    pub fn then_shared(mut self, step: SharedStep<Ctx, Err>) -> Self {
        self.steps.push(step);
        self
    }

    /// Build the saga from the accumulated steps.
    #[must_use]
    pub fn build(self) -> Saga<Ctx, Err> {
        Saga::from_steps(self.steps)
    }
}

impl<Ctx, Err> Default for SagaBuilder<Ctx, Err> {
    fn default() -> Self {
        Self::new()
    }
}
