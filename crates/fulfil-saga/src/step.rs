use std::sync::Arc;

/// A step in a saga that can be executed and compensated.
///
/// A step performs one forward action and knows how to reverse it. Parameters
/// the action needs (an amount, an identifier) live on the step itself;
/// dependencies shared by all steps are injected through the context.
///
/// # Type Parameters
///
/// - `Context`: Shared dependencies (injected, not owned by steps)
/// - `Error`: The error type for step failures
pub trait SagaStep: Send + Sync {
    /// Shared context providing dependencies.
    type Context;

    /// Error type for step failures.
    type Error;

    /// Human-readable name for logging and error messages.
    fn name(&self) -> &'static str;

    /// Execute the step's forward action.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails to complete.
    fn execute(&self, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Compensate (undo) the step's effects.
    ///
    /// Called during rollback when a later step fails, at most once per
    /// successful `execute()` within a run.
    ///
    /// The default implementation is a no-op, suitable for read-only steps.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails.
    fn compensate(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        let _ = ctx;
        Ok(())
    }

    /// Human-readable description of what compensation will do.
    fn compensation_description(&self) -> String {
        format!("undo {}", self.name())
    }
}

/// A step that may be registered in several sagas, or several times in one.
pub type SharedStep<Ctx, Err> = Arc<dyn SagaStep<Context = Ctx, Error = Err>>;
