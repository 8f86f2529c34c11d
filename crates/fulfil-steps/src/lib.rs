//! Order fulfillment expressed as a saga.
//!
//! Four steps make up a fulfillment: charge the payment, place the order,
//! reserve inventory and schedule delivery. Each step reverses its own side
//! effect when a later step fails. The side effects go through the backend
//! traits in [`traits`]; [`InMemoryBackend`] implements all of them.

mod context;
mod error;
mod order;
mod plan;
mod simulation;
mod steps;
pub mod traits;

pub use context::FulfillmentContext;
pub use error::{ExecutionError, Result};
pub use order::{OrderRequest, StepKind, UnknownStepKind};
pub use plan::{fulfillment_saga, standard_saga, step_for};
pub use simulation::{BackendSettings, Effect, InMemoryBackend};
pub use steps::{DeliveryStep, InventoryStep, OrderStep, PaymentStep};
