use thiserror::Error;

use crate::order::StepKind;

/// Failure of a fulfillment step's forward or reversing action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    #[error("payment of {amount_cents} cents for order '{order_id}' declined: {reason}")]
    PaymentDeclined {
        order_id: String,
        amount_cents: u64,
        reason: String,
    },

    #[error("order '{order_id}' rejected: {reason}")]
    OrderRejected { order_id: String, reason: String },

    #[error("insufficient stock for '{sku}': requested {requested}, available {available}")]
    OutOfStock {
        sku: String,
        requested: u32,
        available: u32,
    },

    #[error("delivery to '{address}' is unavailable")]
    DeliveryUnavailable { address: String },

    #[error("{step} step failed: injected failure")]
    Injected { step: StepKind },

    #[error("could not reverse {step} step: injected failure")]
    ReversalInjected { step: StepKind },

    #[error("nothing to reverse for {step} step of '{reference}'")]
    NothingToReverse { step: StepKind, reference: String },
}

impl ExecutionError {
    /// The step kind this error originated from, when it can be told.
    #[must_use]
    pub fn step(&self) -> StepKind {
        match self {
            Self::PaymentDeclined { .. } => StepKind::Payment,
            Self::OrderRejected { .. } => StepKind::Order,
            Self::OutOfStock { .. } => StepKind::Inventory,
            Self::DeliveryUnavailable { .. } => StepKind::Delivery,
            Self::Injected { step }
            | Self::ReversalInjected { step }
            | Self::NothingToReverse { step, .. } => *step,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
