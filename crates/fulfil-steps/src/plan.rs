use std::sync::Arc;

use fulfil_saga::{Saga, SharedStep};

use crate::context::FulfillmentContext;
use crate::error::ExecutionError;
use crate::order::{OrderRequest, StepKind};
use crate::steps::{DeliveryStep, InventoryStep, OrderStep, PaymentStep};

/// Build the step of the given kind for an order.
#[must_use]
pub fn step_for(
    kind: StepKind,
    order: &OrderRequest,
) -> SharedStep<FulfillmentContext, ExecutionError> {
    match kind {
        StepKind::Payment => Arc::new(PaymentStep::for_order(order)),
        StepKind::Order => Arc::new(OrderStep::for_order(order)),
        StepKind::Inventory => Arc::new(InventoryStep::for_order(order)),
        StepKind::Delivery => Arc::new(DeliveryStep::for_order(order)),
    }
}

/// Build a saga running the given step kinds, in the given order, for an order.
#[must_use]
pub fn fulfillment_saga(
    order: &OrderRequest,
    kinds: &[StepKind],
) -> Saga<FulfillmentContext, ExecutionError> {
    let mut saga = Saga::new();
    for &kind in kinds {
        saga.add_shared_step(step_for(kind, order));
    }
    saga
}

/// Payment, order, inventory, delivery.
#[must_use]
pub fn standard_saga(order: &OrderRequest) -> Saga<FulfillmentContext, ExecutionError> {
    fulfillment_saga(order, &StepKind::ALL)
}
