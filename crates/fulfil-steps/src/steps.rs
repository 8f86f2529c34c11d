use fulfil_saga::SagaStep;
use tracing::debug;

use crate::context::FulfillmentContext;
use crate::error::ExecutionError;
use crate::order::{OrderRequest, StepKind};

/// Charges the customer; refunds the charge on compensation.
#[derive(Debug, Clone)]
pub struct PaymentStep {
    order_id: String,
    amount_cents: u64,
}

impl PaymentStep {
    #[must_use]
    pub fn new(order_id: impl Into<String>, amount_cents: u64) -> Self {
        Self {
            order_id: order_id.into(),
            amount_cents,
        }
    }

    #[must_use]
    pub fn for_order(order: &OrderRequest) -> Self {
        Self::new(&order.id, order.amount_cents)
    }
}

impl SagaStep for PaymentStep {
    type Context = FulfillmentContext;
    type Error = ExecutionError;

    fn name(&self) -> &'static str {
        StepKind::Payment.as_str()
    }

    fn execute(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(
            order = %self.order_id,
            amount_cents = self.amount_cents,
            "executing payment"
        );
        ctx.payments().charge(&self.order_id, self.amount_cents)
    }

    fn compensate(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(
            order = %self.order_id,
            amount_cents = self.amount_cents,
            "compensating payment"
        );
        ctx.payments().refund(&self.order_id, self.amount_cents)
    }

    fn compensation_description(&self) -> String {
        format!(
            "refund {} cents for order '{}'",
            self.amount_cents, self.order_id
        )
    }
}

/// Places the order; cancels it on compensation.
#[derive(Debug, Clone)]
pub struct OrderStep {
    order_id: String,
    customer: String,
}

impl OrderStep {
    #[must_use]
    pub fn new(order_id: impl Into<String>, customer: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            customer: customer.into(),
        }
    }

    #[must_use]
    pub fn for_order(order: &OrderRequest) -> Self {
        Self::new(&order.id, &order.customer)
    }
}

impl SagaStep for OrderStep {
    type Context = FulfillmentContext;
    type Error = ExecutionError;

    fn name(&self) -> &'static str {
        StepKind::Order.as_str()
    }

    fn execute(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(order = %self.order_id, customer = %self.customer, "placing order");
        ctx.orders().place(&self.order_id, &self.customer)
    }

    fn compensate(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(order = %self.order_id, "compensating order");
        ctx.orders().cancel(&self.order_id)
    }

    fn compensation_description(&self) -> String {
        format!("cancel order '{}'", self.order_id)
    }
}

/// Reserves stock; releases it on compensation.
#[derive(Debug, Clone)]
pub struct InventoryStep {
    sku: String,
    quantity: u32,
}

impl InventoryStep {
    #[must_use]
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }

    #[must_use]
    pub fn for_order(order: &OrderRequest) -> Self {
        Self::new(&order.sku, order.quantity)
    }
}

impl SagaStep for InventoryStep {
    type Context = FulfillmentContext;
    type Error = ExecutionError;

    fn name(&self) -> &'static str {
        StepKind::Inventory.as_str()
    }

    fn execute(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(sku = %self.sku, quantity = self.quantity, "reserving inventory");
        ctx.warehouse().reserve(&self.sku, self.quantity)
    }

    fn compensate(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(sku = %self.sku, quantity = self.quantity, "compensating inventory");
        ctx.warehouse().release(&self.sku, self.quantity)
    }

    fn compensation_description(&self) -> String {
        format!("release {} x '{}' back to stock", self.quantity, self.sku)
    }
}

/// Schedules delivery; cancels the delivery on compensation.
#[derive(Debug, Clone)]
pub struct DeliveryStep {
    order_id: String,
    address: String,
}

impl DeliveryStep {
    #[must_use]
    pub fn new(order_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            address: address.into(),
        }
    }

    #[must_use]
    pub fn for_order(order: &OrderRequest) -> Self {
        Self::new(&order.id, &order.address)
    }
}

impl SagaStep for DeliveryStep {
    type Context = FulfillmentContext;
    type Error = ExecutionError;

    fn name(&self) -> &'static str {
        StepKind::Delivery.as_str()
    }

    fn execute(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(order = %self.order_id, address = %self.address, "scheduling delivery");
        ctx.courier().schedule(&self.order_id, &self.address)
    }

    fn compensate(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        debug!(order = %self.order_id, "compensating delivery");
        ctx.courier().cancel_delivery(&self.order_id)
    }

    fn compensation_description(&self) -> String {
        format!("cancel delivery of order '{}'", self.order_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::simulation::{BackendSettings, Effect, InMemoryBackend};

    fn backend() -> Arc<InMemoryBackend> {
        Arc::new(InMemoryBackend::new(
            BackendSettings::default()
                .with_credit_limit(10_000)
                .with_stock("WIDGET-7", 4),
        ))
    }

    #[test]
    fn payment_step_charges_and_refunds() -> anyhow::Result<()> {
        let backend = backend();
        let ctx = FulfillmentContext::from_backend(&backend);
        let step = PaymentStep::new("ORD-1", 500);

        step.execute(&ctx)?;
        step.compensate(&ctx)?;

        assert_eq!(
            backend.journal(),
            [
                Effect::Charged {
                    order_id: "ORD-1".to_string(),
                    amount_cents: 500,
                },
                Effect::Refunded {
                    order_id: "ORD-1".to_string(),
                    amount_cents: 500,
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn inventory_step_reserves_and_releases_stock() -> anyhow::Result<()> {
        let backend = backend();
        let ctx = FulfillmentContext::from_backend(&backend);
        let step = InventoryStep::new("WIDGET-7", 3);

        step.execute(&ctx)?;
        assert_eq!(backend.stock_level("WIDGET-7"), 1);

        step.compensate(&ctx)?;
        assert_eq!(backend.stock_level("WIDGET-7"), 4);
        Ok(())
    }

    #[test]
    fn inventory_step_fails_when_stock_is_short() {
        let backend = backend();
        let ctx = FulfillmentContext::from_backend(&backend);
        let step = InventoryStep::new("WIDGET-7", 9);

        let err = step.execute(&ctx).expect_err("should be out of stock");

        assert_eq!(
            err,
            ExecutionError::OutOfStock {
                sku: "WIDGET-7".to_string(),
                requested: 9,
                available: 4,
            }
        );
        assert!(backend.journal().is_empty());
    }

    #[test]
    fn step_names_match_kinds() {
        let order = OrderRequest {
            id: "ORD-1".to_string(),
            customer: "ada".to_string(),
            amount_cents: 1,
            sku: "WIDGET-7".to_string(),
            quantity: 1,
            address: "here".to_string(),
        };

        assert_eq!(PaymentStep::for_order(&order).name(), "payment");
        assert_eq!(OrderStep::for_order(&order).name(), "order");
        assert_eq!(InventoryStep::for_order(&order).name(), "inventory");
        assert_eq!(DeliveryStep::for_order(&order).name(), "delivery");
    }

    #[test]
    fn compensation_descriptions_name_the_reversal() {
        assert_eq!(
            PaymentStep::new("ORD-1", 250).compensation_description(),
            "refund 250 cents for order 'ORD-1'"
        );
        assert_eq!(
            InventoryStep::new("WIDGET-7", 2).compensation_description(),
            "release 2 x 'WIDGET-7' back to stock"
        );
        assert_eq!(
            DeliveryStep::new("ORD-1", "here").compensation_description(),
            "cancel delivery of order 'ORD-1'"
        );
    }
}
