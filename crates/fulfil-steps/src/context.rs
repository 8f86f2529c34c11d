use std::sync::Arc;

use crate::traits::{Courier, OrderBook, PaymentGateway, Warehouse};

/// Dependencies shared by every fulfillment step.
#[derive(Clone)]
pub struct FulfillmentContext {
    payments: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderBook>,
    warehouse: Arc<dyn Warehouse>,
    courier: Arc<dyn Courier>,
}

impl FulfillmentContext {
    #[must_use]
    pub fn new(
        payments: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderBook>,
        warehouse: Arc<dyn Warehouse>,
        courier: Arc<dyn Courier>,
    ) -> Self {
        Self {
            payments,
            orders,
            warehouse,
            courier,
        }
    }

    /// Use one backend for all four concerns.
    #[must_use]
    pub fn from_backend<B>(backend: &Arc<B>) -> Self
    where
        B: PaymentGateway + OrderBook + Warehouse + Courier + 'static,
    {
        let payments: Arc<dyn PaymentGateway> = backend.clone();
        let orders: Arc<dyn OrderBook> = backend.clone();
        let warehouse: Arc<dyn Warehouse> = backend.clone();
        let courier: Arc<dyn Courier> = backend.clone();
        Self::new(payments, orders, warehouse, courier)
    }

    #[must_use]
    pub fn payments(&self) -> &dyn PaymentGateway {
        self.payments.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderBook {
        self.orders.as_ref()
    }

    #[must_use]
    pub fn warehouse(&self) -> &dyn Warehouse {
        self.warehouse.as_ref()
    }

    #[must_use]
    pub fn courier(&self) -> &dyn Courier {
        self.courier.as_ref()
    }
}
