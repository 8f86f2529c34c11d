//! Backends the fulfillment steps act on.

use crate::Result;

pub trait PaymentGateway: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the charge is declined.
    fn charge(&self, order_id: &str, amount_cents: u64) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if there is no matching charge or the refund fails.
    fn refund(&self, order_id: &str, amount_cents: u64) -> Result<()>;
}

pub trait OrderBook: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the order is rejected, e.g. because it already exists.
    fn place(&self, order_id: &str, customer: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the order is unknown or cannot be cancelled.
    fn cancel(&self, order_id: &str) -> Result<()>;
}

pub trait Warehouse: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if there is not enough stock.
    fn reserve(&self, sku: &str, quantity: u32) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the stock cannot be returned.
    fn release(&self, sku: &str, quantity: u32) -> Result<()>;
}

pub trait Courier: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the address cannot be served.
    fn schedule(&self, order_id: &str, address: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if no delivery is scheduled for the order.
    fn cancel_delivery(&self, order_id: &str) -> Result<()>;
}
