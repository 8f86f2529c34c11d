use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::ExecutionError;
use crate::order::StepKind;
use crate::traits::{Courier, OrderBook, PaymentGateway, Warehouse};

const DEFAULT_CREDIT_LIMIT_CENTS: u64 = 100_000;

/// Starting state and rules of an [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendSettings {
    /// Charges above this amount are declined.
    pub credit_limit_cents: u64,
    /// Units on hand per SKU.
    pub stock: BTreeMap<String, u32>,
    /// Addresses the courier does not serve (case-insensitive).
    pub blocked_addresses: Vec<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            credit_limit_cents: DEFAULT_CREDIT_LIMIT_CENTS,
            stock: BTreeMap::new(),
            blocked_addresses: Vec::new(),
        }
    }
}

impl BackendSettings {
    #[must_use]
    pub fn with_credit_limit(mut self, cents: u64) -> Self {
        self.credit_limit_cents = cents;
        self
    }

    #[must_use]
    pub fn with_stock(mut self, sku: impl Into<String>, quantity: u32) -> Self {
        self.stock.insert(sku.into(), quantity);
        self
    }

    #[must_use]
    pub fn with_blocked_address(mut self, address: impl Into<String>) -> Self {
        self.blocked_addresses.push(address.into());
        self
    }

    fn is_blocked(&self, address: &str) -> bool {
        self.blocked_addresses
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(address.trim()))
    }
}

/// A side effect applied to the in-memory backend, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Charged { order_id: String, amount_cents: u64 },
    Refunded { order_id: String, amount_cents: u64 },
    OrderPlaced { order_id: String, customer: String },
    OrderCancelled { order_id: String },
    StockReserved { sku: String, quantity: u32 },
    StockReleased { sku: String, quantity: u32 },
    DeliveryScheduled { order_id: String, address: String },
    DeliveryCancelled { order_id: String },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charged {
                order_id,
                amount_cents,
            } => write!(f, "charged {amount_cents} cents for order '{order_id}'"),
            Self::Refunded {
                order_id,
                amount_cents,
            } => write!(f, "refunded {amount_cents} cents for order '{order_id}'"),
            Self::OrderPlaced { order_id, customer } => {
                write!(f, "placed order '{order_id}' for {customer}")
            }
            Self::OrderCancelled { order_id } => write!(f, "cancelled order '{order_id}'"),
            Self::StockReserved { sku, quantity } => write!(f, "reserved {quantity} x '{sku}'"),
            Self::StockReleased { sku, quantity } => write!(f, "released {quantity} x '{sku}'"),
            Self::DeliveryScheduled { order_id, address } => {
                write!(f, "scheduled delivery of '{order_id}' to {address}")
            }
            Self::DeliveryCancelled { order_id } => {
                write!(f, "cancelled delivery of '{order_id}'")
            }
        }
    }
}

#[derive(Debug, Default)]
struct BackendState {
    charges: BTreeMap<String, u64>,
    orders: BTreeMap<String, String>,
    stock: BTreeMap<String, u32>,
    deliveries: BTreeMap<String, String>,
    journal: Vec<Effect>,
}

/// Payment gateway, order book, warehouse and courier held in memory.
///
/// Failures come from the settings (credit limit, stock, blocked
/// addresses) or are injected per step kind with [`Self::with_failure`] and
/// [`Self::with_reversal_failure`].
#[derive(Debug)]
pub struct InMemoryBackend {
    settings: BackendSettings,
    fail_at: Option<StepKind>,
    fail_reversal_at: Option<StepKind>,
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(settings: BackendSettings) -> Self {
        let state = BackendState {
            stock: settings.stock.clone(),
            ..BackendState::default()
        };
        Self {
            settings,
            fail_at: None,
            fail_reversal_at: None,
            state: Mutex::new(state),
        }
    }

    /// Make the forward action of `kind` fail.
    #[must_use]
    pub fn with_failure(mut self, kind: StepKind) -> Self {
        self.fail_at = Some(kind);
        self
    }

    /// Make the reversing action of `kind` fail.
    #[must_use]
    pub fn with_reversal_failure(mut self, kind: StepKind) -> Self {
        self.fail_reversal_at = Some(kind);
        self
    }

    #[must_use]
    pub fn journal(&self) -> Vec<Effect> {
        self.state().journal.clone()
    }

    #[must_use]
    pub fn stock_level(&self, sku: &str) -> u32 {
        self.state().stock.get(sku).copied().unwrap_or(0)
    }

    /// Total currently charged (net of refunds) for an order.
    #[must_use]
    pub fn charged(&self, order_id: &str) -> Option<u64> {
        self.state().charges.get(order_id).copied()
    }

    #[must_use]
    pub fn has_order(&self, order_id: &str) -> bool {
        self.state().orders.contains_key(order_id)
    }

    #[must_use]
    pub fn has_delivery(&self, order_id: &str) -> bool {
        self.state().deliveries.contains_key(order_id)
    }

    /// Whether every effect has been reversed: no charges, orders or
    /// deliveries remain and stock is back at its starting levels.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        let state = self.state();
        state.charges.is_empty()
            && state.orders.is_empty()
            && state.deliveries.is_empty()
            && state.stock == self.settings.stock
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_forward(&self, kind: StepKind) -> Result<()> {
        if self.fail_at == Some(kind) {
            return Err(ExecutionError::Injected { step: kind });
        }
        Ok(())
    }

    fn check_reversal(&self, kind: StepKind) -> Result<()> {
        if self.fail_reversal_at == Some(kind) {
            return Err(ExecutionError::ReversalInjected { step: kind });
        }
        Ok(())
    }
}

impl PaymentGateway for InMemoryBackend {
    fn charge(&self, order_id: &str, amount_cents: u64) -> Result<()> {
        self.check_forward(StepKind::Payment)?;
        if amount_cents > self.settings.credit_limit_cents {
            return Err(ExecutionError::PaymentDeclined {
                order_id: order_id.to_string(),
                amount_cents,
                reason: format!(
                    "credit limit of {} cents exceeded",
                    self.settings.credit_limit_cents
                ),
            });
        }

        let mut state = self.state();
        let charged = state.charges.get(order_id).copied().unwrap_or(0);
        let Some(total) = charged.checked_add(amount_cents) else {
            return Err(ExecutionError::PaymentDeclined {
                order_id: order_id.to_string(),
                amount_cents,
                reason: "charge total out of range".to_string(),
            });
        };
        state.charges.insert(order_id.to_string(), total);
        state.journal.push(Effect::Charged {
            order_id: order_id.to_string(),
            amount_cents,
        });
        Ok(())
    }

    fn refund(&self, order_id: &str, amount_cents: u64) -> Result<()> {
        self.check_reversal(StepKind::Payment)?;

        let mut state = self.state();
        let remaining = match state.charges.get(order_id) {
            Some(&charged) if charged >= amount_cents => charged - amount_cents,
            _ => {
                return Err(ExecutionError::NothingToReverse {
                    step: StepKind::Payment,
                    reference: order_id.to_string(),
                });
            }
        };
        if remaining == 0 {
            state.charges.remove(order_id);
        } else {
            state.charges.insert(order_id.to_string(), remaining);
        }
        state.journal.push(Effect::Refunded {
            order_id: order_id.to_string(),
            amount_cents,
        });
        Ok(())
    }
}

impl OrderBook for InMemoryBackend {
    fn place(&self, order_id: &str, customer: &str) -> Result<()> {
        self.check_forward(StepKind::Order)?;
        if customer.trim().is_empty() {
            return Err(ExecutionError::OrderRejected {
                order_id: order_id.to_string(),
                reason: "missing customer".to_string(),
            });
        }

        let mut state = self.state();
        if state.orders.contains_key(order_id) {
            return Err(ExecutionError::OrderRejected {
                order_id: order_id.to_string(),
                reason: "order already exists".to_string(),
            });
        }
        state
            .orders
            .insert(order_id.to_string(), customer.to_string());
        state.journal.push(Effect::OrderPlaced {
            order_id: order_id.to_string(),
            customer: customer.to_string(),
        });
        Ok(())
    }

    fn cancel(&self, order_id: &str) -> Result<()> {
        self.check_reversal(StepKind::Order)?;

        let mut state = self.state();
        if state.orders.remove(order_id).is_none() {
            return Err(ExecutionError::NothingToReverse {
                step: StepKind::Order,
                reference: order_id.to_string(),
            });
        }
        state.journal.push(Effect::OrderCancelled {
            order_id: order_id.to_string(),
        });
        Ok(())
    }
}

impl Warehouse for InMemoryBackend {
    fn reserve(&self, sku: &str, quantity: u32) -> Result<()> {
        self.check_forward(StepKind::Inventory)?;

        let mut state = self.state();
        let available = state.stock.get(sku).copied().unwrap_or(0);
        if quantity > available {
            return Err(ExecutionError::OutOfStock {
                sku: sku.to_string(),
                requested: quantity,
                available,
            });
        }
        state.stock.insert(sku.to_string(), available - quantity);
        state.journal.push(Effect::StockReserved {
            sku: sku.to_string(),
            quantity,
        });
        Ok(())
    }

    fn release(&self, sku: &str, quantity: u32) -> Result<()> {
        self.check_reversal(StepKind::Inventory)?;

        let mut state = self.state();
        let level = state.stock.entry(sku.to_string()).or_insert(0);
        *level = level.saturating_add(quantity);
        state.journal.push(Effect::StockReleased {
            sku: sku.to_string(),
            quantity,
        });
        Ok(())
    }
}

impl Courier for InMemoryBackend {
    fn schedule(&self, order_id: &str, address: &str) -> Result<()> {
        self.check_forward(StepKind::Delivery)?;
        if address.trim().is_empty() || self.settings.is_blocked(address) {
            return Err(ExecutionError::DeliveryUnavailable {
                address: address.to_string(),
            });
        }

        let mut state = self.state();
        if state.deliveries.contains_key(order_id) {
            return Err(ExecutionError::DeliveryUnavailable {
                address: address.to_string(),
            });
        }
        state
            .deliveries
            .insert(order_id.to_string(), address.to_string());
        state.journal.push(Effect::DeliveryScheduled {
            order_id: order_id.to_string(),
            address: address.to_string(),
        });
        Ok(())
    }

    fn cancel_delivery(&self, order_id: &str) -> Result<()> {
        self.check_reversal(StepKind::Delivery)?;

        let mut state = self.state();
        if state.deliveries.remove(order_id).is_none() {
            return Err(ExecutionError::NothingToReverse {
                step: StepKind::Delivery,
                reference: order_id.to_string(),
            });
        }
        state.journal.push(Effect::DeliveryCancelled {
            order_id: order_id.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new(
            BackendSettings::default()
                .with_credit_limit(1_000)
                .with_stock("WIDGET-7", 5)
                .with_blocked_address("Nowhere"),
        )
    }

    #[test]
    fn charge_above_credit_limit_is_declined() {
        let backend = backend();

        let err = backend.charge("ORD-1", 1_001).expect_err("should decline");

        assert!(matches!(err, ExecutionError::PaymentDeclined { .. }));
        assert!(backend.charged("ORD-1").is_none());
    }

    #[test]
    fn charge_total_overflow_is_declined() -> anyhow::Result<()> {
        let backend = InMemoryBackend::new(BackendSettings::default().with_credit_limit(u64::MAX));

        backend.charge("ORD-1", u64::MAX)?;
        let err = backend.charge("ORD-1", 1).expect_err("total out of range");

        assert!(matches!(err, ExecutionError::PaymentDeclined { .. }));
        assert_eq!(backend.charged("ORD-1"), Some(u64::MAX));
        assert_eq!(backend.journal().len(), 1);
        Ok(())
    }

    #[test]
    fn second_delivery_for_same_order_is_unavailable() -> anyhow::Result<()> {
        let backend = backend();

        backend.schedule("ORD-1", "here")?;
        let err = backend.schedule("ORD-1", "here").expect_err("already scheduled");

        assert_eq!(
            err,
            ExecutionError::DeliveryUnavailable {
                address: "here".to_string(),
            }
        );
        backend.cancel_delivery("ORD-1")?;
        assert!(backend.is_settled());
        Ok(())
    }

    #[test]
    fn refund_without_charge_has_nothing_to_reverse() {
        let backend = backend();

        let err = backend.refund("ORD-1", 10).expect_err("nothing charged");

        assert_eq!(
            err,
            ExecutionError::NothingToReverse {
                step: StepKind::Payment,
                reference: "ORD-1".to_string(),
            }
        );
    }

    #[test]
    fn partial_refund_keeps_remaining_charge() -> anyhow::Result<()> {
        let backend = backend();

        backend.charge("ORD-1", 300)?;
        backend.charge("ORD-1", 200)?;
        backend.refund("ORD-1", 200)?;

        assert_eq!(backend.charged("ORD-1"), Some(300));
        Ok(())
    }

    #[test]
    fn duplicate_order_is_rejected() -> anyhow::Result<()> {
        let backend = backend();
        backend.place("ORD-1", "ada")?;

        let err = backend.place("ORD-1", "ada").expect_err("duplicate");

        assert!(err.to_string().contains("already exists"));
        Ok(())
    }

    #[test]
    fn order_without_customer_is_rejected() {
        let backend = backend();

        let err = backend.place("ORD-1", "  ").expect_err("no customer");

        assert!(matches!(err, ExecutionError::OrderRejected { .. }));
    }

    #[test]
    fn blocked_address_is_unavailable_case_insensitively() {
        let backend = backend();

        let err = backend
            .schedule("ORD-1", "nowhere")
            .expect_err("blocked address");

        assert!(matches!(err, ExecutionError::DeliveryUnavailable { .. }));
        assert!(!backend.has_delivery("ORD-1"));
    }

    #[test]
    fn injected_failure_only_affects_its_step() -> anyhow::Result<()> {
        let backend = backend().with_failure(StepKind::Order);

        backend.charge("ORD-1", 10)?;
        let err = backend.place("ORD-1", "ada").expect_err("injected");

        assert_eq!(
            err,
            ExecutionError::Injected {
                step: StepKind::Order
            }
        );
        Ok(())
    }

    #[test]
    fn injected_reversal_failure_leaves_effect_in_place() -> anyhow::Result<()> {
        let backend = backend().with_reversal_failure(StepKind::Inventory);
        backend.reserve("WIDGET-7", 2)?;

        let err = backend.release("WIDGET-7", 2).expect_err("injected");

        assert!(matches!(err, ExecutionError::ReversalInjected { .. }));
        assert_eq!(backend.stock_level("WIDGET-7"), 3);
        assert!(!backend.is_settled());
        Ok(())
    }

    #[test]
    fn reversing_everything_settles_backend() -> anyhow::Result<()> {
        let backend = backend();

        backend.charge("ORD-1", 10)?;
        backend.place("ORD-1", "ada")?;
        backend.reserve("WIDGET-7", 5)?;
        backend.schedule("ORD-1", "12 Analytical Row")?;
        assert!(!backend.is_settled());

        backend.cancel_delivery("ORD-1")?;
        backend.release("WIDGET-7", 5)?;
        backend.cancel("ORD-1")?;
        backend.refund("ORD-1", 10)?;

        assert!(backend.is_settled());
        assert_eq!(backend.journal().len(), 8);
        Ok(())
    }

    #[test]
    fn effects_display_as_sentences() {
        let charged = Effect::Charged {
            order_id: "ORD-1".to_string(),
            amount_cents: 10,
        };
        let released = Effect::StockReleased {
            sku: "WIDGET-7".to_string(),
            quantity: 2,
        };

        assert_eq!(charged.to_string(), "charged 10 cents for order 'ORD-1'");
        assert_eq!(released.to_string(), "released 2 x 'WIDGET-7'");
    }

    #[test]
    fn settings_deserialize_with_defaults() -> anyhow::Result<()> {
        let settings: BackendSettings = toml::from_str(
            r#"
blocked_addresses = ["Nowhere"]

[stock]
"WIDGET-7" = 10
"#,
        )?;

        assert_eq!(settings.credit_limit_cents, DEFAULT_CREDIT_LIMIT_CENTS);
        assert_eq!(settings.stock.get("WIDGET-7"), Some(&10));
        assert!(settings.is_blocked(" NOWHERE "));
        Ok(())
    }
}
