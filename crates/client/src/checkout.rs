//! Placing an order for the cart's contents.

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, OrderConfirmation};
use crate::cart::CartStore;

/// Errors that can occur when placing an order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub confirmation: OrderConfirmation,
    /// Cart total at submission, two decimals.
    pub total: String,
    pub item_count: u64,
}

/// Submits the cart and, on success, removes what was ordered from it.
#[derive(Debug, Clone)]
pub struct Checkout {
    api: ApiClient,
    cart: CartStore,
}

impl Checkout {
    #[must_use]
    pub const fn new(api: ApiClient, cart: CartStore) -> Self {
        Self { api, cart }
    }

    /// Submit the current cart.
    ///
    /// Once the backend confirms the order, the submitted quantities are taken
    /// out of the cart in a single update, so anything added while the request
    /// was in flight stays. On any failure the cart is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` without sending anything if the cart
    /// is empty, and `CheckoutError::Api` if the submission fails.
    #[instrument(skip(self))]
    pub async fn place_order(&self) -> Result<PlacedOrder, CheckoutError> {
        let snapshot = self.cart.snapshot();
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = snapshot.total().format();
        let item_count = snapshot.item_count();

        let confirmation = self
            .api
            .submit_order(snapshot.lines())
            .await
            .inspect_err(|e| warn!(error = %e, "Order submission failed"))?;

        self.cart.settle_order(&snapshot);
        info!(order_id = %confirmation.order_id, total = %total, "Order placed");

        Ok(PlacedOrder {
            confirmation,
            total,
            item_count,
        })
    }
}
