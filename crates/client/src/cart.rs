//! Client-side shopping cart.
//!
//! [`Cart`] is a plain value with the mutation rules; [`CartStore`] is the
//! process-wide shared handle every cart-aware surface talks to.
//!
//! # Invariants
//!
//! - At most one [`CartLine`] per product id.
//! - A line's quantity is always at least 1. Decrementing a line of quantity 1
//!   removes it.
//! - Lines keep the order in which their product was first added.
//!
//! # Concurrency
//!
//! Every mutation runs inside [`tokio::sync::watch::Sender::send_if_modified`],
//! which holds the write lock while the closure sees the latest cart. Two
//! call sites can never interleave a read and a write.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use cinecart_core::{Price, Product, ProductId};

/// One product and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// The product snapshot taken when it was first added.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Quantity, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`, counting a missing price as zero.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.unit_price().times(self.quantity)
    }
}

/// An ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Lines in first-added order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product.id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.product.id == product_id)
    }

    /// Add one unit of `product`. Returns `true` (the cart always changes).
    pub fn add(&mut self, product: Product) -> bool {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                product,
                quantity: 1,
            });
        }
        true
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product.id != product_id);
        self.lines.len() != before
    }

    /// Add one to an existing line. Returns whether a line was found.
    pub fn increment(&mut self, product_id: &ProductId) -> bool {
        self.line_mut(product_id).is_some_and(|line| {
            line.quantity = line.quantity.saturating_add(1);
            true
        })
    }

    /// Take one from an existing line, removing it when it would reach zero.
    /// Returns whether a line was found.
    pub fn decrement(&mut self, product_id: &ProductId) -> bool {
        let Some(line) = self.line_mut(product_id) else {
            return false;
        };
        if line.quantity > 1 {
            line.quantity -= 1;
            true
        } else {
            self.remove(product_id)
        }
    }

    /// Drop every line. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        changed
    }

    /// Take away the quantities in `ordered`, dropping lines that reach zero.
    /// Lines added after `ordered` was taken are kept. Returns whether
    /// anything changed.
    pub fn settle(&mut self, ordered: &[CartLine]) -> bool {
        let mut changed = false;
        for placed in ordered {
            let Some(line) = self.line_mut(&placed.product.id) else {
                continue;
            };
            changed = true;
            if line.quantity > placed.quantity {
                line.quantity -= placed.quantity;
            } else {
                self.remove(&placed.product.id);
            }
        }
        changed
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `price × quantity`. Lines with an unknown price count as zero.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }
}

/// Shared, cloneable handle to the session's cart.
///
/// Clones refer to the same cart. Read queries are computed on demand from
/// the current state.
#[derive(Clone, Debug)]
pub struct CartStore {
    inner: Arc<watch::Sender<Cart>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(watch::Sender::new(Cart::default())),
        }
    }

    /// Apply `mutate` to the latest cart. Subscribers are notified only when
    /// it reports a change.
    fn update(&self, mutate: impl FnOnce(&mut Cart) -> bool) -> bool {
        self.inner.send_if_modified(mutate)
    }

    /// Add one unit of `product`, creating its line if needed.
    pub fn add_to_cart(&self, product: Product) {
        debug!(product_id = %product.id, "Adding product to cart");
        self.update(|cart| cart.add(product));
    }

    /// Remove the line for `product_id`. No-op if absent.
    pub fn remove_from_cart(&self, product_id: &ProductId) {
        debug!(%product_id, "Removing product from cart");
        self.update(|cart| cart.remove(product_id));
    }

    /// Increment the line for `product_id`. No-op if absent.
    pub fn increment_quantity(&self, product_id: &ProductId) {
        debug!(%product_id, "Incrementing cart quantity");
        self.update(|cart| cart.increment(product_id));
    }

    /// Decrement the line for `product_id`, removing it instead of storing
    /// zero. No-op if absent.
    pub fn decrement_quantity(&self, product_id: &ProductId) {
        debug!(%product_id, "Decrementing cart quantity");
        self.update(|cart| cart.decrement(product_id));
    }

    /// Empty the cart.
    pub fn clear(&self) {
        debug!("Clearing cart");
        self.update(Cart::clear);
    }

    /// Remove what an order took from the cart, keeping anything added
    /// since `ordered` was snapshotted.
    pub fn settle_order(&self, ordered: &Cart) {
        debug!(lines = ordered.len(), "Settling ordered lines");
        self.update(|cart| cart.settle(ordered.lines()));
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.inner.borrow().item_count()
    }

    /// Cart total formatted with exactly two decimals.
    #[must_use]
    pub fn total(&self) -> String {
        self.inner.borrow().total().format()
    }

    /// An owned copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.inner.borrow().clone()
    }

    /// Observe cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.subscribe()
    }
}
