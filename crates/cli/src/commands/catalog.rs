//! Catalog and checkout commands.

use tracing::info;

use cinecart_client::{ApiError, AuthSession, Checkout, CheckoutError};
use cinecart_core::{Product, ProductId};

/// Fetch the catalog, logging out if the session was refused.
async fn fetch_products(session: &AuthSession) -> Result<Vec<Product>, ApiError> {
    match session.api().fetch_products().await {
        Ok(products) => Ok(products),
        Err(e) => {
            session.logout_on_auth_failure(&e).await;
            Err(e)
        }
    }
}

/// Print the catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn list_products(session: &AuthSession) -> Result<(), Box<dyn std::error::Error>> {
    let products = fetch_products(session).await?;
    if products.is_empty() {
        println!("No products available.");
        return Ok(());
    }
    for product in &products {
        let price = product
            .price
            .map_or_else(|| "-".to_string(), |p| p.format());
        println!("{:>6}  {:<40}  {:>10}", product.id, product.name, price);
    }
    Ok(())
}

/// Fill the cart with `product_ids` and place the order.
///
/// # Errors
///
/// Returns an error if an id is not in the catalog or the order fails.
#[allow(clippy::print_stdout)]
pub async fn checkout(
    session: &AuthSession,
    product_ids: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let products = fetch_products(session).await?;
    let cart = session.cart();

    for raw in product_ids {
        let id = ProductId::new(raw.as_str());
        let product = products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| format!("Unknown product id: {raw}"))?;
        cart.add_to_cart(product.clone());
    }

    let snapshot = cart.snapshot();
    for line in snapshot.lines() {
        println!(
            "{:>3} x {:<40}  {:>10}",
            line.quantity(),
            line.product().name,
            line.subtotal().format()
        );
    }
    println!("Items: {}  Total: {}", cart.item_count(), cart.total());

    let checkout = Checkout::new(session.api().clone(), cart.clone());
    match checkout.place_order().await {
        Ok(order) => {
            info!(order_id = %order.confirmation.order_id, "Checkout complete");
            println!("Order {} placed.", order.confirmation.order_id);
            Ok(())
        }
        Err(CheckoutError::Api(e)) => {
            session.logout_on_auth_failure(&e).await;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
