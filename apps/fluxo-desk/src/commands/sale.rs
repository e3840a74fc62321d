//! # Sale Commands
//!
//! Cart manipulation and checkout.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐
//! │  Empty   │────►│ In Cart  │────►│ Checkout │────►│   Sale   │
//! │  Cart    │     │          │     │          │     │ recorded │
//! └──────────┘     └──────────┘     └──────────┘     └──────────┘
//!                       │                │ error: cart kept
//!                  add / update          │ as it was
//!                  remove / clear        ▼
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{Cart, CartItem, CartState, CartTotals, DeskState};
use fluxo_core::{Money, PaymentMethod, Product, SaleReceipt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            items: cart.items.clone(),
            totals: CartTotals::from(cart),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    pub payment_method: PaymentMethod,
    /// Cash handed over, for computing change.
    #[serde(default)]
    pub tendered: Option<Money>,
    /// Customer name for TERM sales.
    #[serde(default)]
    pub note: Option<String>,
}

pub fn get_cart(cart: &CartState) -> CartResponse {
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds `quantity` (default 1) of a product at its current price.
pub async fn add_to_cart(
    state: &DeskState,
    cart: &CartState,
    product_id: &str,
    quantity: Option<i64>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id, quantity, "add_to_cart command");

    let product = current_product(state, product_id).await?;
    cart.with_cart_mut(|c| {
        c.add_item(&product, quantity)?;
        Ok(CartResponse::from(&*c))
    })
}

pub async fn update_cart_item(
    state: &DeskState,
    cart: &CartState,
    product_id: &str,
    quantity: i64,
) -> ApiResult<CartResponse> {
    debug!(product_id, quantity, "update_cart_item command");

    // A product deleted after it was added can still be removed.
    if quantity == 0 {
        return remove_from_cart(cart, product_id);
    }

    let product = current_product(state, product_id).await?;
    cart.with_cart_mut(|c| {
        c.update_quantity(&product, quantity)?;
        Ok(CartResponse::from(&*c))
    })
}

pub fn remove_from_cart(cart: &CartState, product_id: &str) -> ApiResult<CartResponse> {
    debug!(product_id, "remove_from_cart command");
    cart.with_cart_mut(|c| {
        c.remove_item(product_id)?;
        Ok(CartResponse::from(&*c))
    })
}

pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");
    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

/// Rings the cart up as one sale and empties it.
///
/// The stock check, the ledger entry and the stock decrement happen
/// together inside the desk; any failure leaves both the desk and the
/// cart as they were.
pub async fn checkout(state: &DeskState, cart: &CartState, input: CheckoutInput) -> ApiResult<SaleReceipt> {
    debug!(method = ?input.payment_method, "checkout command");

    let request = cart.with_cart(|c| c.to_sale_request(input.payment_method, input.tendered, input.note))?;
    let receipt = state.mutate(|desk| desk.ring_sale(request)).await?;

    cart.with_cart_mut(Cart::clear);
    info!(
        transaction_id = %receipt.transaction.id,
        total = %receipt.transaction.amount,
        "Checkout complete"
    );
    Ok(receipt)
}

async fn current_product(state: &DeskState, product_id: &str) -> ApiResult<Product> {
    state
        .read(|desk| desk.stock().get(product_id).cloned())
        .await
        .ok_or_else(|| ApiError::not_found("Product", product_id))
}
