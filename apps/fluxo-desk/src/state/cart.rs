//! # Cart State
//!
//! The ticket being assembled at the counter, before it becomes a sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI Action            Command               Cart Change                 │
//! │  ─────────            ───────               ───────────                 │
//! │  Pick product ──────► add_to_cart() ──────► push / qty += n             │
//! │  Change quantity ───► update_cart_item() ─► qty = n (0 removes)         │
//! │  Remove ────────────► remove_from_cart() ─► retain                      │
//! │  Finish ────────────► checkout() ─────────► SaleRequest, then clear     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities are checked against the stock seen when the item is added.
//! The sale itself re-checks stock, so a stale cart can never oversell.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fluxo_core::{Money, PaymentMethod, Product, SaleLine, SaleRequest, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Quantity cannot exceed {max}")]
    QuantityTooLarge { max: i64 },

    #[error("Cart cannot have more than {max} items")]
    TooManyItems { max: usize },

    #[error("Only {available} of {name} in stock")]
    ExceedsStock { name: String, available: i64 },

    #[error("Product {product_id} not in cart")]
    NotInCart { product_id: String },

    #[error("Cart is empty")]
    Empty,
}

/// A cart line. Name and price are frozen when the product is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// ## Invariants
/// - One line per product (adding again raises the quantity)
/// - 1 ≤ quantity ≤ min(stock, `MAX_ITEM_QUANTITY`)
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_item(&mut self, product: &Product, quantity: i64) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity.saturating_add(quantity);
            check_quantity(product, new_qty)?;
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CartError::TooManyItems { max: MAX_CART_ITEMS });
        }
        check_quantity(product, quantity)?;

        self.items.push(CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.sell_price,
            quantity,
        });
        Ok(())
    }

    /// Sets a line's quantity. Zero removes the line.
    pub fn update_quantity(&mut self, product: &Product, quantity: i64) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(&product.id);
        }
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }
        check_quantity(product, quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
            .ok_or_else(|| CartError::NotInCart {
                product_id: product.id.clone(),
            })?;
        item.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CartError::NotInCart {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Turns the cart into a sale request. The cart itself is untouched.
    pub fn to_sale_request(
        &self,
        payment_method: PaymentMethod,
        tendered: Option<Money>,
        note: Option<String>,
    ) -> Result<SaleRequest, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }

        Ok(SaleRequest {
            lines: self
                .items
                .iter()
                .map(|i| SaleLine {
                    product_id: i.product_id.clone(),
                    quantity: i.quantity,
                })
                .collect(),
            payment_method,
            tendered,
            note,
        })
    }
}

fn check_quantity(product: &Product, quantity: i64) -> Result<(), CartError> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CartError::QuantityTooLarge {
            max: MAX_ITEM_QUANTITY,
        });
    }
    if quantity > product.stock {
        return Err(CartError::ExceedsStock {
            name: product.name.clone(),
            available: product.stock,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}

/// Shared cart. Operations are short and synchronous, so a std `Mutex`
/// is enough.
#[derive(Debug, Default)]
pub struct CartState {
    cart: Mutex<Cart>,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}
