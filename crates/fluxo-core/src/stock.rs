//! # Stock Ledger
//!
//! Owns the product records and the only code path that changes `stock`.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stock Ledger                                     │
//! │                                                                         │
//! │  create / update / delete ─────► product records                       │
//! │                                                                         │
//! │  adjust_stock(id, delta) ──────► stock += delta   (never below zero)   │
//! │                                                                         │
//! │  receive_stock(id, qty, mode)                                          │
//! │     ├── PURCHASE ──► stock += qty, ledger.record(EXPENSE, cost, CASH)  │
//! │     └── PRODUCTION ► stock += qty, ledger.record(PRODUCTION, 0, NONE)  │
//! │                                                                         │
//! │  low_stock() ──────────────────► stock <= min_stock (derived read)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `delete` is a hard removal. Sales keep their own name/price snapshot, so
//! reports still read correctly; stock compensation for a deleted product
//! is skipped.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ledger::TransactionLedger;
use crate::money::Money;
use crate::types::{
    LineItem, PaymentMethod, Product, ProductDraft, StockReceiptMode, Transaction,
    TransactionDraft, TransactionKind,
};
use crate::validation::{validate_non_negative, validate_positive_quantity, validate_product_draft};

/// Result of a stock receipt: the updated product and the ledger entry it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReceipt {
    pub product: Product,
    pub transaction: Transaction,
}

/// The product catalogue with its stock levels.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    products: Vec<Product>,
}

impl StockLedger {
    pub fn new() -> Self {
        StockLedger::default()
    }

    /// Rebuilds the ledger from persisted products.
    ///
    /// Rejects duplicate ids and negative stock so a corrupt load never
    /// becomes live state.
    pub fn from_products(products: Vec<Product>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "product id".to_string(),
                    value: product.id.clone(),
                }
                .into());
            }
            validate_product_draft(&ProductDraft::from(product))?;
        }
        Ok(StockLedger { products })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All products, in catalogue order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Like [`get`](Self::get), failing with `NotFound`.
    pub fn require(&self, id: &str) -> CoreResult<&Product> {
        self.get(id).ok_or_else(|| CoreError::product_not_found(id))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products at or below their minimum stock.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_critical()).collect()
    }

    /// Total units on hand across the catalogue.
    pub fn total_units(&self) -> i64 {
        self.products.iter().map(|p| p.stock).sum()
    }

    /// Case-insensitive match on name or category.
    ///
    /// `in_stock_only` hides products with nothing on hand (the counter
    /// picker only offers what can be sold).
    pub fn search(&self, term: &str, in_stock_only: bool) -> Vec<&Product> {
        let needle = term.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| !in_stock_only || p.stock > 0)
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Verifies every line can be supplied, summing lines that repeat a product.
    pub fn check_availability(&self, lines: &[LineItem]) -> CoreResult<()> {
        let mut wanted: BTreeMap<&str, i64> = BTreeMap::new();
        for line in lines {
            *wanted.entry(line.product_id.as_str()).or_insert(0) += line.quantity;
        }

        for (product_id, requested) in wanted {
            let product = self.require(product_id)?;
            if product.stock < requested {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    available: product.stock,
                    requested,
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Catalogue Mutations
    // =========================================================================

    /// Adds a product with a fresh UUID.
    pub fn create(&mut self, draft: ProductDraft) -> CoreResult<Product> {
        validate_product_draft(&draft)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            category: draft.category.trim().to_string(),
            cost_price: draft.cost_price,
            sell_price: draft.sell_price,
            stock: draft.stock,
            min_stock: draft.min_stock,
        };

        debug!(id = %product.id, name = %product.name, stock = product.stock, "Creating product");
        self.products.push(product.clone());
        Ok(product)
    }

    /// Replaces the editable fields of a product.
    pub fn update(&mut self, id: &str, draft: ProductDraft) -> CoreResult<Product> {
        validate_product_draft(&draft)?;
        let product = self.find_mut(id)?;

        product.name = draft.name.trim().to_string();
        product.category = draft.category.trim().to_string();
        product.cost_price = draft.cost_price;
        product.sell_price = draft.sell_price;
        product.stock = draft.stock;
        product.min_stock = draft.min_stock;

        debug!(id = %product.id, stock = product.stock, "Updated product");
        Ok(product.clone())
    }

    /// Hard-deletes a product and returns it.
    pub fn delete(&mut self, id: &str) -> CoreResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::product_not_found(id))?;

        let removed = self.products.remove(index);
        info!(id = %removed.id, name = %removed.name, "Deleted product");
        Ok(removed)
    }

    // =========================================================================
    // Stock Movements
    // =========================================================================

    /// Moves stock by exactly `delta`.
    ///
    /// ## Errors
    /// - `NotFound` when the product does not exist
    /// - `InsufficientStock` when the result would be negative
    ///
    /// ```rust
    /// use fluxo_core::stock::StockLedger;
    /// use fluxo_core::types::ProductDraft;
    /// use fluxo_core::Money;
    ///
    /// let mut stock = StockLedger::new();
    /// let p = stock.create(ProductDraft {
    ///     name: "Coca-Cola 350ml".into(),
    ///     category: "Bebidas".into(),
    ///     cost_price: Money::from_cents(250),
    ///     sell_price: Money::from_cents(500),
    ///     stock: 2,
    ///     min_stock: 1,
    /// }).unwrap();
    ///
    /// assert_eq!(stock.adjust_stock(&p.id, -2).unwrap().stock, 0);
    /// assert!(stock.adjust_stock(&p.id, -1).is_err());
    /// ```
    pub fn adjust_stock(&mut self, id: &str, delta: i64) -> CoreResult<Product> {
        let product = self.find_mut(id)?;

        let next = product
            .stock
            .checked_add(delta)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            })?;

        if next < 0 {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.stock,
                requested: delta.saturating_neg(),
            });
        }

        product.stock = next;
        debug!(id = %product.id, delta, stock = next, "Adjusted stock");
        Ok(product.clone())
    }

    /// Receives stock into the shop.
    ///
    /// A purchase records an EXPENSE paid in cash for `total_cost`. Production
    /// records a zero-amount PRODUCTION entry so the movement stays auditable;
    /// `total_cost` is ignored for it.
    pub fn receive_stock(
        &mut self,
        ledger: &mut TransactionLedger,
        product_id: &str,
        quantity: i64,
        mode: StockReceiptMode,
        total_cost: Money,
        at: DateTime<Utc>,
    ) -> CoreResult<StockReceipt> {
        validate_positive_quantity(quantity)?;
        if mode == StockReceiptMode::Purchase {
            validate_non_negative("total cost", total_cost)?;
        }

        let product = self.require(product_id)?;
        if product.stock.checked_add(quantity).is_none() {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let draft = match mode {
            StockReceiptMode::Purchase => TransactionDraft::new(
                TransactionKind::Expense,
                format!("Compra de estoque: {}x {}", quantity, product.name),
                total_cost,
                PaymentMethod::Cash,
            ),
            StockReceiptMode::Production => TransactionDraft::new(
                TransactionKind::Production,
                format!("Produção interna: {}x {}", quantity, product.name),
                Money::zero(),
                PaymentMethod::None,
            ),
        };

        let transaction = ledger.record(draft, at)?;
        let product = self.adjust_stock(product_id, quantity)?;

        info!(
            product_id = %product.id,
            quantity,
            mode = ?mode,
            cost = %transaction.amount,
            "Received stock"
        );

        Ok(StockReceipt {
            product,
            transaction,
        })
    }

    fn find_mut(&mut self, id: &str) -> CoreResult<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::product_not_found(id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
