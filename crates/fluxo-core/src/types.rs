//! # Domain Types
//!
//! Core domain types used throughout Fluxo.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │   CashSession   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name/category  │   │  kind / method  │   │  opened_at      │       │
//! │  │  cost/sell      │   │  amount         │   │  closed_at?     │       │
//! │  │  stock/min      │   │  items[] (snap) │   │  initial/counted│       │
//! │  └─────────────────┘   │  status         │   │  status         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  TransactionKind    SALE | EXPENSE | INCOME | PRODUCTION                │
//! │  PaymentMethod      CASH | CREDIT | DEBIT | PIX | TERM | NONE           │
//! │  TransactionStatus  COMPLETED → CANCELLED (once)                        │
//! │  SessionStatus      OPEN → CLOSED (once)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A [`LineItem`] copies the product name and sell price at sale time. The
//! product can later be renamed, repriced or deleted without changing what
//! the ledger says was sold.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::OPENING_FLOAT_DESCRIPTION;

// =============================================================================
// Product
// =============================================================================

/// A product kept in stock and sold at the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown at the counter and snapshotted into sales.
    pub name: String,

    /// Free-form grouping ("Bebidas", "Lanches", ...).
    pub category: String,

    /// What one unit costs the store.
    pub cost_price: Money,

    /// What one unit sells for.
    pub sell_price: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Threshold at or below which the product is critical.
    pub min_stock: i64,
}

impl Product {
    /// A product is critical when `stock <= min_stock`.
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Unit margin (sell - cost). May be negative.
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.sell_price - self.cost_price
    }
}

/// The editable fields of a product, used by `create` and `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub cost_price: Money,
    pub sell_price: Money,
    pub stock: i64,
    pub min_stock: i64,
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        ProductDraft {
            name: product.name.clone(),
            category: product.category.clone(),
            cost_price: product.cost_price,
            sell_price: product.sell_price,
            stock: product.stock,
            min_stock: product.min_stock,
        }
    }
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// What a ledger entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Goods sold at the counter.
    Sale,
    /// Money leaving the business (supplies, stock purchases, bills).
    Expense,
    /// Money entering outside of a sale (including the opening float).
    Income,
    /// Internal manufacture log; carries no monetary value.
    Production,
}

impl TransactionKind {
    /// Operator-facing label (pt-BR).
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "Venda",
            TransactionKind::Expense => "Despesa",
            TransactionKind::Income => "Entrada",
            TransactionKind::Production => "Produção",
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How money moved. `None` marks entries with no payment (production logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Physical cash; the only method that moves the drawer balance.
    Cash,
    Credit,
    Debit,
    Pix,
    /// Sold on credit to a known customer, paid later.
    Term,
    None,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::Credit,
        PaymentMethod::Debit,
        PaymentMethod::Pix,
        PaymentMethod::Term,
        PaymentMethod::None,
    ];

    /// Operator-facing label (pt-BR).
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Credit => "Crédito",
            PaymentMethod::Debit => "Débito",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Term => "A Prazo",
            PaymentMethod::None => "N/A",
        }
    }

    #[inline]
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Completed,
    /// Soft-cancelled: kept for audit, excluded from active totals.
    Cancelled,
}

// =============================================================================
// Line Item
// =============================================================================

/// A product line inside a sale, frozen at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    pub quantity: i64,
    /// Sell price at time of sale (frozen).
    pub unit_price: Money,
}

impl LineItem {
    /// Snapshots a product into a line.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price: product.sell_price,
        }
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// One entry of the append-only ledger.
///
/// Only the ledger mutates a recorded transaction, and only its `status`
/// and `cancellation_reason`, once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    /// Marks the synthetic income recorded when a drawer session opens.
    #[serde(default)]
    pub opening_float: bool,
}

impl Transaction {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == TransactionStatus::Cancelled
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_cancelled()
    }

    /// True for the opening-float income of a session.
    ///
    /// Records written before the flag existed are recognised by their
    /// description.
    pub fn is_opening_float(&self) -> bool {
        self.opening_float
            || (self.kind == TransactionKind::Income
                && self.description == OPENING_FLOAT_DESCRIPTION)
    }

    /// Whether the entry falls inside `[from, until]` (`until` open-ended when `None`).
    pub fn within(&self, from: DateTime<Utc>, until: Option<DateTime<Utc>>) -> bool {
        self.timestamp >= from && until.map_or(true, |end| self.timestamp <= end)
    }
}

/// What the caller supplies to record a new transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub opening_float: bool,
}

impl TransactionDraft {
    pub fn new(
        kind: TransactionKind,
        description: impl Into<String>,
        amount: Money,
        payment_method: PaymentMethod,
    ) -> Self {
        TransactionDraft {
            kind,
            description: description.into(),
            amount,
            payment_method,
            items: Vec::new(),
            opening_float: false,
        }
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }
}

// =============================================================================
// Stock Receipt Mode
// =============================================================================

/// How received stock came in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockReceiptMode {
    /// Bought from a supplier; records an expense for the total cost.
    Purchase,
    /// Made in-house; no monetary entry.
    Production,
}

// =============================================================================
// Cash Session
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// One open→close cycle of the physical cash drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashSession {
    pub id: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Cash placed in the drawer at opening (the float).
    pub initial_amount: Money,
    /// Cash the operator counted at closing.
    pub counted_amount: Option<Money>,
    pub status: SessionStatus,
}

impl CashSession {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Whether a transaction belongs to this session's window.
    #[inline]
    pub fn contains(&self, transaction: &Transaction) -> bool {
        transaction.within(self.opened_at, self.closed_at)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
