//! # fluxo-core: Pure Accounting Core for Fluxo
//!
//! This crate is the **heart** of Fluxo. It owns every rule that keeps stock,
//! money and the cash drawer consistent, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fluxo Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    fluxo-desk (host)                            │   │
//! │  │    config ──► state ──► commands (register, sale, inventory)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fluxo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   stock   │  │  ledger   │  │  session  │  │ aggregate │  │   │
//! │  │   │ products  │  │  append-  │  │  drawer   │  │  reports  │  │   │
//! │  │   │ movements │  │  only log │  │  open/close│ │  (reads)  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                 service::CashDesk (composes all four)           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ Snapshot                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    fluxo-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent Money and currency formatting
//! - [`types`] - Product, Transaction, CashSession and their enums
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`stock`] - Stock ledger (the only writer of `stock`)
//! - [`ledger`] - Append-only transaction ledger with soft cancellation
//! - [`session`] - Cash drawer sessions
//! - [`aggregate`] - Pure derived reports
//! - [`service`] - [`CashDesk`], the single owner of all mutable state
//! - [`export`] / [`advisory`] - Read-only report payloads
//! - [`snapshot`] - Full state for persistence
//!
//! ## Example Usage
//!
//! ```rust
//! use fluxo_core::{CashDesk, Money, PaymentMethod, ProductDraft, SaleLine, SaleRequest};
//!
//! let mut desk = CashDesk::new();
//! let coke = desk.create_product(ProductDraft {
//!     name: "Coca-Cola 350ml".into(),
//!     category: "Bebidas".into(),
//!     cost_price: Money::from_cents(250),
//!     sell_price: Money::from_cents(500),
//!     stock: 48,
//!     min_stock: 12,
//! }).unwrap();
//!
//! desk.open_register(Money::from_cents(10_000)).unwrap();
//! desk.ring_sale(SaleRequest {
//!     lines: vec![SaleLine { product_id: coke.id.clone(), quantity: 2 }],
//!     payment_method: PaymentMethod::Cash,
//!     tendered: None,
//!     note: None,
//! }).unwrap();
//!
//! assert_eq!(desk.drawer_balance().cents(), 11_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod advisory;
pub mod aggregate;
pub mod error;
pub mod export;
pub mod ledger;
pub mod money;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CurrencyFormat, Money};
pub use service::{CashDesk, Clock, SaleLine, SaleReceipt, SaleRequest, SessionClosing};
pub use snapshot::Snapshot;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Description written on the income entry recorded when a session opens.
///
/// Also used to recognise opening floats in records that predate the
/// `opening_float` flag.
pub const OPENING_FLOAT_DESCRIPTION: &str = "Abertura de Caixa";

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity moved by a single line or stock receipt.
///
/// ## Business Reason
/// Catches typos at the counter (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Transactions included in an advisory snapshot by default.
pub const DEFAULT_ADVISORY_RECENT: usize = 20;

/// Entries in the top-products ranking by default.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;
