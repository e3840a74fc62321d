//! # Desk Commands
//!
//! The async surface a UI binds to. Every command takes the state it
//! needs by reference and returns `Result<T, ApiError>`; payloads and
//! results are serde types so any IPC layer can carry them as JSON.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here
//! ├── register.rs   ◄─── Open/close drawer, expenses, income, cancel
//! ├── sale.rs       ◄─── Cart manipulation and checkout
//! ├── inventory.rs  ◄─── Product CRUD, stock receipts, low stock
//! └── reports.rs    ◄─── Summary, export, advisory, rankings, import
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI: checkout({ paymentMethod: "PIX" })                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  sale::checkout(&DeskState, &CartState, input)                          │
//! │         │                                                               │
//! │         ├─► DeskState::mutate(ring_sale)  (locks, persists)             │
//! │         └─► CartState::clear                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  UI receives: SaleReceipt  |  { code, message }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod inventory;
pub mod register;
pub mod reports;
pub mod sale;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::DeskConfig;
    use crate::state::DeskState;
    use fluxo_core::{Money, ProductDraft};
    use fluxo_db::{Database, DbConfig};

    pub async fn desk_state() -> DeskState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        DeskState::load(db, DeskConfig::default()).await.unwrap()
    }

    pub fn draft(name: &str, sell_cents: i64, stock: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: "Geral".to_string(),
            cost_price: Money::from_cents(sell_cents / 2),
            sell_price: Money::from_cents(sell_cents),
            stock,
            min_stock: 2,
        }
    }
}
