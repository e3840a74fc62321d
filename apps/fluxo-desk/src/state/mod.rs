//! # Application State
//!
//! ```text
//! ┌──────────────────────────────┐ ┌──────────────────────────────┐
//! │         DeskState            │ │          CartState           │
//! │                              │ │                              │
//! │  • Mutex<CashDesk>           │ │  • Ticket being assembled    │
//! │  • Database (persist)        │ │  • Frozen prices             │
//! │  • DeskConfig                │ │                              │
//! └──────────────────────────────┘ └──────────────────────────────┘
//! ```
//!
//! Commands take only the state they need.

mod cart;
mod desk;

pub use cart::{Cart, CartError, CartItem, CartState, CartTotals};
pub use desk::DeskState;
