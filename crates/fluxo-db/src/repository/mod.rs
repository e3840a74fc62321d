//! # Repository Module
//!
//! One repository per persisted list.
//!
//! ## Full-List Persistence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  load_all()          SELECT ... ORDER BY position                      │
//! │                      (transactions also join their line items)          │
//! │                                                                         │
//! │  replace_all(list)   BEGIN                                              │
//! │                        DELETE FROM <table>                              │
//! │                        INSERT one row per element (position = index)    │
//! │                      COMMIT                                             │
//! │                                                                         │
//! │  replace_in(conn)    same statements on a caller-owned transaction,     │
//! │                      used by Database::save_snapshot                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalogue
//! - [`TransactionRepository`](transaction::TransactionRepository) - Ledger entries and line items
//! - [`SessionRepository`](session::SessionRepository) - Cash drawer sessions

pub mod product;
pub mod session;
pub mod transaction;
