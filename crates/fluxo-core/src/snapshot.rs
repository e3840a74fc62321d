//! Full in-memory state, exchanged with the persistence layer.
//!
//! The host loads one at startup and saves a fresh one after every
//! mutation. There is no partial persistence.

use serde::{Deserialize, Serialize};

use crate::types::{CashSession, Product, Transaction};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub transactions: Vec<Transaction>,
    pub sessions: Vec<CashSession>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.transactions.is_empty() && self.sessions.is_empty()
    }
}
