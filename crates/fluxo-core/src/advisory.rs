//! Bounded read-only snapshot handed to the external advisory service.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregate::total_sales_revenue;
use crate::money::Money;
use crate::types::{CashSession, Product, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdvisorySnapshot {
    pub total_products: usize,
    pub products: Vec<Product>,
    /// Names of products at or below minimum stock.
    pub low_stock: Vec<String>,
    /// Last active transactions, oldest first.
    pub recent_transactions: Vec<Transaction>,
    pub current_session: Option<CashSession>,
    /// Non-cancelled sales over the whole ledger.
    pub total_revenue: Money,
}

impl AdvisorySnapshot {
    pub fn build(
        products: &[Product],
        transactions: &[Transaction],
        current_session: Option<&CashSession>,
        recent: usize,
    ) -> Self {
        let active: Vec<&Transaction> = transactions.iter().filter(|t| t.is_active()).collect();
        let skip = active.len().saturating_sub(recent);

        AdvisorySnapshot {
            total_products: products.len(),
            products: products.to_vec(),
            low_stock: products
                .iter()
                .filter(|p| p.is_critical())
                .map(|p| p.name.clone())
                .collect(),
            recent_transactions: active.into_iter().skip(skip).cloned().collect(),
            current_session: current_session.cloned(),
            total_revenue: total_sales_revenue(transactions),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, TransactionKind, TransactionStatus};
    use chrono::Utc;

    fn sale(id: usize, status: TransactionStatus) -> Transaction {
        Transaction {
            id: format!("t-{id}"),
            timestamp: Utc::now(),
            kind: TransactionKind::Sale,
            description: "Venda".to_string(),
            amount: Money::from_cents(100),
            payment_method: PaymentMethod::Pix,
            items: Vec::new(),
            status,
            cancellation_reason: None,
            opening_float: false,
        }
    }

    #[test]
    fn test_snapshot_is_bounded_and_skips_cancelled() {
        let mut txs: Vec<Transaction> = (0..30).map(|i| sale(i, TransactionStatus::Completed)).collect();
        txs.push(sale(99, TransactionStatus::Cancelled));

        let snapshot = AdvisorySnapshot::build(&[], &txs, None, 20);
        assert_eq!(snapshot.recent_transactions.len(), 20);
        assert_eq!(snapshot.recent_transactions[0].id, "t-10");
        assert_eq!(snapshot.recent_transactions[19].id, "t-29");
        assert_eq!(snapshot.total_revenue.cents(), 3_000);
        assert!(snapshot.current_session.is_none());

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"total_revenue\": 3000"));
    }
}
