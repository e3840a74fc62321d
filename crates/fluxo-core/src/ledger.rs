//! # Transaction Ledger
//!
//! Append-only log of every monetary and stock-relevant event.
//!
//! ## Lifecycle of an Entry
//! ```text
//! record(draft) ──► COMPLETED ──cancel(reason)──► CANCELLED
//!                                   │
//!                                   └──► SALE only: each line item stock += quantity
//!                                        (skipped when the product is gone)
//! ```
//!
//! Entries are never deleted or edited. Cancellation flips `status` once and
//! stores the reason; aggregates ignore cancelled entries.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::stock::StockLedger;
use crate::types::{Transaction, TransactionDraft, TransactionKind, TransactionStatus};
use crate::validation::{
    validate_description, validate_non_negative, validate_positive_quantity, validate_reason,
};

/// One line whose stock went back to the shelf during a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestoredLine {
    pub product_id: String,
    pub quantity: i64,
    pub stock_after: i64,
}

/// Outcome of [`TransactionLedger::cancel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cancellation {
    /// The entry after cancellation.
    pub transaction: Transaction,
    pub restored: Vec<RestoredLine>,
    /// Product ids whose compensation was skipped (product deleted).
    pub skipped: Vec<String>,
}

/// The append-only ledger, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        TransactionLedger::default()
    }

    /// Rebuilds the ledger from persisted entries, rejecting duplicate ids.
    pub fn from_transactions(transactions: Vec<Transaction>) -> CoreResult<Self> {
        let mut ledger = TransactionLedger::new();
        ledger.import(transactions)?;
        Ok(ledger)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Appends a new COMPLETED entry with a fresh id.
    ///
    /// ## Errors
    /// - Empty description
    /// - Negative amount
    /// - Line item with a non-positive quantity
    pub fn record(&mut self, draft: TransactionDraft, at: DateTime<Utc>) -> CoreResult<Transaction> {
        validate_description(&draft.description)?;
        validate_non_negative("amount", draft.amount)?;
        for item in &draft.items {
            validate_positive_quantity(item.quantity)?;
        }

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            timestamp: at,
            kind: draft.kind,
            description: draft.description.trim().to_string(),
            amount: draft.amount,
            payment_method: draft.payment_method,
            items: draft.items,
            status: TransactionStatus::Completed,
            cancellation_reason: None,
            opening_float: draft.opening_float,
        };

        debug!(
            id = %transaction.id,
            kind = ?transaction.kind,
            amount = %transaction.amount,
            method = ?transaction.payment_method,
            "Recorded transaction"
        );

        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Appends externally produced entries as-is, all or nothing.
    ///
    /// The whole batch is checked before anything is appended: ids must be
    /// unique (within the batch and against the ledger), amounts non-negative,
    /// descriptions present, and cancelled entries must carry a reason.
    /// No stock effect is applied.
    pub fn import(&mut self, batch: Vec<Transaction>) -> CoreResult<usize> {
        let mut seen: HashSet<&str> = self.transactions.iter().map(|t| t.id.as_str()).collect();

        for transaction in &batch {
            validate_imported(transaction)?;
            if !seen.insert(transaction.id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "transaction id".to_string(),
                    value: transaction.id.clone(),
                }
                .into());
            }
        }

        let count = batch.len();
        self.transactions.extend(batch);
        info!(count, total = self.transactions.len(), "Imported transactions");
        Ok(count)
    }

    /// Soft-cancels an entry. A cancelled SALE puts its items back into stock;
    /// other kinds leave stock untouched.
    ///
    /// ## Errors
    /// - `NotFound` when the id is unknown
    /// - `AlreadyCancelled` on a second cancel
    /// - `Validation` when the reason is blank
    ///
    /// A line whose product was deleted is skipped and reported in
    /// [`Cancellation::skipped`]; the cancellation itself still succeeds.
    pub fn cancel(&mut self, id: &str, reason: &str, stock: &mut StockLedger) -> CoreResult<Cancellation> {
        let transaction = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::transaction_not_found(id))?;

        if transaction.is_cancelled() {
            return Err(CoreError::AlreadyCancelled {
                transaction_id: transaction.id.clone(),
            });
        }
        validate_reason(reason)?;

        transaction.status = TransactionStatus::Cancelled;
        transaction.cancellation_reason = Some(reason.trim().to_string());

        let mut restored = Vec::new();
        let mut skipped = Vec::new();
        // Only sales took units off the shelf.
        if transaction.kind == TransactionKind::Sale {
            for item in &transaction.items {
                match stock.adjust_stock(&item.product_id, item.quantity) {
                    Ok(product) => restored.push(RestoredLine {
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                        stock_after: product.stock,
                    }),
                    Err(err) => {
                        warn!(
                            transaction_id = %transaction.id,
                            product_id = %item.product_id,
                            error = %err,
                            "Skipping stock compensation"
                        );
                        skipped.push(item.product_id.clone());
                    }
                }
            }
        }

        info!(
            id = %transaction.id,
            kind = ?transaction.kind,
            amount = %transaction.amount,
            restored = restored.len(),
            skipped = skipped.len(),
            "Cancelled transaction"
        );

        Ok(Cancellation {
            transaction: transaction.clone(),
            restored,
            skipped,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every entry, cancelled included, in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Entries that are not cancelled.
    pub fn active(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// The last `n` entries (any status), newest first.
    pub fn recent(&self, n: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(n).collect()
    }
}

fn validate_imported(transaction: &Transaction) -> CoreResult<()> {
    if transaction.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "transaction id".to_string(),
        }
        .into());
    }
    validate_description(&transaction.description)?;
    validate_non_negative("amount", transaction.amount)?;
    if transaction.kind == TransactionKind::Production && !transaction.amount.is_zero() {
        return Err(ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "production entries carry no monetary value".to_string(),
        }
        .into());
    }
    for item in &transaction.items {
        validate_positive_quantity(item.quantity)?;
    }
    if transaction.is_cancelled() {
        validate_reason(transaction.cancellation_reason.as_deref().unwrap_or(""))?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{LineItem, PaymentMethod, ProductDraft};

    fn expense(amount: i64) -> TransactionDraft {
        TransactionDraft::new(
            TransactionKind::Expense,
            "Gelo",
            Money::from_cents(amount),
            PaymentMethod::Cash,
        )
    }

    fn stock_with_product(stock: i64) -> (StockLedger, String) {
        let mut ledger = StockLedger::new();
        let product = ledger
            .create(ProductDraft {
                name: "Salgado Assado".to_string(),
                category: "Lanches".to_string(),
                cost_price: Money::from_cents(300),
                sell_price: Money::from_cents(750),
                stock,
                min_stock: 5,
            })
            .unwrap();
        (ledger, product.id)
    }

    #[test]
    fn test_record_appends_completed_entry() {
        let mut ledger = TransactionLedger::new();
        let t = ledger.record(expense(1200), Utc::now()).unwrap();

        assert_eq!(t.status, TransactionStatus::Completed);
        assert!(t.cancellation_reason.is_none());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&t.id), Some(&t));
    }

    #[test]
    fn test_record_rejects_invalid_drafts() {
        let mut ledger = TransactionLedger::new();
        assert!(ledger.record(expense(-1), Utc::now()).is_err());

        let mut blank = expense(100);
        blank.description = "  ".to_string();
        assert!(ledger.record(blank, Utc::now()).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_cancel_restores_stock_and_sets_reason() {
        let (mut stock, product_id) = stock_with_product(10);
        stock.adjust_stock(&product_id, -3).unwrap();

        let product = stock.get(&product_id).unwrap().clone();
        let mut ledger = TransactionLedger::new();
        let sale = ledger
            .record(
                TransactionDraft::new(
                    TransactionKind::Sale,
                    "Venda PDV - 1 itens",
                    Money::from_cents(2250),
                    PaymentMethod::Pix,
                )
                .with_items(vec![LineItem::from_product(&product, 3)]),
                Utc::now(),
            )
            .unwrap();

        let result = ledger.cancel(&sale.id, "  erro de digitação ", &mut stock).unwrap();

        assert!(result.transaction.is_cancelled());
        assert_eq!(result.transaction.cancellation_reason.as_deref(), Some("erro de digitação"));
        assert_eq!(result.restored.len(), 1);
        assert_eq!(result.restored[0].stock_after, 10);
        assert!(result.skipped.is_empty());
        assert_eq!(stock.get(&product_id).unwrap().stock, 10);
        assert_eq!(ledger.active_count(), 0);
    }

    #[test]
    fn test_cancel_twice_fails_without_double_restore() {
        let (mut stock, product_id) = stock_with_product(5);
        let product = stock.get(&product_id).unwrap().clone();
        let mut ledger = TransactionLedger::new();
        let sale = ledger
            .record(
                TransactionDraft::new(TransactionKind::Sale, "Venda", Money::from_cents(750), PaymentMethod::Debit)
                    .with_items(vec![LineItem::from_product(&product, 1)]),
                Utc::now(),
            )
            .unwrap();

        ledger.cancel(&sale.id, "erro", &mut stock).unwrap();
        let err = ledger.cancel(&sale.id, "erro", &mut stock).unwrap_err();

        assert!(matches!(err, CoreError::AlreadyCancelled { .. }));
        assert_eq!(stock.get(&product_id).unwrap().stock, 6);
    }

    #[test]
    fn test_cancel_errors_leave_entry_untouched() {
        let (mut stock, _) = stock_with_product(5);
        let mut ledger = TransactionLedger::new();
        let t = ledger.record(expense(500), Utc::now()).unwrap();

        assert!(matches!(
            ledger.cancel("missing", "erro", &mut stock),
            Err(CoreError::NotFound { entity: "Transaction", .. })
        ));
        assert!(matches!(
            ledger.cancel(&t.id, "   ", &mut stock),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert_eq!(ledger.get(&t.id).unwrap().status, TransactionStatus::Completed);
    }

    #[test]
    fn test_cancel_skips_deleted_product() {
        let (mut stock, product_id) = stock_with_product(5);
        let product = stock.get(&product_id).unwrap().clone();
        let mut ledger = TransactionLedger::new();
        let sale = ledger
            .record(
                TransactionDraft::new(TransactionKind::Sale, "Venda", Money::from_cents(1500), PaymentMethod::Credit)
                    .with_items(vec![LineItem::from_product(&product, 2)]),
                Utc::now(),
            )
            .unwrap();
        stock.delete(&product_id).unwrap();

        let result = ledger.cancel(&sale.id, "devolução", &mut stock).unwrap();
        assert!(result.transaction.is_cancelled());
        assert_eq!(result.skipped, vec![product_id]);
        assert!(result.restored.is_empty());
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let mut ledger = TransactionLedger::new();
        let existing = ledger.record(expense(100), Utc::now()).unwrap();

        let mut fresh = existing.clone();
        fresh.id = "imported-1".to_string();

        assert!(ledger.import(vec![fresh.clone(), existing.clone()]).is_err());
        assert_eq!(ledger.len(), 1);

        let mut cancelled = fresh.clone();
        cancelled.id = "imported-2".to_string();
        cancelled.status = TransactionStatus::Cancelled;
        assert!(ledger.import(vec![fresh.clone(), cancelled.clone()]).is_err());
        assert_eq!(ledger.len(), 1);

        cancelled.cancellation_reason = Some("estorno".to_string());
        assert_eq!(ledger.import(vec![fresh, cancelled]).unwrap(), 2);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.active_count(), 2);
    }

    #[test]
    fn test_cancel_non_sale_with_items_keeps_stock() {
        let (mut stock, product_id) = stock_with_product(10);
        let product = stock.get(&product_id).unwrap().clone();
        let mut ledger = TransactionLedger::new();
        let income = Transaction {
            id: "legacy-income".to_string(),
            timestamp: Utc::now(),
            kind: TransactionKind::Income,
            description: "Entrada antiga".to_string(),
            amount: Money::from_cents(3750),
            payment_method: PaymentMethod::Pix,
            items: vec![LineItem::from_product(&product, 5)],
            status: TransactionStatus::Completed,
            cancellation_reason: None,
            opening_float: false,
        };
        ledger.import(vec![income]).unwrap();

        let result = ledger.cancel("legacy-income", "lançado errado", &mut stock).unwrap();

        assert!(result.transaction.is_cancelled());
        assert!(result.restored.is_empty());
        assert!(result.skipped.is_empty());
        assert_eq!(stock.get(&product_id).unwrap().stock, 10);
    }

    #[test]
    fn test_import_accepts_large_line_quantity() {
        let (stock, product_id) = stock_with_product(0);
        let product = stock.get(&product_id).unwrap().clone();
        let mut ledger = TransactionLedger::new();
        let sale = Transaction {
            id: "atacado-1".to_string(),
            timestamp: Utc::now(),
            kind: TransactionKind::Sale,
            description: "Venda atacado".to_string(),
            amount: Money::from_units(7500),
            payment_method: PaymentMethod::Pix,
            items: vec![LineItem::from_product(&product, 1000)],
            status: TransactionStatus::Completed,
            cancellation_reason: None,
            opening_float: false,
        };

        assert_eq!(ledger.import(vec![sale.clone()]).unwrap(), 1);
        let reloaded = TransactionLedger::from_transactions(vec![sale]).unwrap();
        assert_eq!(reloaded.transactions()[0].items[0].quantity, 1000);

        let mut zero = ledger.transactions()[0].clone();
        zero.id = "atacado-2".to_string();
        zero.items[0].quantity = 0;
        assert!(ledger.import(vec![zero]).is_err());
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut ledger = TransactionLedger::new();
        let ids: Vec<String> = (1..=4)
            .map(|i| ledger.record(expense(i * 100), Utc::now()).unwrap().id)
            .collect();

        let recent: Vec<&str> = ledger.recent(2).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(recent, vec![ids[3].as_str(), ids[2].as_str()]);
        assert_eq!(ledger.recent(10).len(), 4);
    }
}
