//! # Transaction Repository
//!
//! Stores ledger entries (`transactions`) and their frozen line items
//! (`transaction_items`).
//!
//! ## Line Items
//! ```text
//! transactions                     transaction_items
//! ┌──────────┬──────────┐          ┌──────────┬─────────┬────────────┐
//! │ id (PK)  │ position │◄─────────│ tx id FK │ line_no │ product_id │
//! └──────────┴──────────┘  CASCADE └──────────┴─────────┴────────────┘
//!                                   product_id is free text: a deleted
//!                                   product does not touch old sales
//! ```

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use fluxo_core::{LineItem, Money, Transaction};

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Every entry, cancelled included, in saved order with its line items.
    pub async fn load_all(&self) -> DbResult<Vec<Transaction>> {
        let item_rows = sqlx::query(
            r#"
            SELECT transaction_id, product_id, name, quantity, unit_price_cents
            FROM transaction_items
            ORDER BY transaction_id, line_no
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<String, Vec<LineItem>> = HashMap::new();
        for row in &item_rows {
            let transaction_id: String = row.try_get("transaction_id")?;
            items.entry(transaction_id).or_default().push(LineItem {
                product_id: row.try_get("product_id")?,
                name: row.try_get("name")?,
                quantity: row.try_get("quantity")?,
                unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            });
        }

        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, kind, description, amount_cents, payment_method,
                   status, cancellation_reason, opening_float
            FROM transactions
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let transactions = rows
            .iter()
            .map(|row| {
                let mut transaction = transaction_from_row(row)?;
                transaction.items = items.remove(&transaction.id).unwrap_or_default();
                Ok(transaction)
            })
            .collect::<DbResult<Vec<_>>>()?;

        if !items.is_empty() {
            return Err(DbError::Corrupt(format!(
                "{} line item group(s) reference missing transactions",
                items.len()
            )));
        }

        debug!(count = transactions.len(), "Loaded transactions");
        Ok(transactions)
    }

    /// Number of stored entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Replaces the whole ledger in its own transaction.
    pub async fn replace_all(&self, transactions: &[Transaction]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Self::replace_in(&mut tx, transactions).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Replaces the ledger on a caller-owned connection or transaction.
    pub async fn replace_in(conn: &mut SqliteConnection, transactions: &[Transaction]) -> DbResult<()> {
        sqlx::query("DELETE FROM transaction_items").execute(&mut *conn).await?;
        sqlx::query("DELETE FROM transactions").execute(&mut *conn).await?;

        for (position, transaction) in transactions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO transactions (
                    id, position, timestamp, kind, description, amount_cents,
                    payment_method, status, cancellation_reason, opening_float
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&transaction.id)
            .bind(position as i64)
            .bind(transaction.timestamp)
            .bind(transaction.kind)
            .bind(&transaction.description)
            .bind(transaction.amount.cents())
            .bind(transaction.payment_method)
            .bind(transaction.status)
            .bind(transaction.cancellation_reason.as_deref())
            .bind(transaction.opening_float)
            .execute(&mut *conn)
            .await?;

            for (line_no, item) in transaction.items.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO transaction_items (
                        transaction_id, line_no, product_id, name, quantity, unit_price_cents
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(&transaction.id)
                .bind(line_no as i64)
                .bind(&item.product_id)
                .bind(&item.name)
                .bind(item.quantity)
                .bind(item.unit_price.cents())
                .execute(&mut *conn)
                .await?;
            }
        }

        debug!(count = transactions.len(), "Replaced transactions");
        Ok(())
    }
}

fn transaction_from_row(row: &SqliteRow) -> DbResult<Transaction> {
    Ok(Transaction {
        id: row.try_get("id")?,
        timestamp: row.try_get("timestamp")?,
        kind: row.try_get("kind")?,
        description: row.try_get("description")?,
        amount: Money::from_cents(row.try_get("amount_cents")?),
        payment_method: row.try_get("payment_method")?,
        items: Vec::new(),
        status: row.try_get("status")?,
        cancellation_reason: row.try_get("cancellation_reason")?,
        opening_float: row.try_get("opening_float")?,
    })
}
