//! # Product Repository
//!
//! Stores the product catalogue with its stock levels.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use fluxo_core::{Money, Product};

/// Repository for the `products` table.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let products = repo.load_all().await?;
/// repo.replace_all(&products).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Every product, in saved order.
    pub async fn load_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, category, cost_price_cents, sell_price_cents, stock, min_stock
            FROM products
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let products = rows.iter().map(product_from_row).collect::<DbResult<Vec<_>>>()?;
        debug!(count = products.len(), "Loaded products");
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category, cost_price_cents, sell_price_cents, stock, min_stock
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Replaces the whole catalogue in its own transaction.
    pub async fn replace_all(&self, products: &[Product]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Self::replace_in(&mut tx, products).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Replaces the catalogue on a caller-owned connection or transaction.
    pub async fn replace_in(conn: &mut SqliteConnection, products: &[Product]) -> DbResult<()> {
        sqlx::query("DELETE FROM products").execute(&mut *conn).await?;

        for (position, product) in products.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, position, name, category,
                    cost_price_cents, sell_price_cents, stock, min_stock
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&product.id)
            .bind(position as i64)
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.cost_price.cents())
            .bind(product.sell_price.cents())
            .bind(product.stock)
            .bind(product.min_stock)
            .execute(&mut *conn)
            .await?;
        }

        debug!(count = products.len(), "Replaced products");
        Ok(())
    }
}

fn product_from_row(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        cost_price: Money::from_cents(row.try_get("cost_price_cents")?),
        sell_price: Money::from_cents(row.try_get("sell_price_cents")?),
        stock: row.try_get("stock")?,
        min_stock: row.try_get("min_stock")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn product(id: &str, name: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Bebidas".to_string(),
            cost_price: Money::from_cents(250),
            sell_price: Money::from_cents(500),
            stock,
            min_stock: 12,
        }
    }

    #[tokio::test]
    async fn test_replace_and_load_keep_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let list = vec![product("z", "Zebra", 1), product("a", "Água", 2)];

        repo.replace_all(&list).await.unwrap();
        assert_eq!(repo.load_all().await.unwrap(), list);

        repo.replace_all(&list[1..]).await.unwrap();
        assert_eq!(repo.load_all().await.unwrap().len(), 1);
        assert!(repo.get_by_id("z").await.unwrap().is_none());
        assert_eq!(repo.get_by_id("a").await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_and_rolled_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.replace_all(&[product("a", "Água", 2)]).await.unwrap();

        let err = repo
            .replace_all(&[product("b", "Bala", 1), product("c", "Café", -1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "a");
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .products()
            .replace_all(&[product("a", "Água", 1), product("a", "Água", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
