//! # Seed Data
//!
//! Writes the starter catalogue into an empty database.
//!
//! ## Usage
//! ```bash
//! cargo run -p fluxo-db --bin seed
//! cargo run -p fluxo-db --bin seed -- --db ./data/fluxo.db
//! ```
//!
//! A database that already holds products is left untouched.

use std::env;

use fluxo_core::{CashDesk, Money, ProductDraft};
use fluxo_db::{Database, DbConfig};

/// (name, category, cost cents, sell cents, stock, min stock)
const STARTER_PRODUCTS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Coca-Cola 350ml", "Bebidas", 250, 500, 48, 12),
    ("Salgado Assado", "Lanches", 300, 750, 15, 5),
    ("Chiclete Trident", "Doces", 150, 300, 100, 20),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let db_path = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "fluxo.db".to_string());

    println!("Seeding {}", db_path);
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let snapshot = db.load_snapshot().await?;
    if !snapshot.products.is_empty() {
        println!("Database already has {} products, nothing to do", snapshot.products.len());
        return Ok(());
    }

    let mut desk = CashDesk::from_snapshot(snapshot)?;
    for &(name, category, cost, sell, stock, min_stock) in STARTER_PRODUCTS {
        let product = desk.create_product(ProductDraft {
            name: name.to_string(),
            category: category.to_string(),
            cost_price: Money::from_cents(cost),
            sell_price: Money::from_cents(sell),
            stock,
            min_stock,
        })?;
        println!("  + {} ({} em estoque)", product.name, product.stock);
    }

    db.save_snapshot(&desk.snapshot()).await?;
    db.close().await;

    println!("Done");
    Ok(())
}
