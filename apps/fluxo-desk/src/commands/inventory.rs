//! # Inventory Commands
//!
//! Product catalogue and stock movements outside of sales.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::DeskState;
use fluxo_core::stock::StockReceipt;
use fluxo_core::{Money, Product, ProductDraft, StockReceiptMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStockInput {
    pub product_id: String,
    pub quantity: i64,
    pub mode: StockReceiptMode,
    /// What the batch cost. Ignored for production.
    #[serde(default)]
    pub total_cost: Money,
}

/// Catalogue in saved order, filtered by name/category.
pub async fn list_products(state: &DeskState, query: Option<String>, in_stock_only: bool) -> Vec<Product> {
    let query = query.unwrap_or_default();
    debug!(query = %query, in_stock_only, "list_products command");
    state
        .read(|desk| {
            desk.stock()
                .search(&query, in_stock_only)
                .into_iter()
                .cloned()
                .collect()
        })
        .await
}

pub async fn low_stock(state: &DeskState) -> Vec<Product> {
    state
        .read(|desk| desk.low_stock().into_iter().cloned().collect())
        .await
}

pub async fn create_product(state: &DeskState, draft: ProductDraft) -> ApiResult<Product> {
    debug!(name = %draft.name, "create_product command");
    state.mutate(|desk| desk.create_product(draft)).await
}

pub async fn update_product(state: &DeskState, product_id: &str, draft: ProductDraft) -> ApiResult<Product> {
    debug!(product_id, "update_product command");
    state.mutate(|desk| desk.update_product(product_id, draft)).await
}

pub async fn delete_product(state: &DeskState, product_id: &str) -> ApiResult<Product> {
    debug!(product_id, "delete_product command");
    state.mutate(|desk| desk.delete_product(product_id)).await
}

/// Manual correction after a count. Never takes stock below zero.
pub async fn adjust_stock(state: &DeskState, product_id: &str, delta: i64) -> ApiResult<Product> {
    debug!(product_id, delta, "adjust_stock command");
    state.mutate(|desk| desk.adjust_stock(product_id, delta)).await
}

pub async fn receive_stock(state: &DeskState, input: ReceiveStockInput) -> ApiResult<StockReceipt> {
    debug!(
        product_id = %input.product_id,
        quantity = input.quantity,
        mode = ?input.mode,
        "receive_stock command"
    );
    state
        .mutate(|desk| desk.receive_stock(&input.product_id, input.quantity, input.mode, input.total_cost))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{desk_state, draft};
    use crate::error::ErrorCode;
    use fluxo_core::{PaymentMethod, TransactionKind};

    #[tokio::test]
    async fn test_crud_round_trip() {
        let state = desk_state().await;
        let coca = create_product(&state, draft("Coca-Cola 350ml", 500, 48)).await.unwrap();
        create_product(&state, draft("Salgado Assado", 750, 0)).await.unwrap();

        let mut changed = draft("Coca-Cola 350ml", 550, 48);
        changed.category = "Bebidas".to_string();
        let updated = update_product(&state, &coca.id, changed).await.unwrap();
        assert_eq!(updated.sell_price, Money::from_cents(550));

        assert_eq!(list_products(&state, None, false).await.len(), 2);
        assert_eq!(list_products(&state, None, true).await.len(), 1);
        assert_eq!(list_products(&state, Some("bebi".to_string()), false).await[0].id, coca.id);

        delete_product(&state, &coca.id).await.unwrap();
        let err = delete_product(&state, &coca.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let stored = state.database().products().load_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Salgado Assado");
    }

    #[tokio::test]
    async fn test_invalid_draft_rejected() {
        let state = desk_state().await;
        let err = create_product(&state, draft("  ", 500, 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_products(&state, None, false).await.is_empty());
    }

    #[tokio::test]
    async fn test_purchase_records_expense() {
        let state = desk_state().await;
        let coca = create_product(&state, draft("Coca-Cola 350ml", 500, 2)).await.unwrap();

        let receipt = receive_stock(
            &state,
            ReceiveStockInput {
                product_id: coca.id.clone(),
                quantity: 24,
                mode: StockReceiptMode::Purchase,
                total_cost: Money::from_units(60),
            },
        )
        .await
        .unwrap();

        assert_eq!(receipt.product.stock, 26);
        assert_eq!(receipt.transaction.kind, TransactionKind::Expense);
        assert_eq!(receipt.transaction.payment_method, PaymentMethod::Cash);
        assert_eq!(receipt.transaction.amount, Money::from_units(60));
        assert!(low_stock(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_adjust_and_low_stock() {
        let state = desk_state().await;
        let salgado = create_product(&state, draft("Salgado Assado", 750, 5)).await.unwrap();

        let err = adjust_stock(&state, &salgado.id, -6).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let product = adjust_stock(&state, &salgado.id, -3).await.unwrap();
        assert_eq!(product.stock, 2);
        assert_eq!(low_stock(&state).await.len(), 1);
    }
}
