//! # Register Commands
//!
//! Cash drawer lifecycle and the non-sale ledger entries.
//!
//! ```text
//! ┌──────────┐  open_register(100)   ┌──────────┐  close_register(counted)  ┌──────────┐
//! │  CLOSED  │ ────────────────────► │   OPEN   │ ────────────────────────► │  CLOSED  │
//! └──────────┘  + float income entry └──────────┘  + reconciliation         └──────────┘
//!                                        │
//!                         log_expense / log_income / cancel_transaction
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::DeskState;
use fluxo_core::aggregate::{DrawerTotals, Reconciliation, RevenueBreakdown};
use fluxo_core::ledger::Cancellation;
use fluxo_core::session::SessionOpening;
use fluxo_core::{CashSession, Money, PaymentMethod, SessionClosing, Transaction};

/// Drawer panel shown at the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStatus {
    pub store_name: String,
    pub session: Option<CashSession>,
    pub drawer: DrawerTotals,
    pub revenue: RevenueBreakdown,
    /// Drawer balance formatted with the configured currency.
    pub balance_display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementInput {
    pub description: String,
    pub amount: Money,
    pub payment_method: PaymentMethod,
}

pub async fn open_register(state: &DeskState, initial_amount: Money) -> ApiResult<SessionOpening> {
    debug!(initial = %initial_amount, "open_register command");
    let opening = state.mutate(|desk| desk.open_register(initial_amount)).await?;
    info!(session_id = %opening.session.id, "Register opened");
    Ok(opening)
}

pub async fn close_register(state: &DeskState, counted_amount: Money) -> ApiResult<SessionClosing> {
    debug!(counted = %counted_amount, "close_register command");
    state.mutate(|desk| desk.close_register(counted_amount)).await
}

pub async fn register_status(state: &DeskState) -> RegisterStatus {
    let store_name = state.config().store.name.clone();
    state
        .read(|desk| {
            let drawer = desk.drawer_totals();
            RegisterStatus {
                store_name,
                session: desk.current_session().cloned(),
                drawer,
                revenue: desk.session_revenue(),
                balance_display: drawer.balance.format(desk.currency()),
            }
        })
        .await
}

pub async fn reconciliation(state: &DeskState, session_id: &str) -> ApiResult<Reconciliation> {
    Ok(state.read(|desk| desk.reconciliation(session_id)).await?)
}

pub async fn log_expense(state: &DeskState, input: MovementInput) -> ApiResult<Transaction> {
    debug!(amount = %input.amount, method = ?input.payment_method, "log_expense command");
    state
        .mutate(|desk| desk.log_expense(&input.description, input.amount, input.payment_method))
        .await
}

pub async fn log_income(state: &DeskState, input: MovementInput) -> ApiResult<Transaction> {
    debug!(amount = %input.amount, method = ?input.payment_method, "log_income command");
    state
        .mutate(|desk| desk.log_income(&input.description, input.amount, input.payment_method))
        .await
}

pub async fn cancel_transaction(state: &DeskState, transaction_id: &str, reason: &str) -> ApiResult<Cancellation> {
    debug!(transaction_id, "cancel_transaction command");
    state
        .mutate(|desk| desk.cancel_transaction(transaction_id, reason))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::desk_state;
    use crate::error::ErrorCode;
    use fluxo_core::TransactionStatus;

    fn movement(description: &str, units: i64, method: PaymentMethod) -> MovementInput {
        MovementInput {
            description: description.to_string(),
            amount: Money::from_units(units),
            payment_method: method,
        }
    }

    #[tokio::test]
    async fn test_open_expense_close() {
        let state = desk_state().await;

        open_register(&state, Money::from_units(100)).await.unwrap();
        log_expense(&state, movement("Gelo", 15, PaymentMethod::Cash)).await.unwrap();
        log_income(&state, movement("Reforço", 5, PaymentMethod::Cash)).await.unwrap();

        let status = register_status(&state).await;
        assert!(status.session.is_some());
        assert_eq!(status.drawer.balance, Money::from_units(90));
        assert_eq!(status.balance_display, "R$ 90,00");

        let closing = close_register(&state, Money::from_units(88)).await.unwrap();
        assert_eq!(closing.reconciliation.variance, Some(Money::from_units(-2)));

        let status = register_status(&state).await;
        assert!(status.session.is_none());
        assert_eq!(status.drawer.balance, Money::zero());

        let again = reconciliation(&state, &closing.session.id).await.unwrap();
        assert_eq!(again, closing.reconciliation);
    }

    #[tokio::test]
    async fn test_double_open_rejected() {
        let state = desk_state().await;
        open_register(&state, Money::from_units(10)).await.unwrap();

        let err = open_register(&state, Money::from_units(10)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyOpen);
    }

    #[tokio::test]
    async fn test_cash_expense_needs_open_drawer() {
        let state = desk_state().await;

        let err = log_expense(&state, movement("Gelo", 15, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoOpenSession);

        let pix = log_expense(&state, movement("Fornecedor", 40, PaymentMethod::Pix))
            .await
            .unwrap();
        assert_eq!(pix.amount, Money::from_units(40));
    }

    #[tokio::test]
    async fn test_cancel_persists() {
        let state = desk_state().await;
        let entry = log_income(&state, movement("Serviço", 30, PaymentMethod::Card))
            .await
            .unwrap();

        cancel_transaction(&state, &entry.id, "lançado em dobro").await.unwrap();
        let err = cancel_transaction(&state, &entry.id, "de novo").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyCancelled);

        let stored = state.database().load_snapshot().await.unwrap();
        assert_eq!(stored.transactions[0].status, TransactionStatus::Cancelled);
        assert_eq!(
            stored.transactions[0].cancellation_reason.as_deref(),
            Some("lançado em dobro")
        );
    }
}
