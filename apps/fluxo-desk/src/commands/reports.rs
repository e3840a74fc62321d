//! # Report Commands
//!
//! Read models over the whole ledger, plus the JSON import of ledger
//! history.
//!
//! ```text
//! ┌────────────────────┬──────────────────────────────────────────────────┐
//! │ financial_summary  │ income / expenses / net, active vs cancelled     │
//! │ payment_breakdown  │ sales per method with average ticket             │
//! │ top_products       │ revenue ranking, limit from [reports]            │
//! │ daily_sales        │ sales per local day, offset from [reports]       │
//! │ export_report      │ rows + summary + CSV in the desk currency        │
//! │ advisory_snapshot  │ bounded snapshot for the advisory service        │
//! │ import_transactions│ all-or-nothing append of a JSON array            │
//! └────────────────────┴──────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::DeskState;
use fluxo_core::advisory::AdvisorySnapshot;
use fluxo_core::aggregate::{self, DailySales, FinancialSummary, MethodStats, ProductRevenue};
use fluxo_core::export::ExportReport;
use fluxo_core::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub report: ExportReport,
    /// Same rows rendered as `;`-separated text.
    pub csv: String,
}

pub async fn financial_summary(state: &DeskState) -> FinancialSummary {
    state.read(|desk| desk.financial_summary()).await
}

pub async fn payment_breakdown(state: &DeskState) -> Vec<MethodStats> {
    state.read(|desk| desk.payment_breakdown()).await
}

/// Revenue ranking. `limit` falls back to the configured size.
pub async fn top_products(state: &DeskState, limit: Option<usize>) -> Vec<ProductRevenue> {
    let limit = limit.unwrap_or(state.config().reports.top_products);
    state.read(|desk| desk.top_products(limit)).await
}

/// Sales for the last `days` local days that had any.
pub async fn daily_sales(state: &DeskState, days: usize) -> Vec<DailySales> {
    let offset = state.config().utc_offset();
    state
        .read(|desk| aggregate::daily_sales(desk.ledger().transactions(), offset, days))
        .await
}

pub async fn export_report(state: &DeskState) -> ExportResponse {
    debug!("export_report command");
    state
        .read(|desk| {
            let report = desk.export_report();
            let csv = report.to_csv(desk.currency());
            ExportResponse { report, csv }
        })
        .await
}

pub async fn advisory_snapshot(state: &DeskState) -> AdvisorySnapshot {
    let recent = state.config().reports.advisory_recent;
    state.read(|desk| desk.advisory_snapshot(recent)).await
}

/// Appends a JSON array of transactions. Nothing is appended unless
/// every entry is valid.
pub async fn import_transactions(state: &DeskState, json: &str) -> ApiResult<usize> {
    let batch: Vec<Transaction> = serde_json::from_str(json)
        .map_err(|e| ApiError::validation(format!("Invalid transaction file: {}", e)))?;
    debug!(count = batch.len(), "import_transactions command");

    let count = state.mutate(|desk| desk.import_transactions(batch)).await?;
    info!(count, "Transactions imported");
    Ok(count)
}
