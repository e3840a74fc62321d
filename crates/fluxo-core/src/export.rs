//! Ledger export payload (CSV/PDF renderers read this).
//!
//! Every entry is listed, cancelled ones included and tagged by status; the
//! summary only counts active entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregate::{financial_summary, FinancialSummary};
use crate::money::{CurrencyFormat, Money};
use crate::types::{PaymentMethod, Transaction, TransactionKind, TransactionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportRow {
    pub id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub amount: Money,
    pub status: TransactionStatus,
    pub cancellation_reason: Option<String>,
}

impl From<&Transaction> for ExportRow {
    fn from(t: &Transaction) -> Self {
        ExportRow {
            id: t.id.clone(),
            timestamp: t.timestamp,
            kind: t.kind,
            description: t.description.clone(),
            payment_method: t.payment_method,
            amount: t.amount,
            status: t.status,
            cancellation_reason: t.cancellation_reason.clone(),
        }
    }
}

impl ExportRow {
    /// "ATIVO" or "CANCELADO", as printed on reports.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            TransactionStatus::Completed => "ATIVO",
            TransactionStatus::Cancelled => "CANCELADO",
        }
    }

    /// One CSV line: id;date;type;description;method;amount;status;reason.
    pub fn to_csv_line(&self, fmt: &CurrencyFormat) -> String {
        let fields = [
            self.id.clone(),
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.kind.label().to_string(),
            self.description.clone(),
            self.payment_method.label().to_string(),
            self.amount.format(fmt),
            self.status_label().to_string(),
            self.cancellation_reason.clone().unwrap_or_default(),
        ];
        fields.iter().map(|f| csv_escape(f)).collect::<Vec<_>>().join(";")
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains([';', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportReport {
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    pub summary: FinancialSummary,
    pub rows: Vec<ExportRow>,
}

impl ExportReport {
    pub fn build(transactions: &[Transaction], generated_at: DateTime<Utc>) -> Self {
        ExportReport {
            generated_at,
            summary: financial_summary(transactions),
            rows: transactions.iter().map(ExportRow::from).collect(),
        }
    }

    /// Header plus one line per row, `;`-separated.
    pub fn to_csv(&self, fmt: &CurrencyFormat) -> String {
        let mut out = String::from("ID;Data;Tipo;Descrição;Método;Valor;Status;Motivo\n");
        for row in &self.rows {
            out.push_str(&row.to_csv_line(fmt));
            out.push('\n');
        }
        out
    }
}
