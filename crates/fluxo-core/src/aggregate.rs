//! # Aggregation Engine
//!
//! Pure reads over products, transactions and sessions. Nothing here is
//! cached: every call rescans its input, so a cancellation is reflected by
//! the very next read.
//!
//! ## What Counts Where
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ Aggregate        │ Input (always non-cancelled only)                    │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ drawer balance   │ session window, CASH only:                           │
//! │                  │   + SALE + INCOME (float included)   − EXPENSE       │
//! │ session revenue  │ session window, SALE + INCOME (float excluded)       │
//! │ top products     │ all SALE line items, grouped by product              │
//! │ financial summary│ all entries: income = non-EXPENSE, expenses = EXPENSE│
//! │ payment breakdown│ all SALE entries grouped by method                   │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CashSession, PaymentMethod, Product, Transaction, TransactionKind};

// =============================================================================
// Result Types
// =============================================================================

/// Physical cash movements of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerTotals {
    pub cash_in: Money,
    pub cash_out: Money,
    /// `cash_in - cash_out`: what should be in the drawer.
    pub balance: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total: Money,
}

/// Session revenue grouped by payment method.
///
/// Only methods with at least one contributing entry are listed, in
/// [`PaymentMethod::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueBreakdown {
    pub by_method: Vec<MethodTotal>,
    pub total: Money,
}

impl RevenueBreakdown {
    /// Revenue for one method (zero when absent).
    pub fn get(&self, method: PaymentMethod) -> Money {
        self.by_method
            .iter()
            .find(|m| m.method == method)
            .map(|m| m.total)
            .unwrap_or_default()
    }
}

/// Expected vs counted cash for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reconciliation {
    pub session_id: String,
    pub expected: Money,
    pub counted: Option<Money>,
    /// `counted - expected`; negative means cash is missing.
    pub variance: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRevenue {
    pub product_id: String,
    pub name: String,
    pub units: i64,
    pub revenue: Money,
}

/// Totals over the whole ledger (non-cancelled only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialSummary {
    pub income: Money,
    pub expenses: Money,
    pub net: Money,
    pub active_count: usize,
    pub cancelled_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodStats {
    pub method: PaymentMethod,
    pub total: Money,
    pub count: usize,
    pub average_ticket: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub total: Money,
    pub count: usize,
}

// =============================================================================
// Session Aggregates
// =============================================================================

/// Non-cancelled transactions inside the session window.
pub fn session_window<'a>(session: &CashSession, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.is_active() && session.contains(t))
        .collect()
}

/// Cash in, cash out and balance for the drawer.
///
/// ```rust
/// use chrono::Utc;
/// use fluxo_core::aggregate::drawer_totals;
/// use fluxo_core::ledger::TransactionLedger;
/// use fluxo_core::session::SessionManager;
/// use fluxo_core::Money;
///
/// let mut ledger = TransactionLedger::new();
/// let mut sessions = SessionManager::new();
/// let opening = sessions.open(Money::from_units(100), &mut ledger, Utc::now()).unwrap();
///
/// let totals = drawer_totals(&opening.session, ledger.transactions());
/// assert_eq!(totals.balance, Money::from_units(100));
/// ```
pub fn drawer_totals(session: &CashSession, transactions: &[Transaction]) -> DrawerTotals {
    let mut totals = DrawerTotals::default();
    for t in session_window(session, transactions) {
        if !t.payment_method.is_cash() {
            continue;
        }
        match t.kind {
            TransactionKind::Sale | TransactionKind::Income => totals.cash_in += t.amount,
            TransactionKind::Expense => totals.cash_out += t.amount,
            TransactionKind::Production => {}
        }
    }
    totals.balance = totals.cash_in - totals.cash_out;
    totals
}

/// Shorthand for `drawer_totals(..).balance`.
pub fn drawer_balance(session: &CashSession, transactions: &[Transaction]) -> Money {
    drawer_totals(session, transactions).balance
}

/// Sales and non-float income of the session, grouped by payment method.
/// Entries with no payment method are left out.
pub fn session_revenue(session: &CashSession, transactions: &[Transaction]) -> RevenueBreakdown {
    let mut totals: BTreeMap<PaymentMethod, Money> = BTreeMap::new();
    for t in session_window(session, transactions) {
        if t.payment_method == PaymentMethod::None {
            continue;
        }
        let counts = match t.kind {
            TransactionKind::Sale => true,
            TransactionKind::Income => !t.is_opening_float(),
            TransactionKind::Expense | TransactionKind::Production => false,
        };
        if counts {
            *totals.entry(t.payment_method).or_default() += t.amount;
        }
    }

    let by_method: Vec<MethodTotal> = PaymentMethod::ALL
        .iter()
        .filter_map(|method| totals.get(method).map(|total| MethodTotal { method: *method, total: *total }))
        .collect();
    let total = by_method.iter().map(|m| m.total).sum();

    RevenueBreakdown { by_method, total }
}

/// Compares the computed drawer balance with the counted cash.
///
/// Purely informational: closing never depends on it.
pub fn reconcile(session: &CashSession, transactions: &[Transaction]) -> Reconciliation {
    let expected = drawer_balance(session, transactions);
    Reconciliation {
        session_id: session.id.clone(),
        expected,
        counted: session.counted_amount,
        variance: session.counted_amount.map(|counted| counted - expected),
    }
}

// =============================================================================
// Global Aggregates
// =============================================================================

/// Products at or below their minimum stock.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_critical()).collect()
}

/// Ranks products by sold revenue, highest first.
///
/// Products are taken in catalogue order and sorted stably, so ties keep
/// that order. Products that never sold are kept with zero revenue.
pub fn top_products(products: &[Product], transactions: &[Transaction], limit: usize) -> Vec<ProductRevenue> {
    let mut sold: BTreeMap<&str, (i64, Money)> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.is_active() && t.kind == TransactionKind::Sale) {
        for item in &t.items {
            let entry = sold.entry(item.product_id.as_str()).or_insert((0, Money::zero()));
            entry.0 += item.quantity;
            entry.1 += item.line_total();
        }
    }

    let mut ranking: Vec<ProductRevenue> = products
        .iter()
        .map(|p| {
            let (units, revenue) = sold.get(p.id.as_str()).copied().unwrap_or((0, Money::zero()));
            ProductRevenue {
                product_id: p.id.clone(),
                name: p.name.clone(),
                units,
                revenue,
            }
        })
        .collect();

    ranking.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranking.truncate(limit);
    ranking
}

/// Sum of all non-cancelled sales.
pub fn total_sales_revenue(transactions: &[Transaction]) -> Money {
    transactions
        .iter()
        .filter(|t| t.is_active() && t.kind == TransactionKind::Sale)
        .map(|t| t.amount)
        .sum()
}

/// Income, expenses and net over the whole ledger.
pub fn financial_summary(transactions: &[Transaction]) -> FinancialSummary {
    let mut summary = FinancialSummary::default();
    for t in transactions {
        if t.is_cancelled() {
            summary.cancelled_count += 1;
            continue;
        }
        summary.active_count += 1;
        if t.kind == TransactionKind::Expense {
            summary.expenses += t.amount;
        } else {
            summary.income += t.amount;
        }
    }
    summary.net = summary.income - summary.expenses;
    summary
}

/// Sales per payment method with ticket counts, largest total first.
pub fn payment_breakdown(transactions: &[Transaction]) -> Vec<MethodStats> {
    let mut grouped: BTreeMap<PaymentMethod, (Money, usize)> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.is_active() && t.kind == TransactionKind::Sale) {
        let entry = grouped.entry(t.payment_method).or_insert((Money::zero(), 0));
        entry.0 += t.amount;
        entry.1 += 1;
    }

    let mut stats: Vec<MethodStats> = grouped
        .into_iter()
        .map(|(method, (total, count))| MethodStats {
            method,
            total,
            count,
            average_ticket: average(total, count),
        })
        .collect();

    stats.sort_by(|a, b| b.total.cmp(&a.total));
    stats
}

fn average(total: Money, count: usize) -> Money {
    if count == 0 {
        return Money::zero();
    }
    Money::from_decimal(total.to_decimal() / Decimal::from(count as u64))
}

// =============================================================================
// Daily Sales
// =============================================================================

fn local_day(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

/// Sales total for one local calendar day.
pub fn sales_for_day(transactions: &[Transaction], day: NaiveDate, offset: FixedOffset) -> DailySales {
    let mut result = DailySales {
        day,
        total: Money::zero(),
        count: 0,
    };
    for t in transactions.iter().filter(|t| t.is_active() && t.kind == TransactionKind::Sale) {
        if local_day(t.timestamp, offset) == day {
            result.total += t.amount;
            result.count += 1;
        }
    }
    result
}

/// Sales per local day, oldest first, limited to the last `last_n` days that had sales.
pub fn daily_sales(transactions: &[Transaction], offset: FixedOffset, last_n: usize) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, (Money, usize)> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.is_active() && t.kind == TransactionKind::Sale) {
        let entry = days.entry(local_day(t.timestamp, offset)).or_insert((Money::zero(), 0));
        entry.0 += t.amount;
        entry.1 += 1;
    }

    let skip = days.len().saturating_sub(last_n);
    days.into_iter()
        .skip(skip)
        .map(|(day, (total, count))| DailySales { day, total, count })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
