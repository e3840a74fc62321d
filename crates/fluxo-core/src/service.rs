//! # CashDesk Service
//!
//! The single owner of the three ledgers. The host holds one `CashDesk`
//! (behind its own lock) and calls into it; no other code mutates stock,
//! transactions or sessions.
//!
//! ## Sale Flow
//! ```text
//! ring_sale(request)
//!   │
//!   ├── 1. validate lines (non-empty, quantities in range)
//!   ├── 2. CASH? → an open session is required
//!   ├── 3. snapshot name/price of every product, check stock for ALL lines
//!   ├── 4. CASH with tendered amount? → tendered >= total, compute change
//!   ├── 5. record SALE in the ledger
//!   └── 6. decrement stock per line (cannot fail after step 3)
//! ```
//!
//! Any failure in steps 1-4 leaves every ledger untouched.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::advisory::AdvisorySnapshot;
use crate::aggregate::{self, DrawerTotals, FinancialSummary, MethodStats, ProductRevenue, Reconciliation, RevenueBreakdown};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::export::ExportReport;
use crate::ledger::{Cancellation, TransactionLedger};
use crate::money::{CurrencyFormat, Money};
use crate::session::{SessionManager, SessionOpening};
use crate::snapshot::Snapshot;
use crate::stock::{StockLedger, StockReceipt};
use crate::types::{
    CashSession, LineItem, PaymentMethod, Product, ProductDraft, StockReceiptMode, Transaction,
    TransactionDraft, TransactionKind,
};
use crate::validation::{validate_description, validate_positive, validate_quantity};

/// Source of "now" for every timestamp the desk writes.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// =============================================================================
// Requests / Results
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub lines: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    /// Cash handed over by the customer (CASH only).
    pub tendered: Option<Money>,
    /// Customer name or note (appended for TERM sales).
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    pub transaction: Transaction,
    /// Change owed to the customer, when a tendered amount was given.
    pub change: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionClosing {
    pub session: CashSession,
    pub reconciliation: Reconciliation,
}

// =============================================================================
// CashDesk
// =============================================================================

/// The accounting core behind one cash desk.
///
/// Cloning copies the whole state; the clock is shared.
#[derive(Clone)]
pub struct CashDesk {
    stock: StockLedger,
    ledger: TransactionLedger,
    sessions: SessionManager,
    clock: Clock,
    currency: CurrencyFormat,
}

impl fmt::Debug for CashDesk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CashDesk")
            .field("products", &self.stock.len())
            .field("transactions", &self.ledger.len())
            .field("sessions", &self.sessions.len())
            .field("currency", &self.currency.symbol)
            .finish()
    }
}

impl Default for CashDesk {
    fn default() -> Self {
        CashDesk::new()
    }
}

impl CashDesk {
    /// An empty desk using the system clock and BRL formatting.
    pub fn new() -> Self {
        CashDesk {
            stock: StockLedger::new(),
            ledger: TransactionLedger::new(),
            sessions: SessionManager::new(),
            clock: Arc::new(Utc::now),
            currency: CurrencyFormat::brl(),
        }
    }

    /// Rebuilds a desk from persisted state.
    ///
    /// Fails on structurally inconsistent state (duplicate ids, negative
    /// stock, more than one open session) instead of loading it.
    pub fn from_snapshot(snapshot: Snapshot) -> CoreResult<Self> {
        let desk = CashDesk {
            stock: StockLedger::from_products(snapshot.products)?,
            ledger: TransactionLedger::from_transactions(snapshot.transactions)?,
            sessions: SessionManager::from_sessions(snapshot.sessions)?,
            ..CashDesk::new()
        };

        info!(
            products = desk.stock.len(),
            transactions = desk.ledger.len(),
            sessions = desk.sessions.len(),
            open_session = desk.sessions.current().is_some(),
            "Loaded cash desk state"
        );
        Ok(desk)
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    /// Full copy of the current state for persistence.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            products: self.stock.products().to_vec(),
            transactions: self.ledger.transactions().to_vec(),
            sessions: self.sessions.sessions().to_vec(),
        }
    }

    pub fn stock(&self) -> &StockLedger {
        &self.stock
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // =========================================================================
    // Register
    // =========================================================================

    pub fn open_register(&mut self, initial: Money) -> CoreResult<SessionOpening> {
        let now = self.now();
        self.sessions.open(initial, &mut self.ledger, now)
    }

    /// Closes the drawer. Never fails because of a cash variance.
    pub fn close_register(&mut self, counted: Money) -> CoreResult<SessionClosing> {
        let now = self.now();
        let session = self.sessions.close(counted, now)?;
        let reconciliation = aggregate::reconcile(&session, self.ledger.transactions());

        if let Some(variance) = reconciliation.variance.filter(|v| !v.is_zero()) {
            info!(session_id = %session.id, variance = %variance, "Drawer closed with variance");
        }

        Ok(SessionClosing {
            session,
            reconciliation,
        })
    }

    pub fn current_session(&self) -> Option<&CashSession> {
        self.sessions.current()
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Rings up a sale, all or nothing.
    pub fn ring_sale(&mut self, request: SaleRequest) -> CoreResult<SaleReceipt> {
        debug!(method = ?request.payment_method, lines = request.lines.len(), "Ringing sale");
        if request.lines.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        for line in &request.lines {
            validate_quantity(line.quantity)?;
        }

        let method = request.payment_method;
        if method == PaymentMethod::None {
            return Err(ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: "a sale needs a payment method".to_string(),
            }
            .into());
        }
        if method.is_cash() {
            self.sessions.require_open()?;
        }

        let items = request
            .lines
            .iter()
            .map(|line| {
                self.stock
                    .require(&line.product_id)
                    .map(|product| LineItem::from_product(product, line.quantity))
            })
            .collect::<CoreResult<Vec<LineItem>>>()?;
        self.stock.check_availability(&items)?;

        let total: Money = items.iter().map(LineItem::line_total).sum();
        let units: i64 = items.iter().map(|i| i.quantity).sum();

        let mut description = format!("Venda PDV - {} itens", units);
        let mut change = None;
        if method.is_cash() {
            if let Some(tendered) = request.tendered {
                if tendered < total {
                    return Err(ValidationError::OutOfRange {
                        field: "tendered amount".to_string(),
                        min: total.cents(),
                        max: i64::MAX,
                    }
                    .into());
                }
                let owed = tendered - total;
                description.push_str(&format!(
                    " | Recebido: {} | Troco: {}",
                    tendered.format(&self.currency),
                    owed.format(&self.currency)
                ));
                change = Some(owed);
            }
        }
        if method == PaymentMethod::Term {
            if let Some(note) = request.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                description.push_str(&format!(" | Cliente/Obs: {}", note));
            }
        }

        let now = self.now();
        let draft = TransactionDraft::new(TransactionKind::Sale, description, total, method).with_items(items);
        let transaction = self.ledger.record(draft, now)?;

        for item in &transaction.items {
            self.stock.adjust_stock(&item.product_id, -item.quantity)?;
        }

        info!(id = %transaction.id, total = %total, units, "Sale completed");
        Ok(SaleReceipt { transaction, change })
    }

    // =========================================================================
    // Other Ledger Entries
    // =========================================================================

    /// Records money leaving the business. CASH needs an open drawer.
    pub fn log_expense(&mut self, description: &str, amount: Money, method: PaymentMethod) -> CoreResult<Transaction> {
        self.log_movement(TransactionKind::Expense, description, amount, method)
    }

    /// Records money coming in outside a sale. CASH needs an open drawer.
    pub fn log_income(&mut self, description: &str, amount: Money, method: PaymentMethod) -> CoreResult<Transaction> {
        self.log_movement(TransactionKind::Income, description, amount, method)
    }

    fn log_movement(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount: Money,
        method: PaymentMethod,
    ) -> CoreResult<Transaction> {
        validate_description(description)?;
        validate_positive("amount", amount)?;
        if method.is_cash() {
            self.sessions.require_open()?;
        }

        let now = self.now();
        let transaction = self
            .ledger
            .record(TransactionDraft::new(kind, description, amount, method), now)?;
        info!(id = %transaction.id, kind = ?kind, amount = %amount, "Logged movement");
        Ok(transaction)
    }

    pub fn receive_stock(
        &mut self,
        product_id: &str,
        quantity: i64,
        mode: StockReceiptMode,
        total_cost: Money,
    ) -> CoreResult<StockReceipt> {
        let now = self.now();
        self.stock
            .receive_stock(&mut self.ledger, product_id, quantity, mode, total_cost, now)
    }

    pub fn cancel_transaction(&mut self, id: &str, reason: &str) -> CoreResult<Cancellation> {
        self.ledger.cancel(id, reason, &mut self.stock)
    }

    pub fn import_transactions(&mut self, batch: Vec<Transaction>) -> CoreResult<usize> {
        self.ledger.import(batch)
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn create_product(&mut self, draft: ProductDraft) -> CoreResult<Product> {
        self.stock.create(draft)
    }

    pub fn update_product(&mut self, id: &str, draft: ProductDraft) -> CoreResult<Product> {
        self.stock.update(id, draft)
    }

    pub fn delete_product(&mut self, id: &str) -> CoreResult<Product> {
        self.stock.delete(id)
    }

    pub fn adjust_stock(&mut self, id: &str, delta: i64) -> CoreResult<Product> {
        self.stock.adjust_stock(id, delta)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Cash movements of the open session (zeros when the drawer is closed).
    pub fn drawer_totals(&self) -> DrawerTotals {
        self.sessions
            .current()
            .map(|s| aggregate::drawer_totals(s, self.ledger.transactions()))
            .unwrap_or_default()
    }

    pub fn drawer_balance(&self) -> Money {
        self.drawer_totals().balance
    }

    /// Revenue of the open session (empty when the drawer is closed).
    pub fn session_revenue(&self) -> RevenueBreakdown {
        self.sessions
            .current()
            .map(|s| aggregate::session_revenue(s, self.ledger.transactions()))
            .unwrap_or_default()
    }

    pub fn reconciliation(&self, session_id: &str) -> CoreResult<Reconciliation> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| CoreError::session_not_found(session_id))?;
        Ok(aggregate::reconcile(session, self.ledger.transactions()))
    }

    pub fn low_stock(&self) -> Vec<&Product> {
        self.stock.low_stock()
    }

    pub fn top_products(&self, limit: usize) -> Vec<ProductRevenue> {
        aggregate::top_products(self.stock.products(), self.ledger.transactions(), limit)
    }

    pub fn financial_summary(&self) -> FinancialSummary {
        aggregate::financial_summary(self.ledger.transactions())
    }

    pub fn payment_breakdown(&self) -> Vec<MethodStats> {
        aggregate::payment_breakdown(self.ledger.transactions())
    }

    pub fn export_report(&self) -> ExportReport {
        ExportReport::build(self.ledger.transactions(), self.now())
    }

    pub fn advisory_snapshot(&self, recent: usize) -> AdvisorySnapshot {
        AdvisorySnapshot::build(
            self.stock.products(),
            self.ledger.transactions(),
            self.sessions.current(),
            recent,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;

    fn desk_with_product(stock: i64, price_cents: i64) -> (CashDesk, String) {
        let mut desk = CashDesk::new();
        let product = desk
            .create_product(ProductDraft {
                name: "Salgado Assado".to_string(),
                category: "Lanches".to_string(),
                cost_price: Money::from_cents(300),
                sell_price: Money::from_cents(price_cents),
                stock,
                min_stock: 5,
            })
            .unwrap();
        (desk, product.id)
    }

    fn request(product_id: &str, quantity: i64, method: PaymentMethod) -> SaleRequest {
        SaleRequest {
            lines: vec![SaleLine {
                product_id: product_id.to_string(),
                quantity,
            }],
            payment_method: method,
            tendered: None,
            note: None,
        }
    }

    #[test]
    fn test_cash_sale_requires_open_session() {
        let (mut desk, id) = desk_with_product(10, 750);

        let err = desk.ring_sale(request(&id, 1, PaymentMethod::Cash)).unwrap_err();
        assert!(matches!(err, CoreError::NoOpenSession));
        assert_eq!(desk.stock().get(&id).unwrap().stock, 10);
        assert!(desk.ledger().is_empty());

        // non-cash sales do not touch the drawer
        desk.ring_sale(request(&id, 1, PaymentMethod::Pix)).unwrap();
        assert_eq!(desk.stock().get(&id).unwrap().stock, 9);
    }

    #[test]
    fn test_sale_snapshots_and_decrements() {
        let (mut desk, id) = desk_with_product(10, 750);
        desk.open_register(Money::from_units(100)).unwrap();

        let receipt = desk.ring_sale(request(&id, 2, PaymentMethod::Cash)).unwrap();
        let t = &receipt.transaction;

        assert_eq!(t.kind, TransactionKind::Sale);
        assert_eq!(t.amount.cents(), 1_500);
        assert_eq!(t.description, "Venda PDV - 2 itens");
        assert_eq!(t.items[0].unit_price.cents(), 750);
        assert_eq!(desk.stock().get(&id).unwrap().stock, 8);
        assert_eq!(desk.drawer_balance().cents(), 11_500);
    }

    #[test]
    fn test_insufficient_stock_rejects_whole_sale() {
        let (mut desk, id) = desk_with_product(3, 750);
        let other = desk
            .create_product(ProductDraft {
                name: "Chiclete".to_string(),
                category: "Doces".to_string(),
                cost_price: Money::from_cents(50),
                sell_price: Money::from_cents(200),
                stock: 50,
                min_stock: 20,
            })
            .unwrap();

        let mut req = request(&other.id, 5, PaymentMethod::Debit);
        req.lines.push(SaleLine {
            product_id: id.clone(),
            quantity: 4,
        });

        assert!(matches!(desk.ring_sale(req), Err(CoreError::InsufficientStock { .. })));
        assert_eq!(desk.stock().get(&other.id).unwrap().stock, 50);
        assert!(desk.ledger().is_empty());
    }

    #[test]
    fn test_cash_tendered_and_change() {
        let (mut desk, id) = desk_with_product(10, 750);
        desk.open_register(Money::zero()).unwrap();

        let mut short = request(&id, 2, PaymentMethod::Cash);
        short.tendered = Some(Money::from_cents(1_000));
        assert!(matches!(desk.ring_sale(short), Err(CoreError::Validation(_))));

        let mut req = request(&id, 2, PaymentMethod::Cash);
        req.tendered = Some(Money::from_cents(2_000));
        let receipt = desk.ring_sale(req).unwrap();

        assert_eq!(receipt.change, Some(Money::from_cents(500)));
        assert_eq!(
            receipt.transaction.description,
            "Venda PDV - 2 itens | Recebido: R$ 20,00 | Troco: R$ 5,00"
        );
    }

    #[test]
    fn test_term_sale_appends_note() {
        let (mut desk, id) = desk_with_product(10, 750);
        let mut req = request(&id, 1, PaymentMethod::Term);
        req.note = Some(" Dona Maria ".to_string());

        let receipt = desk.ring_sale(req).unwrap();
        assert_eq!(receipt.transaction.description, "Venda PDV - 1 itens | Cliente/Obs: Dona Maria");
        assert_eq!(receipt.change, None);
    }

    #[test]
    fn test_empty_or_methodless_sale_rejected() {
        let (mut desk, id) = desk_with_product(10, 750);
        let mut empty = request(&id, 1, PaymentMethod::Pix);
        empty.lines.clear();

        assert!(desk.ring_sale(empty).is_err());
        assert!(desk.ring_sale(request(&id, 1, PaymentMethod::None)).is_err());
        assert!(desk.ring_sale(request(&id, 0, PaymentMethod::Pix)).is_err());
        assert!(desk.ledger().is_empty());
    }

    #[test]
    fn test_cash_expense_needs_drawer() {
        let mut desk = CashDesk::new();
        assert!(matches!(
            desk.log_expense("Gelo", Money::from_cents(1_200), PaymentMethod::Cash),
            Err(CoreError::NoOpenSession)
        ));
        desk.log_expense("Conta de luz", Money::from_cents(9_000), PaymentMethod::Pix)
            .unwrap();

        desk.open_register(Money::from_units(50)).unwrap();
        desk.log_expense("Gelo", Money::from_cents(1_200), PaymentMethod::Cash)
            .unwrap();
        desk.log_income("Aporte", Money::from_cents(2_000), PaymentMethod::Cash)
            .unwrap();

        assert_eq!(desk.drawer_balance().cents(), 5_800);
        assert_eq!(desk.session_revenue().get(PaymentMethod::Cash).cents(), 2_000);
        assert!(desk.log_income("Aporte", Money::zero(), PaymentMethod::Cash).is_err());
    }

    #[test]
    fn test_close_register_reports_variance() {
        let (mut desk, id) = desk_with_product(10, 2_500);
        desk.open_register(Money::from_units(100)).unwrap();
        desk.ring_sale(request(&id, 1, PaymentMethod::Cash)).unwrap();

        let closing = desk.close_register(Money::from_units(120)).unwrap();
        assert_eq!(closing.reconciliation.expected.cents(), 12_500);
        assert_eq!(closing.reconciliation.variance, Some(Money::from_cents(-500)));
        assert!(desk.current_session().is_none());
        assert_eq!(desk.drawer_balance(), Money::zero());

        let again = desk.reconciliation(&closing.session.id).unwrap();
        assert_eq!(again, closing.reconciliation);
    }

    #[test]
    fn test_injected_clock_stamps_entries() {
        let fixed = DateTime::parse_from_rfc3339("2026-05-01T12:00:00Z").unwrap().with_timezone(&Utc);
        let mut desk = CashDesk::new().with_clock(Arc::new(move || fixed));

        let opening = desk.open_register(Money::zero()).unwrap();
        assert_eq!(opening.session.opened_at, fixed);
        assert_eq!(opening.float_transaction.timestamp, fixed);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut desk, id) = desk_with_product(10, 750);
        desk.open_register(Money::from_units(10)).unwrap();
        let sale = desk.ring_sale(request(&id, 1, PaymentMethod::Cash)).unwrap();
        desk.cancel_transaction(&sale.transaction.id, "erro").unwrap();

        let restored = CashDesk::from_snapshot(desk.snapshot()).unwrap();
        assert_eq!(restored.snapshot(), desk.snapshot());
        assert_eq!(
            restored.ledger().get(&sale.transaction.id).unwrap().status,
            TransactionStatus::Cancelled
        );
        assert!(restored.current_session().is_some());
    }
}
