//! End-to-end behaviour of a cash desk across stock, ledger and drawer.

use fluxo_core::aggregate::session_revenue;
use fluxo_core::{
    CashDesk, CoreError, Money, PaymentMethod, ProductDraft, SaleLine, SaleRequest, StockReceiptMode,
    TransactionKind, TransactionStatus,
};

fn desk_with(name: &str, stock: i64, price_cents: i64) -> (CashDesk, String) {
    let mut desk = CashDesk::new();
    let product = desk
        .create_product(ProductDraft {
            name: name.to_string(),
            category: "Geral".to_string(),
            cost_price: Money::from_cents(price_cents / 2),
            sell_price: Money::from_cents(price_cents),
            stock,
            min_stock: 2,
        })
        .unwrap();
    (desk, product.id)
}

fn sale(product_id: &str, quantity: i64, method: PaymentMethod) -> SaleRequest {
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
fn open_cancel_scenario_restores_drawer_and_stock() {
    let (mut desk, coke) = desk_with("Coca-Cola 350ml", 10, 2_500);
    desk.open_register(Money::from_units(100)).unwrap();

    let cash_sale = desk.ring_sale(sale(&coke, 1, PaymentMethod::Cash)).unwrap();
    assert_eq!(desk.stock().get(&coke).unwrap().stock, 9);
    assert_eq!(desk.drawer_balance(), Money::from_units(125));

    let pix = desk
        .create_product(ProductDraft {
            name: "Salgado Assado".to_string(),
            category: "Lanches".to_string(),
            cost_price: Money::from_cents(1_000),
            sell_price: Money::from_units(30),
            stock: 5,
            min_stock: 1,
        })
        .unwrap();
    desk.ring_sale(sale(&pix.id, 1, PaymentMethod::Pix)).unwrap();

    desk.cancel_transaction(&cash_sale.transaction.id, "erro").unwrap();

    assert_eq!(desk.drawer_balance(), Money::from_units(100));
    assert_eq!(desk.stock().get(&coke).unwrap().stock, 10);

    let revenue = desk.session_revenue();
    assert_eq!(revenue.by_method.len(), 1);
    assert_eq!(revenue.by_method[0].method, PaymentMethod::Pix);
    assert_eq!(revenue.by_method[0].total, Money::from_units(30));

    let ledger = desk.ledger();
    assert_eq!(ledger.len(), 3);
    assert!(ledger.transactions()[0].is_opening_float());
    assert_eq!(
        ledger.get(&cash_sale.transaction.id).unwrap().status,
        TransactionStatus::Cancelled
    );
}

#[test]
fn drawer_after_open_equals_float() {
    let mut desk = CashDesk::new();
    desk.open_register(Money::from_units(100)).unwrap();
    assert_eq!(desk.drawer_balance().cents(), 10_000);
}

#[test]
fn revenue_never_includes_float() {
    for cents in [0, 1, 5_000, 10_000, 123_456] {
        let mut desk = CashDesk::new();
        let opening = desk.open_register(Money::from_cents(cents)).unwrap();

        let revenue = session_revenue(&opening.session, desk.ledger().transactions());
        assert_eq!(revenue.total, Money::zero(), "float {cents} leaked into revenue");
        assert!(revenue.by_method.is_empty());
    }
}

#[test]
fn cancelled_cash_sale_returns_drawer_and_stock() {
    let (mut desk, id) = desk_with("Gelo", 4, 5_000);
    desk.open_register(Money::from_units(20)).unwrap();
    let before = desk.drawer_balance();

    let receipt = desk.ring_sale(sale(&id, 1, PaymentMethod::Cash)).unwrap();
    assert_eq!(receipt.transaction.amount, Money::from_units(50));

    desk.cancel_transaction(&receipt.transaction.id, "cliente desistiu").unwrap();
    assert_eq!(desk.drawer_balance(), before);
    assert_eq!(desk.stock().get(&id).unwrap().stock, 4);
}

#[test]
fn second_cancel_fails_and_compensates_once() {
    let (mut desk, id) = desk_with("Chiclete", 20, 200);
    let receipt = desk.ring_sale(sale(&id, 3, PaymentMethod::Debit)).unwrap();

    desk.cancel_transaction(&receipt.transaction.id, "erro").unwrap();
    let err = desk.cancel_transaction(&receipt.transaction.id, "erro").unwrap_err();

    assert!(matches!(err, CoreError::AlreadyCancelled { .. }));
    assert_eq!(desk.stock().get(&id).unwrap().stock, 20);
}

#[test]
fn cancelling_keeps_every_entry() {
    let (mut desk, id) = desk_with("Bala", 100, 50);
    let ids: Vec<String> = (0..7)
        .map(|_| desk.ring_sale(sale(&id, 1, PaymentMethod::Pix)).unwrap().transaction.id)
        .collect();

    for tx_id in ids.iter().take(3) {
        desk.cancel_transaction(tx_id, "teste").unwrap();
    }

    assert_eq!(desk.ledger().len(), 7);
    assert_eq!(desk.ledger().active_count(), 4);
}

#[test]
fn stock_never_observed_negative() {
    let (mut desk, id) = desk_with("Água", 5, 300);
    let deltas = [-2, -4, 3, -6, -1, 10, -12, -3];

    for delta in deltas {
        let _ = desk.adjust_stock(&id, delta);
        assert!(desk.stock().get(&id).unwrap().stock >= 0);
    }
    for _ in 0..10 {
        let _ = desk.ring_sale(sale(&id, 2, PaymentMethod::Credit));
        assert!(desk.stock().get(&id).unwrap().stock >= 0);
    }
}

#[test]
fn close_with_mismatch_still_succeeds() {
    let (mut desk, id) = desk_with("Café", 10, 400);
    desk.open_register(Money::from_units(50)).unwrap();
    desk.ring_sale(sale(&id, 2, PaymentMethod::Cash)).unwrap();
    let expected = desk.drawer_balance();

    let closing = desk.close_register(Money::from_units(10)).unwrap();
    assert_eq!(closing.reconciliation.expected, expected);
    assert_eq!(
        closing.reconciliation.variance,
        Some(Money::from_units(10) - expected)
    );
    assert_eq!(closing.session.counted_amount, Some(Money::from_units(10)));
}

#[test]
fn purchase_expense_moves_drawer_but_production_does_not() {
    let (mut desk, id) = desk_with("Salgado", 0, 750);
    desk.open_register(Money::from_units(100)).unwrap();

    desk.receive_stock(&id, 30, StockReceiptMode::Production, Money::zero())
        .unwrap();
    assert_eq!(desk.drawer_balance(), Money::from_units(100));

    let receipt = desk
        .receive_stock(&id, 10, StockReceiptMode::Purchase, Money::from_units(40))
        .unwrap();
    assert_eq!(receipt.transaction.kind, TransactionKind::Expense);
    assert_eq!(desk.drawer_balance(), Money::from_units(60));
    assert_eq!(desk.stock().get(&id).unwrap().stock, 40);

    let summary = desk.financial_summary();
    assert_eq!(summary.expenses, Money::from_units(40));
}
