use axum_pos_api::engine::EngineError;
use axum_pos_api::engine::codes::{self, CodePrefix};
use axum_pos_api::engine::inventory::{
    ProductSnapshot, apply_adjustment, apply_restock, debit_stock, price_sale_line, round_money,
    settle_payment,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

fn snapshot(stock: Decimal, wac: Option<Decimal>, price: Decimal) -> ProductSnapshot {
    ProductSnapshot {
        id: Uuid::new_v4(),
        name: "Gula Pasir".into(),
        unit: "ons".into(),
        price_per_unit: price,
        purchase_price: wac,
        current_stock: stock,
        is_active: true,
    }
}

#[test]
fn first_restock_values_stock_at_batch_price() {
    let outcome = apply_restock(Decimal::ZERO, None, Decimal::from(100), Decimal::from(10))
        .expect("restock");

    assert_eq!(outcome.stock_before, Decimal::ZERO);
    assert_eq!(outcome.stock_after, Decimal::from(100));
    assert_eq!(outcome.new_wac, Decimal::from(10));
}

#[test]
fn second_restock_folds_weighted_average() {
    // 100 on hand at 10, buy 50 more at 12: (1000 + 600) / 150 = 10.666...
    let outcome = apply_restock(
        Decimal::from(100),
        Some(Decimal::from(10)),
        Decimal::from(50),
        Decimal::from(12),
    )
    .expect("restock");

    assert_eq!(outcome.stock_after, Decimal::from(150));
    assert_eq!(outcome.new_wac, Decimal::new(1067, 2));
}

#[test]
fn sale_profit_is_margin_over_weighted_cost() {
    let product = snapshot(
        Decimal::from(150),
        Some(Decimal::new(1067, 2)),
        Decimal::from(15),
    );

    let line = price_sale_line(&product, Decimal::from(20)).expect("sale line");

    assert_eq!(line.subtotal, Decimal::from(300));
    assert_eq!(line.profit, Decimal::new(8660, 2));
    assert_eq!(line.purchase_price, Decimal::new(1067, 2));
    assert_eq!(line.debit.stock_after, Decimal::from(130));
    assert_eq!(line.debit.movement_quantity, Decimal::from(-20));
}

#[test]
fn sale_before_any_restock_books_full_revenue_as_profit() {
    let product = snapshot(Decimal::from(10), None, Decimal::from(15));

    let line = price_sale_line(&product, Decimal::from(2)).expect("sale line");

    assert_eq!(line.purchase_price, Decimal::ZERO);
    assert_eq!(line.subtotal, Decimal::from(30));
    assert_eq!(line.profit, line.subtotal);
}

#[test]
fn oversell_reports_available_stock() {
    let product = snapshot(Decimal::from(5), Some(Decimal::from(10)), Decimal::from(15));

    let err = debit_stock(&product, Decimal::from(8)).unwrap_err();

    match err {
        EngineError::InsufficientStock {
            available, unit, ..
        } => {
            assert_eq!(available, Decimal::from(5));
            assert_eq!(unit, "ons");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn inactive_product_cannot_be_sold() {
    let mut product = snapshot(Decimal::from(10), None, Decimal::from(15));
    product.is_active = false;

    let err = price_sale_line(&product, Decimal::ONE).unwrap_err();
    assert!(matches!(err, EngineError::ProductInactive { .. }));
}

#[test]
fn restock_rejects_zero_quantity_and_negative_price() {
    let err = apply_restock(Decimal::ZERO, None, Decimal::ZERO, Decimal::from(10)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let err = apply_restock(Decimal::ZERO, None, Decimal::ONE, Decimal::from(-1)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));
}

#[test]
fn adjustment_applies_signed_delta() {
    let product = snapshot(Decimal::from(10), None, Decimal::from(15));

    let down = apply_adjustment(&product, Decimal::from(-4)).expect("adjust down");
    assert_eq!(down.stock_after, Decimal::from(6));

    let up = apply_adjustment(&product, Decimal::new(25, 1)).expect("adjust up");
    assert_eq!(up.stock_after, Decimal::new(125, 1));
}

#[test]
fn adjustment_rejects_zero_delta() {
    let product = snapshot(Decimal::from(10), None, Decimal::from(15));

    let err = apply_adjustment(&product, Decimal::ZERO).unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));
}

#[test]
fn adjustment_cannot_take_stock_negative() {
    let product = snapshot(Decimal::from(3), None, Decimal::from(15));

    let err = apply_adjustment(&product, Decimal::from(-5)).unwrap_err();
    assert!(matches!(err, EngineError::NegativeStock { .. }));
}

#[test]
fn change_is_paid_minus_total() {
    assert_eq!(
        settle_payment(Decimal::from(100), Decimal::from(150)).unwrap(),
        Decimal::from(50)
    );
    assert_eq!(
        settle_payment(Decimal::from(100), Decimal::from(100)).unwrap(),
        Decimal::ZERO
    );

    let err = settle_payment(Decimal::from(100), Decimal::from(99)).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientPayment { .. }));
}

#[test]
fn money_rounds_midpoints_away_from_zero() {
    assert_eq!(round_money(Decimal::new(10665, 3)), Decimal::new(1067, 2));
    assert_eq!(round_money(Decimal::new(-10665, 3)), Decimal::new(-1067, 2));
    assert_eq!(round_money(Decimal::from(300)), Decimal::from(300));
}

#[test]
fn document_codes_are_day_scoped_and_zero_padded() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();

    assert_eq!(
        codes::format_code(CodePrefix::Transaction, date, 1),
        "TRX-20250307-001"
    );
    assert_eq!(
        codes::format_code(CodePrefix::Transaction, date, 12),
        "TRX-20250307-012"
    );
    assert_eq!(
        codes::format_code(CodePrefix::Purchase, date, 345),
        "PUR-20250307-345"
    );
    // The counter keeps growing past three digits.
    assert_eq!(
        codes::format_code(CodePrefix::Transaction, date, 1000),
        "TRX-20250307-1000"
    );
}

#[test]
fn adjustment_reference_carries_a_timestamp() {
    let at = chrono::Utc::now();
    let reference = codes::adjustment_reference(at);

    assert_eq!(reference, format!("ADJ-{}", at.timestamp()));
}

#[test]
fn wac_stays_put_when_restock_price_equals_wac() {
    let outcome = apply_restock(
        Decimal::from(40),
        Some(Decimal::new(1250, 2)),
        Decimal::from(60),
        Decimal::new(1250, 2),
    )
    .expect("restock");

    assert_eq!(outcome.new_wac, Decimal::new(1250, 2));
    assert_eq!(outcome.stock_after, Decimal::from(100));
}

#[test]
fn fractional_weighed_quantities_price_cleanly() {
    // 2.5 ons at 18000/ons
    let product = snapshot(Decimal::from(10), Some(Decimal::from(14000)), Decimal::from(18000));

    let line = price_sale_line(&product, Decimal::new(25, 1)).expect("sale line");

    assert_eq!(line.subtotal, Decimal::from(45000));
    assert_eq!(line.profit, Decimal::from(10000));
    assert_eq!(line.debit.stock_after, Decimal::new(75, 1));
}
