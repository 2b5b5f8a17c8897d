//! Property-based tests for the weighted-average-cost math.
//!
//! These fold randomly generated restock batches through `apply_restock`
//! and check the invariants that must hold for every input, not just the
//! worked examples in the unit tests.

use axum_pos_api::engine::EngineError;
use axum_pos_api::engine::inventory::{
    ProductSnapshot, apply_restock, debit_stock, price_sale_line, round_money, settle_payment,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One restock batch: quantity in (0, 500], unit price in [0, 50_000],
/// both with two decimal places.
fn batch_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..=50_000, 0i64..=5_000_000)
        .prop_map(|(qty, price)| (Decimal::new(qty, 2), Decimal::new(price, 2)))
}

fn batches_strategy() -> impl Strategy<Value = Vec<(Decimal, Decimal)>> {
    prop::collection::vec(batch_strategy(), 1..=8)
}

/// Stock on hand plus a sale quantity that does not exceed it.
fn stock_and_sale_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (100i64..=100_000).prop_flat_map(|stock| {
        (Just(stock), 1i64..=stock)
            .prop_map(|(stock, qty)| (Decimal::new(stock, 2), Decimal::new(qty, 2)))
    })
}

fn snapshot(stock: Decimal, wac: Option<Decimal>, price: Decimal) -> ProductSnapshot {
    ProductSnapshot {
        id: Uuid::new_v4(),
        name: "prop".into(),
        unit: "pcs".into(),
        price_per_unit: price,
        purchase_price: wac,
        current_stock: stock,
        is_active: true,
    }
}

proptest! {
    /// Stock is exact bookkeeping: folding any batch sequence from empty
    /// leaves exactly the summed quantity on hand.
    #[test]
    fn prop_folded_stock_equals_summed_quantities(batches in batches_strategy()) {
        let mut stock = Decimal::ZERO;
        let mut wac: Option<Decimal> = None;

        for (qty, price) in &batches {
            let outcome = apply_restock(stock, wac, *qty, *price).unwrap();
            prop_assert_eq!(outcome.stock_before, stock);
            stock = outcome.stock_after;
            wac = Some(outcome.new_wac);
        }

        let expected: Decimal = batches.iter().map(|(qty, _)| *qty).sum();
        prop_assert_eq!(stock, expected);
    }

    /// The folded WAC tracks the exact weighted mean of all batches.
    /// Each fold rounds to two decimals, so allow one cent of drift per
    /// batch.
    #[test]
    fn prop_folded_wac_tracks_exact_weighted_mean(batches in batches_strategy()) {
        let mut stock = Decimal::ZERO;
        let mut wac: Option<Decimal> = None;

        for (qty, price) in &batches {
            let outcome = apply_restock(stock, wac, *qty, *price).unwrap();
            stock = outcome.stock_after;
            wac = Some(outcome.new_wac);
        }

        let total_value: Decimal = batches.iter().map(|(qty, price)| qty * price).sum();
        let total_qty: Decimal = batches.iter().map(|(qty, _)| *qty).sum();
        let exact = total_value / total_qty;

        let tolerance = Decimal::new(batches.len() as i64, 2);
        let drift = (wac.unwrap() - exact).abs();
        prop_assert!(
            drift <= tolerance,
            "wac {} drifted {} from exact mean {}",
            wac.unwrap(), drift, exact
        );
    }

    /// WAC is a convex combination of batch prices, so it can never
    /// escape the [min, max] price band by more than rounding noise.
    #[test]
    fn prop_wac_stays_within_contributing_prices(batches in batches_strategy()) {
        let mut stock = Decimal::ZERO;
        let mut wac: Option<Decimal> = None;

        for (qty, price) in &batches {
            let outcome = apply_restock(stock, wac, *qty, *price).unwrap();
            stock = outcome.stock_after;
            wac = Some(outcome.new_wac);
        }

        let min_price = batches.iter().map(|(_, price)| *price).min().unwrap();
        let max_price = batches.iter().map(|(_, price)| *price).max().unwrap();
        let tolerance = Decimal::new(batches.len() as i64, 2);

        let wac = wac.unwrap();
        prop_assert!(wac >= Decimal::ZERO);
        prop_assert!(wac >= min_price - tolerance);
        prop_assert!(wac <= max_price + tolerance);
    }

    /// A sale within available stock debits exactly the sold quantity and
    /// records the negative movement delta.
    #[test]
    fn prop_sale_debits_exactly_what_was_sold((stock, qty) in stock_and_sale_strategy()) {
        let product = snapshot(stock, Some(Decimal::new(100, 2)), Decimal::new(150, 2));

        let debit = debit_stock(&product, qty).unwrap();
        prop_assert_eq!(debit.stock_after, stock - qty);
        prop_assert!(debit.stock_after >= Decimal::ZERO);
        prop_assert_eq!(debit.movement_quantity, -qty);
    }

    /// Selling more than is on hand always fails, whatever the amounts.
    #[test]
    fn prop_oversell_always_rejected((stock, extra) in (0i64..=100_000, 1i64..=100_000)) {
        let stock = Decimal::new(stock, 2);
        let qty = stock + Decimal::new(extra, 2);
        let product = snapshot(stock, None, Decimal::new(150, 2));

        let err = debit_stock(&product, qty).unwrap_err();
        prop_assert!(
            matches!(err, EngineError::InsufficientStock { .. }),
            "expected InsufficientStock, got {:?}",
            err
        );
    }

    /// Profit never exceeds revenue while the cost basis is non-negative.
    #[test]
    fn prop_profit_bounded_by_revenue(
        (stock, qty) in stock_and_sale_strategy(),
        wac in 0i64..=5_000_000,
        price in 0i64..=5_000_000,
    ) {
        let product = snapshot(
            stock,
            Some(Decimal::new(wac, 2)),
            Decimal::new(price, 2),
        );

        let line = price_sale_line(&product, qty).unwrap();
        prop_assert!(line.profit <= line.subtotal);
    }

    /// Change due is always the overpayment, never negative.
    #[test]
    fn prop_change_settles_exactly(
        total in 0i64..=10_000_000,
        extra in 0i64..=1_000_000,
    ) {
        let total = Decimal::new(total, 2);
        let paid = total + Decimal::new(extra, 2);

        let change = settle_payment(total, paid).unwrap();
        prop_assert!(change >= Decimal::ZERO);
        prop_assert_eq!(total + change, paid);
    }

    /// Rounding to money precision is idempotent.
    #[test]
    fn prop_round_money_is_idempotent(raw in -10_000_000i64..=10_000_000) {
        let once = round_money(Decimal::new(raw, 4));
        prop_assert_eq!(round_money(once), once);
    }
}
