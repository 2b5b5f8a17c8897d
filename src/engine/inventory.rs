use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::EngineError;

/// The product fields the valuation math needs, detached from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub price_per_unit: Decimal,
    /// Current weighted average cost. None until the first restock.
    pub purchase_price: Option<Decimal>,
    pub current_stock: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestockOutcome {
    pub stock_before: Decimal,
    pub stock_after: Decimal,
    pub new_wac: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockDebit {
    pub stock_before: Decimal,
    pub stock_after: Decimal,
    /// Signed quantity for the movement row, negative for a sale.
    pub movement_quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub unit_price: Decimal,
    /// Cost snapshot at sale time; zero when the product has no WAC yet.
    pub purchase_price: Decimal,
    pub subtotal: Decimal,
    pub profit: Decimal,
    pub debit: StockDebit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentOutcome {
    pub stock_before: Decimal,
    pub stock_after: Decimal,
}

/// Monetary rounding used everywhere ledger values are persisted.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fold one restock batch into the running weighted average cost.
///
/// WAC = (stock_before * old_wac + quantity * batch_price) / (stock_before + quantity),
/// with a missing old WAC valued at zero and the result rounded to 2 dp.
pub fn apply_restock(
    stock_before: Decimal,
    current_wac: Option<Decimal>,
    quantity: Decimal,
    batch_price: Decimal,
) -> Result<RestockOutcome, EngineError> {
    if quantity <= Decimal::ZERO {
        return Err(EngineError::InvalidQuantity(
            "Restock quantity must be greater than zero".into(),
        ));
    }
    if batch_price < Decimal::ZERO {
        return Err(EngineError::InvalidQuantity(
            "Purchase price cannot be negative".into(),
        ));
    }

    let old_value = stock_before * current_wac.unwrap_or(Decimal::ZERO);
    let new_value = quantity * batch_price;
    let total_stock = stock_before + quantity;

    let wac = if total_stock > Decimal::ZERO {
        (old_value + new_value) / total_stock
    } else {
        batch_price
    };

    Ok(RestockOutcome {
        stock_before,
        stock_after: total_stock,
        new_wac: round_money(wac),
    })
}

/// Check sufficiency and compute the before/after stock for one sale line.
pub fn debit_stock(product: &ProductSnapshot, quantity: Decimal) -> Result<StockDebit, EngineError> {
    if quantity <= Decimal::ZERO {
        return Err(EngineError::InvalidQuantity(
            "Sale quantity must be greater than zero".into(),
        ));
    }
    if product.current_stock < quantity {
        return Err(EngineError::InsufficientStock {
            name: product.name.clone(),
            available: product.current_stock,
            unit: product.unit.clone(),
        });
    }

    Ok(StockDebit {
        stock_before: product.current_stock,
        stock_after: product.current_stock - quantity,
        movement_quantity: -quantity,
    })
}

/// Price one checkout line: active check, stock debit, revenue and profit.
pub fn price_sale_line(
    product: &ProductSnapshot,
    quantity: Decimal,
) -> Result<PricedLine, EngineError> {
    if !product.is_active {
        return Err(EngineError::ProductInactive {
            name: product.name.clone(),
        });
    }

    let debit = debit_stock(product, quantity)?;
    let unit_price = product.price_per_unit;
    let purchase_price = product.purchase_price.unwrap_or(Decimal::ZERO);

    Ok(PricedLine {
        unit_price,
        purchase_price,
        subtotal: round_money(unit_price * quantity),
        profit: round_money((unit_price - purchase_price) * quantity),
        debit,
    })
}

/// Apply a signed manual correction, refusing zero deltas and negative stock.
pub fn apply_adjustment(
    product: &ProductSnapshot,
    delta: Decimal,
) -> Result<AdjustmentOutcome, EngineError> {
    if delta.is_zero() {
        return Err(EngineError::InvalidQuantity(
            "Adjustment quantity must not be zero".into(),
        ));
    }

    let stock_after = product.current_stock + delta;
    if stock_after < Decimal::ZERO {
        return Err(EngineError::NegativeStock {
            name: product.name.clone(),
            current: product.current_stock,
            unit: product.unit.clone(),
        });
    }

    Ok(AdjustmentOutcome {
        stock_before: product.current_stock,
        stock_after,
    })
}

/// Settle a payment against the invoice total, returning the change due.
pub fn settle_payment(total: Decimal, paid: Decimal) -> Result<Decimal, EngineError> {
    if paid < total {
        return Err(EngineError::InsufficientPayment { total, paid });
    }
    Ok(paid - total)
}
