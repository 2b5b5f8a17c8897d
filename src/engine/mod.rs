//! Pure inventory valuation and ledger math. Everything in here works on
//! plain values so it can be exercised without a database; the services
//! layer owns lookup, locking and persistence.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub mod codes;
pub mod inventory;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: Uuid },

    #[error("Product {name} is inactive")]
    ProductInactive { name: String },

    #[error("Insufficient stock for {name}. Available: {available} {unit}")]
    InsufficientStock {
        name: String,
        available: Decimal,
        unit: String,
    },

    #[error("Insufficient payment. Total: {total}, paid: {paid}")]
    InsufficientPayment { total: Decimal, paid: Decimal },

    #[error("Stock for {name} cannot go negative. Current stock: {current} {unit}")]
    NegativeStock {
        name: String,
        current: Decimal,
        unit: String,
    },

    #[error("{0}")]
    InvalidQuantity(String),

    #[error("Code {code} is already taken")]
    DuplicateCode { code: String },
}
