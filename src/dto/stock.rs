use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, StockMovement};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockAdjustmentRequest {
    pub product_id: Uuid,
    /// Signed delta; positive adds stock, negative removes it.
    pub quantity: Decimal,
    /// Mandatory reason for the correction.
    pub notes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementList {
    pub items: Vec<StockMovement>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductMovements {
    pub product: Product,
    pub movements: Vec<StockMovement>,
}
