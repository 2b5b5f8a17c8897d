use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Purchase, PurchaseItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseItemRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    /// Batch buy price per unit, folded into the product WAC.
    pub purchase_price: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePurchaseRequest {
    pub items: Vec<PurchaseItemRequest>,
    pub supplier_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseList {
    pub items: Vec<Purchase>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseWithItems {
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
}
