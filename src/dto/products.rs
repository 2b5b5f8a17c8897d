use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, ProductType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub product_type_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_per_unit: Decimal,
    pub purchase_price: Option<Decimal>,
    pub current_stock: Option<Decimal>,
    pub unit: String,
    pub is_active: Option<bool>,
}

/// Stock and weighted average cost are deliberately absent: those only
/// change through restocks and adjustments.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub product_type_id: Option<Uuid>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_per_unit: Option<Decimal>,
    pub unit: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductTypeList {
    pub items: Vec<ProductType>,
}
