use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub product_type_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_per_unit: Decimal,
    /// Weighted average cost, null until the first restock.
    pub purchase_price: Option<Decimal>,
    pub current_stock: Decimal,
    pub unit: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_code: String,
    pub user_id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub total_profit: Decimal,
    pub paid_amount: Decimal,
    pub change_amount: Decimal,
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub purchase_price: Decimal,
    pub subtotal: Decimal,
    pub profit: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Purchase {
    pub id: Uuid,
    pub purchase_code: String,
    pub user_id: Uuid,
    pub supplier_name: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseItem {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub subtotal: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: String,
    /// Signed delta: positive for restock/up adjustment, negative for sales.
    pub quantity: Decimal,
    pub stock_before: Decimal,
    pub stock_after: Decimal,
    /// Batch price, present on restock rows only.
    pub purchase_price: Option<Decimal>,
    pub reference_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyReport {
    pub id: Uuid,
    pub report_date: NaiveDate,
    pub total_sales: Decimal,
    pub total_profit: Decimal,
    pub cash_amount: Decimal,
    pub transfer_amount: Decimal,
    pub transaction_count: i32,
    pub top_products: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the top-5 snapshot stored inside `DailyReport::top_products`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub unit: String,
    pub total_quantity: Decimal,
    pub total_sales: Decimal,
    pub total_profit: Decimal,
}
