use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Transaction, TransactionItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub payment_method: String,
    pub paid_amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionList {
    pub items: Vec<Transaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionWithItems {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodaySummary {
    pub total_transactions: i64,
    pub total_sales: Decimal,
    pub total_profit: Decimal,
    pub cash_sales: Decimal,
    pub transfer_sales: Decimal,
}
