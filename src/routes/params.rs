use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use uuid::Uuid;

// serde_urlencoded hands values over as strings once a struct is
// flattened, so these two fields parse either representation.
fn flattened_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom("expected an integer")),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    #[serde(default, deserialize_with = "flattened_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "flattened_i64")]
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    Name,
    Code,
    PricePerUnit,
    CurrentStock,
    CreatedAt,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub product_type_id: Option<Uuid>,
    pub is_active: Option<bool>,
    /// Matches product name or code, case-insensitive.
    pub search: Option<String>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSortBy {
    TransactionDate,
    TransactionCode,
    TotalAmount,
    TotalProfit,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Shortcut for start_date = end_date = today.
    pub today: Option<bool>,
    pub user_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<TransactionSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    /// Matches purchase code or supplier name.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MovementQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub product_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Matches the movement reference code.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthlyQuery {
    /// Defaults to the current month.
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LowStockQuery {
    /// Stock level at or below which a product is flagged. Default 10.
    pub threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserSortBy {
    Name,
    Email,
    Role,
    IsActive,
    CreatedAt,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    /// Matches user name or email.
    pub search: Option<String>,
    pub sort_by: Option<UserSortBy>,
    pub sort_order: Option<SortOrder>,
}
