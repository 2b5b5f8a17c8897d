use sea_orm::entity::prelude::*;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub report_date: Date,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_sales: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_profit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub cash_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub transfer_amount: Decimal,
    pub transaction_count: i32,
    pub top_products: Value,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
