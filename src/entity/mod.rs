pub mod daily_reports;
pub mod product_types;
pub mod products;
pub mod purchase_items;
pub mod purchases;
pub mod stock_movements;
pub mod transaction_items;
pub mod transactions;
pub mod users;

pub use daily_reports::Entity as DailyReports;
pub use product_types::Entity as ProductTypes;
pub use products::Entity as Products;
pub use purchase_items::Entity as PurchaseItems;
pub use purchases::Entity as Purchases;
pub use stock_movements::Entity as StockMovements;
pub use transaction_items::Entity as TransactionItems;
pub use transactions::Entity as Transactions;
pub use users::Entity as Users;
