use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        products::{CreateProductRequest, ProductList, ProductTypeList, UpdateProductRequest},
        purchases::{CreatePurchaseRequest, PurchaseItemRequest, PurchaseList, PurchaseWithItems},
        reports::{
            DailyReportDetail, DailyReportList, GenerateReportRequest, HourlyBucket,
            MonthlySummary, RangeSummary, TodayDashboard,
        },
        stock::{MovementList, ProductMovements, StockAdjustmentRequest},
        transactions::{
            CheckoutItem, CheckoutRequest, TodaySummary, TransactionList, TransactionWithItems,
        },
        users::{CreateUserRequest, UpdateUserRequest, UserDetail, UserList, UserStatistics},
    },
    models::{
        DailyReport, Product, ProductType, Purchase, PurchaseItem, StockMovement, TopProduct,
        Transaction, TransactionItem, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, dashboard, health, params, product_types, products, purchases, reports,
        stock_movements, transactions, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::me,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::toggle_product_status,
        product_types::list_product_types,
        product_types::get_product_type,
        transactions::list_transactions,
        transactions::checkout,
        transactions::today_summary,
        transactions::get_transaction,
        dashboard::today,
        purchases::list_purchases,
        purchases::create_purchase,
        purchases::get_purchase,
        purchases::delete_purchase,
        stock_movements::list_movements,
        stock_movements::adjust_stock,
        stock_movements::product_history,
        stock_movements::low_stock,
        reports::list_reports,
        reports::get_report_by_date,
        reports::generate,
        reports::monthly_summary,
        reports::range_summary,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::toggle_user_status
    ),
    components(
        schemas(
            User,
            ProductType,
            Product,
            Transaction,
            TransactionItem,
            Purchase,
            PurchaseItem,
            StockMovement,
            DailyReport,
            TopProduct,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductTypeList,
            CheckoutItem,
            CheckoutRequest,
            TransactionList,
            TransactionWithItems,
            TodaySummary,
            PurchaseItemRequest,
            CreatePurchaseRequest,
            PurchaseList,
            PurchaseWithItems,
            StockAdjustmentRequest,
            MovementList,
            ProductMovements,
            GenerateReportRequest,
            DailyReportList,
            DailyReportDetail,
            MonthlySummary,
            RangeSummary,
            HourlyBucket,
            TodayDashboard,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            UserStatistics,
            UserDetail,
            params::Pagination,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<TransactionWithItems>,
            ApiResponse<PurchaseWithItems>,
            ApiResponse<StockMovement>,
            ApiResponse<DailyReport>,
            ApiResponse<TodayDashboard>,
            ApiResponse<UserDetail>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product and product type endpoints"),
        (name = "Transactions", description = "Cashier checkout and sales history"),
        (name = "Dashboard", description = "Realtime daily view"),
        (name = "Purchases", description = "Restock purchases"),
        (name = "Stock", description = "Stock movements and adjustments"),
        (name = "Reports", description = "Daily report generation and summaries"),
        (name = "Users", description = "User administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
