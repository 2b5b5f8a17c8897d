use axum_pos_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        purchases::{CreatePurchaseRequest, PurchaseItemRequest},
        reports::GenerateReportRequest,
        transactions::{CheckoutItem, CheckoutRequest},
    },
    entity::{
        daily_reports::ActiveModel as ReportActive, product_types::ActiveModel as ProductTypeActive,
        products::ActiveModel as ProductActive, users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::TopProduct,
    routes::params::{MonthlyQuery, Pagination, RangeQuery, ReportQuery},
    services::{purchase_service, report_service, transaction_service},
    state::AppState,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Reporting flow: sell through two products, generate today's report,
// regenerate it, and roll daily rows up into monthly and range summaries.
#[tokio::test]
async fn daily_report_generation_and_summaries() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin_id = create_user(&state, "admin", "admin@lestari.test").await?;
    let kasir_id = create_user(&state, "kasir", "kasir@lestari.test").await?;
    let sugar = create_product(&state, "Gula Pasir", "GLP-001", Decimal::from(15)).await?;
    let tea = create_product(&state, "Teh Celup", "TEH-001", Decimal::from(8)).await?;

    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let auth_kasir = AuthUser {
        user_id: kasir_id,
        role: "kasir".into(),
    };

    restock(&state, &auth_admin, sugar, Decimal::from(100), Decimal::from(10)).await?;
    restock(&state, &auth_admin, tea, Decimal::from(100), Decimal::from(5)).await?;

    // Three sales today: two cash, one transfer.
    sell(&state, &auth_kasir, vec![(sugar, 10)], "cash", 150).await?;
    sell(&state, &auth_kasir, vec![(tea, 20)], "transfer", 160).await?;
    sell(&state, &auth_kasir, vec![(sugar, 2), (tea, 5)], "cash", 100).await?;

    let report = report_service::generate(
        &state,
        &auth_admin,
        GenerateReportRequest { date: None },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(report.transaction_count, 3);
    assert_eq!(report.total_sales, Decimal::from(380));
    assert_eq!(report.total_profit, Decimal::from(135));
    assert_eq!(report.cash_amount, Decimal::from(220));
    assert_eq!(report.transfer_amount, Decimal::from(160));

    // The top-products snapshot ranks by revenue: tea 200 beats sugar 180.
    let top: Vec<TopProduct> = serde_json::from_value(report.top_products.clone())?;
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].code, "TEH-001");
    assert_eq!(top[0].total_quantity, Decimal::from(25));
    assert_eq!(top[0].total_sales, Decimal::from(200));
    assert_eq!(top[0].total_profit, Decimal::from(75));
    assert_eq!(top[1].code, "GLP-001");
    assert_eq!(top[1].total_sales, Decimal::from(180));

    // Regenerating recomputes into the same row with the same figures.
    let again = report_service::generate(
        &state,
        &auth_admin,
        GenerateReportRequest { date: None },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(again.id, report.id);
    assert_eq!(again.total_sales, report.total_sales);
    assert_eq!(again.top_products, report.top_products);

    let today = Utc::now().date_naive();
    let detail = report_service::get_report_by_date(&state, &auth_admin, today)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.report.transaction_count, 3);
    assert_eq!(detail.transactions.len(), 3);

    let dashboard = report_service::today_dashboard(&state).await?.data.unwrap();
    assert_eq!(dashboard.report.transaction_count, 3);
    assert_eq!(dashboard.transactions.len(), 3);
    let bucket_count: i64 = dashboard
        .hourly_breakdown
        .iter()
        .map(|b| b.transaction_count)
        .sum();
    assert_eq!(bucket_count, 3);

    let listed = report_service::list_reports(&state, &auth_admin, default_report_query()).await?;
    assert_eq!(listed.meta.unwrap().total, Some(1));

    // A quiet day produces an all-zero report with an empty snapshot.
    let quiet_date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    let quiet = report_service::generate(
        &state,
        &auth_admin,
        GenerateReportRequest {
            date: Some(quiet_date),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(quiet.transaction_count, 0);
    assert_eq!(quiet.total_sales, Decimal::ZERO);
    assert_eq!(quiet.top_products, serde_json::json!([]));

    // Monthly and range summaries fold stored daily rows. Seed a month
    // well away from today: a slow day, a closed day, a good day.
    seed_report(&state, "2025-06-01", 100, 20, 60, 40, 2).await?;
    seed_report(&state, "2025-06-02", 0, 0, 0, 0, 0).await?;
    seed_report(&state, "2025-06-03", 300, 90, 300, 0, 5).await?;

    let monthly = report_service::monthly_summary(
        &state,
        &auth_admin,
        MonthlyQuery {
            month: Some(6),
            year: Some(2025),
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(monthly.total_days, 3);
    assert_eq!(monthly.total_sales, Decimal::from(400));
    assert_eq!(monthly.total_profit, Decimal::from(110));
    assert_eq!(monthly.total_transactions, 7);
    assert_eq!(monthly.cash_total, Decimal::from(360));
    assert_eq!(monthly.transfer_total, Decimal::from(40));
    assert_eq!(monthly.average_daily_sales, Decimal::new(13333, 2));
    assert_eq!(monthly.average_daily_profit, Decimal::new(3667, 2));
    assert_eq!(
        monthly.best_day.unwrap().report_date,
        NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
    );
    // The closed day sold nothing and must not win "worst".
    assert_eq!(
        monthly.worst_day.unwrap().report_date,
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    );

    let range = report_service::range_summary(
        &state,
        &auth_admin,
        RangeQuery {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 2),
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(range.total_days, 2);
    assert_eq!(range.total_sales, Decimal::from(100));
    assert_eq!(range.daily_breakdown.len(), 2);
    assert_eq!(
        range.daily_breakdown[0].report_date,
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    );
    assert_eq!(
        range.worst_day.unwrap().report_date,
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    );

    // Inverted and incomplete ranges are refused.
    let err = report_service::range_summary(
        &state,
        &auth_admin,
        RangeQuery {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 5),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = report_service::range_summary(
        &state,
        &auth_admin,
        RangeQuery {
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = report_service::monthly_summary(
        &state,
        &auth_admin,
        MonthlyQuery {
            month: Some(13),
            year: Some(2025),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

fn default_report_query() -> ReportQuery {
    ReportQuery {
        pagination: Pagination {
            page: None,
            per_page: None,
        },
        start_date: None,
        end_date: None,
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE transaction_items, transactions, purchase_items, purchases, stock_movements, daily_reports, code_sequences, products, product_types, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Test {role}")),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_product(
    state: &AppState,
    name: &str,
    code: &str,
    price: Decimal,
) -> anyhow::Result<Uuid> {
    let product_type = ProductTypeActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Type for {code}")),
        description: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        product_type_id: Set(product_type.id),
        name: Set(name.into()),
        code: Set(code.into()),
        description: Set(None),
        image_url: Set(None),
        price_per_unit: Set(price),
        purchase_price: Set(None),
        current_stock: Set(Decimal::ZERO),
        unit: Set("pcs".into()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}

async fn restock(
    state: &AppState,
    admin: &AuthUser,
    product_id: Uuid,
    quantity: Decimal,
    price: Decimal,
) -> anyhow::Result<()> {
    purchase_service::create_purchase(
        state,
        admin,
        CreatePurchaseRequest {
            items: vec![PurchaseItemRequest {
                product_id,
                quantity,
                purchase_price: price,
                notes: None,
            }],
            supplier_name: None,
            notes: None,
        },
    )
    .await?;
    Ok(())
}

async fn sell(
    state: &AppState,
    kasir: &AuthUser,
    items: Vec<(Uuid, i64)>,
    payment_method: &str,
    paid: i64,
) -> anyhow::Result<()> {
    transaction_service::checkout(
        state,
        kasir,
        CheckoutRequest {
            items: items
                .into_iter()
                .map(|(product_id, qty)| CheckoutItem {
                    product_id,
                    quantity: Decimal::from(qty),
                    notes: None,
                })
                .collect(),
            payment_method: payment_method.into(),
            paid_amount: Decimal::from(paid),
            notes: None,
        },
    )
    .await?;
    Ok(())
}

async fn seed_report(
    state: &AppState,
    date: &str,
    sales: i64,
    profit: i64,
    cash: i64,
    transfer: i64,
    count: i32,
) -> anyhow::Result<()> {
    ReportActive {
        id: Set(Uuid::new_v4()),
        report_date: Set(date.parse::<NaiveDate>()?),
        total_sales: Set(Decimal::from(sales)),
        total_profit: Set(Decimal::from(profit)),
        cash_amount: Set(Decimal::from(cash)),
        transfer_amount: Set(Decimal::from(transfer)),
        transaction_count: Set(count),
        top_products: Set(serde_json::json!([])),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}
