use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use sea_orm::Set;
use uuid::Uuid;

use crate::{
    dto::transactions::{CheckoutRequest, TodaySummary, TransactionList, TransactionWithItems},
    engine::codes::CodePrefix,
    engine::inventory::{self, ProductSnapshot},
    engine::EngineError,
    entity::{
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
        stock_movements,
        transaction_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as TransactionItems,
            Model as ItemModel,
        },
        transactions::{
            ActiveModel as TransactionActive, Column as TransactionCol, Entity as Transactions,
            Model as TransactionModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Transaction, TransactionItem},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, TransactionQuery, TransactionSortBy},
    services::sequences,
    state::AppState,
};

pub async fn list_transactions(
    state: &AppState,
    query: TransactionQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if query.today.unwrap_or(false) {
        let (start, end) = super::day_bounds(Utc::now().date_naive());
        condition = condition
            .add(TransactionCol::TransactionDate.gte(start))
            .add(TransactionCol::TransactionDate.lt(end));
    } else {
        if let Some(start_date) = query.start_date {
            let (start, _) = super::day_bounds(start_date);
            condition = condition.add(TransactionCol::TransactionDate.gte(start));
        }
        if let Some(end_date) = query.end_date {
            let (_, end) = super::day_bounds(end_date);
            condition = condition.add(TransactionCol::TransactionDate.lt(end));
        }
    }

    if let Some(user_id) = query.user_id {
        condition = condition.add(TransactionCol::UserId.eq(user_id));
    }

    if let Some(method) = query.payment_method.as_ref().filter(|m| !m.is_empty()) {
        condition = condition.add(TransactionCol::PaymentMethod.eq(method.clone()));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(TransactionCol::TransactionCode).ilike(pattern));
    }

    let sort_by = query.sort_by.unwrap_or(TransactionSortBy::TransactionDate);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        TransactionSortBy::TransactionDate => TransactionCol::TransactionDate,
        TransactionSortBy::TransactionCode => TransactionCol::TransactionCode,
        TransactionSortBy::TotalAmount => TransactionCol::TotalAmount,
        TransactionSortBy::TotalProfit => TransactionCol::TotalProfit,
    };

    let mut finder = Transactions::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(transaction_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Transactions",
        TransactionList { items },
        Some(meta),
    ))
}

pub async fn get_transaction(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    let transaction = Transactions::find_by_id(id).one(&state.orm).await?;
    let transaction = match transaction {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let items = TransactionItems::find()
        .filter(ItemCol::TransactionId.eq(transaction.id))
        .order_by_asc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(transaction_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Transaction",
        TransactionWithItems {
            transaction: transaction_from_entity(transaction),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Checkout: price every line, settle payment and write the header, items,
/// stock updates and sale movements in one database transaction.
///
/// A unique-violation on the reserved code aborts the whole unit; it is
/// retried once with a fresh code before surfacing `DuplicateCode`.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Transaction items are required".into()));
    }
    if payload.payment_method != "cash" && payload.payment_method != "transfer" {
        return Err(AppError::BadRequest(
            "Payment method must be cash or transfer".into(),
        ));
    }
    if payload.paid_amount < Decimal::ZERO {
        return Err(AppError::BadRequest("Paid amount cannot be negative".into()));
    }

    match checkout_once(state, user, &payload).await {
        Err(AppError::Engine(EngineError::DuplicateCode { code })) => {
            tracing::warn!(code = %code, "transaction code collision, retrying once");
            checkout_once(state, user, &payload).await
        }
        other => other,
    }
}

async fn checkout_once(
    state: &AppState,
    user: &AuthUser,
    payload: &CheckoutRequest,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    let txn = state.orm.begin().await?;
    let now = Utc::now();

    // Running snapshots: repeated lines for one product debit cumulatively.
    let mut snapshots: HashMap<Uuid, ProductSnapshot> = HashMap::new();
    let mut lines = Vec::with_capacity(payload.items.len());
    let mut total_amount = Decimal::ZERO;
    let mut total_profit = Decimal::ZERO;

    for item in &payload.items {
        let snapshot = match snapshots.get(&item.product_id) {
            Some(s) => s.clone(),
            None => {
                let model = Products::find_by_id(item.product_id)
                    .lock(LockType::Update)
                    .one(&txn)
                    .await?
                    .ok_or(EngineError::ProductNotFound {
                        product_id: item.product_id,
                    })?;
                let snapshot = snapshot_from_model(&model);
                snapshots.insert(item.product_id, snapshot.clone());
                snapshot
            }
        };

        let line = inventory::price_sale_line(&snapshot, item.quantity)?;
        total_amount += line.subtotal;
        total_profit += line.profit;

        if let Some(s) = snapshots.get_mut(&item.product_id) {
            s.current_stock = line.debit.stock_after;
        }
        lines.push((item, line));
    }

    let change = inventory::settle_payment(total_amount, payload.paid_amount)?;

    let code = sequences::reserve_code(&txn, CodePrefix::Transaction, now.date_naive()).await?;

    let header = TransactionActive {
        id: Set(Uuid::new_v4()),
        transaction_code: Set(code.clone()),
        user_id: Set(user.user_id),
        transaction_date: Set(now.into()),
        total_amount: Set(total_amount),
        total_profit: Set(total_profit),
        paid_amount: Set(payload.paid_amount),
        change_amount: Set(change),
        payment_method: Set(payload.payment_method.clone()),
        notes: Set(payload.notes.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| sequences::duplicate_code_err(err, &code))?;

    let mut items_out: Vec<TransactionItem> = Vec::with_capacity(lines.len());
    for (item, line) in &lines {
        let row = ItemActive {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(header.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(line.unit_price),
            purchase_price: Set(line.purchase_price),
            subtotal: Set(line.subtotal),
            profit: Set(line.profit),
            notes: Set(item.notes.clone()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items_out.push(transaction_item_from_entity(row));

        stock_movements::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(item.product_id),
            user_id: Set(user.user_id),
            movement_type: Set("sale".into()),
            quantity: Set(line.debit.movement_quantity),
            stock_before: Set(line.debit.stock_before),
            stock_after: Set(line.debit.stock_after),
            purchase_price: Set(None),
            reference_code: Set(Some(code.clone())),
            notes: Set(Some(format!("Sale via transaction {code}"))),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    for (product_id, snapshot) in &snapshots {
        Products::update_many()
            .col_expr(ProductCol::CurrentStock, Expr::value(snapshot.current_stock))
            .col_expr(ProductCol::UpdatedAt, Expr::value(now))
            .filter(ProductCol::Id.eq(*product_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::debug!(
        code = %header.transaction_code,
        total = %header.total_amount,
        items = lines.len(),
        "checkout committed"
    );

    Ok(ApiResponse::success(
        "Transaction created",
        TransactionWithItems {
            transaction: transaction_from_entity(header),
            items: items_out,
        },
        Some(Meta::empty()),
    ))
}

pub async fn today_summary(state: &AppState) -> AppResult<ApiResponse<TodaySummary>> {
    let (start, end) = super::day_bounds(Utc::now().date_naive());

    let row: (i64, Decimal, Decimal, Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(total_amount), 0),
               COALESCE(SUM(total_profit), 0),
               COALESCE(SUM(total_amount) FILTER (WHERE payment_method = 'cash'), 0),
               COALESCE(SUM(total_amount) FILTER (WHERE payment_method = 'transfer'), 0)
        FROM transactions
        WHERE transaction_date >= $1 AND transaction_date < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(&state.pool)
    .await?;

    let summary = TodaySummary {
        total_transactions: row.0,
        total_sales: row.1,
        total_profit: row.2,
        cash_sales: row.3,
        transfer_sales: row.4,
    };

    Ok(ApiResponse::success("Today summary", summary, None))
}

fn snapshot_from_model(model: &ProductModel) -> ProductSnapshot {
    ProductSnapshot {
        id: model.id,
        name: model.name.clone(),
        unit: model.unit.clone(),
        price_per_unit: model.price_per_unit,
        purchase_price: model.purchase_price,
        current_stock: model.current_stock,
        is_active: model.is_active,
    }
}

fn transaction_from_entity(model: TransactionModel) -> Transaction {
    Transaction {
        id: model.id,
        transaction_code: model.transaction_code,
        user_id: model.user_id,
        transaction_date: model.transaction_date.with_timezone(&Utc),
        total_amount: model.total_amount,
        total_profit: model.total_profit,
        paid_amount: model.paid_amount,
        change_amount: model.change_amount,
        payment_method: model.payment_method,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn transaction_item_from_entity(model: ItemModel) -> TransactionItem {
    TransactionItem {
        id: model.id,
        transaction_id: model.transaction_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        purchase_price: model.purchase_price,
        subtotal: model.subtotal,
        profit: model.profit,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
