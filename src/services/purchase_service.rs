use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::purchases::{CreatePurchaseRequest, PurchaseList, PurchaseWithItems},
    engine::codes::CodePrefix,
    engine::inventory::{self, ProductSnapshot},
    engine::EngineError,
    entity::{
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
        purchase_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as PurchaseItems,
            Model as ItemModel,
        },
        purchases::{
            ActiveModel as PurchaseActive, Column as PurchaseCol, Entity as Purchases,
            Model as PurchaseModel,
        },
        stock_movements,
    },
    error::{AppError, AppResult},
    middleware::auth::{ensure_management, AuthUser},
    models::{Purchase, PurchaseItem},
    response::{ApiResponse, Meta},
    routes::params::PurchaseQuery,
    services::sequences,
    state::AppState,
};

pub async fn list_purchases(
    state: &AppState,
    user: &AuthUser,
    query: PurchaseQuery,
) -> AppResult<ApiResponse<PurchaseList>> {
    ensure_management(user)?;

    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(start_date) = query.start_date {
        let (start, _) = super::day_bounds(start_date);
        condition = condition.add(PurchaseCol::PurchaseDate.gte(start));
    }
    if let Some(end_date) = query.end_date {
        let (_, end) = super::day_bounds(end_date);
        condition = condition.add(PurchaseCol::PurchaseDate.lt(end));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(PurchaseCol::UserId.eq(user_id));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(PurchaseCol::Status.eq(status.clone()));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(PurchaseCol::PurchaseCode).ilike(pattern.clone()))
                .add(Expr::col(PurchaseCol::SupplierName).ilike(pattern)),
        );
    }

    let finder = Purchases::find()
        .filter(condition)
        .order_by_desc(PurchaseCol::PurchaseDate);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(purchase_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Purchases",
        PurchaseList { items },
        Some(meta),
    ))
}

pub async fn get_purchase(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PurchaseWithItems>> {
    ensure_management(user)?;

    let purchase = Purchases::find_by_id(id).one(&state.orm).await?;
    let purchase = match purchase {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let items = PurchaseItems::find()
        .filter(ItemCol::PurchaseId.eq(purchase.id))
        .order_by_asc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(purchase_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Purchase",
        PurchaseWithItems {
            purchase: purchase_from_entity(purchase),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Restock: fold every batch into the product WAC and write the purchase
/// header, items, stock updates and restock movements in one database
/// transaction. Retried once on a code collision, like checkout.
pub async fn create_purchase(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePurchaseRequest,
) -> AppResult<ApiResponse<PurchaseWithItems>> {
    ensure_management(user)?;

    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Purchase items are required".into()));
    }

    match create_purchase_once(state, user, &payload).await {
        Err(AppError::Engine(EngineError::DuplicateCode { code })) => {
            tracing::warn!(code = %code, "purchase code collision, retrying once");
            create_purchase_once(state, user, &payload).await
        }
        other => other,
    }
}

async fn create_purchase_once(
    state: &AppState,
    user: &AuthUser,
    payload: &CreatePurchaseRequest,
) -> AppResult<ApiResponse<PurchaseWithItems>> {
    let txn = state.orm.begin().await?;
    let now = Utc::now();

    // Running snapshots: repeated lines for one product fold cumulatively.
    let mut snapshots: HashMap<Uuid, ProductSnapshot> = HashMap::new();
    let mut lines = Vec::with_capacity(payload.items.len());
    let mut total_amount = Decimal::ZERO;

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

        let outcome = inventory::apply_restock(
            snapshot.current_stock,
            snapshot.purchase_price,
            item.quantity,
            item.purchase_price,
        )?;
        let subtotal = inventory::round_money(item.quantity * item.purchase_price);
        total_amount += subtotal;

        if let Some(s) = snapshots.get_mut(&item.product_id) {
            s.current_stock = outcome.stock_after;
            s.purchase_price = Some(outcome.new_wac);
        }
        lines.push((item, outcome, subtotal));
    }

    let code = sequences::reserve_code(&txn, CodePrefix::Purchase, now.date_naive()).await?;

    let header = PurchaseActive {
        id: Set(Uuid::new_v4()),
        purchase_code: Set(code.clone()),
        user_id: Set(user.user_id),
        supplier_name: Set(payload.supplier_name.clone()),
        purchase_date: Set(now.into()),
        total_amount: Set(total_amount),
        status: Set("completed".into()),
        notes: Set(payload.notes.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| sequences::duplicate_code_err(err, &code))?;

    let mut items_out: Vec<PurchaseItem> = Vec::with_capacity(lines.len());
    for (item, outcome, subtotal) in &lines {
        let row = ItemActive {
            id: Set(Uuid::new_v4()),
            purchase_id: Set(header.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            purchase_price: Set(item.purchase_price),
            subtotal: Set(*subtotal),
            notes: Set(item.notes.clone()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items_out.push(purchase_item_from_entity(row));

        stock_movements::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(item.product_id),
            user_id: Set(user.user_id),
            movement_type: Set("restock".into()),
            quantity: Set(item.quantity),
            stock_before: Set(outcome.stock_before),
            stock_after: Set(outcome.stock_after),
            purchase_price: Set(Some(item.purchase_price)),
            reference_code: Set(Some(code.clone())),
            notes: Set(Some(format!(
                "Restock via {code}. Batch price: {}. New WAC: {}",
                item.purchase_price, outcome.new_wac
            ))),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    for (product_id, snapshot) in &snapshots {
        Products::update_many()
            .col_expr(ProductCol::CurrentStock, Expr::value(snapshot.current_stock))
            .col_expr(ProductCol::PurchasePrice, Expr::value(snapshot.purchase_price))
            .col_expr(ProductCol::UpdatedAt, Expr::value(now))
            .filter(ProductCol::Id.eq(*product_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::debug!(
        code = %header.purchase_code,
        total = %header.total_amount,
        items = lines.len(),
        "restock committed"
    );

    Ok(ApiResponse::success(
        "Purchase created",
        PurchaseWithItems {
            purchase: purchase_from_entity(header),
            items: items_out,
        },
        Some(Meta::empty()),
    ))
}

/// Completed purchases have already moved stock and must stay on record.
pub async fn delete_purchase(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_management(user)?;

    let purchase = Purchases::find_by_id(id).one(&state.orm).await?;
    let purchase = match purchase {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if purchase.status != "pending" {
        return Err(AppError::BadRequest(
            "Only pending purchases can be deleted".into(),
        ));
    }

    Purchases::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
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

fn purchase_from_entity(model: PurchaseModel) -> Purchase {
    Purchase {
        id: model.id,
        purchase_code: model.purchase_code,
        user_id: model.user_id,
        supplier_name: model.supplier_name,
        purchase_date: model.purchase_date.with_timezone(&Utc),
        total_amount: model.total_amount,
        status: model.status,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn purchase_item_from_entity(model: ItemModel) -> PurchaseItem {
    PurchaseItem {
        id: model.id,
        purchase_id: model.purchase_id,
        product_id: model.product_id,
        quantity: model.quantity,
        purchase_price: model.purchase_price,
        subtotal: model.subtotal,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
