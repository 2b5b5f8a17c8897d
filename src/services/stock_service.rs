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
    dto::products::ProductList,
    dto::stock::{MovementList, ProductMovements, StockAdjustmentRequest},
    engine::codes,
    engine::inventory::{self, ProductSnapshot},
    engine::EngineError,
    entity::{
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
        stock_movements::{
            ActiveModel as MovementActive, Column as MovementCol, Entity as StockMovements,
            Model as MovementModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{ensure_management, AuthUser},
    models::{Product, StockMovement},
    response::{ApiResponse, Meta},
    routes::params::{LowStockQuery, MovementQuery},
    state::AppState,
};

pub async fn list_movements(
    state: &AppState,
    user: &AuthUser,
    query: MovementQuery,
) -> AppResult<ApiResponse<MovementList>> {
    ensure_management(user)?;

    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(product_id) = query.product_id {
        condition = condition.add(MovementCol::ProductId.eq(product_id));
    }
    if let Some(kind) = query.movement_type.as_ref().filter(|t| !t.is_empty()) {
        condition = condition.add(MovementCol::MovementType.eq(kind.clone()));
    }
    if let Some(start_date) = query.start_date {
        let (start, _) = super::day_bounds(start_date);
        condition = condition.add(MovementCol::CreatedAt.gte(start));
    }
    if let Some(end_date) = query.end_date {
        let (_, end) = super::day_bounds(end_date);
        condition = condition.add(MovementCol::CreatedAt.lt(end));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(MovementCol::ReferenceCode).ilike(pattern));
    }

    let finder = StockMovements::find()
        .filter(condition)
        .order_by_desc(MovementCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(movement_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Stock movements",
        MovementList { items },
        Some(meta),
    ))
}

/// Manual stock correction. Locks the product row, applies the signed
/// delta and writes the `adjustment` movement in one transaction.
pub async fn adjust_stock(
    state: &AppState,
    user: &AuthUser,
    payload: StockAdjustmentRequest,
) -> AppResult<ApiResponse<StockMovement>> {
    ensure_management(user)?;

    if payload.notes.trim().is_empty() {
        return Err(AppError::BadRequest("Adjustment notes are required".into()));
    }

    let txn = state.orm.begin().await?;
    let now = Utc::now();

    let product = Products::find_by_id(payload.product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(EngineError::ProductNotFound {
            product_id: payload.product_id,
        })?;

    let snapshot = snapshot_from_model(&product);
    let outcome = inventory::apply_adjustment(&snapshot, payload.quantity)?;

    let movement = MovementActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        user_id: Set(user.user_id),
        movement_type: Set("adjustment".into()),
        quantity: Set(payload.quantity),
        stock_before: Set(outcome.stock_before),
        stock_after: Set(outcome.stock_after),
        purchase_price: Set(None),
        reference_code: Set(Some(codes::adjustment_reference(now))),
        notes: Set(Some(payload.notes.clone())),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    Products::update_many()
        .col_expr(ProductCol::CurrentStock, Expr::value(outcome.stock_after))
        .col_expr(ProductCol::UpdatedAt, Expr::value(now))
        .filter(ProductCol::Id.eq(product.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::debug!(
        product = %product.name,
        delta = %payload.quantity,
        stock_after = %outcome.stock_after,
        "stock adjusted"
    );

    Ok(ApiResponse::success(
        "Stock adjusted",
        movement_from_entity(movement),
        Some(Meta::empty()),
    ))
}

pub async fn product_history(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<ProductMovements>> {
    ensure_management(user)?;

    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let movements = StockMovements::find()
        .filter(MovementCol::ProductId.eq(product_id))
        .order_by_desc(MovementCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(movement_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Stock history",
        ProductMovements {
            product: product_from_entity(product),
            movements,
        },
        Some(Meta::empty()),
    ))
}

/// Active products at or below the threshold, lowest stock first.
pub async fn low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_management(user)?;

    let threshold = query.threshold.unwrap_or(Decimal::from(10));

    let items = Products::find()
        .filter(ProductCol::IsActive.eq(true))
        .filter(ProductCol::CurrentStock.lte(threshold))
        .order_by_asc(ProductCol::CurrentStock)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Low stock products",
        ProductList { items },
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

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        product_type_id: model.product_type_id,
        name: model.name,
        code: model.code,
        description: model.description,
        image_url: model.image_url,
        price_per_unit: model.price_per_unit,
        purchase_price: model.purchase_price,
        current_stock: model.current_stock,
        unit: model.unit,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn movement_from_entity(model: MovementModel) -> StockMovement {
    StockMovement {
        id: model.id,
        product_id: model.product_id,
        user_id: model.user_id,
        movement_type: model.movement_type,
        quantity: model.quantity,
        stock_before: model.stock_before,
        stock_after: model.stock_after,
        purchase_price: model.purchase_price,
        reference_code: model.reference_code,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
