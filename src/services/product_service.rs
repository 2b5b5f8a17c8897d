use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList, ProductTypeList, UpdateProductRequest},
    entity::{
        product_types::{Entity as ProductTypes, Model as ProductTypeModel},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        stock_movements::{Column as MovementCol, Entity as StockMovements},
    },
    error::{AppError, AppResult},
    models::{Product, ProductType},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

const VALID_UNITS: [&str; 2] = ["ons", "pcs"];

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(type_id) = query.product_type_id {
        condition = condition.add(Column::ProductTypeId.eq(type_id));
    }

    if let Some(is_active) = query.is_active {
        condition = condition.add(Column::IsActive.eq(is_active));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Code).ilike(pattern)),
        );
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Code => Column::Code,
        ProductSortBy::PricePerUnit => Column::PricePerUnit,
        ProductSortBy::CurrentStock => Column::CurrentStock,
        ProductSortBy::CreatedAt => Column::CreatedAt,
    };

    let mut finder = Products::find().filter(condition);
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
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    validate_unit(&payload.unit)?;
    validate_money("price_per_unit", payload.price_per_unit)?;
    if let Some(price) = payload.purchase_price {
        validate_money("purchase_price", price)?;
    }
    let current_stock = payload.current_stock.unwrap_or(Decimal::ZERO);
    validate_money("current_stock", current_stock)?;

    ProductTypes::find_by_id(payload.product_type_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Product type not found".into()))?;

    let exists = Products::find()
        .filter(Column::Code.eq(payload.code.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Product code is already taken".into()));
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_type_id: Set(payload.product_type_id),
        name: Set(payload.name),
        code: Set(payload.code),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        price_per_unit: Set(payload.price_per_unit),
        purchase_price: Set(payload.purchase_price),
        current_stock: Set(current_stock),
        unit: Set(payload.unit),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Some(unit) = payload.unit.as_deref() {
        validate_unit(unit)?;
    }
    if let Some(price) = payload.price_per_unit {
        validate_money("price_per_unit", price)?;
    }
    if let Some(type_id) = payload.product_type_id {
        ProductTypes::find_by_id(type_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest("Product type not found".into()))?;
    }
    if let Some(code) = payload.code.as_deref() {
        let taken = Products::find()
            .filter(Column::Code.eq(code))
            .filter(Column::Id.ne(id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest("Product code is already taken".into()));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(type_id) = payload.product_type_id {
        active.product_type_id = Set(type_id);
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(code) = payload.code {
        active.code = Set(code);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(price) = payload.price_per_unit {
        active.price_per_unit = Set(price);
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    if existing.is_none() {
        return Err(AppError::NotFound);
    }

    // Refuse to break the ledger: movement history must stay resolvable.
    let movements = StockMovements::find()
        .filter(MovementCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if movements > 0 {
        return Err(AppError::BadRequest(
            "Product has stock movements and cannot be deleted".into(),
        ));
    }

    Products::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_product_status(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let now_active = !existing.is_active;
    let mut active: ActiveModel = existing.into();
    active.is_active = Set(now_active);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    let message = if now_active {
        "Product activated"
    } else {
        "Product deactivated"
    };
    Ok(ApiResponse::success(
        message,
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn list_product_types(state: &AppState) -> AppResult<ApiResponse<ProductTypeList>> {
    let items = ProductTypes::find()
        .order_by_asc(crate::entity::product_types::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_type_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Product types",
        ProductTypeList { items },
        None,
    ))
}

pub async fn get_product_type(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductType>> {
    let result = ProductTypes::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_type_from_entity);
    let result = match result {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product type", result, None))
}

fn validate_unit(unit: &str) -> AppResult<()> {
    if !VALID_UNITS.contains(&unit) {
        return Err(AppError::BadRequest("Unit must be one of: ons, pcs".into()));
    }
    Ok(())
}

fn validate_money(field: &str, value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{field} cannot be negative")));
    }
    Ok(())
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

fn product_type_from_entity(model: ProductTypeModel) -> ProductType {
    ProductType {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
