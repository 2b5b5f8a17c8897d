use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use chrono::Utc;
use password_hash::rand_core::OsRng;
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
    dto::users::{CreateUserRequest, UpdateUserRequest, UserDetail, UserList, UserStatistics},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{ensure_admin, AuthUser},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, UserQuery, UserSortBy},
    state::AppState,
};

const VALID_ROLES: [&str; 3] = ["admin", "owner", "kasir"];

pub async fn list_users(
    state: &AppState,
    actor: &AuthUser,
    query: UserQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(actor)?;

    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(role) = query.role.as_ref().filter(|r| !r.is_empty()) {
        condition = condition.add(Column::Role.eq(role.clone()));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(Column::IsActive.eq(is_active));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Email).ilike(pattern)),
        );
    }

    let sort_by = query.sort_by.unwrap_or(UserSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        UserSortBy::Name => Column::Name,
        UserSortBy::Email => Column::Email,
        UserSortBy::Role => Column::Role,
        UserSortBy::IsActive => Column::IsActive,
        UserSortBy::CreatedAt => Column::CreatedAt,
    };

    let mut finder = Users::find().filter(condition);
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
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn get_user(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<UserDetail>> {
    ensure_admin(actor)?;

    let user = Users::find_by_id(id).one(&state.orm).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let (total_transactions, total_sales, total_purchases, total_purchase_amount) =
        sqlx::query_as::<_, (i64, Decimal, i64, Decimal)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM transactions WHERE user_id = $1),
                (SELECT COALESCE(SUM(total_amount), 0) FROM transactions WHERE user_id = $1),
                (SELECT COUNT(*) FROM purchases WHERE user_id = $1),
                (SELECT COALESCE(SUM(total_amount), 0) FROM purchases WHERE user_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "User",
        UserDetail {
            user: user_from_entity(user),
            statistics: UserStatistics {
                total_transactions,
                total_sales,
                total_purchases,
                total_purchase_amount,
            },
        },
        None,
    ))
}

pub async fn create_user(
    state: &AppState,
    actor: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(actor)?;
    validate_role(&payload.role)?;

    let exists = Users::find()
        .filter(Column::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Email is already taken".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        role: Set(payload.role),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let user = active.insert(&state.orm).await?;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(actor)?;

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    if let Some(role) = payload.role.as_deref() {
        validate_role(role)?;
        if id == actor.user_id && role != existing.role {
            return Err(AppError::BadRequest("You cannot change your own role".into()));
        }
    }
    if payload.is_active == Some(false) && id == actor.user_id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }
    if let Some(email) = payload.email.as_deref() {
        let taken = Users::find()
            .filter(Column::Email.eq(email))
            .filter(Column::Id.ne(id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest("Email is already taken".into()));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());

    let user = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "User updated",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(actor)?;

    if id == actor.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    if existing.is_none() {
        return Err(AppError::NotFound);
    }

    // The ledger references users; anyone with recorded activity stays.
    let (referenced,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (SELECT 1 FROM transactions WHERE user_id = $1)
            OR EXISTS (SELECT 1 FROM purchases WHERE user_id = $1)
            OR EXISTS (SELECT 1 FROM stock_movements WHERE user_id = $1)
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    if referenced {
        return Err(AppError::BadRequest(
            "User has recorded activity and cannot be deleted".into(),
        ));
    }

    Users::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "User deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_user_status(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(actor)?;

    if id == actor.user_id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let now_active = !existing.is_active;
    let mut active: ActiveModel = existing.into();
    active.is_active = Set(now_active);
    active.updated_at = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    let message = if now_active {
        "User activated"
    } else {
        "User deactivated"
    };
    Ok(ApiResponse::success(
        message,
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

fn validate_role(role: &str) -> Result<(), AppError> {
    if !VALID_ROLES.contains(&role) {
        return Err(AppError::BadRequest(
            "Role must be one of: admin, owner, kasir".into(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    Ok(hash.to_string())
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        role: model.role,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
