use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use axum_pos_api::{
    config::AppConfig,
    db::create_pool,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    ensure_user(&pool, "Admin Lestari", "admin@lestari.com", "password123", "admin").await?;
    ensure_user(&pool, "Owner Toko", "owner@lestari.com", "password123", "owner").await?;
    ensure_user(&pool, "Kasir 1", "kasir1@lestari.com", "password123", "kasir").await?;
    ensure_user(&pool, "Kasir 2", "kasir2@lestari.com", "password123", "kasir").await?;

    let timbangan = ensure_product_type(&pool, "Timbangan", "Sold by weight").await?;
    let kemasan = ensure_product_type(&pool, "Kemasan", "Pre-packaged goods").await?;

    seed_products(&pool, timbangan, kemasan).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_product_type(
    pool: &sqlx::PgPool,
    name: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO product_types (id, name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await?;

    let type_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM product_types WHERE name = $1")
                .bind(name)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured product type {name}");
    Ok(type_id)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    timbangan: Uuid,
    kemasan: Uuid,
) -> anyhow::Result<()> {
    // (type, name, code, price per unit, unit)
    let products = vec![
        (timbangan, "Gula Pasir", "GLP-001", "18000", "ons"),
        (timbangan, "Beras Premium", "BRS-001", "14000", "ons"),
        (timbangan, "Tepung Terigu", "TPG-001", "10000", "ons"),
        (kemasan, "Minyak Goreng 1L", "MYK-001", "17500", "pcs"),
        (kemasan, "Teh Celup", "TEH-001", "8500", "pcs"),
        (kemasan, "Kopi Sachet", "KOP-001", "1500", "pcs"),
    ];

    for (type_id, name, code, price, unit) in products {
        let price: Decimal = price.parse()?;
        sqlx::query(
            r#"
            INSERT INTO products (id, product_type_id, name, code, price_per_unit, unit)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(type_id)
        .bind(name)
        .bind(code)
        .bind(price)
        .bind(unit)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
