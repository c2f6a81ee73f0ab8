use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    domain::role::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&pool).await?;

    let admin_id =
        ensure_user(&pool, "Admin", "admin@example.com", "admin12345", Role::Admin).await?;
    let courier_id =
        ensure_user(&pool, "Courier", "courier@example.com", "courier12345", Role::Courier).await?;
    let user_id =
        ensure_user(&pool, "Customer", "user@example.com", "user12345", Role::User).await?;
    seed_products(&pool, admin_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Courier ID: {courier_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &DbPool, owner_id: Uuid) -> anyhow::Result<()> {
    let products = [
        ("Kemeja Batik", "Hand-stamped cotton batik shirt", 250_000_i64, 4.5, 40),
        ("Tas Anyaman", "Woven rattan shoulder bag", 180_000, 4.2, 25),
        ("Kopi Gayo 250g", "Single origin arabica beans", 95_000, 4.8, 120),
        ("Sarung Tenun", "Traditional woven sarong", 320_000, 4.0, 15),
    ];

    for (name, description, price, rate, stock) in products {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO products (user_id, name, description, price, rate, published, stock)
            SELECT $1, $2, $3, $4, $5, TRUE, $6
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE user_id = $1 AND name = $2)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(rate)
        .bind(stock)
        .fetch_optional(pool)
        .await?;

        if let Some((product_id,)) = inserted {
            sqlx::query(
                "INSERT INTO product_images (product_id, image_url, position) VALUES ($1, $2, 0)",
            )
            .bind(product_id)
            .bind(format!("https://picsum.photos/seed/{product_id}/600/600"))
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded products");
    Ok(())
}
