#![allow(dead_code)]

use sea_orm::{ConnectionTrait, Statement};
use storefront_api::{
    config::AppConfig,
    db::{connect, run_migrations},
    domain::{
        payment::{Bank, PaymentMethod},
        receipt::DEFAULT_RECEIPT_PREFIX,
        role::Role,
        shipping::ShippingMethod,
    },
    dto::{
        orders::{CreateOrderRequest, OrderLineInput},
        products::CreateProductRequest,
    },
    middleware::auth::AuthUser,
    models::Product,
    services::product_service,
    state::AppState,
};
use uuid::Uuid;

/// Connects to the test database, or returns `None` so the caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let (pool, orm) = connect(&database_url, 5).await?;
    run_migrations(&pool).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE payments, order_products, orders, cart_items, carts, addresses, product_images, products, audit_logs, users CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        max_connections: 5,
        jwt_ttl_hours: 1,
        receipt_prefix: DEFAULT_RECEIPT_PREFIX.into(),
    };

    Ok(Some(AppState { pool, orm, config }))
}

pub async fn create_user(state: &AppState, email: &str, role: Role) -> anyhow::Result<AuthUser> {
    let (user_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, 'dummy', $3) RETURNING id",
    )
    .bind(email)
    .bind(email)
    .bind(role.as_str())
    .fetch_one(&state.pool)
    .await?;

    Ok(AuthUser { user_id, role })
}

pub async fn create_product(
    state: &AppState,
    owner: &AuthUser,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        owner,
        CreateProductRequest {
            name: format!("Product {}", Uuid::new_v4()),
            description: "Used by integration tests".into(),
            price,
            rate: 4.5,
            published: true,
            stock,
            images: vec![],
        },
    )
    .await?;
    Ok(resp.data.expect("product data"))
}

pub async fn product_stock(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(stock)
}

pub fn order_request(
    lines: Vec<(Uuid, i32)>,
    payment_method: PaymentMethod,
    total: i64,
) -> CreateOrderRequest {
    let bank = match payment_method {
        PaymentMethod::BankTransfer => Some(Bank::Bri),
        PaymentMethod::Cod => None,
    };
    CreateOrderRequest {
        name: "Budi Santoso".into(),
        phone: "081234567890".into(),
        email: "budi@example.com".into(),
        address: "Jl. Merdeka No. 1".into(),
        city: "Bandung".into(),
        postal_code: "40111".into(),
        province: "Jawa Barat".into(),
        shipping_method: ShippingMethod::Jne,
        payment_method,
        bank,
        account_number: None,
        notes: None,
        total,
        products: lines
            .into_iter()
            .map(|(product_id, quantity)| OrderLineInput {
                product_id,
                quantity,
            })
            .collect(),
    }
}
