use std::time::Duration;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use sqlx::postgres::PgPoolOptions;
use storefront_api::{
    app::build_app, config::AppConfig, db::orm_from_pool,
    domain::receipt::DEFAULT_RECEIPT_PREFIX, routes::health::health_check, state::AppState,
};
use tower::ServiceExt;

// Nothing listens on port 1, so every query fails fast without a real database.
fn offline_state() -> anyhow::Result<AppState> {
    let database_url = "postgres://postgres@127.0.0.1:1/unreachable".to_string();
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy(&database_url)?;
    Ok(AppState {
        orm: orm_from_pool(&pool),
        pool,
        config: AppConfig {
            database_url,
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 1,
            jwt_ttl_hours: 1,
            receipt_prefix: DEFAULT_RECEIPT_PREFIX.into(),
        },
    })
}

async fn body_json(response: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_check_reports_database_down() -> anyhow::Result<()> {
    let response = health_check(axum::extract::State(offline_state()?)).await;
    assert_eq!(response.0.message, "Health check");

    let data = serde_json::to_value(response.0.data.expect("health data"))?;
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "down");
    Ok(())
}

#[tokio::test]
async fn router_envelopes_and_guards() -> anyhow::Result<()> {
    let app = build_app(offline_state()?);

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .clone()
        .oneshot(Request::get("/nope").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["path"], "/nope");

    // Protected routes reject before touching the database.
    let response = app
        .clone()
        .oneshot(Request::get("/api/orders/me").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["error"], "Unauthorized Missing Authorization header");

    let response = app
        .oneshot(
            Request::get("/api/dashboard/sales")
                .header("Authorization", "Basic abc")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
