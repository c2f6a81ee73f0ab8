use std::net::{IpAddr, SocketAddr};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::{
    app::build_app,
    config::AppConfig,
    db::{connect, run_migrations},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_api=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let addr = SocketAddr::from((config.host.parse::<IpAddr>()?, config.port));

    let (pool, orm) = connect(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;
    tracing::info!(
        max_connections = config.max_connections,
        receipt_prefix = %config.receipt_prefix,
        "database ready"
    );

    let app = build_app(AppState { pool, orm, config });

    tracing::info!("listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
