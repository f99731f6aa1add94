use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use wayfarer_api::api::{create_router, AppState};
use wayfarer_api::config::Config;
use wayfarer_api::db;
use wayfarer_api::store::{
    ItemCatalog, LikeStore, PgItemCatalog, PgLikeStore, PgPreferenceStore, PreferenceStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = db::create_pool(&config)
        .await
        .context("connecting to database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    let likes: Arc<dyn LikeStore> = Arc::new(PgLikeStore::new(pool.clone()));
    let catalog: Arc<dyn ItemCatalog> = Arc::new(PgItemCatalog::new(pool.clone()));
    let preferences: Arc<dyn PreferenceStore> = Arc::new(PgPreferenceStore::new(pool));

    let state = AppState::new(likes, catalog, preferences);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, "wayfarer-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
