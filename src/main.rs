//! Vehicle server: reads config from env, prepares the store, serves the vehicle routes.

use std::sync::Arc;
use tokio::net::TcpListener;
use vehicle_registry::{
    app, ensure_database_exists, AppState, MemoryVehicleStore, PgVehicleStore, ServerConfig, StoreBackend,
    VehicleStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vehicle_registry=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn VehicleStore> = match config.backend {
        StoreBackend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            let store = PgVehicleStore::new(pool, config.schema.clone());
            store.ensure_schema().await?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            Arc::new(MemoryVehicleStore::new())
        }
    };

    let app = app(AppState::new(store), config.body_limit_bytes);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
