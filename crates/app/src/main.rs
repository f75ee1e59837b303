mod categories;
mod problem;
mod router;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};

use tracing::info;

use ecom_catalog_core::{CategoryStore, InMemoryCategoryStore};
use ecom_catalog_storage::{Database, StorageError};
use ecom_catalog_util::{load_env_file, AppConfig, StoreBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let store = build_store(&config).await?;
    let state = router::AppState::new(metrics, store);

    let addr: SocketAddr = config.bind_addr;
    info!(
        stage = "app",
        %addr,
        env = %config.environment.as_str(),
        store = %config.store_backend.as_str(),
        "starting HTTP server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .await
        .map_err(|err| err.into())
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn CategoryStore>, StorageError> {
    match config.store_backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryCategoryStore::new())),
        StoreBackend::Sqlite => {
            let database = Database::connect(&config.database_url).await?;
            database.run_migrations().await?;
            info!(stage = "storage", url = %config.database_url, "sqlite category store ready");
            Ok(Arc::new(database.categories()))
        }
    }
}
