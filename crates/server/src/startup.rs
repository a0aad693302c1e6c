use std::future::Future;
use std::sync::Arc;

use configs::{AppConfig, StorageBackend};
use migration::{Migrator, MigratorTrait};
use service::items::ItemStore;
use service::users::repo::{MemoryUserRepository, SeaOrmUserRepository};
use service::users::repository::UserRepository;
use service::users::UserService;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::{self, AppState};

/// Construct stores and the user service for the configured backend.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let repo: Arc<dyn UserRepository> = match cfg.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryUserRepository::new()),
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            Migrator::up(&db, None).await?;
            info!("database migrations applied");
            Arc::new(SeaOrmUserRepository::new(db))
        }
    };
    info!(backend = ?cfg.storage.backend, "user storage ready");
    Ok(AppState { items: Arc::new(ItemStore::new()), users: Arc::new(UserService::new(repo)) })
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = routes::build_router(state);
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "starting server");
    serve(listener, state, shutdown_signal()).await
}
