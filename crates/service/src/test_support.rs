#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// Connection for database-backed tests, or `None` when they should be
/// skipped (`SKIP_DB_TESTS` set, or no `DATABASE_URL`).
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }

    let migrated = MIGRATED
        .get_or_init(|| async {
            match models::db::connect_from_env().await {
                Ok(db) => migration::Migrator::up(&db, None).await.is_ok(),
                Err(_) => false,
            }
        })
        .await;
    if !*migrated {
        eprintln!("skip: database unreachable or migration failed");
        return Ok(None);
    }

    // Return a fresh connection for the current test's runtime
    let db = models::db::connect_from_env().await?;
    Ok(Some(db))
}
