use crate::error::DbError;
use chrono::Utc;
use configuration::DatabaseSettings;
use core_types::RoleKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Establishes a connection pool to the SQLite database.
///
/// The database file is created if missing and foreign-key enforcement is
/// switched on for every pooled connection.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect_with(options)
        .await?;

    tracing::info!(url = %settings.url, max_connections = settings.max_connections, "Connected to database.");
    Ok(pool)
}

/// A private in-memory database behind a single, never-recycled connection.
///
/// An in-memory SQLite database lives exactly as long as its connection, so
/// the pool must not close or replace it.
pub async fn connect_in_memory() -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Applies the embedded migrations, creating any missing tables.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Inserts the fixed set of roles, leaving existing rows untouched.
pub async fn seed_roles(pool: &SqlitePool) -> Result<(), DbError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    for role in RoleKind::ALL {
        sqlx::query(
            "INSERT OR IGNORE INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(role.id())
        .bind(role.name())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Startup hook: schema first, then the rows the schema's defaults rely on.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), DbError> {
    run_migrations(pool).await?;
    seed_roles(pool).await?;
    tracing::info!("Database schema is up to date.");
    Ok(())
}

/// Shutdown hook: waits for checked-out connections to return, then closes them all.
pub async fn disconnect(pool: &SqlitePool) {
    pool.close().await;
    tracing::info!("Database pool closed.");
}
