use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;

/// Configure SQLite pragmas for the crawl workload.
/// These are set per-connection via the after_connect callback.
async fn configure_sqlite_pragmas(conn: &mut sqlx::SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Executor;

    // WAL mode: searches keep reading while a flush writes
    conn.execute("PRAGMA journal_mode = WAL").await?;

    conn.execute("PRAGMA synchronous = NORMAL").await?;

    // Negative value = KB, so -65536 = 64MB
    conn.execute("PRAGMA cache_size = -65536").await?;

    // 5 second timeout for busy connections
    conn.execute("PRAGMA busy_timeout = 5000").await?;

    conn.execute("PRAGMA temp_store = MEMORY").await?;

    conn.execute("PRAGMA foreign_keys = ON").await?;

    Ok(())
}

/// Connect to the database and run embedded migrations.
pub async fn init_db(database_url: &str) -> Result<SqlitePool> {
    log::info!("[DB] Database URL: {}", database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                configure_sqlite_pragmas(conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
        .context(format!("failed to connect to database at {}", database_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    log::info!("[DB] Database initialized");

    Ok(pool)
}
