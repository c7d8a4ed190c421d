use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{ensure, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub type DbPool = SqlitePool;

pub async fn connect(url: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database URL {}", url))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to the database")?;
    migrate(&pool).await?;

    Ok(pool)
}

/// A single-connection in-memory database, used by the tests.
///
/// Every connection to `sqlite::memory:` gets its own database, so the pool
/// is pinned to one connection that never expires.
pub async fn in_memory() -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("Failed to open an in-memory database")?;
    migrate(&pool).await?;

    Ok(pool)
}

pub async fn migrate(pool: &DbPool) -> Result<()> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

/// The file a SQLite database URL points at.
pub fn file_path(url: &str) -> Result<PathBuf> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database URL {}", url))?;

    Ok(options.get_filename().to_path_buf())
}

/// Fails when the database file lives somewhere the static file
/// service would hand it out.
pub fn ensure_not_served(url: &str, static_dir: &Path) -> Result<()> {
    let database = file_path(url)?;
    let (Ok(database), Ok(static_dir)) = (database.canonicalize(), static_dir.canonicalize()) else {
        return Ok(());
    };

    ensure!(
        !database.starts_with(&static_dir),
        "The database {} is inside the static directory {}",
        database.display(),
        static_dir.display()
    );
    Ok(())
}
