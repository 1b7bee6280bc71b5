use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

/// Handle to the civil-registry database.
///
/// Opened once at startup and cloned into every repository that needs it.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database file at `path`
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        Self::setup_schema(&pool).await?;
        info!("Opened civil registry database at {}", path.display());

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Private in-memory database living as long as this handle
    pub async fn open_in_memory() -> Result<Self> {
        // a single connection that never idles out keeps the memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::setup_schema(&pool).await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // AUTOINCREMENT keeps ids from ever being reused, even after delete-all
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ciudadano (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fecha_nac TEXT NOT NULL,
                paterno TEXT NOT NULL,
                materno TEXT NOT NULL,
                nombre TEXT NOT NULL,
                qr TEXT NOT NULL,
                codigo TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for ordering by codigo
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ciudadano_codigo
            ON ciudadano(codigo);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
