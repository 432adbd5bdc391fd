//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use currencier_types::{Currency, CurrencyRepository, RepoError};

use crate::types::{
    DbCurrency, UPSERT_CHUNK_ROWS, check_affected, db_error, latest_per_id, tx_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_currency.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for SqliteRepo {
    async fn set_all(&self, currencies: &[Currency]) -> Result<(), RepoError> {
        let rows = latest_per_id(currencies);
        if rows.is_empty() {
            return Ok(());
        }

        let mut db_tx = self.pool.begin().await.map_err(tx_error)?;
        let mut affected = 0;

        for chunk in rows.chunks(UPSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO currency (id, name, rate, updated_at) ");
            builder.push_values(chunk, |mut row, c| {
                row.push_bind(c.id.clone())
                    .push_bind(c.name.clone())
                    .push_bind(c.per_unit_value())
                    .push("CURRENT_TIMESTAMP");
            });
            builder.push(
                " ON CONFLICT (id) DO UPDATE SET rate = excluded.rate, updated_at = excluded.updated_at",
            );

            let result = builder
                .build()
                .execute(&mut *db_tx)
                .await
                .map_err(db_error)?;
            affected += result.rows_affected();
        }

        // Dropping the transaction on error rolls it back.
        check_affected(rows.len(), affected)?;
        db_tx.commit().await.map_err(tx_error)?;

        tracing::debug!("Upserted {} currencies", rows.len());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Currency>, RepoError> {
        let row: Option<DbCurrency> =
            sqlx::query_as(r#"SELECT id, name, rate FROM currency WHERE id = ?"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(row.map(DbCurrency::into_domain))
    }

    async fn get_page(&self, limit: u32, offset: u32) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> =
            sqlx::query_as(r#"SELECT id, name, rate FROM currency ORDER BY id LIMIT ? OFFSET ?"#)
                .bind(i64::from(limit))
                .bind(i64::from(offset))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(rows.into_iter().map(DbCurrency::into_domain).collect())
    }

    async fn get_lazy(&self, limit: u32, last_id: &str) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> = sqlx::query_as(
            r#"SELECT id, name, rate FROM currency WHERE id > ? ORDER BY id LIMIT ?"#,
        )
        .bind(last_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(DbCurrency::into_domain).collect())
    }
}
