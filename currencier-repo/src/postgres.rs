//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use currencier_types::{Currency, CurrencyRepository, RepoError};

use crate::types::{
    DbCurrency, UPSERT_CHUNK_ROWS, check_affected, db_error, latest_per_id, tx_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository. Batch upserts run in a single transaction.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currency_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for PostgresRepo {
    async fn set_all(&self, currencies: &[Currency]) -> Result<(), RepoError> {
        let rows = latest_per_id(currencies);
        if rows.is_empty() {
            return Ok(());
        }

        let mut db_tx = self.pool.begin().await.map_err(tx_error)?;
        let mut affected = 0;

        for chunk in rows.chunks(UPSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO currency (id, name, rate, updated_at) ");
            builder.push_values(chunk, |mut row, c| {
                row.push_bind(c.id.clone())
                    .push_bind(c.name.clone())
                    .push_bind(c.per_unit_value())
                    .push("now()");
            });
            builder.push(
                " ON CONFLICT (id) DO UPDATE SET rate = EXCLUDED.rate, updated_at = EXCLUDED.updated_at",
            );

            let result = builder
                .build()
                .execute(&mut *db_tx)
                .await
                .map_err(db_error)?;
            affected += result.rows_affected();
        }

        check_affected(rows.len(), affected)?;
        db_tx.commit().await.map_err(tx_error)?;

        tracing::debug!("Upserted {} currencies", rows.len());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Currency>, RepoError> {
        let row: Option<DbCurrency> =
            sqlx::query_as(r#"SELECT id, name, rate FROM currency WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(row.map(DbCurrency::into_domain))
    }

    async fn get_page(&self, limit: u32, offset: u32) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> = sqlx::query_as(
            r#"SELECT id, name, rate FROM currency ORDER BY id LIMIT $1 OFFSET $2"#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(DbCurrency::into_domain).collect())
    }

    async fn get_lazy(&self, limit: u32, last_id: &str) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> = sqlx::query_as(
            r#"SELECT id, name, rate FROM currency WHERE id > $1 ORDER BY id LIMIT $2"#,
        )
        .bind(last_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(DbCurrency::into_domain).collect())
    }
}
