//! Shared database row types and helpers for both backends.

use std::collections::BTreeMap;

use sqlx::FromRow;

use currencier_types::{Currency, RepoError};

/// Rows per upsert statement. Three bind parameters per row keeps a chunk
/// under SQLite's default limit of 999 variables.
pub const UPSERT_CHUNK_ROWS: usize = 300;

/// Currency row from database. `rate` is always per unit.
#[derive(FromRow)]
pub struct DbCurrency {
    pub id: String,
    pub name: String,
    pub rate: f64,
}

impl DbCurrency {
    pub fn into_domain(self) -> Currency {
        Currency::per_unit(self.id, self.name, self.rate)
    }
}

/// Keeps the last record for every id, ordered by id.
///
/// A single upsert statement may not touch the same key twice (Postgres
/// rejects it), and a stable key order keeps row locks ordered.
pub fn latest_per_id(currencies: &[Currency]) -> Vec<&Currency> {
    currencies
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect()
}

pub fn db_error(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

pub fn tx_error(e: sqlx::Error) -> RepoError {
    RepoError::Transaction(e.to_string())
}

/// Fails when an upsert touched fewer (or more) rows than it was given.
pub fn check_affected(expected: usize, affected: u64) -> Result<(), RepoError> {
    if affected != expected as u64 {
        return Err(RepoError::PartialWrite { expected, affected });
    }
    Ok(())
}
