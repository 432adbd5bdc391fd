//! Repository port trait.
//!
//! Adapters (Postgres, SQLite, in-memory mocks) implement this trait.

use crate::domain::Currency;
use crate::error::RepoError;

/// The storage port for currency records.
///
/// Records are keyed by `Currency::id`; reads are ordered by id ascending.
#[async_trait::async_trait]
pub trait CurrencyRepository: Send + Sync + 'static {
    /// Upserts every record, storing the per-unit rate.
    ///
    /// MUST be atomic for the whole batch. An empty batch is a no-op.
    async fn set_all(&self, currencies: &[Currency]) -> Result<(), RepoError>;

    /// Gets a record by exact id. `Ok(None)` when it does not exist.
    async fn get_by_id(&self, id: &str) -> Result<Option<Currency>, RepoError>;

    /// Returns up to `limit` records after skipping `offset`.
    async fn get_page(&self, limit: u32, offset: u32) -> Result<Vec<Currency>, RepoError>;

    /// Returns up to `limit` records with id strictly greater than `last_id`.
    async fn get_lazy(&self, limit: u32, last_id: &str) -> Result<Vec<Currency>, RepoError>;
}
