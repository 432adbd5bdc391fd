//! Currencier Application Service
//!
//! Orchestrates "load from source → persist" and "read from store" through
//! the two ports. Contains NO infrastructure logic - pure orchestration.

use tracing::{info, instrument};

use currencier_types::{AppError, Currency, CurrencyRepository, CurrencySource};

/// Application service for currency rate operations.
///
/// Generic over the source and repository adapters, injected at compile time.
/// Holds no mutable state, so one instance is shared (behind an `Arc`) by the
/// HTTP handlers and the refresh scheduler.
pub struct CurrencierService<S: CurrencySource, R: CurrencyRepository> {
    source: S,
    repo: R,
}

impl<S: CurrencySource, R: CurrencyRepository> CurrencierService<S, R> {
    /// Creates a new service over the given adapters.
    pub fn new(source: S, repo: R) -> Self {
        Self { source, repo }
    }

    /// Returns a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Pulls a fresh snapshot from the source and upserts it.
    ///
    /// The fetch completes before anything is written. No retries here; the
    /// scheduler's next tick is the retry. Returns the number of records stored.
    #[instrument(skip(self))]
    pub async fn update_currencies(&self) -> Result<usize, AppError> {
        let currencies = self.source.load().await.map_err(AppError::Load)?;

        self.repo
            .set_all(&currencies)
            .await
            .map_err(AppError::Store)?;

        info!("Stored {} currencies", currencies.len());
        Ok(currencies.len())
    }

    /// Gets a currency by id; `None` when it is not stored.
    #[instrument(skip(self))]
    pub async fn get_currency_by_id(&self, id: &str) -> Result<Option<Currency>, AppError> {
        self.repo.get_by_id(id).await.map_err(AppError::GetById)
    }

    /// Offset pagination over all stored currencies, ordered by id.
    #[instrument(skip(self))]
    pub async fn get_currencies_page(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Currency>, AppError> {
        self.repo
            .get_page(limit, offset)
            .await
            .map_err(AppError::GetAll)
    }

    /// Cursor pagination: currencies with id greater than `last_id`.
    #[instrument(skip(self))]
    pub async fn get_currencies_lazy(
        &self,
        limit: u32,
        last_id: &str,
    ) -> Result<Vec<Currency>, AppError> {
        self.repo
            .get_lazy(limit, last_id)
            .await
            .map_err(AppError::GetAll)
    }
}
