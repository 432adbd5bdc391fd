//! External rate source port.
//!
//! Implementations fetch a full snapshot of currencies from a third-party
//! feed and hand back canonical records. Feed quirks (charset, decimal
//! separators) never leak past this trait.

use crate::domain::Currency;
use crate::error::SourceError;

/// Port trait for external currency rate sources.
///
/// Dropping the returned future aborts the in-flight request.
#[async_trait::async_trait]
pub trait CurrencySource: Send + Sync + 'static {
    /// Loads every currency currently published by the source.
    ///
    /// An empty feed is reported as an error, never as `Ok(vec![])`.
    async fn load(&self) -> Result<Vec<Currency>, SourceError>;
}
