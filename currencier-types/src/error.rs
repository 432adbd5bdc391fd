//! Error types for the currency rates service.

/// What went wrong while loading from an external source.
#[derive(Debug, thiserror::Error)]
pub enum SourceErrorKind {
    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("can't parse entry {entry}: {message}")]
    Parse { entry: String, message: String },

    #[error("source returned no currencies")]
    EmptyResult,
}

/// External source failure, tagged with the source location.
#[derive(Debug, thiserror::Error)]
#[error("can't pull currency prices from {url}: {kind}")]
pub struct SourceError {
    pub url: String,
    pub kind: SourceErrorKind,
}

impl SourceError {
    pub fn new(url: impl Into<String>, kind: SourceErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    pub fn kind(&self) -> &SourceErrorKind {
        &self.kind
    }
}

/// Repository-level errors (data access failures).
///
/// "No rows" is never an error; lookups return `Ok(None)` or an empty list.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Partial write: expected {expected} rows, affected {affected}")]
    PartialWrite { expected: usize, affected: u64 },
}

/// Application-level errors returned by the use-case service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("can't load currencies: {0}")]
    Load(SourceError),

    #[error("can't store currencies: {0}")]
    Store(RepoError),

    #[error("can't get currency by id: {0}")]
    GetById(RepoError),

    #[error("can't get currencies: {0}")]
    GetAll(RepoError),
}
