//! # Currencier Types
//!
//! Domain types and port traits for the currency rates service.
//! This crate has ZERO external IO dependencies - only data structures,
//! invariants, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - The canonical `Currency` record
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Query parameter types for API boundaries
//! - `error/` - Source, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::Currency;
pub use dto::*;
pub use error::{AppError, RepoError, SourceError, SourceErrorKind};
pub use ports::{CurrencyRepository, CurrencySource};
