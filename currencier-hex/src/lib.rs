//! # Currencier Hex
//!
//! Application service layer, background refresh and HTTP adapter for the
//! currency rates service.
//!
//! ## Architecture
//!
//! - `service/` - Use-case service (orchestrates source and repository ports)
//! - `scheduler/` - Periodic refresh loop driving `update_currencies`
//! - `shutdown/` - Process-wide cancellation signal
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `S: CurrencySource` and `R: CurrencyRepository`,
//! allowing different adapters to be injected.

pub mod inbound;
pub mod scheduler;
pub mod service;
pub mod shutdown;


pub use scheduler::RefreshScheduler;
pub use service::CurrencierService;
pub use shutdown::{Shutdown, ShutdownTrigger, shutdown_channel};
