//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server exposing the read API.

mod access_log;
mod handlers;
pub mod request_id;
mod server;

pub use handlers::MISSING_ID;
pub use request_id::{REQUEST_ID_HEADER, RequestId};
pub use server::{HttpServer, SHUTDOWN_GRACE};
