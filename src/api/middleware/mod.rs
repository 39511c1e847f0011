//! Middleware components for request processing.
//!
//! This module contains middleware for logging, request ID tracking,
//! and error rendering.

mod error_handler;
mod logging;
mod request_id;

pub use error_handler::global_error_handler;
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
