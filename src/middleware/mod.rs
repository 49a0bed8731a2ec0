//! # Middleware Module
//!
//! Cross-cutting request/response processing.
//!
//! - [`CorsMiddleware`] answers preflight requests and decorates responses
//!   with CORS headers
//! - [`TracingMiddleware`] logs one event per completed request
//!
//! Middleware runs in registration order for `before` and `after`.

mod core;
mod cors;
mod tracing;

pub use self::core::Middleware;
pub use self::cors::{CorsMiddleware, OriginPolicy};
pub use self::tracing::TracingMiddleware;
