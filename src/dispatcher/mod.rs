//! # Dispatcher Module
//!
//! Handler registry and invocation.
//!
//! ## Overview
//!
//! Handlers are plain functions from [`HandlerRequest`] to [`HandlerResponse`],
//! registered by name at startup. The router yields a handler name for each
//! matched request; the dispatcher looks it up and runs it.
//!
//! ## Error Handling
//!
//! - Unknown handler names yield `None` (the server answers 500)
//! - Handler panics are caught and answered with a 500 response
//!
//! ## Example
//!
//! ```rust
//! use form_builder::dispatcher::{Dispatcher, HandlerResponse};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_handler("health", |_req| {
//!     HandlerResponse::json(200, serde_json::json!({ "status": "ok" }))
//! });
//! assert!(dispatcher.has_handler("health"));
//! ```

mod core;

pub use core::{
    Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS,
};
