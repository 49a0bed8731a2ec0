//! # form-builder
//!
//! A small CRUD backend for form definitions, served over HTTP by a
//! coroutine-per-connection server (`may` / `may_minihttp`) and persisted in
//! MongoDB.
//!
//! ## Architecture
//!
//! - **[`storage`]** - The `Form` model, payload coercion, and the
//!   [`FormStore`](storage::FormStore) trait with MongoDB and in-memory backends
//! - **[`forms`]** - The `/api/forms` route table and its four handlers
//! - **[`router`]** - Regex-compiled path templates and route matching
//! - **[`dispatcher`]** - Named handler registry with panic isolation
//! - **[`middleware`]** - CORS and request logging hooks
//! - **[`server`]** - Request parsing, the `HttpService` implementation and
//!   response writing
//! - **[`config`]**, **[`runtime_config`]**, **[`logging`]**, **[`cli`]** -
//!   Process setup for the `form-builder` binary
//!
//! ## Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as server::AppService
//!     participant MW as middleware
//!     participant Router as router::Router
//!     participant Dispatcher as dispatcher::Dispatcher
//!     participant Handler as forms::FormHandlers
//!     participant Store as storage::FormStore
//!
//!     Client->>Server: HTTP request
//!     Server->>MW: before (CORS preflight)
//!     Server->>Router: route(method, path)
//!     Router-->>Server: RouteMatch
//!     Server->>Dispatcher: dispatch(route_match, ...)
//!     Dispatcher->>Handler: handler(HandlerRequest)
//!     Handler->>Store: one storage call
//!     Store-->>Handler: Result<_, StoreError>
//!     Handler-->>Dispatcher: HandlerResponse
//!     Server->>MW: after (CORS headers, request log)
//!     Server-->>Client: JSON response
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use form_builder::forms::build_service;
//! use form_builder::middleware::CorsMiddleware;
//! use form_builder::server::HttpServer;
//! use form_builder::storage::{MongoFormStore, PooledStore, DEFAULT_STORE_THREADS};
//!
//! let mongo = MongoFormStore::connect("mongodb://localhost:27017", "FORM_BUILDER");
//! let store = Arc::new(PooledStore::new(Arc::new(mongo), DEFAULT_STORE_THREADS).unwrap());
//! let service = build_service(store, CorsMiddleware::default()).unwrap();
//! let handle = HttpServer(service).start("0.0.0.0:8080").unwrap();
//! handle.join().unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod forms;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod storage;
