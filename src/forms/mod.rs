//! # Forms Resource
//!
//! The `/api/forms` route table, its handlers, and the assembly of a ready
//! [`AppService`] around a [`FormStore`].
//!
//! | Method | Path              | Handler       |
//! |--------|-------------------|---------------|
//! | POST   | `/api/forms`      | `create_form` |
//! | GET    | `/api/forms`      | `list_forms`  |
//! | PUT    | `/api/forms/{id}` | `update_form` |
//! | DELETE | `/api/forms/{id}` | `delete_form` |
//!
//! ```rust
//! use std::sync::Arc;
//! use form_builder::forms::build_service;
//! use form_builder::middleware::CorsMiddleware;
//! use form_builder::storage::MemoryFormStore;
//!
//! let service = build_service(Arc::new(MemoryFormStore::new()), CorsMiddleware::default()).unwrap();
//! assert_eq!(service.router.routes().count(), 4);
//! ```

mod handlers;

use http::Method;
use std::sync::Arc;

pub use handlers::{
    FormHandlers, DELETED, DELETE_FAILED, LIST_FAILED, SUBMITTED, SUBMIT_FAILED, UPDATED,
    UPDATE_FAILED,
};

use crate::dispatcher::Dispatcher;
use crate::middleware::{CorsMiddleware, TracingMiddleware};
use crate::router::{RouteMeta, Router};
use crate::server::AppService;
use crate::storage::FormStore;

pub const COLLECTION_PATH: &str = "/api/forms";
pub const ITEM_PATH: &str = "/api/forms/{id}";

/// The four form routes.
#[must_use]
pub fn routes() -> Vec<RouteMeta> {
    vec![
        RouteMeta::new(Method::POST, COLLECTION_PATH, "create_form"),
        RouteMeta::new(Method::GET, COLLECTION_PATH, "list_forms"),
        RouteMeta::new(Method::PUT, ITEM_PATH, "update_form"),
        RouteMeta::new(Method::DELETE, ITEM_PATH, "delete_form"),
    ]
}

/// Register every form handler with `dispatcher`.
pub fn register(dispatcher: &mut Dispatcher, store: Arc<dyn FormStore>) {
    let handlers = FormHandlers::new(store);

    let h = handlers.clone();
    dispatcher.register_handler("create_form", move |req| h.create(req));
    let h = handlers.clone();
    dispatcher.register_handler("list_forms", move |req| h.list(req));
    let h = handlers.clone();
    dispatcher.register_handler("update_form", move |req| h.update(req));
    dispatcher.register_handler("delete_form", move |req| handlers.delete(req));
}

/// Router, dispatcher and middleware chain for the forms API.
///
/// CORS runs first so preflights short-circuit before anything else; the
/// tracing middleware then sees every final response.
///
/// # Errors
///
/// Fails only if a route template does not compile.
pub fn build_service(
    store: Arc<dyn FormStore>,
    cors: CorsMiddleware,
) -> Result<AppService, regex::Error> {
    let router = Router::new(routes())?;
    let mut dispatcher = Dispatcher::new();
    register(&mut dispatcher, store);

    let mut service = AppService::new(router, dispatcher);
    service.add_middleware(Arc::new(cors));
    service.add_middleware(Arc::new(TracingMiddleware));
    Ok(service)
}
