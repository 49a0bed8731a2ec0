//! # Router Module
//!
//! Path matching and route resolution.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates (e.g. `/api/forms/{id}`) into anchored regexes
//! - Matching an incoming method and path to a registered route
//! - Extracting path parameters for the handler
//!
//! Unmatched requests produce `None`, which the server turns into a 404.
//!
//! ## Example
//!
//! ```rust
//! use form_builder::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Router::new(vec![
//!     RouteMeta::new(Method::PUT, "/api/forms/{id}", "update_form"),
//! ]).unwrap();
//!
//! let m = router.route(&Method::PUT, "/api/forms/abc").unwrap();
//! assert_eq!(m.handler_name, "update_form");
//! assert_eq!(m.get_path_param("id"), Some("abc"));
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};
