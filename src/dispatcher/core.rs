use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::ids::RequestId;
use crate::router::{ParamVec, RouteMatch};

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for requests and responses. Names are shared `Arc<str>`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data handed to a handler.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub request_id: RequestId,
    pub method: Method,
    /// Request path as received (without query string)
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    pub headers: HeaderVec,
    /// Parsed JSON body; `None` when the request had no body
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a path parameter by name, last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by a handler or a middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: HeaderVec,
    /// JSON body; `Value::Null` with status 204 means no body
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with no extra headers.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, HeaderVec::new(), body)
    }

    /// `{"error": message}` with the given status.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// An empty response, used for preflight answers.
    #[must_use]
    pub fn no_content() -> Self {
        Self::new(204, HeaderVec::new(), Value::Null)
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive on the name).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// A registered request handler.
pub type Handler = Arc<dyn Fn(HandlerRequest) -> HandlerResponse + Send + Sync>;

/// Routes matched requests to handlers registered by name.
///
/// Handlers run on the calling coroutine (one per connection under
/// `may_minihttp`), so independent requests proceed concurrently. A handler
/// panic is caught and turned into a 500; the server keeps serving.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Handler>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous registration.
    pub fn register_handler<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        if self.handlers.insert(name.to_string(), Arc::new(handler)).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        }
        info!(
            handler_name = %name,
            total_handlers = self.handlers.len(),
            "Handler registered successfully"
        );
    }

    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Invoke the handler bound to `route_match`.
    ///
    /// Returns `None` if no handler is registered under the route's name.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        request_id: RequestId,
        path: String,
        headers: HeaderVec,
        body: Option<Value>,
    ) -> Option<HandlerResponse> {
        let handler = match self.handlers.get(&route_match.handler_name) {
            Some(h) => Arc::clone(h),
            None => {
                let available_handlers: Vec<&String> = self.handlers.keys().collect();
                error!(
                    request_id = %request_id,
                    handler_name = %route_match.handler_name,
                    available_handlers = ?available_handlers,
                    "Handler not found"
                );
                return None;
            }
        };

        let request = HandlerRequest {
            request_id,
            method: route_match.route.method.clone(),
            path,
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            headers,
            body,
        };
        let handler_name = request.handler_name.clone();

        debug!(
            request_id = %request_id,
            handler_name = %handler_name,
            path_params = ?request.path_params,
            "Handler execution start"
        );
        let start = Instant::now();

        let response = match catch_unwind(AssertUnwindSafe(|| handler(request))) {
            Ok(response) => {
                info!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    status = response.status,
                    execution_time_ms = start.elapsed().as_millis() as u64,
                    "Handler execution complete"
                );
                response
            }
            Err(panic) => {
                let panic_message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    panic_message = %panic_message,
                    "Handler panicked"
                );
                HandlerResponse::error(500, &format!("Handler panicked: {panic_message}"))
            }
        };
        Some(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{RouteMeta, Router};
    use serde_json::json;

    fn router() -> Router {
        Router::new(vec![
            RouteMeta::new(Method::GET, "/echo/{id}", "echo"),
            RouteMeta::new(Method::GET, "/boom", "boom"),
            RouteMeta::new(Method::GET, "/orphan", "orphan"),
        ])
        .unwrap()
    }

    fn dispatcher() -> Dispatcher {
        let mut d = Dispatcher::new();
        d.register_handler("echo", |req| {
            HandlerResponse::json(200, json!({ "id": req.get_path_param("id"), "body": req.body }))
        });
        d.register_handler("boom", |_req| panic!("kaboom"));
        d
    }

    fn run(path: &str, body: Option<Value>) -> Option<HandlerResponse> {
        let m = router().route(&Method::GET, path).unwrap();
        dispatcher().dispatch(m, RequestId::new(), path.to_string(), HeaderVec::new(), body)
    }

    #[test]
    fn test_dispatch_passes_params_and_body() {
        let resp = run("/echo/7", Some(json!({"k": 1}))).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, json!({"id": "7", "body": {"k": 1}}));
    }

    #[test]
    fn test_panicking_handler_becomes_500() {
        let resp = run("/boom", None).unwrap();
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, json!({"error": "Handler panicked: kaboom"}));
    }

    #[test]
    fn test_unregistered_handler_returns_none() {
        assert!(run("/orphan", None).is_none());
        assert!(!dispatcher().has_handler("orphan"));
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut resp = HandlerResponse::json(200, Value::Null);
        resp.set_header("Vary", "Origin".into());
        resp.set_header("vary", "Accept".into());
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("VARY"), Some("Accept"));
    }
}
