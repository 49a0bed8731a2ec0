use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

use super::headers::HeaderLines;
use super::request::{parse_request, ParsedRequest, RequestBody};
use super::response::write_handler_response;
use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::middleware::Middleware;
use crate::router::Router;

/// The `may_minihttp` service: parse, middleware, route, dispatch, write.
///
/// Cloned once per connection. Router, dispatcher and middleware are shared;
/// each clone owns the header lines of the response it is writing.
#[derive(Clone)]
pub struct AppService {
    pub router: Router,
    pub dispatcher: Arc<Dispatcher>,
    pub middlewares: Arc<Vec<Arc<dyn Middleware>>>,
    header_lines: HeaderLines,
}

impl AppService {
    pub fn new(router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            router,
            dispatcher: Arc::new(dispatcher),
            middlewares: Arc::new(Vec::new()),
            header_lines: HeaderLines::default(),
        }
    }

    /// Append a middleware. Must be called before the service is cloned
    /// into the server.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        Arc::make_mut(&mut self.middlewares).push(mw);
    }

    /// Produce the response for a parsed request, middleware included.
    #[must_use]
    pub fn handle(&self, mut req: ParsedRequest) -> HandlerResponse {
        let start = Instant::now();

        let mut resp = match self.middlewares.iter().find_map(|mw| mw.before(&req)) {
            Some(early) => early,
            None => self.route_and_dispatch(&mut req),
        };

        let latency = start.elapsed();
        for mw in self.middlewares.iter() {
            mw.after(&req, &mut resp, latency);
        }
        resp
    }

    fn route_and_dispatch(&self, req: &mut ParsedRequest) -> HandlerResponse {
        if req.method == "GET" && req.path == "/health" {
            return health_response();
        }

        let method = match Method::from_bytes(req.method.as_bytes()) {
            Ok(m) => m,
            Err(_) => {
                warn!(request_id = %req.request_id, method = %req.method, "Unparsable request method");
                return HandlerResponse::error(400, "Bad Request");
            }
        };

        if let RequestBody::Malformed(message) = &req.body {
            warn!(request_id = %req.request_id, error = %message, "Rejected malformed JSON body");
            return HandlerResponse::json(
                400,
                json!({ "error": "Invalid JSON body", "message": message }),
            );
        }

        let Some(route_match) = self.router.route(&method, &req.path) else {
            return HandlerResponse::json(
                404,
                json!({ "error": "Not Found", "method": req.method, "path": req.path }),
            );
        };

        let body = match std::mem::take(&mut req.body) {
            RequestBody::Json(value) => Some(value),
            _ => None,
        };

        match self.dispatcher.dispatch(
            route_match,
            req.request_id,
            req.path.clone(),
            req.headers.clone(),
            body,
        ) {
            Some(resp) => resp,
            None => {
                error!(request_id = %req.request_id, path = %req.path, "No handler for matched route");
                HandlerResponse::json(
                    500,
                    json!({
                        "error": "Handler failed or not registered",
                        "method": req.method,
                        "path": req.path
                    }),
                )
            }
        }
    }
}

/// Liveness probe body: `{ "status": "ok" }`. Does not touch the store.
#[must_use]
pub fn health_response() -> HandlerResponse {
    HandlerResponse::json(200, json!({ "status": "ok" }))
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let resp = self.handle(parsed);
        write_handler_response(res, &resp, &mut self.header_lines);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::CorsMiddleware;
    use crate::router::RouteMeta;
    use crate::server::test_support::parsed;

    fn service() -> AppService {
        let router = Router::new(vec![
            RouteMeta::new(Method::POST, "/things", "create_thing"),
            RouteMeta::new(Method::GET, "/unregistered", "ghost"),
        ])
        .unwrap();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_handler("create_thing", |req| {
            HandlerResponse::json(200, json!({ "got": req.body }))
        });
        let mut svc = AppService::new(router, dispatcher);
        svc.add_middleware(Arc::new(CorsMiddleware::default()));
        svc
    }

    #[test]
    fn test_health() {
        let resp = service().handle(parsed("GET", "/health", &[]));
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, json!({"status": "ok"}));
    }

    #[test]
    fn test_unknown_route_is_404_with_cors() {
        let resp = service().handle(parsed("GET", "/nope", &[("origin", "http://x.test")]));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body["error"], "Not Found");
        assert_eq!(resp.get_header("Access-Control-Allow-Origin"), Some("http://x.test"));
    }

    #[test]
    fn test_json_body_reaches_handler() {
        let mut req = parsed("POST", "/things", &[]);
        req.body = RequestBody::Json(json!({"a": 1}));
        let resp = service().handle(req);
        assert_eq!(resp.body, json!({"got": {"a": 1}}));
    }

    #[test]
    fn test_malformed_body_is_400() {
        let mut req = parsed("POST", "/things", &[]);
        req.body = RequestBody::Malformed("expected value".into());
        let resp = service().handle(req);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["error"], "Invalid JSON body");
    }

    #[test]
    fn test_route_without_handler_is_500() {
        let resp = service().handle(parsed("GET", "/unregistered", &[]));
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Handler failed or not registered");
    }

    #[test]
    fn test_garbage_method_is_400() {
        let resp = service().handle(parsed("G E T", "/things", &[]));
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn test_preflight_skips_routing() {
        let resp = service().handle(parsed("OPTIONS", "/nope", &[("origin", "http://x.test")]));
        assert_eq!(resp.status, 204);
    }
}
