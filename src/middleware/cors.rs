use std::time::Duration;

use http::Method;
use tracing::debug;

use super::Middleware;
use crate::dispatcher::HandlerResponse;
use crate::server::ParsedRequest;

/// Which request origins receive `Access-Control-Allow-Origin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Echo whatever `Origin` the request carries
    Reflect,
    /// Only these exact origins
    Exact(Vec<String>),
}

impl OriginPolicy {
    fn allows(&self, origin: &str) -> bool {
        match self {
            OriginPolicy::Reflect => true,
            OriginPolicy::Exact(origins) => origins.iter().any(|o| o == origin),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// `OPTIONS` requests are treated as preflights and answered with `204`
/// without reaching a handler. Every response to a request carrying an
/// allowed `Origin` gets that origin reflected, plus the credentials flag when
/// enabled. Because the allowed origin is echoed rather than `*`, credentials
/// may be combined with [`OriginPolicy::Reflect`].
///
/// # Usage
///
/// ```rust
/// use form_builder::middleware::{CorsMiddleware, OriginPolicy};
/// use http::Method;
///
/// let cors = CorsMiddleware::new(
///     OriginPolicy::Exact(vec!["https://forms.example.com".to_string()]),
///     vec![Method::GET, Method::POST],
///     true,
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    origin_policy: OriginPolicy,
    allowed_methods: Vec<Method>,
    allow_credentials: bool,
}

impl CorsMiddleware {
    pub fn new(
        origin_policy: OriginPolicy,
        allowed_methods: Vec<Method>,
        allow_credentials: bool,
    ) -> Self {
        Self {
            origin_policy,
            allowed_methods,
            allow_credentials,
        }
    }

    fn allowed_origin<'a>(&self, req: &'a ParsedRequest) -> Option<&'a str> {
        req.get_header("origin")
            .filter(|origin| self.origin_policy.allows(origin))
    }

    fn methods_header(&self) -> String {
        self.allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Reflect any origin, allow `GET,POST,PUT,DELETE`, allow credentials.
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self::new(
            OriginPolicy::Reflect,
            vec![Method::GET, Method::POST, Method::PUT, Method::DELETE],
            true,
        )
    }
}

impl Middleware for CorsMiddleware {
    fn before(&self, req: &ParsedRequest) -> Option<HandlerResponse> {
        if req.method != Method::OPTIONS.as_str() {
            return None;
        }
        debug!(
            request_id = %req.request_id,
            path = %req.path,
            origin = ?req.get_header("origin"),
            "CORS preflight answered"
        );
        let mut res = HandlerResponse::no_content();
        res.set_header("Access-Control-Allow-Methods", self.methods_header());
        if let Some(requested) = req.get_header("access-control-request-headers") {
            res.set_header("Access-Control-Allow-Headers", requested.to_string());
        }
        Some(res)
    }

    fn after(&self, req: &ParsedRequest, res: &mut HandlerResponse, _latency: Duration) {
        if self.origin_policy == OriginPolicy::Reflect || req.get_header("origin").is_some() {
            res.set_header("Vary", "Origin".to_string());
        }
        if let Some(origin) = self.allowed_origin(req) {
            res.set_header("Access-Control-Allow-Origin", origin.to_string());
            if self.allow_credentials {
                res.set_header("Access-Control-Allow-Credentials", "true".to_string());
            }
        }
    }
}
