use std::time::Duration;

use tracing::{info, warn};

use super::Middleware;
use crate::dispatcher::HandlerResponse;
use crate::server::ParsedRequest;

/// Emits one structured event per completed request.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &ParsedRequest, res: &mut HandlerResponse, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        if res.status >= 500 {
            warn!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                status = res.status,
                latency_ms,
                "Request failed"
            );
        } else {
            info!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                status = res.status,
                latency_ms,
                "Request completed"
            );
        }
    }
}
