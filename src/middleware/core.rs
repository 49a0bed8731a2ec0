use std::time::Duration;

use crate::dispatcher::HandlerResponse;
use crate::server::ParsedRequest;

/// Hook run around every request the server receives, routed or not.
///
/// `before` may short-circuit with a response, in which case routing and the
/// handler are skipped. `after` sees every response, including early ones,
/// 404s, and errors.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &ParsedRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &ParsedRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
