//! HTTP surface: request parsing, the `may_minihttp` service, response
//! writing and the server handle.
//!
//! ```text
//! TCP -> parse_request -> middleware.before -> /health | router -> dispatcher
//!     -> middleware.after -> write_handler_response
//! ```

mod headers;
pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use headers::{HeaderLines, MAX_RESPONSE_HEADERS};
pub use http_server::{HttpServer, ServerHandle, MAX_REQUEST_HEADERS};
pub use request::{parse_request, split_path, ParsedRequest, RequestBody};
pub use response::write_handler_response;
pub use service::{health_response, AppService};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::{ParsedRequest, RequestBody};
    use crate::dispatcher::HeaderVec;
    use crate::ids::RequestId;

    /// Build a `ParsedRequest` without a socket. Header names should be
    /// lowercase, as `parse_request` produces them.
    pub fn parsed(method: &str, path: &str, headers: &[(&str, &str)]) -> ParsedRequest {
        ParsedRequest {
            request_id: RequestId::new(),
            method: method.to_string(),
            path: path.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (Arc::<str>::from(*k), (*v).to_string()))
                .collect::<HeaderVec>(),
            body: RequestBody::Empty,
        }
    }
}
