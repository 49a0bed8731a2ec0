use may_minihttp::Request;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dispatcher::HeaderVec;
use crate::ids::RequestId;

/// Outcome of reading the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body, or a body in a non-JSON content type
    #[default]
    Empty,
    Json(Value),
    /// A JSON body that failed to parse; holds the parser message
    Malformed(String),
}

impl RequestBody {
    /// Classify a raw body according to its content type.
    ///
    /// Bodies are parsed as JSON when the content type mentions `json` or is
    /// missing; other content types are ignored, leaving the body empty.
    #[must_use]
    pub fn from_raw(raw: &str, content_type: Option<&str>) -> Self {
        if raw.trim().is_empty() {
            return RequestBody::Empty;
        }
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(true);
        if !is_json {
            return RequestBody::Empty;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => RequestBody::Json(value),
            Err(e) => RequestBody::Malformed(e.to_string()),
        }
    }
}

/// Parsed HTTP request data used by `AppService` and the middleware chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub request_id: RequestId,
    /// HTTP method exactly as sent
    pub method: String,
    /// Request path without query string
    pub path: String,
    /// Headers with lowercase names
    pub headers: HeaderVec,
    pub body: RequestBody,
}

impl ParsedRequest {
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

/// Strip the query string from a request target.
#[must_use]
pub fn split_path(raw_path: &str) -> &str {
    raw_path.split('?').next().unwrap_or("/")
}

/// Extract everything the service needs from a `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let path = split_path(req.path()).to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase().as_str()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let request_id = RequestId::from_header_or_new(
        headers
            .iter()
            .find(|(k, _)| k.as_ref() == "x-request-id")
            .map(|(_, v)| v.as_str()),
    );

    debug!(
        request_id = %request_id,
        header_count = headers.len(),
        "Headers extracted"
    );

    let body = {
        let mut raw = String::new();
        match req.body().read_to_string(&mut raw) {
            Ok(size) if size > 0 => {
                let content_type = headers
                    .iter()
                    .find(|(k, _)| k.as_ref() == "content-type")
                    .map(|(_, v)| v.as_str());
                debug!(
                    request_id = %request_id,
                    body_size_bytes = size,
                    content_type = ?content_type,
                    "Request body read"
                );
                RequestBody::from_raw(&raw, content_type)
            }
            Ok(_) => RequestBody::Empty,
            Err(e) => RequestBody::Malformed(e.to_string()),
        }
    };

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "HTTP request parsed"
    );

    ParsedRequest {
        request_id,
        method,
        path,
        headers,
        body,
    }
}
