use may_minihttp::Response;
use serde_json::Value;

use super::headers::HeaderLines;
use crate::dispatcher::HandlerResponse;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Serialize a [`HandlerResponse`] onto the wire.
///
/// Header lines are stored in `lines`, which must stay untouched until `res`
/// has been encoded. A 204 or a `Null` body is written without content;
/// anything else is JSON.
pub fn write_handler_response(
    res: &mut Response,
    hr: &HandlerResponse,
    lines: &mut HeaderLines,
) {
    res.status_code(hr.status as usize, status_reason(hr.status));
    lines.clear();
    for (name, value) in &hr.headers {
        if let Some(line) = lines.push(name, value) {
            // SAFETY: the line is a heap allocation owned by `lines`, which
            // the caller keeps alive and unmodified until `res` is encoded.
            // may_minihttp encodes the response right after
            // `HttpService::call` returns, before the next call on the same
            // service clone and before the clone is dropped. Moving the
            // `Box<str>` inside the vector does not move its bytes.
            let line: &'static str = unsafe { &*(line as *const str) };
            res.header(line);
        }
    }
    if hr.status == 204 || hr.body == Value::Null {
        return;
    }
    res.header("Content-Type: application/json");
    res.body_vec(serde_json::to_vec(&hr.body).unwrap_or_default());
}
