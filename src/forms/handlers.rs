use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::storage::{FormPayload, FormStore, StoreError};

pub const SUBMITTED: &str = "Form submitted successfully";
pub const UPDATED: &str = "Form updated successfully";
pub const DELETED: &str = "Form deleted successfully";

pub const SUBMIT_FAILED: &str = "Failed to submit form";
pub const LIST_FAILED: &str = "Failed to get forms";
pub const UPDATE_FAILED: &str = "Failed to update form";
pub const DELETE_FAILED: &str = "Failed to delete form";

/// The four form handlers, sharing one store.
#[derive(Clone)]
pub struct FormHandlers {
    store: Arc<dyn FormStore>,
}

impl FormHandlers {
    pub fn new(store: Arc<dyn FormStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, req: HandlerRequest) -> HandlerResponse {
        let result = FormPayload::from_json(req.body.as_ref())
            .map_err(StoreError::from)
            .and_then(|payload| self.store.create(payload));
        match result {
            Ok(form) => {
                info!(request_id = %req.request_id, form_id = %form.id, "Form created");
                HandlerResponse::json(200, json!({ "message": SUBMITTED, "form": form }))
            }
            Err(err) => failure(&req, SUBMIT_FAILED, &err),
        }
    }

    pub fn list(&self, req: HandlerRequest) -> HandlerResponse {
        match self.store.list_all() {
            Ok(forms) => {
                info!(request_id = %req.request_id, count = forms.len(), "Forms listed");
                HandlerResponse::json(200, json!(forms))
            }
            Err(err) => failure(&req, LIST_FAILED, &err),
        }
    }

    pub fn update(&self, req: HandlerRequest) -> HandlerResponse {
        let id = path_id(&req);
        let result = FormPayload::from_json(req.body.as_ref())
            .map_err(StoreError::from)
            .and_then(|payload| self.store.replace(&id, payload));
        match result {
            Ok(form) => {
                info!(
                    request_id = %req.request_id,
                    form_id = %id,
                    matched = form.is_some(),
                    "Form replaced"
                );
                HandlerResponse::json(200, json!({ "message": UPDATED, "form": form }))
            }
            Err(err) => failure(&req, UPDATE_FAILED, &err),
        }
    }

    pub fn delete(&self, req: HandlerRequest) -> HandlerResponse {
        let id = path_id(&req);
        match self.store.delete(&id) {
            Ok(()) => {
                info!(request_id = %req.request_id, form_id = %id, "Form deleted");
                HandlerResponse::json(200, json!({ "message": DELETED }))
            }
            Err(err) => failure(&req, DELETE_FAILED, &err),
        }
    }
}

/// The percent-decoded `:id` segment. An undecodable segment is passed through
/// raw and rejected by the store as a malformed identifier.
fn path_id(req: &HandlerRequest) -> String {
    let raw = req.get_path_param("id").unwrap_or_default();
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn failure(req: &HandlerRequest, label: &str, err: &StoreError) -> HandlerResponse {
    warn!(
        request_id = %req.request_id,
        handler_name = %req.handler_name,
        error_kind = err.kind(),
        error = %err,
        "{label}"
    );
    HandlerResponse::json(500, json!({ "error": label, "message": err.to_string() }))
}
