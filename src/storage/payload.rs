//! Conversion of request bodies into typed form payloads.
//!
//! Callers may send any JSON. The rules applied here:
//!
//! - the body must be an object; unknown keys (including `_id`) are ignored
//! - `name` and each field's `name`/`type` accept strings; numbers and
//!   booleans are coerced to their string form; `null` or missing means absent;
//!   arrays and objects are rejected
//! - `fields` accepts an array of objects, a single object (treated as a
//!   one-element array), or `null`/missing (empty); anything else is rejected

use serde_json::{Map, Value};
use std::fmt;

use super::model::Field;

/// Typed content of a create or replace request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormPayload {
    pub name: Option<String>,
    pub fields: Vec<Field>,
}

/// Reason a request body could not be coerced into a [`FormPayload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The body was valid JSON but not an object.
    NotAnObject,
    /// A string-typed path held a value that cannot be cast to a string.
    CastString {
        /// Dotted path of the offending value (e.g. `fields.0.type`)
        path: String,
        /// JSON type name of the value received
        found: &'static str,
    },
    /// `fields` held something other than an array of objects.
    CastFields {
        /// Dotted path of the offending value
        path: String,
        /// JSON type name of the value received
        found: &'static str,
    },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::NotAnObject => f.write_str("request body must be a JSON object"),
            PayloadError::CastString { path, found } => {
                write!(f, "{path}: Cast to string failed for value of type {found}")
            }
            PayloadError::CastFields { path, found } => {
                write!(f, "{path}: Cast to embedded failed for value of type {found}")
            }
        }
    }
}

impl std::error::Error for PayloadError {}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce_string(value: Option<&Value>, path: &str) -> Result<Option<String>, PayloadError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(PayloadError::CastString {
            path: path.to_string(),
            found: json_type(other),
        }),
    }
}

fn coerce_field(value: &Value, index: usize) -> Result<Field, PayloadError> {
    let obj = value.as_object().ok_or_else(|| PayloadError::CastFields {
        path: format!("fields.{index}"),
        found: json_type(value),
    })?;
    Ok(Field {
        name: coerce_string(obj.get("name"), &format!("fields.{index}.name"))?,
        field_type: coerce_string(obj.get("type"), &format!("fields.{index}.type"))?,
    })
}

fn coerce_fields(value: Option<&Value>) -> Result<Vec<Field>, PayloadError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| coerce_field(item, i))
            .collect(),
        Some(single @ Value::Object(_)) => Ok(vec![coerce_field(single, 0)?]),
        Some(other) => Err(PayloadError::CastFields {
            path: "fields".to_string(),
            found: json_type(other),
        }),
    }
}

impl FormPayload {
    /// Coerce an optional request body. An absent body counts as `{}`.
    pub fn from_json(body: Option<&Value>) -> Result<Self, PayloadError> {
        let empty = Map::new();
        let obj = match body {
            None => &empty,
            Some(Value::Object(obj)) => obj,
            Some(_) => return Err(PayloadError::NotAnObject),
        };
        Ok(Self {
            name: coerce_string(obj.get("name"), "name")?,
            fields: coerce_fields(obj.get("fields"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_body() {
        let body = json!({"name": "Contact", "fields": [{"name": "email", "type": "text"}]});
        let payload = FormPayload::from_json(Some(&body)).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Contact"));
        assert_eq!(payload.fields, vec![Field::new("email", "text")]);
    }

    #[test]
    fn test_unknown_keys_and_id_are_ignored() {
        let body = json!({
            "_id": "65f0c0ffee00000000000001",
            "name": "A",
            "owner": "bob",
            "fields": [{"name": "x", "type": "y", "required": true}]
        });
        let payload = FormPayload::from_json(Some(&body)).unwrap();
        assert_eq!(payload.name.as_deref(), Some("A"));
        assert_eq!(payload.fields, vec![Field::new("x", "y")]);
    }

    #[test]
    fn test_missing_body_is_empty_form() {
        let payload = FormPayload::from_json(None).unwrap();
        assert_eq!(payload, FormPayload::default());
    }

    #[test]
    fn test_scalars_are_coerced_to_strings() {
        let body = json!({"name": 42, "fields": [{"name": true, "type": 1.5}]});
        let payload = FormPayload::from_json(Some(&body)).unwrap();
        assert_eq!(payload.name.as_deref(), Some("42"));
        assert_eq!(payload.fields[0].name.as_deref(), Some("true"));
        assert_eq!(payload.fields[0].field_type.as_deref(), Some("1.5"));
    }

    #[test]
    fn test_field_order_is_preserved() {
        let body = json!({"fields": [
            {"name": "c", "type": "t"},
            {"name": "a", "type": "t"},
            {"name": "b", "type": "t"}
        ]});
        let names: Vec<_> = FormPayload::from_json(Some(&body))
            .unwrap()
            .fields
            .into_iter()
            .filter_map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_single_field_object_is_wrapped() {
        let body = json!({"fields": {"name": "only", "type": "text"}});
        let payload = FormPayload::from_json(Some(&body)).unwrap();
        assert_eq!(payload.fields, vec![Field::new("only", "text")]);
    }

    #[test]
    fn test_object_name_is_rejected() {
        let body = json!({"name": {"first": "x"}});
        let err = FormPayload::from_json(Some(&body)).unwrap_err();
        assert_eq!(
            err,
            PayloadError::CastString {
                path: "name".into(),
                found: "object"
            }
        );
    }

    #[test]
    fn test_non_object_field_entry_is_rejected() {
        let body = json!({"fields": ["email"]});
        let err = FormPayload::from_json(Some(&body)).unwrap_err();
        assert!(err.to_string().starts_with("fields.0"));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let body = json!([1, 2, 3]);
        assert_eq!(
            FormPayload::from_json(Some(&body)).unwrap_err(),
            PayloadError::NotAnObject
        );
    }
}
