use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::error::StoreError;

/// Storage-assigned identifier of a [`Form`].
///
/// Backed by a 12-byte ObjectId and rendered on the wire as 24 lowercase hex
/// characters. Both stores generate and parse identifiers through this type,
/// so a malformed identifier fails the same way regardless of the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(ObjectId);

impl FormId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for FormId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl FromStr for FormId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(FormId)
            .map_err(|_| StoreError::InvalidId {
                value: s.to_string(),
            })
    }
}

impl Serialize for FormId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for FormId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<FormId>()
            .map_err(|_| serde::de::Error::custom("invalid form id"))
    }
}

/// One input element of a form. Has no identity of its own.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            field_type: Some(field_type.into()),
        }
    }
}

/// A stored form as returned to API callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    #[serde(rename = "_id")]
    pub id: FormId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}
