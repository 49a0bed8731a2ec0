use std::fmt;

use super::payload::PayloadError;

/// Failure of a single storage operation.
///
/// The variants exist for logging. At the HTTP boundary every variant is
/// reported the same way: a 500 carrying the `Display` text as `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The identifier is not a well-formed ObjectId.
    InvalidId {
        /// The identifier as received
        value: String,
    },
    /// The request body could not be coerced into a form.
    InvalidPayload(PayloadError),
    /// The store never connected, or its client could not be built.
    Unavailable(String),
    /// Any error reported by the database driver.
    Driver(String),
}

impl StoreError {
    /// Short machine-friendly tag used as a log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidId { .. } => "invalid_id",
            StoreError::InvalidPayload(_) => "invalid_payload",
            StoreError::Unavailable(_) => "unavailable",
            StoreError::Driver(_) => "driver",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidId { value } => write!(
                f,
                "Cast to ObjectId failed for value \"{value}\" at path \"_id\" for model \"Form\""
            ),
            StoreError::InvalidPayload(err) => write!(f, "Form validation failed: {err}"),
            StoreError::Unavailable(reason) => write!(f, "Database unavailable: {reason}"),
            StoreError::Driver(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::InvalidPayload(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PayloadError> for StoreError {
    fn from(err: PayloadError) -> Self {
        StoreError::InvalidPayload(err)
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Driver(err.to_string())
    }
}
