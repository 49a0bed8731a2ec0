//! # Storage Module
//!
//! Persistence for the single `Form` resource.
//!
//! ## Overview
//!
//! [`FormStore`] is the seam between the HTTP layer and the database. Handlers
//! hold an `Arc<dyn FormStore>` and make exactly one call per request. Two
//! implementations are provided:
//!
//! - [`MongoFormStore`] - MongoDB via the official driver's blocking API
//! - [`MemoryFormStore`] - process-local vector, for development and tests
//!
//! [`PooledStore`] wraps either one and runs its calls on dedicated threads,
//! so blocking driver I/O never holds a coroutine worker.
//!
//! ## Failure Semantics
//!
//! Every failure (malformed identifier, rejected payload, lost connection,
//! driver error) is a [`StoreError`]. Nothing is retried; the caller decides
//! how to report it.
//!
//! ## Example
//!
//! ```rust
//! use form_builder::storage::{FormPayload, FormStore, MemoryFormStore};
//!
//! let store = MemoryFormStore::new();
//! let form = store.create(FormPayload::default()).unwrap();
//! assert_eq!(store.list_all().unwrap(), vec![form]);
//! ```

mod error;
mod memory;
mod model;
mod mongo;
mod payload;
mod pool;

pub use error::StoreError;
pub use memory::MemoryFormStore;
pub use model::{Field, Form, FormId};
pub use mongo::{MongoFormStore, DEFAULT_DATABASE, FORMS_COLLECTION};
pub use payload::{FormPayload, PayloadError};
pub use pool::{PooledStore, DEFAULT_STORE_THREADS};

/// The four persistence operations over the form collection.
///
/// Implementations must be safe to share between connection coroutines.
pub trait FormStore: Send + Sync {
    /// Insert a new form with a freshly generated identifier.
    fn create(&self, payload: FormPayload) -> Result<Form, StoreError>;

    /// Every stored form, in storage-native order.
    fn list_all(&self) -> Result<Vec<Form>, StoreError>;

    /// Overwrite the form's content, keeping its identifier.
    ///
    /// Returns `Ok(None)` when no form has this identifier.
    fn replace(&self, id: &str, payload: FormPayload) -> Result<Option<Form>, StoreError>;

    /// Remove the form. Succeeds when nothing matched.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}
