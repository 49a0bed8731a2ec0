use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::sync::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use std::thread;
use tracing::{debug, error, info, warn};

use super::{Field, Form, FormId, FormPayload, FormStore, StoreError};

/// Database name used when none is configured.
pub const DEFAULT_DATABASE: &str = "FORM_BUILDER";

/// Collection holding one document per form.
pub const FORMS_COLLECTION: &str = "forms";

/// BSON shape of a stored form. `_id` stays a native ObjectId in the database.
#[derive(Debug, Serialize, Deserialize)]
struct FormDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: Vec<Field>,
}

impl FormDocument {
    fn new(id: ObjectId, payload: FormPayload) -> Self {
        Self {
            id,
            name: payload.name,
            fields: payload.fields,
        }
    }
}

impl From<FormDocument> for Form {
    fn from(doc: FormDocument) -> Self {
        Form {
            id: FormId::from(doc.id),
            name: doc.name,
            fields: doc.fields,
        }
    }
}

enum Connection {
    Ready(Collection<FormDocument>),
    Unavailable(String),
}

/// MongoDB-backed [`FormStore`].
///
/// Construction never fails. When the client cannot be built the store is
/// kept in an unavailable state and every operation reports the reason, so
/// the HTTP surface stays up and answers 500 until the process is restarted
/// with a working configuration.
pub struct MongoFormStore {
    connection: Connection,
}

impl MongoFormStore {
    /// Build the client for `uri`, select `database`, and verify connectivity
    /// in the background.
    ///
    /// The driver connects lazily and pools connections; the background ping
    /// only reports whether the server is reachable.
    pub fn connect(uri: &str, database: &str) -> Self {
        match Client::with_uri_str(uri) {
            Ok(client) => {
                let db = client.database(database);
                spawn_connectivity_check(db.clone());
                info!(database = %database, collection = FORMS_COLLECTION, "MongoDB client created");
                Self {
                    connection: Connection::Ready(db.collection::<FormDocument>(FORMS_COLLECTION)),
                }
            }
            Err(e) => {
                error!(error = %e, "MongoDB connection error");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// A store whose every operation fails with `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            connection: Connection::Unavailable(reason.into()),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.connection, Connection::Ready(_))
    }

    fn collection(&self) -> Result<&Collection<FormDocument>, StoreError> {
        match &self.connection {
            Connection::Ready(coll) => Ok(coll),
            Connection::Unavailable(reason) => Err(StoreError::Unavailable(reason.clone())),
        }
    }
}

fn spawn_connectivity_check(db: Database) {
    let spawned = thread::Builder::new()
        .name("mongo-ping".into())
        .spawn(move || match db.run_command(doc! { "ping": 1 }).run() {
            Ok(_) => info!(database = %db.name(), "MongoDB is connected"),
            Err(e) => error!(database = %db.name(), error = %e, "MongoDB connection error"),
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Could not start MongoDB connectivity check");
    }
}

impl FormStore for MongoFormStore {
    fn create(&self, payload: FormPayload) -> Result<Form, StoreError> {
        let coll = self.collection()?;
        let document = FormDocument::new(ObjectId::new(), payload);
        coll.insert_one(&document).run()?;
        debug!(form_id = %document.id.to_hex(), "Form document inserted");
        Ok(document.into())
    }

    fn list_all(&self) -> Result<Vec<Form>, StoreError> {
        let coll = self.collection()?;
        let cursor = coll.find(doc! {}).run()?;
        cursor
            .map(|doc| doc.map(Form::from).map_err(StoreError::from))
            .collect()
    }

    fn replace(&self, id: &str, payload: FormPayload) -> Result<Option<Form>, StoreError> {
        let coll = self.collection()?;
        let id: FormId = id.parse()?;
        let oid = id.object_id();
        let replacement = FormDocument::new(oid, payload);
        let updated = coll
            .find_one_and_replace(doc! { "_id": oid }, &replacement)
            .return_document(ReturnDocument::After)
            .run()?;
        Ok(updated.map(Form::from))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let coll = self.collection()?;
        let id: FormId = id.parse()?;
        let result = coll.delete_one(doc! { "_id": id.object_id() }).run()?;
        debug!(form_id = %id, deleted = result.deleted_count, "Form delete executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_store_fails_every_operation() {
        let store = MongoFormStore::unavailable("MONGO_URL is not set");
        assert!(!store.is_available());
        let id = FormId::generate().to_string();

        let expect_unavailable = |err: StoreError| {
            assert_eq!(err, StoreError::Unavailable("MONGO_URL is not set".into()));
        };
        expect_unavailable(store.create(FormPayload::default()).unwrap_err());
        expect_unavailable(store.list_all().unwrap_err());
        expect_unavailable(store.replace(&id, FormPayload::default()).unwrap_err());
        expect_unavailable(store.delete(&id).unwrap_err());
    }

    #[test]
    fn test_unparsable_uri_yields_unavailable_store() {
        let store = MongoFormStore::connect("not a mongodb uri", DEFAULT_DATABASE);
        assert!(!store.is_available());
        assert!(matches!(store.list_all(), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_document_converts_to_form() {
        let oid = ObjectId::new();
        let doc = FormDocument::new(
            oid,
            FormPayload {
                name: Some("Survey".into()),
                fields: vec![Field::new("age", "number")],
            },
        );
        let form = Form::from(doc);
        assert_eq!(form.id.object_id(), oid);
        assert_eq!(form.name.as_deref(), Some("Survey"));
        assert_eq!(form.fields.len(), 1);
    }
}
