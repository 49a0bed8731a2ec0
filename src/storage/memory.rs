use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::{Form, FormId, FormPayload, FormStore, StoreError};

/// In-process store keeping forms in insertion order.
#[derive(Debug, Default)]
pub struct MemoryFormStore {
    forms: RwLock<Vec<Form>>,
}

impl MemoryFormStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Form>>, StoreError> {
        self.forms
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Form>>, StoreError> {
        self.forms
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl FormStore for MemoryFormStore {
    fn create(&self, payload: FormPayload) -> Result<Form, StoreError> {
        let form = Form {
            id: FormId::generate(),
            name: payload.name,
            fields: payload.fields,
        };
        self.write()?.push(form.clone());
        debug!(form_id = %form.id, "Form inserted into memory store");
        Ok(form)
    }

    fn list_all(&self) -> Result<Vec<Form>, StoreError> {
        Ok(self.read()?.clone())
    }

    fn replace(&self, id: &str, payload: FormPayload) -> Result<Option<Form>, StoreError> {
        let id: FormId = id.parse()?;
        let mut forms = self.write()?;
        Ok(forms.iter_mut().find(|f| f.id == id).map(|form| {
            form.name = payload.name;
            form.fields = payload.fields;
            form.clone()
        }))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id: FormId = id.parse()?;
        self.write()?.retain(|f| f.id != id);
        Ok(())
    }
}
