//! Generic CRUD engine: one implementation, instantiated per entity type.
//!
//! The engine never pre-checks constraints. It hands typed rows to the store and classifies
//! whatever the store rejects; every write is one store transaction.

use crate::error::{CrudError, StoreError};
use crate::schema::Entity;
use crate::store::{Filter, MergeFn, Row, StoreHandle, Window};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// Acknowledgement returned by a successful delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub ok: bool,
}

pub struct Crud<E: Entity> {
    store: StoreHandle,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Crud<E> {
    fn clone(&self) -> Self {
        Crud::new(self.store.clone())
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Codec(format!("expected an object, got {}", other))),
    }
}

fn decode<E: Entity>(row: Row) -> Result<E, StoreError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

impl<E: Entity> Crud<E> {
    pub fn new(store: StoreHandle) -> Self {
        Crud {
            store,
            _entity: PhantomData,
        }
    }

    fn name() -> &'static str {
        E::def().name
    }

    fn fail(e: StoreError) -> CrudError {
        CrudError::from_store(Self::name(), e)
    }

    fn not_found(id: i64) -> CrudError {
        CrudError::NotFound {
            entity: Self::name(),
            id,
        }
    }

    fn decode_all(rows: Vec<Row>) -> Result<Vec<E>, CrudError> {
        rows.into_iter().map(|r| decode(r).map_err(Self::fail)).collect()
    }

    /// Up to `window.limit` rows after skipping `window.offset`, ordered by identity.
    pub async fn list(&self, window: Window) -> Result<Vec<E>, CrudError> {
        let rows = self
            .store
            .select(E::def(), None, window)
            .await
            .map_err(Self::fail)?;
        Self::decode_all(rows)
    }

    /// Every row whose value in any of `columns` equals `parent_id`, ordered by identity.
    pub async fn list_by(&self, columns: &[&'static str], parent_id: i64) -> Result<Vec<E>, CrudError> {
        let filter = Filter::any_of(columns, parent_id);
        let rows = self
            .store
            .select(E::def(), Some(&filter), Window::all())
            .await
            .map_err(Self::fail)?;
        Self::decode_all(rows)
    }

    pub async fn get(&self, id: i64) -> Result<E, CrudError> {
        let row = self
            .store
            .fetch(E::def(), id)
            .await
            .map_err(Self::fail)?
            .ok_or_else(|| Self::not_found(id))?;
        decode(row).map_err(Self::fail)
    }

    pub async fn create(&self, payload: E::Create) -> Result<E, CrudError> {
        let values = encode(&payload).map_err(Self::fail)?;
        let row = self
            .store
            .insert(E::def(), values)
            .await
            .map_err(Self::fail)?;
        let created: E = decode(row).map_err(Self::fail)?;
        tracing::debug!(entity = Self::name(), id = created.id(), "created");
        Ok(created)
    }

    /// Applies exactly the fields present in `patch` to the locked current row.
    pub async fn update(&self, id: i64, patch: E::Update) -> Result<E, CrudError> {
        let merge: MergeFn = Box::new(move |current: Row| {
            let mut entity: E = decode(current)?;
            entity.merge(patch);
            encode(&entity)
        });
        let row = self
            .store
            .update(E::def(), id, merge)
            .await
            .map_err(Self::fail)?
            .ok_or_else(|| Self::not_found(id))?;
        tracing::debug!(entity = Self::name(), id, "updated");
        decode(row).map_err(Self::fail)
    }

    pub async fn delete(&self, id: i64) -> Result<Deleted, CrudError> {
        let removed = self.store.delete(E::def(), id).await.map_err(Self::fail)?;
        if !removed {
            return Err(Self::not_found(id));
        }
        tracing::debug!(entity = Self::name(), id, "deleted");
        Ok(Deleted { ok: true })
    }
}
