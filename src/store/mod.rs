//! Persistence stores behind one object-safe trait.
//!
//! Rows travel as JSON objects keyed by wire names. Each write runs in its own transaction
//! and is either committed whole or rolled back before the error is returned.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::StoreError;
use crate::schema::EntityDef;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub type Row = Map<String, Value>;

/// Computes the new row from the locked current row inside an update transaction.
pub type MergeFn = Box<dyn FnOnce(Row) -> Result<Row, StoreError> + Send>;

/// Shared handle passed to the engine and the HTTP state.
pub type StoreHandle = Arc<dyn Store>;

/// Offset/limit window over a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Window {
    pub const DEFAULT_LIMIT: u64 = 100;
    /// Largest offset or limit PostgreSQL accepts (a signed 64-bit count).
    pub const MAX: u64 = i64::MAX as u64;

    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Window {
            offset: offset.unwrap_or(0).min(Self::MAX),
            limit: Some(limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX)),
        }
    }

    /// No offset, no limit.
    pub fn all() -> Self {
        Window {
            offset: 0,
            limit: None,
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::new(None, None)
    }
}

/// Rows whose value in any of `columns` equals `value` (foreign-key lookups).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub columns: Vec<&'static str>,
    pub value: i64,
}

impl Filter {
    pub fn eq(column: &'static str, value: i64) -> Self {
        Filter {
            columns: vec![column],
            value,
        }
    }

    pub fn any_of(columns: &[&'static str], value: i64) -> Self {
        Filter {
            columns: columns.to_vec(),
            value,
        }
    }
}

/// The store is the authority on uniqueness and foreign keys; it reports rejected writes as
/// [`StoreError::Constraint`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Rows ordered by identity.
    async fn select(
        &self,
        def: &'static EntityDef,
        filter: Option<&Filter>,
        window: Window,
    ) -> Result<Vec<Row>, StoreError>;

    async fn fetch(&self, def: &'static EntityDef, id: i64) -> Result<Option<Row>, StoreError>;

    /// Inserts a row and returns it with its assigned identity.
    async fn insert(&self, def: &'static EntityDef, values: Row) -> Result<Row, StoreError>;

    /// Locks the row, applies `merge`, writes every column back. `None` when the row is absent.
    async fn update(
        &self,
        def: &'static EntityDef,
        id: i64,
        merge: MergeFn,
    ) -> Result<Option<Row>, StoreError>;

    /// Deletes the row, applying each dependent's delete policy. `false` when the row is absent.
    async fn delete(&self, def: &'static EntityDef, id: i64) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
