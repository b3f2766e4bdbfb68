//! In-process store enforcing the catalog's constraints: NOT NULL, value domains, uniqueness,
//! foreign-key existence and CASCADE / RESTRICT / SET NULL on delete.
//!
//! A write works on a copy of every table and swaps it in only when the whole operation
//! succeeded, so a failed write leaves no trace.

use super::{Filter, MergeFn, Row, Store, Window};
use crate::error::StoreError;
use crate::schema::{dependents_of, Column, ColumnType, DeletePolicy, EntityDef, CATALOG, ID};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard};

#[derive(Clone, Default)]
struct Tables {
    rows: HashMap<&'static str, BTreeMap<i64, Row>>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    fn table(&self, name: &str) -> Option<&BTreeMap<i64, Row>> {
        self.rows.get(name)
    }

    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    catalog: &'static [&'static EntityDef],
    state: Arc<RwLock<Tables>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new(CATALOG)
    }
}

impl MemoryStore {
    pub fn new(catalog: &'static [&'static EntityDef]) -> Self {
        MemoryStore {
            catalog,
            state: Arc::new(RwLock::new(Tables::default())),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Runs `f` against a working copy; the copy replaces the live tables only on `Ok`.
    fn transact<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut live = self
            .state
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        let mut working = live.clone();
        let out = f(&mut working)?;
        *live = working;
        Ok(out)
    }

    fn select_rows(
        &self,
        def: &'static EntityDef,
        filter: Option<&Filter>,
        window: Window,
    ) -> Result<Vec<Row>, StoreError> {
        let columns = match filter {
            Some(f) => f
                .columns
                .iter()
                .map(|name| known_column(def, name))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let tables = self.read()?;
        let Some(table) = tables.table(def.table) else {
            return Ok(Vec::new());
        };
        let keep = |row: &Row| match filter {
            Some(f) => columns.iter().any(|c| row.get(c.name).and_then(Value::as_i64) == Some(f.value)),
            None => true,
        };
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = window
            .limit
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(table
            .values()
            .filter(|row| keep(row))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn insert_row(&self, def: &'static EntityDef, values: Row) -> Result<Row, StoreError> {
        self.transact(|tables| {
            let id = tables.next_id(def.table);
            let row = normalize(def, id, values);
            check_row(tables, def, id, &row)?;
            tables.rows.entry(def.table).or_default().insert(id, row.clone());
            Ok(row)
        })
    }

    fn update_row(&self, def: &'static EntityDef, id: i64, merge: MergeFn) -> Result<Option<Row>, StoreError> {
        self.transact(|tables| {
            let Some(current) = tables.table(def.table).and_then(|t| t.get(&id)).cloned() else {
                return Ok(None);
            };
            let row = normalize(def, id, merge(current)?);
            check_row(tables, def, id, &row)?;
            tables.rows.entry(def.table).or_default().insert(id, row.clone());
            Ok(Some(row))
        })
    }

    fn delete_row(&self, def: &'static EntityDef, id: i64) -> Result<bool, StoreError> {
        self.transact(|tables| self.delete_cascading(tables, def, id))
    }

    /// Removes the row, then applies each dependent's policy. Any RESTRICT hit fails the whole delete.
    fn delete_cascading(&self, tables: &mut Tables, def: &'static EntityDef, id: i64) -> Result<bool, StoreError> {
        let removed = tables.rows.get_mut(def.table).and_then(|t| t.remove(&id));
        if removed.is_none() {
            return Ok(false);
        }
        for dep in dependents_of(self.catalog, def.table) {
            let child_ids: Vec<i64> = tables
                .table(dep.entity.table)
                .map(|t| {
                    t.iter()
                        .filter(|(_, row)| row.get(dep.column.name).and_then(Value::as_i64) == Some(id))
                        .map(|(child_id, _)| *child_id)
                        .collect()
                })
                .unwrap_or_default();
            if child_ids.is_empty() {
                continue;
            }
            match dep.on_delete {
                DeletePolicy::Restrict => {
                    return Err(StoreError::Constraint(format!(
                        "update or delete on table \"{}\" violates foreign key constraint \"{}\" on table \"{}\"",
                        def.table,
                        fkey_name(dep.entity, dep.column),
                        dep.entity.table
                    )));
                }
                DeletePolicy::Cascade => {
                    for child_id in child_ids {
                        self.delete_cascading(tables, dep.entity, child_id)?;
                    }
                }
                DeletePolicy::SetNull => {
                    if let Some(t) = tables.rows.get_mut(dep.entity.table) {
                        for child_id in child_ids {
                            if let Some(row) = t.get_mut(&child_id) {
                                row.insert(dep.column.name.to_string(), Value::Null);
                            }
                        }
                    }
                }
            }
        }
        Ok(true)
    }
}

fn known_column(def: &'static EntityDef, name: &str) -> Result<&'static Column, StoreError> {
    def.column(name).ok_or_else(|| StoreError::UnknownColumn {
        table: def.table,
        column: name.to_string(),
    })
}

/// Keeps exactly the catalog's columns (missing ones become null) and pins the identity.
fn normalize(def: &EntityDef, id: i64, mut values: Row) -> Row {
    let mut row = Row::new();
    row.insert(ID.to_string(), Value::from(id));
    for c in def.columns {
        let v = values.remove(c.name).unwrap_or(Value::Null);
        row.insert(c.name.to_string(), v);
    }
    row
}

fn fkey_name(def: &EntityDef, column: &Column) -> String {
    format!("{}_{}_fkey", def.table, column.db_name())
}

fn fits(ty: &ColumnType, v: &Value) -> bool {
    match ty {
        ColumnType::Integer => v.as_i64().map(|n| i32::try_from(n).is_ok()).unwrap_or(false),
        ColumnType::BigInt => v.as_i64().is_some(),
        ColumnType::Float => v.is_number(),
        ColumnType::Text => v.is_string(),
        ColumnType::Boolean => v.is_boolean(),
        ColumnType::Timestamp => serde_json::from_value::<NaiveDateTime>(v.clone()).is_ok(),
        ColumnType::Enum(e) => v.as_str().map(|s| e.contains(s)).unwrap_or(false),
    }
}

/// Column-level checks in declaration order, mirroring what PostgreSQL enforces.
fn check_row(tables: &Tables, def: &EntityDef, id: i64, row: &Row) -> Result<(), StoreError> {
    for c in def.columns {
        let v = row.get(c.name).unwrap_or(&Value::Null);
        if v.is_null() {
            if !c.nullable {
                return Err(StoreError::Constraint(format!(
                    "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                    c.db_name(),
                    def.table
                )));
            }
            continue;
        }
        if !fits(&c.ty, v) {
            return Err(StoreError::Constraint(format!(
                "invalid input for column \"{}\" of type {}: {}",
                c.db_name(),
                c.ty.pg_type(),
                v
            )));
        }
        if c.unique {
            let taken = tables
                .table(def.table)
                .map(|t| t.iter().any(|(other, r)| *other != id && r.get(c.name) == Some(v)))
                .unwrap_or(false);
            if taken {
                return Err(StoreError::Constraint(format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\" (Key ({})=({}) already exists.)",
                    def.table,
                    c.db_name(),
                    c.db_name(),
                    display(v)
                )));
            }
        }
        if let Some(fk) = c.references {
            let target_id = v.as_i64();
            let exists = target_id
                .map(|tid| tables.table(fk.target).map(|t| t.contains_key(&tid)).unwrap_or(false))
                .unwrap_or(false);
            if !exists {
                return Err(StoreError::Constraint(format!(
                    "insert or update on table \"{}\" violates foreign key constraint \"{}\" (Key ({})=({}) is not present in table \"{}\".)",
                    def.table,
                    fkey_name(def, c),
                    c.db_name(),
                    display(v),
                    fk.target
                )));
            }
        }
    }
    Ok(())
}

fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(
        &self,
        def: &'static EntityDef,
        filter: Option<&Filter>,
        window: Window,
    ) -> Result<Vec<Row>, StoreError> {
        self.select_rows(def, filter, window)
    }

    async fn fetch(&self, def: &'static EntityDef, id: i64) -> Result<Option<Row>, StoreError> {
        let tables = self.read()?;
        Ok(tables.table(def.table).and_then(|t| t.get(&id)).cloned())
    }

    async fn insert(&self, def: &'static EntityDef, values: Row) -> Result<Row, StoreError> {
        self.insert_row(def, values)
    }

    async fn update(
        &self,
        def: &'static EntityDef,
        id: i64,
        merge: MergeFn,
    ) -> Result<Option<Row>, StoreError> {
        self.update_row(def, id, merge)
    }

    async fn delete(&self, def: &'static EntityDef, id: i64) -> Result<bool, StoreError> {
        self.delete_row(def, id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}
