//! Entity schema: the closed catalog of entity definitions, columns, enumerations,
//! foreign keys and delete policies. Purely declarative; the CRUD engine and the stores read it.

#[macro_use]
mod macros;
mod catalog;
mod entities;
mod enums;
pub mod patch;
mod validator;

pub use catalog::*;
pub use entities::*;
pub use enums::*;
pub use validator::validate;

use crate::case::to_snake_case;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// What happens to dependent rows when the referenced row is deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Dependents are deleted with the parent.
    Cascade,
    /// The delete is rejected while dependents exist.
    Restrict,
    /// The (nullable) reference is cleared.
    SetNull,
}

impl DeletePolicy {
    pub fn sql(&self) -> &'static str {
        match self {
            DeletePolicy::Cascade => "CASCADE",
            DeletePolicy::Restrict => "RESTRICT",
            DeletePolicy::SetNull => "SET NULL",
        }
    }
}

/// Closed value set of an enumerated column. `name` is the PostgreSQL type name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumDef {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

impl EnumDef {
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Float,
    Text,
    Boolean,
    /// Zone-less date-time.
    Timestamp,
    Enum(&'static EnumDef),
}

impl ColumnType {
    /// PostgreSQL type used in DDL and parameter casts.
    pub fn pg_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Enum(e) => e.name,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    /// Table name of the referenced entity.
    pub target: &'static str,
    pub on_delete: DeletePolicy,
}

/// One column of an entity. `name` is the wire name; see [`Column::db_name`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub references: Option<ForeignKey>,
}

impl Column {
    const fn of(ty: ColumnType) -> Self {
        Column {
            name: "",
            ty,
            nullable: false,
            unique: false,
            references: None,
        }
    }

    pub const fn named(self, name: &'static str, nullable: bool) -> Self {
        Column {
            name,
            nullable,
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Column {
            unique: true,
            ..self
        }
    }

    /// PostgreSQL column name.
    pub fn db_name(&self) -> String {
        to_snake_case(self.name)
    }
}

pub const fn integer() -> Column {
    Column::of(ColumnType::Integer)
}

pub const fn float() -> Column {
    Column::of(ColumnType::Float)
}

pub const fn text() -> Column {
    Column::of(ColumnType::Text)
}

pub const fn boolean() -> Column {
    Column::of(ColumnType::Boolean)
}

pub const fn timestamp() -> Column {
    Column::of(ColumnType::Timestamp)
}

pub const fn enumeration(def: &'static EnumDef) -> Column {
    Column::of(ColumnType::Enum(def))
}

/// Foreign-key column holding the identity of a row in `target`.
pub const fn references(target: &'static str, on_delete: DeletePolicy) -> Column {
    Column {
        references: Some(ForeignKey { target, on_delete }),
        ..Column::of(ColumnType::BigInt)
    }
}

/// Identity column name shared by every entity.
pub const ID: &str = "id";

#[derive(Debug, PartialEq, Eq)]
pub struct EntityDef {
    /// Type name used in messages, e.g. "City".
    pub name: &'static str,
    /// Table name; also the HTTP path segment.
    pub table: &'static str,
    /// Every column except the identity.
    pub columns: &'static [Column],
}

impl EntityDef {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns of this entity that reference `table`.
    pub fn references_to<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'static Column> + 'a {
        self.columns
            .iter()
            .filter(move |c| c.references.map(|fk| fk.target == table).unwrap_or(false))
    }

    pub fn unique_columns(&self) -> impl Iterator<Item = &'static Column> {
        self.columns.iter().filter(|c| c.unique)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static Column, ForeignKey)> {
        self.columns.iter().filter_map(|c| c.references.map(|fk| (c, fk)))
    }
}

/// A typed entity: its row type, creation payload, update payload and catalog definition.
///
/// The update payload carries only the fields a caller wants to change; [`Entity::merge`]
/// applies exactly those fields to a stored row.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Create: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Update: DeserializeOwned + Default + Send + Sync + 'static;

    fn def() -> &'static EntityDef;

    fn id(&self) -> i64;

    fn merge(&mut self, patch: Self::Update);
}
