//! Convert JSON row values into typed values sqlx can bind, using the column's declared type.

use crate::error::StoreError;
use crate::schema::{Column, ColumnType};
use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// A value that can be bound to a PostgreSQL query. Nulls keep their column type.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Bool(Option<bool>),
    Timestamp(Option<NaiveDateTime>),
}

impl PgBindValue {
    pub fn from_json(column: &Column, v: &Value) -> Result<Self, StoreError> {
        if v.is_null() {
            return Ok(Self::null(&column.ty));
        }
        let invalid = || {
            StoreError::Constraint(format!(
                "invalid input for column \"{}\" of type {}: {}",
                column.db_name(),
                column.ty.pg_type(),
                v
            ))
        };
        Ok(match column.ty {
            ColumnType::Integer => {
                let n = v.as_i64().and_then(|n| i32::try_from(n).ok()).ok_or_else(invalid)?;
                PgBindValue::Int(Some(n))
            }
            ColumnType::BigInt => PgBindValue::BigInt(Some(v.as_i64().ok_or_else(invalid)?)),
            ColumnType::Float => PgBindValue::Float(Some(v.as_f64().ok_or_else(invalid)?)),
            ColumnType::Text | ColumnType::Enum(_) => {
                PgBindValue::Text(Some(v.as_str().ok_or_else(invalid)?.to_string()))
            }
            ColumnType::Boolean => PgBindValue::Bool(Some(v.as_bool().ok_or_else(invalid)?)),
            ColumnType::Timestamp => {
                let ts: NaiveDateTime = serde_json::from_value(v.clone()).map_err(|_| invalid())?;
                PgBindValue::Timestamp(Some(ts))
            }
        })
    }

    fn null(ty: &ColumnType) -> Self {
        match ty {
            ColumnType::Integer => PgBindValue::Int(None),
            ColumnType::BigInt => PgBindValue::BigInt(None),
            ColumnType::Float => PgBindValue::Float(None),
            ColumnType::Text | ColumnType::Enum(_) => PgBindValue::Text(None),
            ColumnType::Boolean => PgBindValue::Bool(None),
            ColumnType::Timestamp => PgBindValue::Timestamp(None),
        }
    }

    pub fn bind<'q>(&self, query: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        match self {
            PgBindValue::Int(v) => query.bind(*v),
            PgBindValue::BigInt(v) => query.bind(*v),
            PgBindValue::Float(v) => query.bind(*v),
            PgBindValue::Text(v) => query.bind(v.clone()),
            PgBindValue::Bool(v) => query.bind(*v),
            PgBindValue::Timestamp(v) => query.bind(*v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{integer, text, timestamp};
    use serde_json::json;

    #[test]
    fn null_keeps_column_type() {
        let c = integer().named("capacity", true);
        assert_eq!(PgBindValue::from_json(&c, &Value::Null).unwrap(), PgBindValue::Int(None));
    }

    #[test]
    fn integer_out_of_range_is_rejected() {
        let c = integer().named("capacity", true);
        let err = PgBindValue::from_json(&c, &json!(5_000_000_000i64)).unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[test]
    fn wrong_json_type_is_rejected() {
        let c = text().named("name", false);
        assert!(PgBindValue::from_json(&c, &json!(12)).is_err());
    }

    #[test]
    fn timestamps_parse_from_iso_strings() {
        let c = timestamp().named("kickoff", false);
        let v = PgBindValue::from_json(&c, &json!("2026-06-11T18:00:00")).unwrap();
        let expected = NaiveDateTime::parse_from_str("2026-06-11 18:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(v, PgBindValue::Timestamp(Some(expected)));
    }
}
