//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from an entity definition.

use super::params::PgBindValue;
use crate::error::StoreError;
use crate::schema::{Column, ColumnType, EntityDef, ID};
use crate::store::{Filter, Row, Window};
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from the catalog).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// Placeholder for a column value; enum columns need an explicit cast from text.
fn placeholder(column: &Column, n: u32) -> String {
    match column.ty {
        ColumnType::Enum(e) => format!("${}::{}", n, quoted(e.name)),
        _ => format!("${}", n),
    }
}

/// SELECT list: id first, then each column; enum columns as text so they decode as String.
fn select_column_list(entity: &EntityDef) -> String {
    std::iter::once(quoted(ID))
        .chain(entity.columns.iter().map(|c| {
            let q = quoted(&c.db_name());
            match c.ty {
                ColumnType::Enum(_) => format!("{}::text AS {}", q, q),
                _ => q,
            }
        }))
        .collect::<Vec<_>>()
        .join(", ")
}

fn filter_column(entity: &'static EntityDef, name: &str) -> Result<&'static Column, StoreError> {
    entity.column(name).ok_or_else(|| StoreError::UnknownColumn {
        table: entity.table,
        column: name.to_string(),
    })
}

/// SELECT list with an optional any-of foreign-key filter, ORDER BY id, optional LIMIT/OFFSET.
pub fn select_list(
    entity: &'static EntityDef,
    filter: Option<&Filter>,
    window: Window,
) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let table = quoted(entity.table);

    let where_clause = match filter {
        Some(f) if !f.columns.is_empty() => {
            let n = q.push_param(PgBindValue::BigInt(Some(f.value)));
            let parts = f
                .columns
                .iter()
                .map(|name| filter_column(entity, name).map(|c| format!("{} = ${}", quoted(&c.db_name()), n)))
                .collect::<Result<Vec<_>, _>>()?;
            format!(" WHERE {}", parts.join(" OR "))
        }
        Some(_) => " WHERE FALSE".to_string(),
        None => String::new(),
    };
    let order_clause = format!(" ORDER BY {}", quoted(ID));
    let limit_clause = window
        .limit
        .map(|n| format!(" LIMIT {}", n.min(Window::MAX)))
        .unwrap_or_default();
    let offset_clause = if window.offset > 0 {
        format!(" OFFSET {}", window.offset.min(Window::MAX))
    } else {
        String::new()
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}{}",
        select_column_list(entity),
        table,
        where_clause,
        order_clause,
        limit_clause,
        offset_clause
    );
    Ok(q)
}

/// SELECT by primary key; `for_update` locks the row for the rest of the transaction.
pub fn select_by_id(entity: &EntityDef, id: i64, for_update: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::BigInt(Some(id)));
    let lock = if for_update { " FOR UPDATE" } else { "" };
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}{}",
        select_column_list(entity),
        quoted(entity.table),
        quoted(ID),
        n,
        lock
    );
    q
}

/// INSERT every column from `row` (missing keys bind NULL); the store assigns the id.
pub fn insert(entity: &EntityDef, row: &Row) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(entity.columns.len());
    let mut placeholders = Vec::with_capacity(entity.columns.len());
    for c in entity.columns {
        let val = row.get(c.name).unwrap_or(&Value::Null);
        let n = q.push_param(PgBindValue::from_json(c, val)?);
        cols.push(quoted(&c.db_name()));
        placeholders.push(placeholder(c, n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(entity.table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(entity)
    );
    Ok(q)
}

/// UPDATE by id: SET every column from the merged `row`.
pub fn update(entity: &EntityDef, id: i64, row: &Row) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(entity.columns.len());
    for c in entity.columns {
        let val = row.get(c.name).unwrap_or(&Value::Null);
        let n = q.push_param(PgBindValue::from_json(c, val)?);
        sets.push(format!("{} = {}", quoted(&c.db_name()), placeholder(c, n)));
    }
    let id_param = q.push_param(PgBindValue::BigInt(Some(id)));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(entity.table),
        sets.join(", "),
        quoted(ID),
        id_param,
        select_column_list(entity)
    );
    Ok(q)
}

/// DELETE by id. Dependent rows follow the foreign keys' ON DELETE clauses.
pub fn delete(entity: &EntityDef, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::BigInt(Some(id)));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        quoted(entity.table),
        quoted(ID),
        n,
        quoted(ID)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CITY, MATCH, STAGE};
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn select_list_orders_and_windows() {
        let q = select_list(&CITY, None, Window::new(Some(10), Some(5))).unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"country_code\", \"slug\", \"tz\", \"airport_codes\", \"lat\", \"lng\" \
             FROM \"cities\" ORDER BY \"id\" LIMIT 5 OFFSET 10"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn oversized_window_stays_in_bigint_range() {
        let raw = Window {
            offset: u64::MAX,
            limit: Some(u64::MAX),
        };
        let q = select_list(&CITY, None, raw).unwrap();
        assert!(q.sql.ends_with(" LIMIT 9223372036854775807 OFFSET 9223372036854775807"));
    }

    #[test]
    fn enum_columns_are_read_as_text() {
        let q = select_by_id(&STAGE, 4, false);
        assert!(q.sql.contains("\"type\"::text AS \"type\""));
        assert_eq!(q.params, vec![PgBindValue::BigInt(Some(4))]);
    }

    #[test]
    fn any_of_filter_shares_one_parameter() {
        let f = Filter::any_of(&["home_team_id", "away_team_id"], 8);
        let q = select_list(&MATCH, Some(&f), Window::all()).unwrap();
        assert!(q
            .sql
            .ends_with("WHERE \"home_team_id\" = $1 OR \"away_team_id\" = $1 ORDER BY \"id\""));
        assert_eq!(q.params, vec![PgBindValue::BigInt(Some(8))]);
    }

    #[test]
    fn unknown_filter_column_is_an_error() {
        let f = Filter::eq("team_id", 1);
        let err = select_list(&CITY, Some(&f), Window::all()).err().unwrap();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }

    #[test]
    fn insert_binds_every_column_and_casts_enums() {
        let r = row(json!({"name": "Group A", "type": "GROUP", "season_id": 2}));
        let q = insert(&STAGE, &r).unwrap();
        assert_eq!(
            q.sql,
            "INSERT INTO \"stages\" (\"name\", \"type\", \"sort_order\", \"season_id\") \
             VALUES ($1, $2::\"stage_type\", $3, $4) \
             RETURNING \"id\", \"name\", \"type\"::text AS \"type\", \"sort_order\", \"season_id\""
        );
        assert_eq!(q.params[2], PgBindValue::Int(None));
    }

    #[test]
    fn update_sets_every_column_then_id() {
        let r = row(json!({"name": "Paris", "countryCode": "FR", "slug": "paris"}));
        let q = update(&CITY, 3, &r).unwrap();
        assert!(q.sql.starts_with("UPDATE \"cities\" SET \"name\" = $1, \"country_code\" = $2"));
        assert!(q.sql.contains("WHERE \"id\" = $8 RETURNING"));
        assert_eq!(q.params.last(), Some(&PgBindValue::BigInt(Some(3))));
    }

    #[test]
    fn delete_returns_id() {
        let q = delete(&CITY, 1);
        assert_eq!(q.sql, "DELETE FROM \"cities\" WHERE \"id\" = $1 RETURNING \"id\"");
    }
}
