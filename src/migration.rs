//! Apply the catalog to the database: enum types, tables with their constraints, foreign-key indexes.
//! Tables are created in catalog order so every referenced table exists first.

use crate::error::MigrationError;
use crate::schema::{validate, Column, ColumnType, EntityDef, EnumDef, CATALOG, ENUMS, ID};
use crate::sql::quoted;
use sqlx::PgPool;

/// PostgreSQL reports an existing type as `duplicate_object`.
const DUPLICATE_OBJECT: &str = "42710";

fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn enum_ddl(e: &EnumDef) -> String {
    let values: Vec<String> = e.values.iter().map(|v| literal(v)).collect();
    format!("CREATE TYPE {} AS ENUM ({})", quoted(e.name), values.join(", "))
}

fn column_ddl(c: &Column) -> String {
    let ty = match c.ty {
        ColumnType::Enum(e) => quoted(e.name),
        ref other => other.pg_type().to_string(),
    };
    let mut def = format!("{} {}", quoted(&c.db_name()), ty);
    if !c.nullable {
        def.push_str(" NOT NULL");
    }
    if c.unique {
        def.push_str(" UNIQUE");
    }
    if let Some(fk) = c.references {
        def.push_str(&format!(
            " REFERENCES {} ({}) ON DELETE {}",
            quoted(fk.target),
            quoted(ID),
            fk.on_delete.sql()
        ));
    }
    def
}

pub(crate) fn table_ddl(def: &EntityDef) -> String {
    let col_defs: Vec<String> = std::iter::once(format!("{} BIGSERIAL PRIMARY KEY", quoted(ID)))
        .chain(def.columns.iter().map(column_ddl))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(def.table),
        col_defs.join(",\n  ")
    )
}

pub(crate) fn index_ddl(def: &EntityDef) -> Vec<String> {
    def.foreign_keys()
        .map(|(c, _)| {
            let column = c.db_name();
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quoted(&format!("ix_{}_{}", def.table, column)),
                quoted(def.table),
                quoted(&column)
            )
        })
        .collect()
}

/// Creates every enum type, table and foreign-key index the catalog declares.
/// Safe to run on every start: existing types, tables and indexes are left as they are.
pub async fn apply_schema(pool: &PgPool) -> Result<(), MigrationError> {
    validate(CATALOG)?;

    for e in ENUMS {
        let sql = enum_ddl(e);
        tracing::debug!(sql = %sql, "migration");
        if let Err(err) = sqlx::query(&sql).execute(pool).await {
            let duplicate = err
                .as_database_error()
                .and_then(|db| db.code())
                .map(|code| code == DUPLICATE_OBJECT)
                .unwrap_or(false);
            if !duplicate {
                return Err(err.into());
            }
            tracing::debug!(enum_type = e.name, "enum type already exists");
        }
    }

    for def in CATALOG {
        let sql = table_ddl(def);
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(pool).await?;
        for sql in index_ddl(def) {
            tracing::debug!(sql = %sql, "migration");
            sqlx::query(&sql).execute(pool).await?;
        }
    }

    tracing::info!(tables = CATALOG.len(), enums = ENUMS.len(), "schema applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CITY, MATCH, STAGE_TYPE, VENUE};

    #[test]
    fn enum_type_lists_values_in_order() {
        assert_eq!(enum_ddl(&STAGE_TYPE), "CREATE TYPE \"stage_type\" AS ENUM ('GROUP', 'KO')");
    }

    #[test]
    fn table_carries_constraints() {
        let sql = table_ddl(&VENUE);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"venues\" (\n  \"id\" BIGSERIAL PRIMARY KEY,"));
        assert!(sql.contains("\"slug\" TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("\"capacity\" INTEGER,"));
        assert!(sql.contains("\"city_id\" BIGINT NOT NULL REFERENCES \"cities\" (\"id\") ON DELETE RESTRICT"));
    }

    #[test]
    fn enum_columns_use_their_type() {
        let sql = table_ddl(&MATCH);
        assert!(sql.contains("\"status\" \"match_status\" NOT NULL"));
        assert!(sql.contains("\"stage_id\" BIGINT REFERENCES \"stages\" (\"id\") ON DELETE SET NULL"));
    }

    #[test]
    fn camel_case_columns_are_snake_case() {
        assert!(table_ddl(&CITY).contains("\"country_code\" TEXT NOT NULL"));
    }

    #[test]
    fn every_foreign_key_gets_an_index() {
        let idx = index_ddl(&MATCH);
        assert_eq!(idx.len(), 5);
        assert_eq!(
            idx[0],
            "CREATE INDEX IF NOT EXISTS \"ix_matches_season_id\" ON \"matches\" (\"season_id\")"
        );
        assert!(index_ddl(&CITY).is_empty());
    }
}
