//! PostgreSQL store over a `PgPool`. Foreign keys, uniqueness and delete policies are enforced by
//! the database (see `migration`); errors are classified by SQLSTATE into constraint vs. infrastructure.

use super::{Filter, MergeFn, Row, Store, Window};
use crate::error::StoreError;
use crate::schema::{Column, ColumnType, EntityDef, ID};
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{ConnectOptions, PgPool, Postgres, Row as _, Transaction};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn query_many(&self, entity: &EntityDef, q: &QueryBuf) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(&self.pool).await?;
        rows.iter().map(|r| decode_row(entity, r)).collect()
    }

    async fn query_optional(&self, entity: &EntityDef, q: &QueryBuf) -> Result<Option<Row>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(&self.pool).await?;
        row.map(|r| decode_row(entity, &r)).transpose()
    }
}

fn bind_all(q: &QueryBuf) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    q.params.iter().fold(sqlx::query(&q.sql), |query, p| p.bind(query))
}

async fn query_optional_tx(
    conn: &mut PgConnection,
    entity: &EntityDef,
    q: &QueryBuf,
) -> Result<Option<Row>, StoreError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
    let row = bind_all(q).fetch_optional(&mut *conn).await?;
    row.map(|r| decode_row(entity, &r)).transpose()
}

/// Commit on success; roll back before handing the error back.
async fn finish<T>(tx: Transaction<'_, Postgres>, result: Result<T, StoreError>) -> Result<T, StoreError> {
    match result {
        Ok(v) => {
            tx.commit().await?;
            Ok(v)
        }
        Err(e) => {
            if let Err(rb) = tx.rollback().await {
                tracing::warn!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}

fn decode_row(entity: &EntityDef, row: &PgRow) -> Result<Row, StoreError> {
    let mut map = Row::new();
    map.insert(ID.to_string(), Value::from(row.try_get::<i64, _>(ID)?));
    for c in entity.columns {
        map.insert(c.name.to_string(), decode_cell(row, c)?);
    }
    Ok(map)
}

fn decode_cell(row: &PgRow, column: &Column) -> Result<Value, StoreError> {
    let name = column.db_name();
    let name = name.as_str();
    Ok(match column.ty {
        ColumnType::Integer => row.try_get::<Option<i32>, _>(name)?.map(Value::from),
        ColumnType::BigInt => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
        ColumnType::Float => row
            .try_get::<Option<f64>, _>(name)?
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        ColumnType::Text | ColumnType::Enum(_) => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        ColumnType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        ColumnType::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(name)?
            .map(serde_json::to_value)
            .transpose()?,
    }
    .unwrap_or(Value::Null))
}

#[async_trait]
impl Store for PgStore {
    async fn select(
        &self,
        def: &'static EntityDef,
        filter: Option<&Filter>,
        window: Window,
    ) -> Result<Vec<Row>, StoreError> {
        let q = sql::select_list(def, filter, window)?;
        self.query_many(def, &q).await
    }

    async fn fetch(&self, def: &'static EntityDef, id: i64) -> Result<Option<Row>, StoreError> {
        let q = sql::select_by_id(def, id, false);
        self.query_optional(def, &q).await
    }

    async fn insert(&self, def: &'static EntityDef, values: Row) -> Result<Row, StoreError> {
        let q = sql::insert(def, &values)?;
        let mut tx = self.pool.begin().await?;
        let result = query_optional_tx(&mut tx, def, &q)
            .await
            .and_then(|row| row.ok_or_else(|| StoreError::Codec("INSERT returned no row".into())));
        finish(tx, result).await
    }

    async fn update(
        &self,
        def: &'static EntityDef,
        id: i64,
        merge: MergeFn,
    ) -> Result<Option<Row>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result: Result<Option<Row>, StoreError> = async {
            let locate = sql::select_by_id(def, id, true);
            let Some(current) = query_optional_tx(&mut tx, def, &locate).await? else {
                return Ok(None);
            };
            let merged = merge(current)?;
            let write = sql::update(def, id, &merged)?;
            query_optional_tx(&mut tx, def, &write).await
        }
        .await;
        finish(tx, result).await
    }

    async fn delete(&self, def: &'static EntityDef, id: i64) -> Result<bool, StoreError> {
        let q = sql::delete(def, id);
        let mut tx = self.pool.begin().await?;
        let result = async {
            tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
            let row = bind_all(&q).fetch_optional(&mut *tx).await?;
            Ok::<_, StoreError>(row.is_some())
        }
        .await;
        finish(tx, result).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Connects to the server's `postgres` database and creates the target database if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StoreError::Unavailable(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::Unavailable("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}
