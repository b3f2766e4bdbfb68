//! Entity CRUD handlers, generic over the entity type: list, create, read, update, delete.

use crate::error::AppError;
use crate::response::{success_many, success_one, success_one_ok};
use crate::schema::Entity;
use crate::service::Validate;
use crate::state::AppState;
use crate::store::Window;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

/// `?skip=&limit=`; defaults 0 and 100.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn list<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state
        .crud::<E>()
        .list(Window::new(params.skip, params.limit))
        .await?;
    Ok(success_many(rows))
}

pub async fn create<E>(
    State(state): State<AppState>,
    Json(payload): Json<E::Create>,
) -> Result<impl IntoResponse, AppError>
where
    E: Entity,
    E::Create: Validate,
{
    let payload = payload.validate()?;
    let row = state.crud::<E>().create(payload).await?;
    Ok(success_one(row))
}

pub async fn read<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let row = state.crud::<E>().get(id).await?;
    Ok(success_one_ok(row))
}

pub async fn update<E>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<E::Update>,
) -> Result<impl IntoResponse, AppError>
where
    E: Entity,
    E::Update: Validate,
{
    let patch = patch.validate()?;
    let row = state.crud::<E>().update(id, patch).await?;
    Ok(success_one_ok(row))
}

/// 200 with `{"ok": true}`.
pub async fn delete<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ack = state.crud::<E>().delete(id).await?;
    Ok(Json(ack))
}
