//! Relationship lookups: dependents of a parent row, found by foreign key.
//! A parent id with no rows (or no parent at all) yields an empty list.

use crate::error::AppError;
use crate::response::success_many;
use crate::schema::{Entity, Match};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

/// Rows of `C` referencing the `P` row `id` through any of its foreign keys to `P`.
pub async fn children<P: Entity, C: Entity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let columns: Vec<&'static str> = C::def().references_to(P::def().table).map(|c| c.name).collect();
    let rows = state.crud::<C>().list_by(&columns, id).await?;
    Ok(success_many(rows))
}

/// Which side of a fixture a team plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRole {
    #[default]
    Any,
    Home,
    Away,
}

impl MatchRole {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            MatchRole::Any => &["home_team_id", "away_team_id"],
            MatchRole::Home => &["home_team_id"],
            MatchRole::Away => &["away_team_id"],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleParams {
    #[serde(default)]
    pub role: MatchRole,
}

/// `GET /teams/:id/matches?role=any|home|away`
pub async fn team_matches(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RoleParams>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.crud::<Match>().list_by(params.role.columns(), id).await?;
    Ok(success_many(rows))
}
