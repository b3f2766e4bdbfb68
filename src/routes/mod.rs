//! Router assembly.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::entity_routes;

use crate::state::AppState;
use axum::Router;

/// Every route the service exposes, without transport layers.
pub fn api_router(state: AppState) -> Router {
    common_routes(state.clone()).merge(entity_routes(state))
}
