//! SportsHub: typed CRUD over a relational sports-content schema, served over HTTP.

mod case;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError, CrudError, ErrorKind, MigrationError, SchemaError, StoreError};
pub use migration::apply_schema;
pub use routes::{api_router, common_routes, entity_routes};
pub use service::{Crud, Deleted};
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store, StoreHandle, Window};
