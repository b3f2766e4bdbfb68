//! Generic CRUD engine and boundary payload validation.

mod crud;
mod validation;
pub use crud::{Crud, Deleted};
pub use validation::{is_valid_email, normalize_email, Validate};
