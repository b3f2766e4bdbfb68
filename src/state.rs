//! Shared application state for all routes.

use crate::schema::Entity;
use crate::service::Crud;
use crate::store::StoreHandle;

#[derive(Clone)]
pub struct AppState {
    /// Opened at start-up and closed by the binary on shutdown.
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        AppState { store }
    }

    pub fn crud<E: Entity>(&self) -> Crud<E> {
        Crud::new(self.store.clone())
    }
}
