//! Process-scoped ownership of the current [`Catalog`].
//!
//! The catalog is never mutated in place. A reload builds a complete new
//! [`Catalog`] and swaps the `Arc` held here; readers that took a
//! [`CatalogHandle::snapshot`] keep using the old value until they drop it.

use std::sync::{Arc, RwLock};

use crate::models::Catalog;

/// Shared handle to the current catalog.
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The catalog as of now. Stays consistent for as long as it is held.
    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the whole catalog, returning the one it displaced.
    pub fn replace(&self, catalog: impl Into<Arc<Catalog>>) -> Arc<Catalog> {
        let next = catalog.into();
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}
