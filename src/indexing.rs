//! Index lifecycle across backends.
//!
//! Both operations are idempotent and best-effort: a backend that fails is
//! logged and skipped, never blocking the others. Index DDL runs in an
//! administrative context of its own (each adapter isolates its DDL from
//! workload transactions), strictly between workload passes.

use crate::BookStore;
use tracing::warn;

pub fn create_indexes(backends: &mut [Box<dyn BookStore>]) {
    for store in backends.iter_mut() {
        if let Err(e) = store.create_indexes() {
            warn!(backend = store.name(), error = %e, "index creation failed; continuing");
        }
    }
}

pub fn drop_indexes(backends: &mut [Box<dyn BookStore>]) {
    for store in backends.iter_mut() {
        if let Err(e) = store.drop_indexes() {
            warn!(backend = store.name(), error = %e, "index drop failed; continuing");
        }
    }
}
