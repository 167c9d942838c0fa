//! Storage trait for the persisted progress document.
//!
//! Backends move one JSON document in and out of durable storage. The store
//! decodes it tolerantly, so backends hand back raw JSON rather than typed
//! state: a partially corrupt document must still reach the per-slice
//! recovery in `progress::state`.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// Trait for progress persistence backends.
pub trait ProgressBackend: Send + Sync {
    /// Load the stored document.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Value>>;

    /// Replace the stored document.
    fn save(&self, doc: &Value) -> Result<()>;
}

/// Blanket implementation for Arc-wrapped backends, so tests and commands
/// can share one backend instance.
impl<T: ProgressBackend + ?Sized> ProgressBackend for Arc<T> {
    fn load(&self) -> Result<Option<Value>> {
        (**self).load()
    }

    fn save(&self, doc: &Value) -> Result<()> {
        (**self).save(doc)
    }
}
