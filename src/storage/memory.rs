//! In-memory progress backend for testing.

use std::sync::RwLock;

use serde_json::Value;

use crate::error::{Result, TrekError};
use crate::storage::ProgressBackend;

/// In-memory progress backend.
///
/// Holds the document behind an `RwLock`; contents are lost on drop. A
/// `fail_writes` toggle lets tests exercise the fail-open persistence path.
#[derive(Debug, Default)]
pub struct MemoryProgressBackend {
    doc: RwLock<Option<Value>>,
    fail_writes: RwLock<bool>,
}

impl MemoryProgressBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-seeded with a document.
    pub fn with_document(doc: Value) -> Self {
        Self {
            doc: RwLock::new(Some(doc)),
            fail_writes: RwLock::new(false),
        }
    }

    /// Make subsequent saves fail (simulates an unavailable backend).
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().unwrap() = fail;
    }

    /// Whether no document has been stored.
    pub fn is_empty(&self) -> bool {
        self.doc.read().unwrap().is_none()
    }

    /// Drop the stored document.
    pub fn clear(&self) {
        *self.doc.write().unwrap() = None;
    }
}

impl ProgressBackend for MemoryProgressBackend {
    fn load(&self) -> Result<Option<Value>> {
        Ok(self.doc.read().unwrap().clone())
    }

    fn save(&self, doc: &Value) -> Result<()> {
        if *self.fail_writes.read().unwrap() {
            return Err(TrekError::storage(
                "<memory>",
                std::io::Error::other("writes disabled"),
            ));
        }
        *self.doc.write().unwrap() = Some(doc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::test_backend_roundtrip;

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryProgressBackend::new();
        test_backend_roundtrip(&backend);
    }

    #[test]
    fn test_new_backend_is_empty() {
        let backend = MemoryProgressBackend::new();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_with_document() {
        let backend = MemoryProgressBackend::with_document(serde_json::json!({ "userPoints": 5 }));
        let loaded = backend.load().unwrap().unwrap();
        assert_eq!(loaded["userPoints"], 5);
    }

    #[test]
    fn test_clear() {
        let backend = MemoryProgressBackend::with_document(serde_json::json!({}));
        assert!(!backend.is_empty());
        backend.clear();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_fail_writes() {
        let backend = MemoryProgressBackend::new();
        backend.set_fail_writes(true);

        let result = backend.save(&serde_json::json!({}));
        assert!(result.is_err());
        assert!(backend.is_empty());

        backend.set_fail_writes(false);
        backend.save(&serde_json::json!({})).unwrap();
        assert!(!backend.is_empty());
    }

    #[test]
    fn test_shared_via_arc() {
        use std::sync::Arc;

        let backend = Arc::new(MemoryProgressBackend::new());
        let clone = Arc::clone(&backend);

        clone.save(&serde_json::json!({ "isAdmin": true })).unwrap();
        let loaded = backend.load().unwrap().unwrap();
        assert_eq!(loaded["isAdmin"], true);
    }
}
