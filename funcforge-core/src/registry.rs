//! Thread-safe function registry using DashMap.
//!
//! Maps generated function identifiers to the image identifiers produced
//! by the build step. Written by the load path, read by the execute path;
//! entries are never removed and the mapping is lost on restart.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{ForgeError, ForgeResult};
use crate::types::{FunctionId, ImageId};

/// Thread-safe registry of loaded functions.
/// Uses DashMap for lock-free concurrent access.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: DashMap<FunctionId, ImageId>,
}

impl FunctionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            functions: DashMap::new(),
        }
    }

    /// Create a registry wrapped in an Arc for sharing across threads.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Bind a freshly generated function identifier to `image` and make
    /// it visible to subsequent lookups.
    pub fn register(&self, image: ImageId) -> FunctionId {
        let id = FunctionId::generate();
        self.functions.insert(id.clone(), image);
        id
    }

    /// Look up the image bound to `id`.
    pub fn lookup(&self, id: &FunctionId) -> ForgeResult<ImageId> {
        self.functions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ForgeError::FunctionNotFound(id.clone()))
    }

    /// Check if a function is registered.
    pub fn contains(&self, id: &FunctionId) -> bool {
        self.functions.contains_key(id)
    }

    /// Get the number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Get a list of all registered function IDs.
    pub fn function_ids(&self) -> Vec<FunctionId> {
        self.functions.iter().map(|r| r.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: &str) -> ImageId {
        ImageId::new(format!("sha256:{}", tag)).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = FunctionRegistry::new();
        let id = registry.register(image("aaaa"));

        assert!(registry.contains(&id));
        assert_eq!(registry.lookup(&id).unwrap(), image("aaaa"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_id() {
        let registry = FunctionRegistry::new();
        let unknown = FunctionId::generate();

        let err = registry.lookup(&unknown).unwrap_err();
        assert!(matches!(err, ForgeError::FunctionNotFound(_)));
    }

    #[test]
    fn test_registrations_get_distinct_ids() {
        let registry = FunctionRegistry::new();
        let a = registry.register(image("aaaa"));
        let b = registry.register(image("bbbb"));

        assert_ne!(a, b);
        assert_eq!(registry.lookup(&a).unwrap(), image("aaaa"));
        assert_eq!(registry.lookup(&b).unwrap(), image("bbbb"));
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let registry = FunctionRegistry::new_shared();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    let id = reg.register(image(&format!("{:04}", i)));
                    reg.lookup(&id).unwrap();
                    id
                })
            })
            .collect();

        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 10);
        for id in &ids {
            assert!(registry.contains(id));
        }
    }
}
