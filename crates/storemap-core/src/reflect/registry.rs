//! Name-based type resolution.

use std::collections::HashMap;

use crate::error::MappingError;

use super::descriptor::TypeHandle;

/// Registry resolving type names to descriptors.
///
/// Deferred type references ([`super::TypeRef`]) resolve through a registry
/// passed explicitly by the caller.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_name: HashMap<String, TypeHandle>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type descriptor under its name.
    pub fn register(&mut self, handle: TypeHandle) -> Result<(), MappingError> {
        if self.by_name.contains_key(handle.name()) {
            return Err(MappingError::DuplicateTypeRegistration {
                name: handle.name().to_string(),
            });
        }
        self.by_name.insert(handle.name().to_string(), handle);
        Ok(())
    }

    /// Get a registered type by name.
    pub fn get(&self, name: &str) -> Option<&TypeHandle> {
        self.by_name.get(name)
    }

    /// Check if a type name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Resolve a type name, failing if it is not registered.
    pub fn resolve(&self, name: &str) -> Result<TypeHandle, MappingError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| MappingError::UnresolvedTypeName {
                name: name.to_string(),
            })
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
