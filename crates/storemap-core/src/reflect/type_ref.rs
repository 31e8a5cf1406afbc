//! Deferred type references.

use parking_lot::RwLock;

use crate::error::MappingError;

use super::descriptor::TypeHandle;
use super::registry::TypeRegistry;

/// A type reference that is either resolved or known only by name.
///
/// Resolution transitions the reference exactly once; a resolved reference
/// answers all subsequent accesses from the memoized handle and never
/// re-resolves.
#[derive(Debug)]
pub struct TypeRef {
    state: RwLock<State>,
}

#[derive(Debug, Clone)]
enum State {
    Unresolved(String),
    Resolved(TypeHandle),
}

impl TypeRef {
    /// Create an already resolved reference.
    pub fn resolved(handle: TypeHandle) -> Self {
        Self {
            state: RwLock::new(State::Resolved(handle)),
        }
    }

    /// Create a deferred reference known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(State::Unresolved(name.into())),
        }
    }

    /// Check if the reference has been resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(*self.state.read(), State::Resolved(_))
    }

    /// The type name, resolved or not.
    pub fn name(&self) -> String {
        match &*self.state.read() {
            State::Unresolved(name) => name.clone(),
            State::Resolved(handle) => handle.name().to_string(),
        }
    }

    /// The resolved handle, if resolution already happened.
    pub fn handle(&self) -> Option<TypeHandle> {
        match &*self.state.read() {
            State::Resolved(handle) => Some(handle.clone()),
            State::Unresolved(_) => None,
        }
    }

    /// Resolve through the registry, memoizing the result.
    pub fn resolve(&self, registry: &TypeRegistry) -> Result<TypeHandle, MappingError> {
        if let State::Resolved(handle) = &*self.state.read() {
            return Ok(handle.clone());
        }

        let mut state = self.state.write();
        match &*state {
            State::Resolved(handle) => Ok(handle.clone()),
            State::Unresolved(name) => {
                let handle = registry.resolve(name)?;
                *state = State::Resolved(handle.clone());
                Ok(handle)
            }
        }
    }
}
