//! Runtime type facade for the mapping model.
//!
//! The mapping invariants reason about type relationships (derivation from
//! the persistence root, value-ness, marker types), so types are described
//! explicitly and shared as handles.

mod descriptor;
mod registry;
mod type_ref;

pub use descriptor::{TypeDescriptor, TypeHandle, TypeKind};
pub use registry::TypeRegistry;
pub use type_ref::TypeRef;
