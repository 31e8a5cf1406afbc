//! storemap-core - Business-object persistence mapping model.
//!
//! Builds, validates, and queries an in-memory model describing how domain
//! classes relate to a persistent store: classes, their properties, their
//! inheritance hierarchy, and the relations between classes.
//!
//! The model is produced once by a [`MappingLoader`], wired and validated
//! by [`MappingConfiguration::build`], and published read-only through a
//! [`MappingContext`]. All queries are synchronous in-memory traversals.

pub mod error;
pub mod mapping;
pub mod mixin;
pub mod reflect;

pub use error::{ArgumentError, ConfigurationError, Error, LookupError, MappingError};
pub use mapping::{
    Cardinality, ClassDefinition, ClassDefinitionCollection, ClassDefinitionValidator,
    DefaultValue, MappingConfiguration, MappingContext, MappingLoader, PropertyDefinition,
    PropertyDefinitionCollection, RelationDefinition, RelationDefinitionCollection,
    RelationEndPointDefinition, RelationEndPointVariant, ScopedConfiguration,
};
pub use mixin::{MixinConfiguration, PersistentMixinFinder};
pub use reflect::{TypeDescriptor, TypeHandle, TypeKind, TypeRef, TypeRegistry};
