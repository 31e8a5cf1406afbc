//! The persistence mapping model.
//!
//! Classes, properties, relations, and the configuration tying them
//! together.

mod class;
mod class_collection;
mod configuration;
mod context;
mod end_point;
mod property;
mod relation;
mod validator;

pub use class::ClassDefinition;
pub use class_collection::ClassDefinitionCollection;
pub use configuration::{MappingConfiguration, MappingLoader};
pub use context::{MappingContext, ScopedConfiguration};
pub use end_point::{Cardinality, RelationEndPointDefinition, RelationEndPointVariant};
pub use property::{DefaultValue, PropertyDefinition, PropertyDefinitionCollection};
pub use relation::{RelationDefinition, RelationDefinitionCollection};
pub use validator::ClassDefinitionValidator;
