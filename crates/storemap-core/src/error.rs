//! Mapping model error types.

use thiserror::Error;

/// Top-level error for the mapping model.
#[derive(Debug, Error)]
pub enum Error {
    /// Structural mapping error.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Mandatory lookup failure.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Argument precondition violation.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// Configuration lifecycle violation.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Violations of a structural invariant of the mapping model.
///
/// Raised while a mapping is built or validated. Always fatal to the build
/// step that detected the violation; the partially built model must be
/// discarded.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The class type is not a reference type.
    #[error("type '{class_type}' of class '{class}' is not a reference type")]
    ClassTypeNotReference {
        /// Class id.
        class: String,
        /// Name of the offending type.
        class_type: String,
    },

    /// The class type does not derive from the persistence root type.
    #[error("type '{class_type}' of class '{class}' is not derived from the persistence root type")]
    ClassTypeNotDerived {
        /// Class id.
        class: String,
        /// Name of the offending type.
        class_type: String,
    },

    /// The class type is the persistence root type itself.
    #[error("type '{class_type}' of class '{class}' must not be the persistence root type itself")]
    ClassTypeIsRoot {
        /// Class id.
        class: String,
        /// Name of the offending type.
        class_type: String,
    },

    /// The class type does not derive from its base class's type.
    #[error("type '{class_type}' of class '{class}' is not derived from type '{base_type}' of base class '{base_class}'")]
    BaseTypeMismatch {
        /// Class id.
        class: String,
        /// Name of the class's type.
        class_type: String,
        /// Base class id.
        base_class: String,
        /// Name of the base class's type.
        base_type: String,
    },

    /// A derived class is assigned to a different storage provider than its base class.
    #[error("class '{class}' must use the same storage provider as its base class '{base_class}': '{storage_provider}' does not match '{base_storage_provider}'")]
    StorageProviderMismatch {
        /// Class id.
        class: String,
        /// Storage provider of the class.
        storage_provider: String,
        /// Base class id.
        base_class: String,
        /// Storage provider of the base class.
        base_storage_provider: String,
    },

    /// A property with the same name already exists on the class.
    #[error("class '{class}' already contains a property named '{property}'")]
    DuplicateProperty {
        /// Class id.
        class: String,
        /// Property name.
        property: String,
    },

    /// A base class already defines a property with the same name.
    #[error("property '{property}' cannot be added to class '{class}': base class '{base_class}' already defines a property with this name")]
    PropertyDefinedInBaseClass {
        /// Class the property was added to.
        class: String,
        /// Property name.
        property: String,
        /// Base class that already defines the name.
        base_class: String,
    },

    /// A property records a different owning class than the collection it is added to.
    #[error("property '{property}' belongs to class '{property_class}' and cannot be added to the collection of class '{collection_class}'")]
    PropertyClassMismatch {
        /// Property name.
        property: String,
        /// Class recorded on the property.
        property_class: String,
        /// Class owning the collection.
        collection_class: String,
    },

    /// A storage-specific name was requested for a transient property.
    #[error("property '{property}' of class '{class}' is not persistent and has no storage-specific name")]
    TransientProperty {
        /// Class id.
        class: String,
        /// Property name.
        property: String,
    },

    /// A maximum length was supplied for a type that does not support one.
    #[error("property '{property}': a maximum length is only valid for string and binary properties, not for type '{property_type}'")]
    MaxLengthNotSupported {
        /// Property name.
        property: String,
        /// Name of the declared type.
        property_type: String,
    },

    /// Nullability was supplied for a value type.
    #[error("property '{property}': nullability cannot be specified for value type '{property_type}'")]
    NullabilityNotSupported {
        /// Property name.
        property: String,
        /// Name of the declared type.
        property_type: String,
    },

    /// A class with the same id is already part of the collection.
    #[error("mapping already contains a class with id '{id}'")]
    DuplicateClassId {
        /// Class id.
        id: String,
    },

    /// A class for the same resolved type is already part of the collection.
    #[error("mapping already contains a class for type '{class_type}'")]
    DuplicateClassType {
        /// Name of the resolved type.
        class_type: String,
    },

    /// An unresolved class was added to a collection requiring resolved types.
    #[error("class '{class}' has an unresolved type but the collection requires resolved types")]
    ClassTypeNotResolved {
        /// Class id.
        class: String,
    },

    /// A class's base class is not part of the collection.
    #[error("base class '{base_class}' of class '{class}' is not part of the collection")]
    BaseClassNotInCollection {
        /// Class id.
        class: String,
        /// Base class id.
        base_class: String,
    },

    /// A mutation was attempted on a frozen collection.
    #[error("the collection is read-only and cannot be modified")]
    ReadOnlyCollection,

    /// A relation with the same id is already part of the collection.
    #[error("mapping already contains a relation with id '{id}'")]
    DuplicateRelationId {
        /// Relation id.
        id: String,
    },

    /// Both end points of a relation are anonymous.
    #[error("relation '{relation}' cannot have two anonymous end points")]
    BothEndPointsAnonymous {
        /// Relation id.
        relation: String,
    },

    /// An end point is already attached to another relation.
    #[error("an end point of class '{class}' is already attached to relation '{attached_to}'")]
    EndPointAlreadyAttached {
        /// Class owning the end point.
        class: String,
        /// Relation the end point is already attached to.
        attached_to: String,
    },

    /// A single-object end point carries a sort expression.
    #[error("end point '{class}.{property}' is a single-object end point and cannot have a sort expression")]
    SortExpressionOnSingleEndPoint {
        /// Class owning the end point.
        class: String,
        /// Property name of the end point.
        property: String,
    },

    /// The one-time set-relations step ran twice for the same class.
    #[error("relation definitions of class '{class}' have already been set")]
    RelationsAlreadySet {
        /// Class id.
        class: String,
    },

    /// A relation end point references a class missing from the mapping.
    #[error("relation '{relation}' references class '{class}' which is not part of the mapping")]
    EndPointClassNotFound {
        /// Relation id.
        relation: String,
        /// Referenced class id.
        class: String,
    },

    /// The same persistent mixin is declared more than once for a class.
    #[error("class '{class}' declares the persistent mixin '{mixin}' more than once")]
    DuplicatePersistentMixin {
        /// Class id.
        class: String,
        /// Mixin type name.
        mixin: String,
    },

    /// Captured persistent mixins are missing from the live configuration.
    #[error("A persistence-related mixin was removed from the domain object type '{class_type}' after the mapping information was built: {mixins}.")]
    PersistentMixinsRemoved {
        /// Name of the domain object type.
        class_type: String,
        /// Comma-joined names of the missing mixins.
        mixins: String,
    },

    /// The live configuration contains persistent mixins that were not captured.
    #[error("One or more persistence-related mixins were added to the domain object type '{class_type}' after the mapping information was built: {mixins}")]
    PersistentMixinsAdded {
        /// Name of the domain object type.
        class_type: String,
        /// Comma-joined names of the added mixins.
        mixins: String,
    },

    /// A persistence-relevant mixin has unbound generic type parameters.
    #[error("The persistence-relevant mixin {mixin} applied to class {class} has open generic type parameters. All type parameters of the mixin must be specified when it is applied to a DomainObject.")]
    OpenGenericMixin {
        /// Mixin type name.
        mixin: String,
        /// Name of the class type the mixin is applied to.
        class: String,
    },

    /// A type name could not be resolved through the registry.
    #[error("no type named '{name}' is registered")]
    UnresolvedTypeName {
        /// The unresolved type name.
        name: String,
    },

    /// A type with the same name is already registered.
    #[error("a type named '{name}' is already registered")]
    DuplicateTypeRegistration {
        /// The duplicated type name.
        name: String,
    },
}

/// Failures of mandatory lookup variants.
///
/// The optional counterpart of each lookup returns `None` for the same
/// input; callers choose the contract by the method they call.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The property is not defined anywhere in the inheritance chain.
    #[error("Class '{class}' does not contain the property '{property}'.")]
    PropertyNotFound {
        /// Class the lookup started at.
        class: String,
        /// Property name.
        property: String,
    },

    /// No relation involves the class and property.
    #[error("No relation found for class '{class}' and property '{property}'.")]
    RelationNotFound {
        /// Class the lookup started at.
        class: String,
        /// Property name.
        property: String,
    },

    /// The relation id is not part of the collection.
    #[error("Relation '{id}' does not exist.")]
    RelationIdNotFound {
        /// Relation id.
        id: String,
    },

    /// The class id is not part of the mapping.
    #[error("Mapping does not contain class '{id}'.")]
    ClassIdNotFound {
        /// Class id.
        id: String,
    },

    /// No class is mapped for the type.
    #[error("Mapping does not contain a class for type '{class_type}'.")]
    ClassTypeNotFound {
        /// Name of the type.
        class_type: String,
    },

    /// The end point is not one of the relation's two end points.
    #[error("Relation '{relation}' has no association with class '{class}' and property '{property}'.")]
    NoAssociation {
        /// Relation id.
        relation: String,
        /// Class owning the foreign end point.
        class: String,
        /// Property name of the foreign end point.
        property: String,
    },
}

/// Argument precondition violations.
///
/// Always a programming-error signal, independent of model state.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// A required string argument was empty.
    #[error("argument '{argument}' must not be empty")]
    Empty {
        /// Name of the offending argument.
        argument: &'static str,
    },
}

/// Violations of the configuration install contract.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A configuration with unresolved types cannot become the active configuration.
    #[error("a mapping configuration with unresolved types cannot be installed as the active configuration")]
    UnresolvedTypesNotAllowed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_display() {
        let err = MappingError::StorageProviderMismatch {
            class: "Customer".to_string(),
            storage_provider: "P2".to_string(),
            base_class: "Company".to_string(),
            base_storage_provider: "P1".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("P1"));
        assert!(message.contains("P2"));
        assert!(message.contains("Customer"));
        assert!(message.contains("Company"));
    }

    #[test]
    fn test_lookup_messages_distinguish_entity_kind() {
        let class = LookupError::ClassIdNotFound {
            id: "Order".to_string(),
        };
        let relation = LookupError::RelationIdNotFound {
            id: "Order".to_string(),
        };
        assert_eq!(class.to_string(), "Mapping does not contain class 'Order'.");
        assert_eq!(relation.to_string(), "Relation 'Order' does not exist.");
    }

    #[test]
    fn test_error_wraps_categories() {
        let err: Error = MappingError::ReadOnlyCollection.into();
        assert!(matches!(err, Error::Mapping(_)));

        let err: Error = ArgumentError::Empty { argument: "id" }.into();
        assert!(matches!(err, Error::Argument(_)));
    }
}
