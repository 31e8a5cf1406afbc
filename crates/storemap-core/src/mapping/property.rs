//! Property definitions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ArgumentError, Error, LookupError, MappingError};
use crate::reflect::TypeRef;

/// Default value of a property, derived from its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// No value.
    Null,
    /// Zero value of a value type.
    Zero,
    /// Empty string (non-nullable string property).
    EmptyString,
    /// Empty byte array (non-nullable binary property).
    EmptyBytes,
}

/// Description of one scalar property of a mapped class.
///
/// Immutable after construction; owned by exactly one
/// [`PropertyDefinitionCollection`] and shared from there.
#[derive(Debug)]
pub struct PropertyDefinition {
    class_id: String,
    name: String,
    storage_specific_name: Option<String>,
    property_type: TypeRef,
    is_nullable: bool,
    max_length: Option<u32>,
}

impl PropertyDefinition {
    /// Create a persistent property backed by a storage-specific name.
    ///
    /// `is_nullable` may only be supplied for reference types; `max_length`
    /// only for string and binary types. Compatibility with the declared
    /// type is checked when the type is resolved.
    pub fn persistent(
        class_id: impl Into<String>,
        name: impl Into<String>,
        storage_specific_name: impl Into<String>,
        property_type: TypeRef,
        is_nullable: Option<bool>,
        max_length: Option<u32>,
    ) -> Result<Self, Error> {
        let storage_specific_name = storage_specific_name.into();
        if storage_specific_name.is_empty() {
            return Err(ArgumentError::Empty {
                argument: "storage_specific_name",
            }
            .into());
        }
        Self::build(
            class_id.into(),
            name.into(),
            Some(storage_specific_name),
            property_type,
            is_nullable,
            max_length,
        )
    }

    /// Create a transient property with no storage representation.
    pub fn transient(
        class_id: impl Into<String>,
        name: impl Into<String>,
        property_type: TypeRef,
        is_nullable: Option<bool>,
    ) -> Result<Self, Error> {
        Self::build(
            class_id.into(),
            name.into(),
            None,
            property_type,
            is_nullable,
            None,
        )
    }

    fn build(
        class_id: String,
        name: String,
        storage_specific_name: Option<String>,
        property_type: TypeRef,
        is_nullable: Option<bool>,
        max_length: Option<u32>,
    ) -> Result<Self, Error> {
        if class_id.is_empty() {
            return Err(ArgumentError::Empty {
                argument: "class_id",
            }
            .into());
        }
        if name.is_empty() {
            return Err(ArgumentError::Empty {
                argument: "property_name",
            }
            .into());
        }

        if let Some(handle) = property_type.handle() {
            if max_length.is_some() && !handle.supports_max_length() {
                return Err(MappingError::MaxLengthNotSupported {
                    property: name,
                    property_type: handle.name().to_string(),
                }
                .into());
            }
            if is_nullable.is_some() && handle.is_value_type() {
                return Err(MappingError::NullabilityNotSupported {
                    property: name,
                    property_type: handle.name().to_string(),
                }
                .into());
            }
        }

        Ok(Self {
            class_id,
            name,
            storage_specific_name,
            property_type,
            is_nullable: is_nullable.unwrap_or(false),
            max_length,
        })
    }

    /// Id of the class declaring this property.
    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    /// Property name, unique across the declaring class's hierarchy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this property is stored.
    pub fn is_persistent(&self) -> bool {
        self.storage_specific_name.is_some()
    }

    /// Storage-specific name of a persistent property.
    ///
    /// Asking a transient property for its storage name is an error, not a
    /// defaulted value.
    pub fn storage_specific_name(&self) -> Result<&str, MappingError> {
        self.storage_specific_name
            .as_deref()
            .ok_or_else(|| MappingError::TransientProperty {
                class: self.class_id.clone(),
                property: self.name.clone(),
            })
    }

    /// Declared type of the property.
    pub fn property_type(&self) -> &TypeRef {
        &self.property_type
    }

    /// Check if the declared type has been resolved.
    pub fn is_property_type_resolved(&self) -> bool {
        self.property_type.is_resolved()
    }

    /// Check if null is a legal value.
    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    /// Maximum length for string and binary properties.
    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    /// Check if the property is an identity reference to another object.
    pub fn is_object_id(&self) -> bool {
        self.property_type
            .handle()
            .map(|handle| handle.is_object_id())
            .unwrap_or(false)
    }

    /// Default value derived from the declared type.
    pub fn default_value(&self) -> DefaultValue {
        use crate::reflect::TypeKind;

        match self.property_type.handle() {
            Some(handle) => match handle.kind() {
                TypeKind::Value => DefaultValue::Zero,
                TypeKind::String if !self.is_nullable => DefaultValue::EmptyString,
                TypeKind::Bytes if !self.is_nullable => DefaultValue::EmptyBytes,
                _ => DefaultValue::Null,
            },
            None => DefaultValue::Null,
        }
    }
}

/// Ordered, name-unique container of property definitions bound to one class.
#[derive(Debug)]
pub struct PropertyDefinitionCollection {
    class_id: String,
    entries: Vec<Arc<PropertyDefinition>>,
    by_name: HashMap<String, usize>,
    read_only: bool,
}

impl PropertyDefinitionCollection {
    /// Create an empty collection owned by the given class.
    pub fn new(class_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            entries: Vec::new(),
            by_name: HashMap::new(),
            read_only: false,
        }
    }

    /// Id of the owning class.
    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    /// Add a property.
    ///
    /// Fails if the collection is frozen, the property records a different
    /// owning class, or a property with the same name already exists. A
    /// rejected add leaves the collection unchanged.
    pub fn add(&mut self, property: PropertyDefinition) -> Result<(), MappingError> {
        if self.read_only {
            return Err(MappingError::ReadOnlyCollection);
        }
        if property.class_id() != self.class_id {
            return Err(MappingError::PropertyClassMismatch {
                property: property.name().to_string(),
                property_class: property.class_id().to_string(),
                collection_class: self.class_id.clone(),
            });
        }
        if self.by_name.contains_key(property.name()) {
            return Err(MappingError::DuplicateProperty {
                class: self.class_id.clone(),
                property: property.name().to_string(),
            });
        }

        self.by_name
            .insert(property.name().to_string(), self.entries.len());
        self.entries.push(Arc::new(property));
        Ok(())
    }

    /// Check membership of this exact instance (identity, not equality).
    pub fn contains_property(&self, property: &PropertyDefinition) -> bool {
        self.entries
            .iter()
            .any(|entry| std::ptr::eq(entry.as_ref(), property))
    }

    /// Check if a property with the given name exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Check if a persistent property with the given storage-specific name exists.
    pub fn contains_storage_specific_name(&self, storage_specific_name: &str) -> bool {
        self.entries.iter().any(|entry| {
            entry.storage_specific_name.as_deref() == Some(storage_specific_name)
        })
    }

    /// Get a property by name.
    pub fn get(&self, name: &str) -> Option<&Arc<PropertyDefinition>> {
        self.by_name.get(name).map(|index| &self.entries[*index])
    }

    /// Get a property by name, failing if it is absent.
    pub fn get_mandatory(&self, name: &str) -> Result<&Arc<PropertyDefinition>, LookupError> {
        self.get(name).ok_or_else(|| LookupError::PropertyNotFound {
            class: self.class_id.clone(),
            property: name.to_string(),
        })
    }

    /// Iterate properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PropertyDefinition>> {
        self.entries.iter()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the collection against further mutation.
    pub fn set_read_only(&mut self) {
        self.read_only = true;
    }

    /// Check if the collection is frozen.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Create a mutable copy sharing the same property instances.
    pub fn shallow_copy(&self) -> Self {
        Self {
            class_id: self.class_id.clone(),
            entries: self.entries.clone(),
            by_name: self.by_name.clone(),
            read_only: false,
        }
    }
}
