//! Class definition collections.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{LookupError, MappingError};

use super::class::ClassDefinition;

/// Ordered container of class definitions, indexed by class id and, once
/// types are resolved, by type name.
///
/// The collection is the arena side of the inheritance graph: base links
/// live on the classes (pointing upward), derived links live here as id
/// lists and are populated during registration.
#[derive(Debug)]
pub struct ClassDefinitionCollection {
    entries: Vec<Arc<ClassDefinition>>,
    by_id: HashMap<String, usize>,
    by_type: HashMap<String, usize>,
    derived: HashMap<String, Vec<String>>,
    resolved_types_required: bool,
    read_only: bool,
}

impl ClassDefinitionCollection {
    /// Create an empty collection.
    ///
    /// `resolved_types_required` reflects whether the producing loader
    /// guarantees resolved types; such a collection refuses unresolved
    /// classes at registration.
    pub fn new(resolved_types_required: bool) -> Self {
        Self {
            entries: Vec::new(),
            by_id: HashMap::new(),
            by_type: HashMap::new(),
            derived: HashMap::new(),
            resolved_types_required,
            read_only: false,
        }
    }

    /// Whether the producing loader guarantees resolved types.
    pub fn resolved_types_required(&self) -> bool {
        self.resolved_types_required
    }

    /// Register a class.
    ///
    /// The base class, if any, must already be registered (identity, not
    /// equality); registration links the class into its base's derived-class
    /// list. A rejected add leaves the collection unchanged.
    pub fn add(&mut self, class: Arc<ClassDefinition>) -> Result<(), MappingError> {
        if self.read_only {
            return Err(MappingError::ReadOnlyCollection);
        }
        if self.by_id.contains_key(class.id()) {
            return Err(MappingError::DuplicateClassId {
                id: class.id().to_string(),
            });
        }
        if self.resolved_types_required && !class.is_class_type_resolved() {
            return Err(MappingError::ClassTypeNotResolved {
                class: class.id().to_string(),
            });
        }
        let type_name = class.class_type().handle().map(|handle| {
            handle.name().to_string()
        });
        if let Some(type_name) = &type_name {
            if self.by_type.contains_key(type_name) {
                return Err(MappingError::DuplicateClassType {
                    class_type: type_name.clone(),
                });
            }
        }
        if let Some(base) = class.base_class() {
            let registered = self
                .get(base.id())
                .map(|existing| Arc::ptr_eq(existing, base))
                .unwrap_or(false);
            if !registered {
                return Err(MappingError::BaseClassNotInCollection {
                    class: class.id().to_string(),
                    base_class: base.id().to_string(),
                });
            }
        }

        let index = self.entries.len();
        if let Some(type_name) = type_name {
            self.by_type.insert(type_name, index);
        }
        if let Some(base) = class.base_class() {
            self.derived
                .entry(base.id().to_string())
                .or_default()
                .push(class.id().to_string());
        }
        self.by_id.insert(class.id().to_string(), index);
        self.entries.push(class);
        Ok(())
    }

    /// Get a class by id.
    pub fn get(&self, id: &str) -> Option<&Arc<ClassDefinition>> {
        self.by_id.get(id).map(|index| &self.entries[*index])
    }

    /// Get a class by id, failing if it is absent.
    pub fn get_mandatory(&self, id: &str) -> Result<&Arc<ClassDefinition>, LookupError> {
        self.get(id)
            .ok_or_else(|| LookupError::ClassIdNotFound { id: id.to_string() })
    }

    /// Get a class by the name of its resolved type.
    pub fn get_by_class_type(&self, type_name: &str) -> Option<&Arc<ClassDefinition>> {
        self.by_type.get(type_name).map(|index| &self.entries[*index])
    }

    /// Get a class by type name, failing if it is absent.
    pub fn get_mandatory_by_class_type(
        &self,
        type_name: &str,
    ) -> Result<&Arc<ClassDefinition>, LookupError> {
        self.get_by_class_type(type_name)
            .ok_or_else(|| LookupError::ClassTypeNotFound {
                class_type: type_name.to_string(),
            })
    }

    /// Check membership of this exact instance (identity, not equality).
    pub fn contains_class(&self, class: &ClassDefinition) -> bool {
        self.by_id
            .get(class.id())
            .map(|index| std::ptr::eq(self.entries[*index].as_ref(), class))
            .unwrap_or(false)
    }

    /// Check if a class with the given id exists.
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Ids of the classes directly derived from the given class, in
    /// registration order.
    pub fn derived_class_ids(&self, class_id: &str) -> &[String] {
        self.derived
            .get(class_id)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// The classes directly derived from the given class.
    pub fn derived_classes(&self, class_id: &str) -> Vec<&Arc<ClassDefinition>> {
        self.derived_class_ids(class_id)
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Iterate classes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassDefinition>> {
        self.entries.iter()
    }

    /// Number of classes.
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
}
