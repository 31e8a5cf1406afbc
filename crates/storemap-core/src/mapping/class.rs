//! Class definitions.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::error::{ArgumentError, Error, LookupError, MappingError};
use crate::reflect::{TypeHandle, TypeRef};

use super::class_collection::ClassDefinitionCollection;
use super::end_point::RelationEndPointDefinition;
use super::property::{PropertyDefinition, PropertyDefinitionCollection};
use super::relation::{RelationDefinition, RelationDefinitionCollection};

/// Description of one domain class: identity, runtime type, storage
/// assignment, inheritance links, own properties and relations, and the
/// persistent mixins captured when the mapping was built.
///
/// A class is mutable only while it is exclusively owned: properties are
/// added before the class is shared into a collection, and the relation set
/// is attached exactly once afterwards. Base links point strictly upward;
/// derived links live in the owning [`ClassDefinitionCollection`].
#[derive(Debug)]
pub struct ClassDefinition {
    id: String,
    class_type: TypeRef,
    is_abstract: bool,
    storage_provider_id: String,
    entity_name: Option<String>,
    base_class: Option<Arc<ClassDefinition>>,
    properties: PropertyDefinitionCollection,
    relations: OnceLock<RelationDefinitionCollection>,
    persistent_mixins: Vec<TypeHandle>,
}

impl ClassDefinition {
    /// Create a class definition.
    ///
    /// Validates that a resolved class type is a reference type derived
    /// from the persistence root (and not the root itself), that the type
    /// derives from a resolved base class's type, that the storage provider
    /// matches the base class's, and that the persistent-mixin list carries
    /// no duplicates.
    pub fn new(
        id: impl Into<String>,
        class_type: TypeRef,
        storage_provider_id: impl Into<String>,
        is_abstract: bool,
        base_class: Option<&Arc<ClassDefinition>>,
        persistent_mixins: Vec<TypeHandle>,
    ) -> Result<Self, Error> {
        let id = id.into();
        let storage_provider_id = storage_provider_id.into();
        if id.is_empty() {
            return Err(ArgumentError::Empty {
                argument: "class_id",
            }
            .into());
        }
        if storage_provider_id.is_empty() {
            return Err(ArgumentError::Empty {
                argument: "storage_provider_id",
            }
            .into());
        }

        if let Some(handle) = class_type.handle() {
            if !handle.is_class() {
                return Err(MappingError::ClassTypeNotReference {
                    class: id,
                    class_type: handle.name().to_string(),
                }
                .into());
            }
            if handle.is_persistence_root() {
                return Err(MappingError::ClassTypeIsRoot {
                    class: id,
                    class_type: handle.name().to_string(),
                }
                .into());
            }
            if !handle.derives_from_persistence_root() {
                return Err(MappingError::ClassTypeNotDerived {
                    class: id,
                    class_type: handle.name().to_string(),
                }
                .into());
            }
        }

        if let Some(base) = base_class {
            if base.storage_provider_id != storage_provider_id {
                return Err(MappingError::StorageProviderMismatch {
                    class: id,
                    storage_provider: storage_provider_id,
                    base_class: base.id.clone(),
                    base_storage_provider: base.storage_provider_id.clone(),
                }
                .into());
            }
            if let (Some(handle), Some(base_handle)) =
                (class_type.handle(), base.class_type.handle())
            {
                if !handle.derives_from(&base_handle) {
                    return Err(MappingError::BaseTypeMismatch {
                        class: id,
                        class_type: handle.name().to_string(),
                        base_class: base.id.clone(),
                        base_type: base_handle.name().to_string(),
                    }
                    .into());
                }
            }
        }

        let mut seen = HashSet::new();
        for mixin in &persistent_mixins {
            if !seen.insert(mixin.name()) {
                return Err(MappingError::DuplicatePersistentMixin {
                    class: id,
                    mixin: mixin.name().to_string(),
                }
                .into());
            }
        }

        let properties = PropertyDefinitionCollection::new(id.clone());
        Ok(Self {
            id,
            class_type,
            is_abstract,
            storage_provider_id,
            entity_name: None,
            base_class: base_class.cloned(),
            properties,
            relations: OnceLock::new(),
            persistent_mixins,
        })
    }

    /// Set the name of the storage entity backing this class.
    pub fn with_entity_name(mut self, entity_name: impl Into<String>) -> Self {
        self.entity_name = Some(entity_name.into());
        self
    }

    /// Class id, unique within a [`ClassDefinitionCollection`].
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The class's runtime type, possibly deferred to a type name.
    pub fn class_type(&self) -> &TypeRef {
        &self.class_type
    }

    /// Check if the class type has been resolved.
    pub fn is_class_type_resolved(&self) -> bool {
        self.class_type.is_resolved()
    }

    /// Check if the class is abstract.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Id of the storage provider this class's data lives in.
    pub fn storage_provider_id(&self) -> &str {
        &self.storage_provider_id
    }

    /// Entity name declared on this class, if any.
    pub fn my_entity_name(&self) -> Option<&str> {
        self.entity_name.as_deref()
    }

    /// Entity name of this class, falling back to the nearest base class
    /// with a storage entity. `None` for classes with no storage entity
    /// anywhere in the chain.
    pub fn entity_name(&self) -> Option<&str> {
        self.hierarchy().find_map(|class| class.my_entity_name())
    }

    /// Base class, if any.
    pub fn base_class(&self) -> Option<&Arc<ClassDefinition>> {
        self.base_class.as_ref()
    }

    /// The persistent mixins captured when the mapping was built.
    pub fn persistent_mixins(&self) -> &[TypeHandle] {
        &self.persistent_mixins
    }

    /// Iterate this class and its ancestors, most derived first.
    pub(crate) fn hierarchy(&self) -> impl Iterator<Item = &ClassDefinition> {
        std::iter::successors(Some(self), |class| {
            class.base_class().map(|base| base.as_ref())
        })
    }

    /// Add a property to this class.
    ///
    /// Fails when the property's name is already taken by this class or any
    /// ancestor, or when the property records a different owning class.
    pub fn add_property(&mut self, property: PropertyDefinition) -> Result<(), MappingError> {
        for ancestor in self.hierarchy().skip(1) {
            if ancestor.properties.contains_name(property.name()) {
                return Err(MappingError::PropertyDefinedInBaseClass {
                    class: self.id.clone(),
                    property: property.name().to_string(),
                    base_class: ancestor.id.clone(),
                });
            }
        }
        self.properties.add(property)
    }

    /// The properties declared directly on this class.
    pub fn my_property_definitions(&self) -> &PropertyDefinitionCollection {
        &self.properties
    }

    /// Mutable access to the own property set, bypassing the hierarchy
    /// checks of [`ClassDefinition::add_property`].
    pub(crate) fn my_property_definitions_mut(&mut self) -> &mut PropertyDefinitionCollection {
        &mut self.properties
    }

    /// Check if this exact property instance is declared directly on this
    /// class (identity, not equality; inherited properties do not count).
    pub fn contains_property(&self, property: &PropertyDefinition) -> bool {
        self.properties.contains_property(property)
    }

    /// Find a property by name on this class or any ancestor.
    pub fn property_definition(&self, name: &str) -> Option<&Arc<PropertyDefinition>> {
        self.hierarchy().find_map(|class| class.properties.get(name))
    }

    /// Find a property by name, failing if the walk exhausts the hierarchy.
    pub fn mandatory_property_definition(
        &self,
        name: &str,
    ) -> Result<&Arc<PropertyDefinition>, LookupError> {
        self.property_definition(name)
            .ok_or_else(|| LookupError::PropertyNotFound {
                class: self.id.clone(),
                property: name.to_string(),
            })
    }

    /// All properties of this class including inherited ones, own
    /// properties first.
    pub fn property_definitions(&self) -> Vec<&Arc<PropertyDefinition>> {
        self.hierarchy()
            .flat_map(|class| class.properties.iter())
            .collect()
    }

    /// Attach the relations this class participates in. One-time step,
    /// performed after all classes and relations are known.
    pub fn set_relation_definitions(
        &self,
        relations: RelationDefinitionCollection,
    ) -> Result<(), MappingError> {
        self.relations
            .set(relations)
            .map_err(|_| MappingError::RelationsAlreadySet {
                class: self.id.clone(),
            })
    }

    /// The relations this class participates in directly, once set.
    pub fn my_relation_definitions(&self) -> Option<&RelationDefinitionCollection> {
        self.relations.get()
    }

    /// Find the relation involving this class (or an ancestor) and the
    /// given property name.
    pub fn relation_definition(&self, property_name: &str) -> Option<&Arc<RelationDefinition>> {
        for class in self.hierarchy() {
            if let Some(relations) = class.my_relation_definitions() {
                for relation in relations.iter() {
                    if relation.is_end_point(&class.id, property_name) {
                        return Some(relation);
                    }
                }
            }
        }
        None
    }

    /// Find the relation for a property name, failing if none exists.
    pub fn mandatory_relation_definition(
        &self,
        property_name: &str,
    ) -> Result<&Arc<RelationDefinition>, LookupError> {
        self.relation_definition(property_name)
            .ok_or_else(|| LookupError::RelationNotFound {
                class: self.id.clone(),
                property: property_name.to_string(),
            })
    }

    /// All relations of this class including inherited ones, de-duplicated
    /// by id, own relations first.
    pub fn relation_definitions(&self) -> Vec<&Arc<RelationDefinition>> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for class in self.hierarchy() {
            if let Some(relations) = class.my_relation_definitions() {
                for relation in relations.iter() {
                    if seen.insert(relation.id()) {
                        result.push(relation);
                    }
                }
            }
        }
        result
    }

    /// The relation end points owned directly by this class.
    pub fn my_relation_end_point_definitions(&self) -> Vec<&RelationEndPointDefinition> {
        let mut result = Vec::new();
        if let Some(relations) = self.my_relation_definitions() {
            for relation in relations.iter() {
                for end_point in relation.end_point_definitions() {
                    if end_point.class_id() == self.id
                        && !end_point.is_anonymous()
                        && !end_point.is_null()
                    {
                        result.push(end_point);
                    }
                }
            }
        }
        result
    }

    /// The relation end points of this class including inherited ones.
    pub fn relation_end_point_definitions(&self) -> Vec<&RelationEndPointDefinition> {
        self.hierarchy()
            .flat_map(|class| class.my_relation_end_point_definitions())
            .collect()
    }

    /// Find the end point for a property name on this class or an ancestor.
    pub fn relation_end_point_definition(
        &self,
        property_name: &str,
    ) -> Option<&RelationEndPointDefinition> {
        for class in self.hierarchy() {
            if let Some(relations) = class.my_relation_definitions() {
                for relation in relations.iter() {
                    if let Some(end_point) =
                        relation.end_point_definition(&class.id, property_name)
                    {
                        return Some(end_point);
                    }
                }
            }
        }
        None
    }

    /// Check if this exact end-point instance belongs to this class or an
    /// ancestor (identity, not equality).
    pub fn is_relation_end_point(&self, end_point: &RelationEndPointDefinition) -> bool {
        self.relation_end_point_definitions()
            .into_iter()
            .any(|candidate| std::ptr::eq(candidate, end_point))
    }

    /// Check if this exact end-point instance belongs directly to this
    /// class.
    pub fn is_my_relation_end_point(&self, end_point: &RelationEndPointDefinition) -> bool {
        self.my_relation_end_point_definitions()
            .into_iter()
            .any(|candidate| std::ptr::eq(candidate, end_point))
    }

    /// Class definition on the far side of the relation reached through the
    /// given property name.
    pub fn opposite_class_definition<'a>(
        &self,
        classes: &'a ClassDefinitionCollection,
        property_name: &str,
    ) -> Option<&'a Arc<ClassDefinition>> {
        for class in self.hierarchy() {
            if let Some(relations) = class.my_relation_definitions() {
                for relation in relations.iter() {
                    if relation.is_end_point(&class.id, property_name) {
                        return relation.opposite_class_definition(
                            classes,
                            &class.id,
                            property_name,
                        );
                    }
                }
            }
        }
        None
    }

    /// Opposite class definition, failing if no relation exists for the
    /// property name.
    pub fn mandatory_opposite_class_definition<'a>(
        &self,
        classes: &'a ClassDefinitionCollection,
        property_name: &str,
    ) -> Result<&'a Arc<ClassDefinition>, LookupError> {
        self.opposite_class_definition(classes, property_name)
            .ok_or_else(|| LookupError::RelationNotFound {
                class: self.id.clone(),
                property: property_name.to_string(),
            })
    }

    /// The topmost class of this class's inheritance chain; the class
    /// itself when it has no base class.
    pub fn inheritance_root(&self) -> &ClassDefinition {
        let mut current = self;
        while let Some(base) = current.base_class() {
            current = base.as_ref();
        }
        current
    }

    /// All transitively derived classes, each direct subtree flattened in
    /// registration order.
    pub fn all_derived_classes(
        &self,
        classes: &ClassDefinitionCollection,
    ) -> Vec<Arc<ClassDefinition>> {
        let mut result = Vec::new();
        self.collect_derived(classes, &mut result);
        result
    }

    fn collect_derived(
        &self,
        classes: &ClassDefinitionCollection,
        result: &mut Vec<Arc<ClassDefinition>>,
    ) {
        for id in classes.derived_class_ids(&self.id) {
            if let Some(class) = classes.get(id) {
                result.push(class.clone());
                class.collect_derived(classes, result);
            }
        }
    }

    /// Check if `other` is this class or derives from it.
    pub fn is_same_or_base_class_of(&self, other: &ClassDefinition) -> bool {
        other.hierarchy().any(|class| std::ptr::eq(class, self))
    }

    /// Check if this class has a base class or derived classes.
    pub fn is_part_of_inheritance_hierarchy(&self, classes: &ClassDefinitionCollection) -> bool {
        self.base_class.is_some() || !classes.derived_class_ids(&self.id).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::TypeDescriptor;

    fn root() -> TypeHandle {
        TypeDescriptor::persistence_root("DomainObject")
    }

    fn company_class(root: &TypeHandle) -> ClassDefinition {
        ClassDefinition::new(
            "Company",
            TypeRef::resolved(TypeDescriptor::class("Company", root)),
            "P1",
            false,
            None,
            Vec::new(),
        )
        .unwrap()
        .with_entity_name("Company")
    }

    fn string_property(class: &str, name: &str) -> PropertyDefinition {
        PropertyDefinition::persistent(
            class,
            name,
            name,
            TypeRef::resolved(TypeDescriptor::string()),
            None,
            Some(100),
        )
        .unwrap()
    }

    #[test]
    fn test_construction_requires_persistence_root_derivation() {
        let result = ClassDefinition::new(
            "Company",
            TypeRef::resolved(TypeDescriptor::plain_class("Company")),
            "P1",
            false,
            None,
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::ClassTypeNotDerived { .. }))
        ));

        let result = ClassDefinition::new(
            "Root",
            TypeRef::resolved(root()),
            "P1",
            false,
            None,
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::ClassTypeIsRoot { .. }))
        ));

        let result = ClassDefinition::new(
            "Company",
            TypeRef::resolved(TypeDescriptor::string()),
            "P1",
            false,
            None,
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::ClassTypeNotReference { .. }))
        ));
    }

    #[test]
    fn test_derived_class_shares_storage_provider() {
        let root = root();
        let company = Arc::new(company_class(&root));
        let company_type = company.class_type().handle().unwrap();

        let customer = ClassDefinition::new(
            "Customer",
            TypeRef::resolved(TypeDescriptor::class("Customer", &company_type)),
            "P1",
            false,
            Some(&company),
            Vec::new(),
        );
        assert!(customer.is_ok());

        let result = ClassDefinition::new(
            "Customer",
            TypeRef::resolved(TypeDescriptor::class("Customer", &company_type)),
            "P2",
            false,
            Some(&company),
            Vec::new(),
        );
        match result {
            Err(Error::Mapping(MappingError::StorageProviderMismatch {
                storage_provider,
                base_storage_provider,
                ..
            })) => {
                assert_eq!(storage_provider, "P2");
                assert_eq!(base_storage_provider, "P1");
            }
            other => panic!("expected StorageProviderMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_base_type_derivation_checked() {
        let root = root();
        let company = Arc::new(company_class(&root));

        let result = ClassDefinition::new(
            "Order",
            TypeRef::resolved(TypeDescriptor::class("Order", &root)),
            "P1",
            false,
            Some(&company),
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::BaseTypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_duplicate_persistent_mixins_rejected() {
        let root = root();
        let marker = TypeDescriptor::mixin_base("DomainObjectMixin");
        let audit = TypeDescriptor::mixin("AuditMixin", &marker);

        let result = ClassDefinition::new(
            "Company",
            TypeRef::resolved(TypeDescriptor::class("Company", &root)),
            "P1",
            false,
            None,
            vec![audit.clone(), audit],
        );
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::DuplicatePersistentMixin { .. }))
        ));
    }

    #[test]
    fn test_add_property_rejects_base_class_conflict() {
        let root = root();
        let mut company = company_class(&root);
        company.add_property(string_property("Company", "Name")).unwrap();

        let result = company.add_property(string_property("Company", "Name"));
        assert!(matches!(
            result,
            Err(MappingError::DuplicateProperty { .. })
        ));

        let company = Arc::new(company);
        let company_type = company.class_type().handle().unwrap();
        let mut customer = ClassDefinition::new(
            "Customer",
            TypeRef::resolved(TypeDescriptor::class("Customer", &company_type)),
            "P1",
            false,
            Some(&company),
            Vec::new(),
        )
        .unwrap();

        let result = customer.add_property(string_property("Customer", "Name"));
        match result {
            Err(MappingError::PropertyDefinedInBaseClass { base_class, .. }) => {
                assert_eq!(base_class, "Company");
            }
            other => panic!("expected PropertyDefinedInBaseClass, got {:?}", other),
        }
    }

    #[test]
    fn test_property_walk_reaches_base_class() {
        let root = root();
        let mut company = company_class(&root);
        company.add_property(string_property("Company", "Name")).unwrap();
        let company = Arc::new(company);
        let company_type = company.class_type().handle().unwrap();

        let mut customer = ClassDefinition::new(
            "Customer",
            TypeRef::resolved(TypeDescriptor::class("Customer", &company_type)),
            "P1",
            false,
            Some(&company),
            Vec::new(),
        )
        .unwrap();
        customer
            .add_property(string_property("Customer", "CustomerSince"))
            .unwrap();

        assert!(customer.property_definition("Name").is_some());
        assert!(customer.property_definition("CustomerSince").is_some());
        assert!(customer.property_definition("Missing").is_none());

        // Repeated lookups return the same shared instance.
        let first = customer.property_definition("Name").unwrap();
        let second = customer.property_definition("Name").unwrap();
        assert!(Arc::ptr_eq(first, second));

        // Own-set membership does not include inherited properties.
        assert!(company.contains_property(first));
        assert!(!customer.contains_property(first));

        let err = customer.mandatory_property_definition("Missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Class 'Customer' does not contain the property 'Missing'."
        );

        let all = customer.property_definitions();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name(), "CustomerSince");
        assert_eq!(all[1].name(), "Name");
    }

    #[test]
    fn test_entity_name_falls_back_to_base() {
        let root = root();
        let company = Arc::new(company_class(&root));
        let company_type = company.class_type().handle().unwrap();

        let customer = ClassDefinition::new(
            "Customer",
            TypeRef::resolved(TypeDescriptor::class("Customer", &company_type)),
            "P1",
            false,
            Some(&company),
            Vec::new(),
        )
        .unwrap();

        assert!(customer.my_entity_name().is_none());
        assert_eq!(customer.entity_name(), Some("Company"));
        assert_eq!(company.entity_name(), Some("Company"));
    }

    #[test]
    fn test_inheritance_root_and_is_same_or_base() {
        let root = root();
        let company = Arc::new(company_class(&root));
        let company_type = company.class_type().handle().unwrap();
        let customer = Arc::new(
            ClassDefinition::new(
                "Customer",
                TypeRef::resolved(TypeDescriptor::class("Customer", &company_type)),
                "P1",
                false,
                Some(&company),
                Vec::new(),
            )
            .unwrap(),
        );

        assert_eq!(customer.inheritance_root().id(), "Company");
        assert_eq!(company.inheritance_root().id(), "Company");

        assert!(company.is_same_or_base_class_of(&customer));
        assert!(company.is_same_or_base_class_of(&company));
        assert!(!customer.is_same_or_base_class_of(&company));
    }

    #[test]
    fn test_set_relation_definitions_is_one_time() {
        let root = root();
        let company = company_class(&root);

        company
            .set_relation_definitions(RelationDefinitionCollection::new())
            .unwrap();
        let result = company.set_relation_definitions(RelationDefinitionCollection::new());
        assert!(matches!(
            result,
            Err(MappingError::RelationsAlreadySet { .. })
        ));
    }
}
