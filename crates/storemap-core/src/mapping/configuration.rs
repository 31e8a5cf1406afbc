//! Mapping configuration.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, MappingError};

use super::class_collection::ClassDefinitionCollection;
use super::end_point::RelationEndPointDefinition;
use super::property::PropertyDefinition;
use super::relation::{RelationDefinition, RelationDefinitionCollection};
use super::validator::ClassDefinitionValidator;

/// Boundary with the subsystem that discovers mapping metadata.
///
/// The core calls `class_definitions` once, then `relation_definitions`
/// once with the produced classes, and never calls back afterwards.
pub trait MappingLoader {
    /// Produce the class definitions.
    fn class_definitions(&self) -> Result<ClassDefinitionCollection, MappingError>;

    /// Produce the relation definitions for the given classes.
    fn relation_definitions(
        &self,
        classes: &ClassDefinitionCollection,
    ) -> Result<RelationDefinitionCollection, MappingError>;

    /// Whether the loader guarantees resolved runtime types.
    fn resolve_types(&self) -> bool;
}

/// The published mapping model: class and relation collections wired
/// together, validated, and frozen.
///
/// Built single-threaded, then shared read-only; every query is a pure
/// in-memory traversal.
#[derive(Debug)]
pub struct MappingConfiguration {
    classes: ClassDefinitionCollection,
    relations: RelationDefinitionCollection,
    resolve_types: bool,
}

impl MappingConfiguration {
    /// Build a configuration from a loader.
    ///
    /// Loads classes, then relations; wires each relation into the classes
    /// participating with a mapped, property-bearing end point; validates
    /// the result and freezes both collections.
    pub fn build(loader: &dyn MappingLoader) -> Result<Self, Error> {
        let mut classes = loader.class_definitions()?;
        let mut relations = loader.relation_definitions(&classes)?;

        Self::wire_relations(&classes, &relations)?;
        ClassDefinitionValidator::new(&classes).validate()?;

        classes.set_read_only();
        relations.set_read_only();
        debug!(
            classes = classes.len(),
            relations = relations.len(),
            "mapping configuration built"
        );

        Ok(Self {
            classes,
            relations,
            resolve_types: loader.resolve_types(),
        })
    }

    /// Perform the one-time set-relations step for every class.
    fn wire_relations(
        classes: &ClassDefinitionCollection,
        relations: &RelationDefinitionCollection,
    ) -> Result<(), MappingError> {
        let mut per_class: HashMap<String, RelationDefinitionCollection> = HashMap::new();
        for relation in relations.iter() {
            for end_point in relation.end_point_definitions() {
                if end_point.is_anonymous() || end_point.is_null() {
                    continue;
                }
                if !classes.contains_id(end_point.class_id()) {
                    return Err(MappingError::EndPointClassNotFound {
                        relation: relation.id().to_string(),
                        class: end_point.class_id().to_string(),
                    });
                }
                let class_relations = per_class
                    .entry(end_point.class_id().to_string())
                    .or_default();
                if !class_relations.contains_id(relation.id()) {
                    class_relations.add(relation.clone())?;
                }
            }
        }

        for class in classes.iter() {
            let mut class_relations = per_class.remove(class.id()).unwrap_or_default();
            class_relations.set_read_only();
            class.set_relation_definitions(class_relations)?;
        }
        Ok(())
    }

    /// The class definitions.
    pub fn class_definitions(&self) -> &ClassDefinitionCollection {
        &self.classes
    }

    /// The relation definitions.
    pub fn relation_definitions(&self) -> &RelationDefinitionCollection {
        &self.relations
    }

    /// Whether the producing loader guarantees resolved runtime types.
    pub fn resolve_types(&self) -> bool {
        self.resolve_types
    }

    /// Check if this exact class instance belongs to the configuration
    /// (identity, not equality).
    pub fn contains_class(&self, class: &super::class::ClassDefinition) -> bool {
        self.classes.contains_class(class)
    }

    /// Check if this exact property instance belongs to the configuration.
    pub fn contains_property_definition(&self, property: &PropertyDefinition) -> bool {
        self.classes
            .get(property.class_id())
            .map(|class| class.my_property_definitions().contains_property(property))
            .unwrap_or(false)
    }

    /// Check if this exact relation instance belongs to the configuration.
    pub fn contains_relation_definition(&self, relation: &RelationDefinition) -> bool {
        self.relations.contains_relation(relation)
    }

    /// Check if this exact end-point instance belongs to the configuration.
    pub fn contains_relation_end_point_definition(
        &self,
        end_point: &RelationEndPointDefinition,
    ) -> bool {
        end_point
            .relation_id()
            .and_then(|id| self.relations.get(id))
            .map(|relation| {
                relation
                    .end_point_definitions()
                    .iter()
                    .any(|candidate| std::ptr::eq(candidate, end_point))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mapping::{
        Cardinality, ClassDefinition, RelationEndPointDefinition as EndPoint,
    };
    use crate::reflect::{TypeDescriptor, TypeHandle, TypeRef};

    struct TestDomainLoader {
        root: TypeHandle,
    }

    impl TestDomainLoader {
        fn new() -> Self {
            Self {
                root: TypeDescriptor::persistence_root("DomainObject"),
            }
        }
    }

    impl MappingLoader for TestDomainLoader {
        fn class_definitions(&self) -> Result<ClassDefinitionCollection, MappingError> {
            let mut classes = ClassDefinitionCollection::new(true);

            let mut customer = ClassDefinition::new(
                "Customer",
                TypeRef::resolved(TypeDescriptor::class("Customer", &self.root)),
                "P1",
                false,
                None,
                Vec::new(),
            )
            .unwrap()
            .with_entity_name("Customer");
            customer
                .add_property(
                    PropertyDefinition::persistent(
                        "Customer",
                        "Name",
                        "Name",
                        TypeRef::resolved(TypeDescriptor::string()),
                        None,
                        Some(100),
                    )
                    .unwrap(),
                )
                .unwrap();
            classes.add(Arc::new(customer)).unwrap();

            let mut order = ClassDefinition::new(
                "Order",
                TypeRef::resolved(TypeDescriptor::class("Order", &self.root)),
                "P1",
                false,
                None,
                Vec::new(),
            )
            .unwrap()
            .with_entity_name("Order");
            order
                .add_property(
                    PropertyDefinition::persistent(
                        "Order",
                        "Customer",
                        "CustomerID",
                        TypeRef::resolved(TypeDescriptor::object_id()),
                        None,
                        None,
                    )
                    .unwrap(),
                )
                .unwrap();
            classes.add(Arc::new(order)).unwrap();

            Ok(classes)
        }

        fn relation_definitions(
            &self,
            classes: &ClassDefinitionCollection,
        ) -> Result<RelationDefinitionCollection, MappingError> {
            let order = classes.get_mandatory("Order").map_err(|_| {
                MappingError::EndPointClassNotFound {
                    relation: "CustomerToOrder".to_string(),
                    class: "Order".to_string(),
                }
            })?;
            let customer_property = order
                .my_property_definitions()
                .get("Customer")
                .unwrap()
                .clone();

            let relation = RelationDefinition::new(
                "CustomerToOrder",
                EndPoint::concrete("Order", customer_property, true),
                EndPoint::virtual_side(
                    "Customer",
                    "Orders",
                    TypeRef::named("OrderCollection"),
                    Cardinality::Many,
                    false,
                ),
            )
            .unwrap();

            let mut relations = RelationDefinitionCollection::new();
            relations.add(Arc::new(relation)).unwrap();
            Ok(relations)
        }

        fn resolve_types(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_build_wires_relations_into_classes() {
        let configuration = MappingConfiguration::build(&TestDomainLoader::new()).unwrap();

        assert!(configuration.resolve_types());
        assert!(configuration.class_definitions().is_read_only());
        assert!(configuration.relation_definitions().is_read_only());

        let order = configuration
            .class_definitions()
            .get_mandatory("Order")
            .unwrap();
        let relation = order.relation_definition("Customer").unwrap();
        assert_eq!(relation.id(), "CustomerToOrder");

        let customer = configuration
            .class_definitions()
            .get_mandatory("Customer")
            .unwrap();
        assert_eq!(
            customer.relation_definition("Orders").unwrap().id(),
            "CustomerToOrder"
        );

        let opposite = order
            .opposite_class_definition(configuration.class_definitions(), "Customer")
            .unwrap();
        assert_eq!(opposite.id(), "Customer");
    }

    #[test]
    fn test_contains_queries_use_identity() {
        let configuration = MappingConfiguration::build(&TestDomainLoader::new()).unwrap();

        let order = configuration
            .class_definitions()
            .get_mandatory("Order")
            .unwrap()
            .clone();
        assert!(configuration.contains_class(&order));

        let property = order.my_property_definitions().get("Customer").unwrap();
        assert!(configuration.contains_property_definition(property));

        let relation = configuration
            .relation_definitions()
            .get_mandatory("CustomerToOrder")
            .unwrap();
        assert!(configuration.contains_relation_definition(relation));
        for end_point in relation.end_point_definitions() {
            assert!(configuration.contains_relation_end_point_definition(end_point));
        }

        // A structurally identical configuration holds different instances.
        let other = MappingConfiguration::build(&TestDomainLoader::new()).unwrap();
        let foreign = other.class_definitions().get_mandatory("Order").unwrap();
        assert!(!configuration.contains_class(foreign));
        let foreign_property = foreign.my_property_definitions().get("Customer").unwrap();
        assert!(!configuration.contains_property_definition(foreign_property));
        let foreign_relation = other
            .relation_definitions()
            .get_mandatory("CustomerToOrder")
            .unwrap();
        assert!(!configuration.contains_relation_definition(foreign_relation));
        for end_point in foreign_relation.end_point_definitions() {
            assert!(!configuration.contains_relation_end_point_definition(end_point));
        }
    }

    #[test]
    fn test_unattached_end_point_is_not_contained() {
        let configuration = MappingConfiguration::build(&TestDomainLoader::new()).unwrap();
        let stray = EndPoint::anonymous("Order");
        assert!(!configuration.contains_relation_end_point_definition(&stray));
    }

    struct MissingClassLoader {
        inner: TestDomainLoader,
    }

    impl MappingLoader for MissingClassLoader {
        fn class_definitions(&self) -> Result<ClassDefinitionCollection, MappingError> {
            self.inner.class_definitions()
        }

        fn relation_definitions(
            &self,
            _classes: &ClassDefinitionCollection,
        ) -> Result<RelationDefinitionCollection, MappingError> {
            let relation = RelationDefinition::new(
                "GhostRelation",
                EndPoint::virtual_side(
                    "Ghost",
                    "Orders",
                    TypeRef::named("OrderCollection"),
                    Cardinality::Many,
                    false,
                ),
                EndPoint::anonymous("Order"),
            )
            .unwrap();
            let mut relations = RelationDefinitionCollection::new();
            relations.add(Arc::new(relation)).unwrap();
            Ok(relations)
        }

        fn resolve_types(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_end_point_referencing_missing_class_fails() {
        let loader = MissingClassLoader {
            inner: TestDomainLoader::new(),
        };
        let result = MappingConfiguration::build(&loader);
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::EndPointClassNotFound { .. }))
        ));
    }
}
