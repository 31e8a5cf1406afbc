//! Relation definitions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ArgumentError, Error, LookupError, MappingError};

use super::class_collection::ClassDefinitionCollection;
use super::end_point::{Cardinality, RelationEndPointDefinition};

/// An association between two classes, described by exactly two end points.
///
/// Construction attaches both end points to the relation; a relation is
/// immutable afterwards.
#[derive(Debug)]
pub struct RelationDefinition {
    id: String,
    end_points: [RelationEndPointDefinition; 2],
}

impl RelationDefinition {
    /// Create a relation from its two end points.
    ///
    /// Fails if both end points are anonymous (both sides unmapped), if an
    /// end point is already attached to another relation, or if a
    /// single-object end point carries a sort expression.
    pub fn new(
        id: impl Into<String>,
        mut first: RelationEndPointDefinition,
        mut second: RelationEndPointDefinition,
    ) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() {
            return Err(ArgumentError::Empty {
                argument: "relation_id",
            }
            .into());
        }
        if first.is_anonymous() && second.is_anonymous() {
            return Err(MappingError::BothEndPointsAnonymous { relation: id }.into());
        }
        for end_point in [&first, &second] {
            if end_point.sort_expression().is_some()
                && end_point.cardinality() == Cardinality::One
            {
                return Err(MappingError::SortExpressionOnSingleEndPoint {
                    class: end_point.class_id().to_string(),
                    property: end_point
                        .property_name()
                        .unwrap_or("<anonymous>")
                        .to_string(),
                }
                .into());
            }
        }

        first.attach_to(&id)?;
        second.attach_to(&id)?;

        Ok(Self {
            id,
            end_points: [first, second],
        })
    }

    /// Relation id, unique within a [`RelationDefinitionCollection`].
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The two end points, in construction order.
    pub fn end_point_definitions(&self) -> &[RelationEndPointDefinition; 2] {
        &self.end_points
    }

    /// Check if the given class and property name is one of this relation's
    /// sides.
    pub fn is_end_point(&self, class: &str, property_name: &str) -> bool {
        self.end_points
            .iter()
            .any(|end_point| end_point.corresponds_to(class, property_name))
    }

    /// Get the end point for a class and property name.
    pub fn end_point_definition(
        &self,
        class: &str,
        property_name: &str,
    ) -> Option<&RelationEndPointDefinition> {
        self.end_points
            .iter()
            .find(|end_point| end_point.corresponds_to(class, property_name))
    }

    /// Get the end point opposite to the given class and property name.
    /// Returns `None` when the class and property do not participate.
    pub fn opposite_end_point_definition(
        &self,
        class: &str,
        property_name: &str,
    ) -> Option<&RelationEndPointDefinition> {
        let index = self
            .end_points
            .iter()
            .position(|end_point| end_point.corresponds_to(class, property_name))?;
        Some(&self.end_points[1 - index])
    }

    /// Get the end point opposite to `end_point`, failing when `end_point`
    /// is not one of this relation's two end points (identity, not
    /// equality).
    pub fn mandatory_opposite_end_point_definition(
        &self,
        end_point: &RelationEndPointDefinition,
    ) -> Result<&RelationEndPointDefinition, LookupError> {
        let index = self
            .end_points
            .iter()
            .position(|candidate| std::ptr::eq(candidate, end_point));
        match index {
            Some(index) => Ok(&self.end_points[1 - index]),
            None => Err(LookupError::NoAssociation {
                relation: self.id.clone(),
                class: end_point.class_id().to_string(),
                property: end_point
                    .property_name()
                    .unwrap_or("<anonymous>")
                    .to_string(),
            }),
        }
    }

    /// Id of the class on the opposite side of a class and property name.
    pub fn opposite_class_id(&self, class: &str, property_name: &str) -> Option<&str> {
        self.opposite_end_point_definition(class, property_name)
            .map(|end_point| end_point.class_id())
    }

    /// Class definition on the opposite side, resolved through the class
    /// collection.
    pub fn opposite_class_definition<'a>(
        &self,
        classes: &'a ClassDefinitionCollection,
        class: &str,
        property_name: &str,
    ) -> Option<&'a Arc<super::class::ClassDefinition>> {
        self.opposite_class_id(class, property_name)
            .and_then(|id| classes.get(id))
    }
}

/// Ordered, id-unique container of relation definitions.
#[derive(Debug, Default)]
pub struct RelationDefinitionCollection {
    entries: Vec<Arc<RelationDefinition>>,
    by_id: HashMap<String, usize>,
    read_only: bool,
}

impl RelationDefinitionCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relation.
    pub fn add(&mut self, relation: Arc<RelationDefinition>) -> Result<(), MappingError> {
        if self.read_only {
            return Err(MappingError::ReadOnlyCollection);
        }
        if self.by_id.contains_key(relation.id()) {
            return Err(MappingError::DuplicateRelationId {
                id: relation.id().to_string(),
            });
        }
        self.by_id
            .insert(relation.id().to_string(), self.entries.len());
        self.entries.push(relation);
        Ok(())
    }

    /// Get a relation by id.
    pub fn get(&self, id: &str) -> Option<&Arc<RelationDefinition>> {
        self.by_id.get(id).map(|index| &self.entries[*index])
    }

    /// Get a relation by id, failing if it is absent.
    pub fn get_mandatory(&self, id: &str) -> Result<&Arc<RelationDefinition>, LookupError> {
        self.get(id)
            .ok_or_else(|| LookupError::RelationIdNotFound { id: id.to_string() })
    }

    /// Check membership of this exact instance (identity, not equality).
    pub fn contains_relation(&self, relation: &RelationDefinition) -> bool {
        self.by_id
            .get(relation.id())
            .map(|index| std::ptr::eq(self.entries[*index].as_ref(), relation))
            .unwrap_or(false)
    }

    /// Check if a relation with the given id exists.
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterate relations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RelationDefinition>> {
        self.entries.iter()
    }

    /// Number of relations.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PropertyDefinition;
    use crate::reflect::{TypeDescriptor, TypeRef};

    fn order_to_customer() -> RelationDefinition {
        let customer_property = Arc::new(
            PropertyDefinition::persistent(
                "Order",
                "Customer",
                "CustomerID",
                TypeRef::resolved(TypeDescriptor::object_id()),
                None,
                None,
            )
            .unwrap(),
        );
        RelationDefinition::new(
            "CustomerToOrder",
            RelationEndPointDefinition::concrete("Order", customer_property, true),
            RelationEndPointDefinition::virtual_side(
                "Customer",
                "Orders",
                TypeRef::named("OrderCollection"),
                Cardinality::Many,
                false,
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_attachment_round_trip() {
        let relation = order_to_customer();

        let [first, second] = relation.end_point_definitions();
        assert_eq!(first.relation_id(), Some("CustomerToOrder"));
        assert_eq!(second.relation_id(), Some("CustomerToOrder"));
        assert_eq!(first.class_id(), "Order");
        assert_eq!(second.class_id(), "Customer");
    }

    #[test]
    fn test_both_anonymous_rejected() {
        let result = RelationDefinition::new(
            "Broken",
            RelationEndPointDefinition::anonymous("Client"),
            RelationEndPointDefinition::anonymous("Location"),
        );
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::BothEndPointsAnonymous { .. }))
        ));
    }

    #[test]
    fn test_one_anonymous_side_allowed() {
        let location_client = Arc::new(
            PropertyDefinition::persistent(
                "Location",
                "Client",
                "ClientID",
                TypeRef::resolved(TypeDescriptor::object_id()),
                None,
                None,
            )
            .unwrap(),
        );
        let relation = RelationDefinition::new(
            "ClientToLocation",
            RelationEndPointDefinition::concrete("Location", location_client, true),
            RelationEndPointDefinition::anonymous("Client"),
        )
        .unwrap();

        assert!(relation.is_end_point("Location", "Client"));
        assert_eq!(relation.opposite_class_id("Location", "Client"), Some("Client"));
    }

    #[test]
    fn test_sort_expression_on_single_side_rejected() {
        let result = RelationDefinition::new(
            "Broken",
            RelationEndPointDefinition::virtual_side(
                "Customer",
                "PrimaryOrder",
                TypeRef::named("Order"),
                Cardinality::One,
                false,
            )
            .with_sort_expression("OrderNumber asc"),
            RelationEndPointDefinition::anonymous("Order"),
        );
        assert!(matches!(
            result,
            Err(Error::Mapping(
                MappingError::SortExpressionOnSingleEndPoint { .. }
            ))
        ));
    }

    #[test]
    fn test_opposite_lookups() {
        let relation = order_to_customer();

        let opposite = relation
            .opposite_end_point_definition("Order", "Customer")
            .unwrap();
        assert_eq!(opposite.class_id(), "Customer");
        assert_eq!(opposite.property_name(), Some("Orders"));

        let opposite = relation
            .opposite_end_point_definition("Customer", "Orders")
            .unwrap();
        assert_eq!(opposite.class_id(), "Order");

        assert!(relation
            .opposite_end_point_definition("Order", "Missing")
            .is_none());
        assert!(!relation.is_end_point("Order", "Missing"));
    }

    #[test]
    fn test_mandatory_opposite_rejects_foreign_end_point() {
        let relation = order_to_customer();
        let foreign = RelationEndPointDefinition::virtual_side(
            "Customer",
            "Orders",
            TypeRef::named("OrderCollection"),
            Cardinality::Many,
            false,
        );

        let err = relation
            .mandatory_opposite_end_point_definition(&foreign)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Relation 'CustomerToOrder' has no association with class 'Customer' and property 'Orders'."
        );

        let [first, _] = relation.end_point_definitions();
        let opposite = relation
            .mandatory_opposite_end_point_definition(first)
            .unwrap();
        assert_eq!(opposite.class_id(), "Customer");
    }

    #[test]
    fn test_collection_add_and_mandatory_lookup() {
        let mut collection = RelationDefinitionCollection::new();
        let relation = Arc::new(order_to_customer());
        collection.add(relation.clone()).unwrap();

        assert!(collection.contains_id("CustomerToOrder"));
        assert!(collection.contains_relation(&relation));
        assert!(collection.get_mandatory("CustomerToOrder").is_ok());

        let err = collection.get_mandatory("Missing").unwrap_err();
        assert_eq!(err.to_string(), "Relation 'Missing' does not exist.");
    }

    #[test]
    fn test_collection_rejects_duplicate_id() {
        let mut collection = RelationDefinitionCollection::new();
        collection.add(Arc::new(order_to_customer())).unwrap();

        let result = collection.add(Arc::new(order_to_customer()));
        assert!(matches!(
            result,
            Err(MappingError::DuplicateRelationId { .. })
        ));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_contains_relation_is_identity_based() {
        let mut collection = RelationDefinitionCollection::new();
        collection.add(Arc::new(order_to_customer())).unwrap();

        let twin = order_to_customer();
        assert!(!collection.contains_relation(&twin));
    }
}
