//! Relation end-point definitions.

use std::sync::Arc;

use crate::error::MappingError;
use crate::reflect::TypeRef;

use super::property::PropertyDefinition;

/// Cardinality of a relation end point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Single object.
    One,
    /// Collection of objects.
    Many,
}

/// One side of a relation.
///
/// The three variants carry only the fields meaningful to them; consumers
/// dispatch on [`RelationEndPointDefinition::variant`] with `match`.
#[derive(Debug)]
pub enum RelationEndPointVariant {
    /// Scalar side backed by a foreign-key-like property. A concrete end
    /// point without a bound property is the null object: it reports
    /// [`RelationEndPointDefinition::is_null`] and participates in no
    /// lookup that requires a property.
    Concrete {
        /// Id of the owning class.
        class: String,
        /// Backing property, shared with the owning class's property set.
        property: Option<Arc<PropertyDefinition>>,
        /// Whether the association must be set.
        is_mandatory: bool,
    },
    /// Object or collection side with no physical column.
    Virtual {
        /// Id of the owning class.
        class: String,
        /// Property name on the owning class.
        property_name: String,
        /// One or many related objects.
        cardinality: Cardinality,
        /// Whether the association must be set.
        is_mandatory: bool,
        /// Sort expression for the collection side.
        sort_expression: Option<String>,
        /// Declared type, possibly deferred to a type name.
        property_type: TypeRef,
    },
    /// Association partner outside the mapped model. Carries only the
    /// owning class; the side has no property.
    Anonymous {
        /// Id of the owning class.
        class: String,
    },
}

/// One end of a [`super::RelationDefinition`].
#[derive(Debug)]
pub struct RelationEndPointDefinition {
    variant: RelationEndPointVariant,
    relation: Option<String>,
}

impl RelationEndPointDefinition {
    /// Create a concrete end point backed by a property.
    pub fn concrete(
        class: impl Into<String>,
        property: Arc<PropertyDefinition>,
        is_mandatory: bool,
    ) -> Self {
        Self {
            variant: RelationEndPointVariant::Concrete {
                class: class.into(),
                property: Some(property),
                is_mandatory,
            },
            relation: None,
        }
    }

    /// Create a concrete end point with no bound property (null object).
    pub fn unbound(class: impl Into<String>) -> Self {
        Self {
            variant: RelationEndPointVariant::Concrete {
                class: class.into(),
                property: None,
                is_mandatory: false,
            },
            relation: None,
        }
    }

    /// Create a virtual end point.
    pub fn virtual_side(
        class: impl Into<String>,
        property_name: impl Into<String>,
        property_type: TypeRef,
        cardinality: Cardinality,
        is_mandatory: bool,
    ) -> Self {
        Self {
            variant: RelationEndPointVariant::Virtual {
                class: class.into(),
                property_name: property_name.into(),
                cardinality,
                is_mandatory,
                sort_expression: None,
                property_type,
            },
            relation: None,
        }
    }

    /// Create an anonymous end point.
    pub fn anonymous(class: impl Into<String>) -> Self {
        Self {
            variant: RelationEndPointVariant::Anonymous {
                class: class.into(),
            },
            relation: None,
        }
    }

    /// Set the sort expression. Only meaningful on the collection side of a
    /// virtual end point; validated when the relation is constructed.
    pub fn with_sort_expression(mut self, expression: impl Into<String>) -> Self {
        if let RelationEndPointVariant::Virtual {
            sort_expression, ..
        } = &mut self.variant
        {
            *sort_expression = Some(expression.into());
        }
        self
    }

    /// The variant for pattern matching.
    pub fn variant(&self) -> &RelationEndPointVariant {
        &self.variant
    }

    /// Id of the owning class.
    pub fn class_id(&self) -> &str {
        match &self.variant {
            RelationEndPointVariant::Concrete { class, .. } => class,
            RelationEndPointVariant::Virtual { class, .. } => class,
            RelationEndPointVariant::Anonymous { class } => class,
        }
    }

    /// Property name, absent for anonymous and unbound end points.
    pub fn property_name(&self) -> Option<&str> {
        match &self.variant {
            RelationEndPointVariant::Concrete { property, .. } => {
                property.as_ref().map(|property| property.name())
            }
            RelationEndPointVariant::Virtual { property_name, .. } => Some(property_name),
            RelationEndPointVariant::Anonymous { .. } => None,
        }
    }

    /// Backing property of a concrete end point.
    pub fn property_definition(&self) -> Option<&Arc<PropertyDefinition>> {
        match &self.variant {
            RelationEndPointVariant::Concrete { property, .. } => property.as_ref(),
            _ => None,
        }
    }

    /// Declared property type, if the end point has one.
    pub fn property_type(&self) -> Option<&TypeRef> {
        match &self.variant {
            RelationEndPointVariant::Concrete { property, .. } => {
                property.as_ref().map(|property| property.property_type())
            }
            RelationEndPointVariant::Virtual { property_type, .. } => Some(property_type),
            RelationEndPointVariant::Anonymous { .. } => None,
        }
    }

    /// Check if the property type is resolved.
    pub fn is_property_type_resolved(&self) -> bool {
        self.property_type()
            .map(TypeRef::is_resolved)
            .unwrap_or(false)
    }

    /// Cardinality of this side. Concrete end points are always the scalar
    /// side; an anonymous end point stands in for the missing collection
    /// side of a unidirectional relation.
    pub fn cardinality(&self) -> Cardinality {
        match &self.variant {
            RelationEndPointVariant::Concrete { .. } => Cardinality::One,
            RelationEndPointVariant::Virtual { cardinality, .. } => *cardinality,
            RelationEndPointVariant::Anonymous { .. } => Cardinality::Many,
        }
    }

    /// Whether the association must be set. Anonymous sides are never
    /// mandatory.
    pub fn is_mandatory(&self) -> bool {
        match &self.variant {
            RelationEndPointVariant::Concrete { is_mandatory, .. } => *is_mandatory,
            RelationEndPointVariant::Virtual { is_mandatory, .. } => *is_mandatory,
            RelationEndPointVariant::Anonymous { .. } => false,
        }
    }

    /// Sort expression of a virtual collection side.
    pub fn sort_expression(&self) -> Option<&str> {
        match &self.variant {
            RelationEndPointVariant::Virtual {
                sort_expression, ..
            } => sort_expression.as_deref(),
            _ => None,
        }
    }

    /// Check if this is an anonymous end point.
    pub fn is_anonymous(&self) -> bool {
        matches!(self.variant, RelationEndPointVariant::Anonymous { .. })
    }

    /// Check if this is a concrete end point with no bound property.
    pub fn is_null(&self) -> bool {
        matches!(
            self.variant,
            RelationEndPointVariant::Concrete { property: None, .. }
        )
    }

    /// Id of the relation this end point is attached to, once attached.
    pub fn relation_id(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// Check if this end point represents the given class and property.
    /// End points without a property never correspond to anything.
    pub fn corresponds_to(&self, class: &str, property_name: &str) -> bool {
        self.class_id() == class && self.property_name() == Some(property_name)
    }

    pub(crate) fn attach_to(&mut self, relation_id: &str) -> Result<(), MappingError> {
        if let Some(attached_to) = &self.relation {
            return Err(MappingError::EndPointAlreadyAttached {
                class: self.class_id().to_string(),
                attached_to: attached_to.clone(),
            });
        }
        self.relation = Some(relation_id.to_string());
        Ok(())
    }
}
