//! Class definition validation.

use crate::error::MappingError;
use crate::mixin::{MixinConfiguration, PersistentMixinFinder};

use super::class::ClassDefinition;
use super::class_collection::ClassDefinitionCollection;

/// Validates a loaded class collection and re-validates a class's
/// persistent-mixin set against the live mixin configuration.
pub struct ClassDefinitionValidator<'a> {
    classes: &'a ClassDefinitionCollection,
}

impl<'a> ClassDefinitionValidator<'a> {
    /// Create a validator over the given classes.
    pub fn new(classes: &'a ClassDefinitionCollection) -> Self {
        Self { classes }
    }

    /// Validate the structural invariants of the collection: every base
    /// class is registered (identity, not equality) and no property name
    /// repeats anywhere in an inheritance chain.
    pub fn validate(&self) -> Result<(), MappingError> {
        for class in self.classes.iter() {
            if let Some(base) = class.base_class() {
                if !self.classes.contains_class(base) {
                    return Err(MappingError::BaseClassNotInCollection {
                        class: class.id().to_string(),
                        base_class: base.id().to_string(),
                    });
                }
            }
            for ancestor in class.hierarchy().skip(1) {
                for property in class.my_property_definitions().iter() {
                    if ancestor
                        .my_property_definitions()
                        .contains_name(property.name())
                    {
                        return Err(MappingError::PropertyDefinedInBaseClass {
                            class: class.id().to_string(),
                            property: property.name().to_string(),
                            base_class: ancestor.id().to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Check that a class's captured persistent-mixin set still matches the
    /// live mixin configuration.
    ///
    /// Walks the base chain; drift on an ancestor is reported against the
    /// ancestor's type name. Mixins contributing no persistent state are
    /// ignored entirely.
    pub fn validate_current_mixin_configuration(
        &self,
        class: &ClassDefinition,
        mixin_configuration: &MixinConfiguration,
    ) -> Result<(), MappingError> {
        let finder = PersistentMixinFinder::new(mixin_configuration);
        for level in class.hierarchy() {
            let Some(class_type) = level.class_type().handle() else {
                continue;
            };
            let current = finder.find_persistent_mixins(&class_type)?;
            let captured = level.persistent_mixins();

            let missing: Vec<&str> = captured
                .iter()
                .filter(|mixin| !current.iter().any(|m| m.name() == mixin.name()))
                .map(|mixin| mixin.name())
                .collect();
            if !missing.is_empty() {
                return Err(MappingError::PersistentMixinsRemoved {
                    class_type: class_type.name().to_string(),
                    mixins: missing.join(", "),
                });
            }

            let added: Vec<&str> = current
                .iter()
                .filter(|mixin| !captured.iter().any(|m| m.name() == mixin.name()))
                .map(|mixin| mixin.name())
                .collect();
            if !added.is_empty() {
                return Err(MappingError::PersistentMixinsAdded {
                    class_type: class_type.name().to_string(),
                    mixins: added.join(", "),
                });
            }
        }
        Ok(())
    }
}
