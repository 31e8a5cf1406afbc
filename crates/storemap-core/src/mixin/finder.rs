//! Persistent-mixin discovery.

use crate::error::MappingError;
use crate::reflect::TypeHandle;

use super::configuration::MixinConfiguration;

/// Finds the mixins contributing persistent state to a class type.
///
/// The finder walks the type's base chain, so mixins configured only on a
/// base type are included in a derived type's result. Each mixin is
/// reported exactly once; a mixin configured on a base type is suppressed
/// when a more derived configuration level carries the same mixin or an
/// override deriving from it.
pub struct PersistentMixinFinder<'a> {
    configuration: &'a MixinConfiguration,
}

impl<'a> PersistentMixinFinder<'a> {
    /// Create a finder over the given mixin configuration.
    pub fn new(configuration: &'a MixinConfiguration) -> Self {
        Self { configuration }
    }

    /// Collect the persistence-relevant mixins applied to `class_type`,
    /// most derived configuration level first.
    pub fn find_persistent_mixins(
        &self,
        class_type: &TypeHandle,
    ) -> Result<Vec<TypeHandle>, MappingError> {
        let mut found: Vec<TypeHandle> = Vec::new();
        let mut current = Some(class_type);

        while let Some(level) = current {
            for mixin in self.configuration.mixins_for(level.name()) {
                if !mixin.is_persistent_mixin() {
                    continue;
                }
                if mixin.has_open_generic_params() {
                    return Err(MappingError::OpenGenericMixin {
                        mixin: mixin.name().to_string(),
                        class: class_type.name().to_string(),
                    });
                }
                let already_found = found
                    .iter()
                    .any(|existing| existing.name() == mixin.name() || existing.derives_from(mixin));
                if !already_found {
                    found.push(mixin.clone());
                }
            }
            current = level.base();
        }

        Ok(found)
    }
}
