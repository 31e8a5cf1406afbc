//! Mixin configuration.

use std::collections::HashMap;

use crate::reflect::TypeHandle;

/// The mixins configured per class type.
///
/// This is the boundary with the mixin subsystem: an order-stable map from
/// a class-type name to the mixins configured at exactly that level.
/// Inherited configuration is handled by [`super::PersistentMixinFinder`]
/// walking the base chain, not by this type.
#[derive(Debug, Clone, Default)]
pub struct MixinConfiguration {
    mixins: HashMap<String, Vec<TypeHandle>>,
}

impl MixinConfiguration {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a mixin for a class type.
    pub fn with_mixin(mut self, class_type: impl Into<String>, mixin: &TypeHandle) -> Self {
        self.add_mixin(class_type, mixin);
        self
    }

    /// Configure a mixin for a class type.
    pub fn add_mixin(&mut self, class_type: impl Into<String>, mixin: &TypeHandle) {
        self.mixins
            .entry(class_type.into())
            .or_default()
            .push(mixin.clone());
    }

    /// The mixins configured at exactly this class-type level, in
    /// configuration order.
    pub fn mixins_for(&self, class_type: &str) -> &[TypeHandle] {
        self.mixins
            .get(class_type)
            .map(|mixins| mixins.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::TypeDescriptor;

    #[test]
    fn test_mixins_for_preserves_order() {
        let marker = TypeDescriptor::mixin_base("DomainObjectMixin");
        let first = TypeDescriptor::mixin("FirstMixin", &marker);
        let second = TypeDescriptor::mixin("SecondMixin", &marker);

        let configuration = MixinConfiguration::new()
            .with_mixin("Company", &first)
            .with_mixin("Company", &second);

        let mixins = configuration.mixins_for("Company");
        assert_eq!(mixins.len(), 2);
        assert_eq!(mixins[0].name(), "FirstMixin");
        assert_eq!(mixins[1].name(), "SecondMixin");
    }

    #[test]
    fn test_unconfigured_type_has_no_mixins() {
        let configuration = MixinConfiguration::new();
        assert!(configuration.mixins_for("Company").is_empty());
    }
}
