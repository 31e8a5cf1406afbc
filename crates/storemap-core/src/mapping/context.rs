//! Active-configuration context.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::ConfigurationError;

use super::class::ClassDefinition;
use super::configuration::MappingConfiguration;
use super::end_point::RelationEndPointDefinition;
use super::property::PropertyDefinition;
use super::relation::RelationDefinition;

/// Holds the active mapping configuration for a scope of consumers.
///
/// Consumers receive the context explicitly instead of reading process-wide
/// state. Installation validates that the configuration carries resolved
/// types; [`MappingContext::scoped`] installs a configuration and restores
/// the previous one when the guard drops, so tests and request-scoped code
/// revert automatically.
#[derive(Debug, Default)]
pub struct MappingContext {
    current: RwLock<Option<Arc<MappingConfiguration>>>,
}

impl MappingContext {
    /// Create a context with no active configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the active configuration.
    ///
    /// Fails when the configuration was produced without resolved types.
    pub fn install(
        &self,
        configuration: Arc<MappingConfiguration>,
    ) -> Result<(), ConfigurationError> {
        if !configuration.resolve_types() {
            return Err(ConfigurationError::UnresolvedTypesNotAllowed);
        }
        debug!(
            classes = configuration.class_definitions().len(),
            "mapping configuration installed"
        );
        *self.current.write() = Some(configuration);
        Ok(())
    }

    /// Clear the active configuration.
    pub fn clear(&self) {
        debug!("mapping configuration cleared");
        *self.current.write() = None;
    }

    /// The active configuration, if one is installed.
    pub fn current(&self) -> Option<Arc<MappingConfiguration>> {
        self.current.read().clone()
    }

    /// Install a configuration for the lifetime of the returned guard; the
    /// previously active configuration is restored when the guard drops.
    pub fn scoped(
        &self,
        configuration: Arc<MappingConfiguration>,
    ) -> Result<ScopedConfiguration<'_>, ConfigurationError> {
        if !configuration.resolve_types() {
            return Err(ConfigurationError::UnresolvedTypesNotAllowed);
        }
        let previous = self.current.write().replace(configuration);
        Ok(ScopedConfiguration {
            context: self,
            previous,
        })
    }

    /// Check if this exact class instance belongs to the active
    /// configuration. `false` when no configuration is installed.
    pub fn contains_class(&self, class: &ClassDefinition) -> bool {
        self.current()
            .map(|configuration| configuration.contains_class(class))
            .unwrap_or(false)
    }

    /// Check if this exact property instance belongs to the active
    /// configuration.
    pub fn contains_property_definition(&self, property: &PropertyDefinition) -> bool {
        self.current()
            .map(|configuration| configuration.contains_property_definition(property))
            .unwrap_or(false)
    }

    /// Check if this exact relation instance belongs to the active
    /// configuration.
    pub fn contains_relation_definition(&self, relation: &RelationDefinition) -> bool {
        self.current()
            .map(|configuration| configuration.contains_relation_definition(relation))
            .unwrap_or(false)
    }

    /// Check if this exact end-point instance belongs to the active
    /// configuration.
    pub fn contains_relation_end_point_definition(
        &self,
        end_point: &RelationEndPointDefinition,
    ) -> bool {
        self.current()
            .map(|configuration| {
                configuration.contains_relation_end_point_definition(end_point)
            })
            .unwrap_or(false)
    }
}

/// Guard restoring the previously active configuration on drop.
#[derive(Debug)]
pub struct ScopedConfiguration<'a> {
    context: &'a MappingContext,
    previous: Option<Arc<MappingConfiguration>>,
}

impl Drop for ScopedConfiguration<'_> {
    fn drop(&mut self) {
        *self.context.current.write() = self.previous.take();
    }
}
