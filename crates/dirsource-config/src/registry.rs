//! Registry for parsed context-source definitions
//!
//! The registry is the collaborator the parser registers its output with.
//! It holds one definition per id and preserves registration order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::ContextSourceProxyDefinition;
use crate::error::{ConfigError, ConfigResult};

/// Holds registered context-source definitions by id.
#[derive(Debug, Default)]
pub struct ContextSourceRegistry {
    definitions: HashMap<String, Arc<ContextSourceProxyDefinition>>,
    order: Vec<String>,
}

impl ContextSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its id.
    ///
    /// A second definition under the same id is rejected; the first
    /// registration stays intact.
    pub fn register(
        &mut self,
        definition: ContextSourceProxyDefinition,
    ) -> ConfigResult<Arc<ContextSourceProxyDefinition>> {
        let id = definition.id.clone();
        if self.definitions.contains_key(&id) {
            return Err(ConfigError::DuplicateDefinition { id });
        }

        let definition = Arc::new(definition);
        self.definitions.insert(id.clone(), definition.clone());
        self.order.push(id);
        Ok(definition)
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&Arc<ContextSourceProxyDefinition>> {
        self.definitions.get(id)
    }

    /// Check whether an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
