//! Name to filter lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{Result, ValidatorError};
use crate::filter::Filter;
use crate::filters;

/// Every filter a schema may reference, keyed by name.
///
/// Built once at startup and then shared read-only through an `Arc`.
#[derive(Default, Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in filter.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, filter) in filters::builtins() {
            if let Err(err) = registry.register_arc(name, filter) {
                error!("Skipping built-in filter: {err}");
            }
        }
        debug!("Registered {} built-in filters", registry.len());
        registry
    }

    /// Register `filter` under `name`. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        filter: impl Filter + 'static,
    ) -> Result<()> {
        self.register_arc(name, Arc::new(filter))
    }

    /// Register an already shared filter under `name`.
    pub fn register_arc(&mut self, name: impl Into<String>, filter: Arc<dyn Filter>) -> Result<()> {
        let name = name.into();
        if self.filters.contains_key(&name) {
            return Err(ValidatorError::DuplicateFilter { name });
        }
        debug!(filter = %name, "Registered filter");
        self.filters.insert(name, filter);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.filters.get(name).cloned()
    }

    /// Look up the filter `name` referenced by `entity.field`.
    pub fn resolve(&self, entity: &str, field: &str, name: &str) -> Result<Arc<dyn Filter>> {
        self.get(name).ok_or_else(|| ValidatorError::FilterNotFound {
            entity: entity.to_string(),
            field: field.to_string(),
            filter: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn describe(&self) -> Vec<(&str, &'static str)> {
        let mut entries: Vec<_> = self
            .filters
            .iter()
            .map(|(name, filter)| (name.as_str(), filter.description()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}
