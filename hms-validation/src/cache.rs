//! Per-type schema cache.

use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Result;
use crate::registry::FilterRegistry;
use crate::schema::{EntitySchema, SchemaBuilder, Validatable};

/// Compiled schemas keyed by the Rust type they were declared for.
///
/// A miss compiles the schema while holding the map entry, so concurrent
/// first requests for the same type build it once and the others observe the
/// finished schema. A failed build caches nothing.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: DashMap<TypeId, Arc<EntitySchema>>,
    builds: AtomicUsize,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema of `T`, compiling it on first use.
    pub fn get_or_build<T: Validatable>(
        &self,
        registry: &FilterRegistry,
    ) -> Result<Arc<EntitySchema>> {
        let key = TypeId::of::<T>();
        if let Some(schema) = self.schemas.get(&key) {
            return Ok(Arc::clone(schema.value()));
        }

        let entry = self.schemas.entry(key).or_try_insert_with(|| {
            let schema = SchemaBuilder::for_type::<T>().compile(registry)?;
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok::<_, crate::error::ValidatorError>(Arc::new(schema))
        })?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn contains<T: Validatable>(&self) -> bool {
        self.schemas.contains_key(&TypeId::of::<T>())
    }

    /// How many schemas have been compiled so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
