//! # Entity registry - concurrent map from identifier to entity.
//!
//! ## Architecture
//! ```text
//! add(entity)    ──► DashMap::entry(id) ─┬─ Vacant   → insert (strong Arc)
//!                                        └─ Occupied → Err(DuplicateEntity), unchanged
//! get(id)        ──► Some(Arc) | None
//! remove(id)     ──► Some(Arc) | None   (absent is not an error)
//! range(visitor) ──► snapshot Vec<Arc> ──► visitor(e) until Break
//! ```
//!
//! ## Rules
//! - Operations on one identifier are linearizable (sharded locks in `DashMap`).
//! - `range` clones the registered `Arc`s first and runs the visitor with no
//!   lock held, so the visitor may add or remove entities; none is visited twice.
//! - Removal only drops the registry's reference; it never destroys the entity.

use std::ops::ControlFlow;
use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};

use crate::entities::Entity;
use crate::error::RuntimeError;
use crate::uid::Uid;

/// Concurrent registry of entities keyed by [`Uid`].
#[derive(Default)]
pub struct EntityRegistry {
    entities: DashMap<Uid, Arc<dyn Entity>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity.
    ///
    /// Fails with [`RuntimeError::DuplicateEntity`] if the identifier is taken;
    /// the registry is left unchanged in that case.
    pub fn add(&self, entity: Arc<dyn Entity>) -> Result<(), RuntimeError> {
        let id = entity.entity_id();
        match self.entities.entry(id) {
            Entry::Occupied(_) => Err(RuntimeError::DuplicateEntity { id }),
            Entry::Vacant(slot) => {
                slot.insert(entity);
                Ok(())
            }
        }
    }

    /// Looks up an entity.
    pub fn get(&self, id: Uid) -> Option<Arc<dyn Entity>> {
        self.entities.get(&id).map(|e| Arc::clone(e.value()))
    }

    /// Removes an entity and returns the registry's reference to it.
    pub fn remove(&self, id: Uid) -> Option<Arc<dyn Entity>> {
        self.entities.remove(&id).map(|(_, e)| e)
    }

    /// Returns true if `id` is registered.
    pub fn contains(&self, id: Uid) -> bool {
        self.entities.contains_key(&id)
    }

    /// Visits a snapshot of the registered entities in unspecified order.
    pub fn range<F>(&self, mut visitor: F)
    where
        F: FnMut(&Arc<dyn Entity>) -> ControlFlow<()>,
    {
        let snapshot: Vec<Arc<dyn Entity>> =
            self.entities.iter().map(|e| Arc::clone(e.value())).collect();

        for entity in &snapshot {
            if visitor(entity).is_break() {
                break;
            }
        }
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
