//! # Entity capability.
//!
//! An entity is any shareable object with a stable [`Uid`]. The registry holds
//! it as `Arc<dyn Entity>`; callers recover the concrete type with
//! `dyn Entity::downcast_ref`.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use appvisor::{Entity, Uid};
//!
//! struct Player { id: Uid, name: &'static str }
//!
//! impl Entity for Player {
//!     fn entity_id(&self) -> Uid { self.id }
//! }
//!
//! let e: Arc<dyn Entity> = Arc::new(Player { id: Uid::MIN, name: "ada" });
//! assert_eq!(e.downcast_ref::<Player>().map(|p| p.name), Some("ada"));
//! ```

use std::any::Any;

use crate::uid::Uid;

/// Uniquely identified object that can live in an [`App`](crate::App) registry.
pub trait Entity: Any + Send + Sync {
    /// Identifier; must not change while the entity is registered.
    fn entity_id(&self) -> Uid;
}

impl dyn Entity {
    /// Returns true if the entity's concrete type is `T`.
    pub fn is<T: Entity>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Borrows the entity as its concrete type `T`.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
