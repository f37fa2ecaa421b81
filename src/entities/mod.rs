//! Entities and their registry.
//!
//! - [`Entity`]: capability trait (`entity_id`);
//! - [`EntityRegistry`]: concurrent `Uid → Arc<dyn Entity>` map owned by an [`App`](crate::App).

mod entity;
mod registry;

pub use entity::Entity;
pub use registry::EntityRegistry;
