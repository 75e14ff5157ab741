//! Entity handles.

use ember_ecs::entity::EntityId;

use crate::directory;
use crate::scene::SceneHandle;
use crate::uuid::Uuid;

/// A lightweight, copyable reference to an entity inside a scene.
///
/// The handle owns nothing: all data lives in the scene's registry, and a
/// handle held across a destroy simply stops resolving. The scene itself is
/// found through the scene [`directory`] by UUID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Entity {
    /// Registry handle within the owning scene.
    pub id: EntityId,
    /// UUID of the owning scene.
    pub scene: Uuid,
}

impl Entity {
    /// Build a handle from its parts.
    pub fn new(id: EntityId, scene: Uuid) -> Self {
        Self { id, scene }
    }

    /// Resolve the owning scene, if it still exists on this thread.
    pub fn scene(&self) -> Option<SceneHandle> {
        directory::scene_by_uuid(self.scene)
    }

    /// Whether the handle still refers to a live entity.
    pub fn is_alive(&self) -> bool {
        self.scene()
            .is_some_and(|scene| scene.borrow().registry().is_alive(self.id))
    }
}
