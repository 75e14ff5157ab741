//! Ember Scene -- the runtime scene and entity core.
//!
//! This crate builds on [`ember_ecs`] to provide the layer a game runtime
//! and editor sit on: scenes full of identified entities, the built-in
//! component set, per-frame update/render traversals, 2D physics sessions,
//! scene files, and the copy machinery behind play-mode and entity
//! duplication.
//!
//! # Quick Start
//!
//! ```
//! use ember_scene::prelude::*;
//!
//! let scene = Scene::new();
//! let mut renderer = NullRenderer;
//! {
//!     let mut scene = scene.borrow_mut();
//!     let player = scene.create_entity("Player");
//!     scene.add_component(player, SpriteRendererComponent::default());
//!     scene.add_component(player, CameraComponent::default());
//!
//!     scene.on_viewport_resize(1280, 720);
//!     scene.on_runtime_start();
//!     scene.on_update(1.0 / 60.0);
//!     scene.on_update_runtime(1.0 / 60.0, &mut renderer);
//!     scene.on_runtime_stop();
//! }
//! ```
//!
//! Rendering and scripting are consumed through the [`render::SceneRenderer`]
//! and [`script::ScriptHost`] traits; the scene itself never touches a GPU
//! or a script VM.

#![deny(unsafe_code)]

pub mod camera;
pub mod components;
pub mod directory;
pub mod entity;
pub mod lighting;
pub mod physics;
pub mod render;
pub mod scene;
pub mod script;
pub mod serializer;
pub mod uuid;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use ember_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common scene usage.
pub mod prelude {
    // Re-export everything from the ECS prelude.
    pub use ember_ecs::prelude::*;

    pub use crate::camera::{ProjectionType, SceneCamera};
    pub use crate::components::{
        BodyType, BoxCollider2dComponent, CameraComponent, CircleCollider2dComponent,
        CollisionDetection, IdComponent, Material, MeshComponent, MeshHandle,
        PointLightComponent, RigidBody2dComponent, SceneComponent, ScriptComponent,
        SkyLightComponent, SleepType, SpriteRendererComponent, TagComponent, TextureHandle,
        TransformComponent, NULL_SCRIPT_MODULE,
    };
    pub use crate::directory::scene_by_uuid;
    pub use crate::entity::Entity;
    pub use crate::lighting::{LightEnvironment, PointLight, SkyLight};
    pub use crate::physics::{BodyHandle, FixtureHandle, Physics2d};
    pub use crate::render::{EditorCamera, NullRenderer, SceneRenderer};
    pub use crate::scene::{Scene, SceneHandle, FIXED_TIMESTEP};
    pub use crate::script::{NullScriptHost, ScriptHost, ScriptHostHandle};
    pub use crate::serializer::{SceneLoadError, SceneSerializer, SCENE_FORMAT_VERSION};
    pub use crate::uuid::Uuid;
}
