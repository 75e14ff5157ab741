//! The built-in component set.
//!
//! Every component is plain data: `Clone` + serde, with runtime-only fields
//! (physics handles, GPU handles, snapshots) marked `#[serde(skip)]` so they
//! never leak into scene files. Each type also implements [`SceneComponent`],
//! which gives the scene a place to hook component construction and removal
//! (cameras pick up the viewport size, scripts notify the host) and to strip
//! runtime state when a component is cloned into another entity or scene.

use ember_ecs::entity::EntityId;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::camera::SceneCamera;
use crate::entity::Entity;
use crate::physics::{BodyHandle, FixtureHandle};
use crate::scene::Scene;
use crate::uuid::Uuid;

/// Module name of an unbound script component.
pub const NULL_SCRIPT_MODULE: &str = "Null";

// ---------------------------------------------------------------------------
// SceneComponent
// ---------------------------------------------------------------------------

/// Scene-level behavior shared by all component types.
///
/// The hooks run inside [`Scene::add_component`] /
/// [`Scene::remove_component`], after insertion and before removal
/// respectively. Implementations must not re-enter the scene's `RefCell`
/// through the directory.
pub trait SceneComponent: Clone + 'static {
    /// Called after the component was attached to `entity`.
    fn on_added(_scene: &mut Scene, _entity: EntityId) {}

    /// Called before the component is detached from `entity`.
    fn on_removed(_scene: &mut Scene, _entity: EntityId) {}

    /// Drop state that belongs to a live runtime session (physics handles,
    /// collider snapshots). Used when cloning components across entities or
    /// scenes.
    fn clear_runtime_state(&mut self) {}
}

// ---------------------------------------------------------------------------
// Identity and tag
// ---------------------------------------------------------------------------

/// Stable identity. Attached to every entity the scene creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdComponent {
    pub id: Uuid,
}

impl SceneComponent for IdComponent {}

/// Human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagComponent {
    pub tag: String,
}

impl SceneComponent for TagComponent {}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Position, orientation (Euler angles, radians) and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformComponent {
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "vec3_one")]
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformComponent {
    /// The local-to-world matrix: translate, then rotate, then scale.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_translation(self.translation)
            * Mat4::from_quat(rotation)
            * Mat4::from_scale(self.scale)
    }

    /// Restore all fields to their defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for TransformComponent {}

// ---------------------------------------------------------------------------
// Sprite renderer
// ---------------------------------------------------------------------------

/// Opaque renderer-owned texture identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// 2D quad with a tint color and an optional texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteRendererComponent {
    #[serde(default = "vec4_one")]
    pub color: Vec4,
    /// Live texture, if the renderer has loaded one for `texture_filepath`.
    #[serde(skip)]
    pub texture: Option<TextureHandle>,
    #[serde(default)]
    pub texture_filepath: String,
    #[serde(default = "one")]
    pub tiling_factor: f32,
}

impl Default for SpriteRendererComponent {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            texture: None,
            texture_filepath: String::new(),
            tiling_factor: 1.0,
        }
    }
}

impl SpriteRendererComponent {
    /// Bind a loaded texture and remember where it came from.
    pub fn set_texture(&mut self, handle: TextureHandle, filepath: impl Into<String>) {
        self.texture = Some(handle);
        self.texture_filepath = filepath.into();
    }

    /// Drop the texture binding, reverting to the flat color.
    pub fn remove_texture(&mut self) {
        self.texture = None;
        self.texture_filepath.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for SpriteRendererComponent {}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// A scene camera. The first primary camera in store order drives the
/// runtime render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CameraComponent {
    #[serde(default)]
    pub camera: SceneCamera,
    #[serde(default = "yes")]
    pub primary: bool,
    /// When set, [`Scene::on_viewport_resize`] leaves this camera alone.
    #[serde(default)]
    pub fixed_aspect_ratio: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            camera: SceneCamera::default(),
            primary: true,
            fixed_aspect_ratio: false,
        }
    }
}

impl CameraComponent {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for CameraComponent {
    fn on_added(scene: &mut Scene, entity: EntityId) {
        // New cameras pick up the current viewport immediately.
        let (width, height) = scene.viewport_size();
        if width > 0 && height > 0 {
            if let Some(cam) = scene.registry_mut().get_mut::<CameraComponent>(entity) {
                cam.camera.set_viewport_size(width, height);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mesh
// ---------------------------------------------------------------------------

/// Opaque renderer-owned mesh identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Surface parameters handed to the renderer with each mesh submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "Material-Color", default = "vec3_one")]
    pub color: Vec3,
    #[serde(rename = "Material-Shininess", default = "default_shininess")]
    pub shininess: f32,
    #[serde(rename = "Material-AlbedoTexToggle", default)]
    pub albedo_tex_toggle: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            shininess: default_shininess(),
            albedo_tex_toggle: false,
        }
    }
}

/// A 3D mesh loaded from `asset_path`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MeshComponent {
    /// Live mesh, if the renderer has loaded `asset_path`.
    #[serde(skip)]
    pub mesh: Option<MeshHandle>,
    #[serde(default)]
    pub asset_path: String,
    #[serde(flatten)]
    pub material: Material,
}

impl MeshComponent {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for MeshComponent {}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Binds an entity to a scripting-host module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScriptComponent {
    pub module_name: String,
}

impl Default for ScriptComponent {
    fn default() -> Self {
        Self {
            module_name: NULL_SCRIPT_MODULE.to_owned(),
        }
    }
}

impl ScriptComponent {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Whether the component names a real module rather than the null
    /// sentinel.
    pub fn is_bound(&self) -> bool {
        self.module_name != NULL_SCRIPT_MODULE && !self.module_name.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for ScriptComponent {
    fn on_added(scene: &mut Scene, entity: EntityId) {
        // Fires for every attach path, including scene copies and entity
        // duplication, so the host always learns about new script carriers.
        let handle = Entity::new(entity, scene.uuid());
        let host = scene.script_host();
        host.borrow_mut().init_script_entity(handle);
    }

    fn on_removed(scene: &mut Scene, entity: EntityId) {
        let scene_id = scene.uuid();
        let Some(entity_id) = scene.registry().get::<IdComponent>(entity).map(|c| c.id) else {
            return;
        };
        let host = scene.script_host();
        host.borrow_mut().script_component_destroyed(scene_id, entity_id);
    }
}

// ---------------------------------------------------------------------------
// 2D physics
// ---------------------------------------------------------------------------

/// How the physics solver treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Immovable.
    #[default]
    Static,
    /// Fully simulated.
    Dynamic,
    /// Moved by game logic, never by forces.
    Kinematic,
}

/// Collision detection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionDetection {
    #[default]
    Discrete,
    /// Enables continuous collision detection for fast-moving bodies.
    Continuous,
}

/// Sleep behavior of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SleepType {
    NeverSleep,
    /// Starts the session asleep.
    Sleep,
    #[default]
    Awake,
}

/// A 2D rigid body driven by the scene's physics session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RigidBody2dComponent {
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default)]
    pub fixed_rotation: bool,
    #[serde(rename = "Gravity", default = "one")]
    pub gravity_scale: f32,
    #[serde(default)]
    pub collision_detection: CollisionDetection,
    #[serde(default)]
    pub sleep_type: SleepType,
    /// Handle into the live physics session. `None` outside of play.
    #[serde(skip)]
    pub runtime_body: Option<BodyHandle>,
}

impl Default for RigidBody2dComponent {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            fixed_rotation: false,
            gravity_scale: 1.0,
            collision_detection: CollisionDetection::Discrete,
            sleep_type: SleepType::Awake,
            runtime_body: None,
        }
    }
}

impl RigidBody2dComponent {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for RigidBody2dComponent {
    fn clear_runtime_state(&mut self) {
        self.runtime_body = None;
    }
}

/// Axis-aligned box collider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoxCollider2dComponent {
    #[serde(default)]
    pub offset: Vec2,
    #[serde(default = "vec2_one")]
    pub size: Vec2,
    /// Snapshot of the entity's transform scale, taken at runtime start.
    #[serde(skip, default = "vec2_one")]
    pub scale: Vec2,
    #[serde(default = "one")]
    pub density: f32,
    #[serde(default = "one")]
    pub friction: f32,
    /// Editor-only toggle for the collider bounds overlay.
    #[serde(skip)]
    pub show_bounds: bool,
    /// Handle into the live physics session. `None` outside of play.
    #[serde(skip)]
    pub runtime_fixture: Option<FixtureHandle>,
}

impl Default for BoxCollider2dComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Vec2::ONE,
            scale: Vec2::ONE,
            density: 1.0,
            friction: 1.0,
            show_bounds: false,
            runtime_fixture: None,
        }
    }
}

impl BoxCollider2dComponent {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for BoxCollider2dComponent {
    fn clear_runtime_state(&mut self) {
        self.scale = Vec2::ONE;
        self.runtime_fixture = None;
    }
}

/// Circle collider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CircleCollider2dComponent {
    #[serde(default)]
    pub offset: Vec2,
    #[serde(default = "one")]
    pub radius: f32,
    #[serde(default = "one")]
    pub density: f32,
    #[serde(default = "one")]
    pub friction: f32,
    /// Handle into the live physics session. `None` outside of play.
    #[serde(skip)]
    pub runtime_fixture: Option<FixtureHandle>,
}

impl Default for CircleCollider2dComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            radius: 1.0,
            density: 1.0,
            friction: 1.0,
            runtime_fixture: None,
        }
    }
}

impl CircleCollider2dComponent {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for CircleCollider2dComponent {
    fn clear_runtime_state(&mut self) {
        self.runtime_fixture = None;
    }
}

// ---------------------------------------------------------------------------
// Lights
// ---------------------------------------------------------------------------

/// Ambient light applied to the whole scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkyLightComponent {
    #[serde(default = "vec3_one")]
    pub color: Vec3,
    #[serde(default = "default_sky_intensity")]
    pub intensity: f32,
}

impl Default for SkyLightComponent {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: default_sky_intensity(),
        }
    }
}

impl SkyLightComponent {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for SkyLightComponent {}

/// Point light with distance attenuation. The light's position comes from
/// the entity's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PointLightComponent {
    #[serde(default = "vec3_one")]
    pub color: Vec3,
    #[serde(default = "one")]
    pub intensity: f32,
    #[serde(default = "one")]
    pub constant: f32,
    #[serde(default = "default_linear")]
    pub linear: f32,
    #[serde(default = "default_quadratic")]
    pub quadratic: f32,
}

impl Default for PointLightComponent {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            constant: 1.0,
            linear: default_linear(),
            quadratic: default_quadratic(),
        }
    }
}

impl PointLightComponent {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SceneComponent for PointLightComponent {}

// ---------------------------------------------------------------------------
// serde default helpers
// ---------------------------------------------------------------------------

fn one() -> f32 {
    1.0
}

fn yes() -> bool {
    true
}

fn vec2_one() -> Vec2 {
    Vec2::ONE
}

fn vec3_one() -> Vec3 {
    Vec3::ONE
}

fn vec4_one() -> Vec4 {
    Vec4::ONE
}

fn default_shininess() -> f32 {
    16.0
}

fn default_sky_intensity() -> f32 {
    0.2
}

fn default_linear() -> f32 {
    0.09
}

fn default_quadratic() -> f32 {
    0.032
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
