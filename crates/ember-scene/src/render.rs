//! Renderer seam.
//!
//! The scene never talks to a GPU. Each traversal drives a
//! [`SceneRenderer`] implementation: the real engine binds its 2D/3D
//! renderers here, tests bind a recording double, and [`NullRenderer`]
//! drops everything on the floor.

use glam::{Mat4, Vec3};

use crate::components::{Material, MeshComponent, SpriteRendererComponent};
use crate::lighting::LightEnvironment;

/// External camera used by the editor traversal, in place of an in-scene
/// camera entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorCamera {
    /// World-space viewer position, used for lighting.
    pub position: Vec3,
    /// Combined view-projection matrix.
    pub view_projection: Mat4,
}

/// What the scene needs from a renderer.
///
/// Calls arrive in a fixed shape per frame: one `begin_scene` /
/// `draw_sprite`* / `end_scene` block for the 2D pass, then
/// `render_lights` + `submit_mesh` per mesh for the 3D pass, and (editor
/// only) a `begin_wireframe` / `draw_debug_quad`* / `end_wireframe` block
/// for overlays.
pub trait SceneRenderer {
    /// Start the 2D pass with the camera's view-projection.
    fn begin_scene(&mut self, view_projection: Mat4);

    /// Draw one sprite with its world transform.
    fn draw_sprite(&mut self, transform: Mat4, sprite: &SpriteRendererComponent);

    /// Finish the 2D pass.
    fn end_scene(&mut self);

    /// Upload the frame's lights for the next mesh submission.
    fn render_lights(&mut self, lights: &LightEnvironment, viewer: Vec3, material: &Material);

    /// Draw one mesh with its world transform.
    fn submit_mesh(&mut self, mesh: &MeshComponent, transform: Mat4);

    /// Start the wireframe overlay pass.
    fn begin_wireframe(&mut self);

    /// Draw a unit overlay quad with the given transform.
    fn draw_debug_quad(&mut self, transform: Mat4);

    /// Finish the wireframe overlay pass.
    fn end_wireframe(&mut self);
}

/// A renderer that ignores everything. Useful for headless runs.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl SceneRenderer for NullRenderer {
    fn begin_scene(&mut self, _view_projection: Mat4) {}
    fn draw_sprite(&mut self, _transform: Mat4, _sprite: &SpriteRendererComponent) {}
    fn end_scene(&mut self) {}
    fn render_lights(&mut self, _lights: &LightEnvironment, _viewer: Vec3, _material: &Material) {}
    fn submit_mesh(&mut self, _mesh: &MeshComponent, _transform: Mat4) {}
    fn begin_wireframe(&mut self) {}
    fn draw_debug_quad(&mut self, _transform: Mat4) {}
    fn end_wireframe(&mut self) {}
}
