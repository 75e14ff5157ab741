//! Scripting-host seam.
//!
//! The scene drives scripts through [`ScriptHost`] without knowing what
//! executes them. Hosts are shared `Rc<RefCell<..>>` handles so a scene and
//! its copies can point at the same host.
//!
//! Host implementations are called while the invoking scene is mutably
//! borrowed, so they must not resolve that scene through the directory
//! during a callback.

use std::cell::RefCell;
use std::rc::Rc;

use crate::entity::Entity;
use crate::uuid::Uuid;

/// Shared handle to a script host.
pub type ScriptHostHandle = Rc<RefCell<dyn ScriptHost>>;

/// What the scene needs from a scripting backend.
pub trait ScriptHost {
    /// Bind subsequent instantiations to a scene. Called at runtime start.
    fn set_scene_context(&mut self, scene: Uuid);

    /// Whether a script module with this name exists.
    fn module_exists(&self, module: &str) -> bool;

    /// Create the script instance for an entity whose module exists.
    /// Called once per scripted entity at runtime start.
    fn instantiate_entity_class(&mut self, entity: Entity);

    /// A script component appeared on an entity (freshly added, copied, or
    /// duplicated).
    fn init_script_entity(&mut self, entity: Entity);

    /// A script component is about to disappear (component removal or
    /// entity destruction).
    fn script_component_destroyed(&mut self, scene: Uuid, entity: Uuid);

    /// Per-frame variable-timestep update.
    fn on_update_entity(&mut self, entity: Entity, ts: f32);

    /// Per-frame fixed-timestep update.
    fn on_fixed_update_entity(&mut self, entity: Entity, fixed_ts: f32);

    /// Whether the host holds live script instances for a scene. Gates the
    /// script-data pass of a scene copy.
    fn has_entity_instances(&self, scene: Uuid) -> bool;

    /// Copy per-instance script state from `src` onto `dst`.
    fn copy_entity_script_data(&mut self, dst: Entity, src: Entity);

    /// A scene was dropped; release anything held for it.
    fn scene_destructed(&mut self, scene: Uuid);
}

/// A host with no modules and no instances. The default for scenes created
/// without scripting.
#[derive(Debug, Default)]
pub struct NullScriptHost;

impl ScriptHost for NullScriptHost {
    fn set_scene_context(&mut self, _scene: Uuid) {}

    fn module_exists(&self, _module: &str) -> bool {
        false
    }

    fn instantiate_entity_class(&mut self, _entity: Entity) {}
    fn init_script_entity(&mut self, _entity: Entity) {}
    fn script_component_destroyed(&mut self, _scene: Uuid, _entity: Uuid) {}
    fn on_update_entity(&mut self, _entity: Entity, _ts: f32) {}
    fn on_fixed_update_entity(&mut self, _entity: Entity, _fixed_ts: f32) {}

    fn has_entity_instances(&self, _scene: Uuid) -> bool {
        false
    }

    fn copy_entity_script_data(&mut self, _dst: Entity, _src: Entity) {}
    fn scene_destructed(&mut self, _scene: Uuid) {}
}
