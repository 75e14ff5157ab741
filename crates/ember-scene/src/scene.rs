//! Scene lifecycle and per-frame traversals.
//!
//! A [`Scene`] owns an ECS [`Registry`], a UUID-to-entity map, the per-scene
//! physics session, and the seams to the renderer and script host. Scenes
//! are handed out as [`SceneHandle`]s (`Rc<RefCell<Scene>>`) and register
//! themselves in the scene [`directory`](crate::directory) so UUID-bearing
//! handles can find their way back.
//!
//! # Frame shape
//!
//! During play the driver calls [`Scene::on_update`] (physics step) and
//! [`Scene::on_update_runtime`] (camera selection, render passes, script
//! updates) each frame. While paused only `on_update` keeps running, so the
//! simulation continues to integrate while rendering and scripts stand
//! still. The editor drives [`Scene::on_update_editor`] with an external
//! camera instead.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ember_ecs::entity::EntityId;
use ember_ecs::registry::Registry;
use ember_ecs::EcsError;
use glam::{Mat4, Vec2, Vec3};

use crate::components::{
    BoxCollider2dComponent, CameraComponent, CircleCollider2dComponent, IdComponent,
    MeshComponent, PointLightComponent, RigidBody2dComponent, SceneComponent, ScriptComponent,
    SkyLightComponent, SpriteRendererComponent, TagComponent, TransformComponent,
};
use crate::directory;
use crate::entity::Entity;
use crate::lighting::LightEnvironment;
use crate::physics::Physics2d;
use crate::render::{EditorCamera, SceneRenderer};
use crate::script::{NullScriptHost, ScriptHostHandle};
use crate::uuid::Uuid;

/// Fixed timestep handed to script fixed updates, in seconds.
pub const FIXED_TIMESTEP: f32 = 0.02;

/// Shared, interior-mutable scene handle.
pub type SceneHandle = Rc<RefCell<Scene>>;

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A runtime scene: entities, their components, and the session state that
/// drives them.
pub struct Scene {
    uuid: Uuid,
    registry: Registry,
    /// UUID to registry handle for every live entity.
    entity_map: HashMap<Uuid, EntityId>,
    viewport_width: u32,
    viewport_height: u32,
    is_playing: bool,
    physics: Physics2d,
    lights: LightEnvironment,
    script_host: ScriptHostHandle,
}

impl Scene {
    /// Create a scene with no scripting backend.
    pub fn new() -> SceneHandle {
        Self::with_script_host(Rc::new(RefCell::new(NullScriptHost)))
    }

    /// Create a scene bound to a script host.
    pub fn with_script_host(script_host: ScriptHostHandle) -> SceneHandle {
        let uuid = Uuid::generate();
        let scene = Rc::new(RefCell::new(Scene {
            uuid,
            registry: Registry::new(),
            entity_map: HashMap::new(),
            viewport_width: 0,
            viewport_height: 0,
            is_playing: false,
            physics: Physics2d::new(),
            lights: LightEnvironment::default(),
            script_host,
        }));
        directory::register(uuid, &scene);
        tracing::debug!(scene = %uuid, "scene created");
        scene
    }

    // -- accessors ----------------------------------------------------------

    /// The scene's UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Shared access to the underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the underlying registry.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The UUID-to-handle map of live entities.
    pub fn entity_map(&self) -> &HashMap<Uuid, EntityId> {
        &self.entity_map
    }

    /// Current viewport size as `(width, height)`.
    pub fn viewport_size(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    /// Whether a runtime session is active.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The bound script host.
    pub fn script_host(&self) -> ScriptHostHandle {
        Rc::clone(&self.script_host)
    }

    /// Replace the script host. Only meaningful before runtime start.
    pub fn set_script_host(&mut self, host: ScriptHostHandle) {
        self.script_host = host;
    }

    /// The lights gathered by the most recent render traversal.
    pub fn lights(&self) -> &LightEnvironment {
        &self.lights
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Create an entity with a fresh UUID.
    ///
    /// The entity always gets an [`IdComponent`] and a default
    /// [`TransformComponent`]; a [`TagComponent`] is attached only when
    /// `name` is non-empty.
    pub fn create_entity(&mut self, name: &str) -> Entity {
        self.create_entity_with_id(Uuid::generate(), name)
    }

    /// Create an entity with a caller-provided UUID (deserialization, scene
    /// copies).
    ///
    /// # Panics
    ///
    /// Panics if the UUID is already present in this scene.
    pub fn create_entity_with_id(&mut self, uuid: Uuid, name: &str) -> Entity {
        assert!(
            !self.entity_map.contains_key(&uuid),
            "entity UUID {uuid} already exists in scene {}",
            self.uuid
        );
        let id = self.registry.spawn();
        self.attach(id, IdComponent { id: uuid });
        self.attach(id, TransformComponent::default());
        if !name.is_empty() {
            self.attach(
                id,
                TagComponent {
                    tag: name.to_owned(),
                },
            );
        }
        self.entity_map.insert(uuid, id);
        Entity::new(id, self.uuid)
    }

    /// Destroy an entity and everything attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is dead or stale.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.registry.is_alive(entity.id) {
            return Err(EcsError::StaleEntity(entity.id));
        }
        if self.registry.has::<ScriptComponent>(entity.id) {
            ScriptComponent::on_removed(self, entity.id);
        }
        let uuid = self.registry.get::<IdComponent>(entity.id).map(|c| c.id);
        self.registry.despawn(entity.id)?;
        if let Some(uuid) = uuid {
            self.entity_map.remove(&uuid);
        }
        Ok(())
    }

    /// Resolve an entity by UUID.
    pub fn entity_by_uuid(&self, uuid: Uuid) -> Option<Entity> {
        self.entity_map
            .get(&uuid)
            .map(|&id| Entity::new(id, self.uuid))
    }

    /// The first entity whose tag equals `tag`, in creation order.
    pub fn find_entity_by_tag(&self, tag: &str) -> Option<Entity> {
        for &id in self.registry.entities() {
            if self
                .registry
                .get::<TagComponent>(id)
                .is_some_and(|t| t.tag == tag)
            {
                return Some(Entity::new(id, self.uuid));
            }
        }
        None
    }

    /// The UUID of an entity, if it is alive in this scene.
    pub fn entity_uuid(&self, entity: Entity) -> Option<Uuid> {
        self.registry.get::<IdComponent>(entity.id).map(|c| c.id)
    }

    // -- component access ---------------------------------------------------

    /// Attach a component, firing its `on_added` hook.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead or already has a component of this
    /// type.
    pub fn add_component<T: SceneComponent>(&mut self, entity: Entity, component: T) {
        self.attach(entity.id, component);
        T::on_added(self, entity.id);
    }

    /// Attach a component, replacing any existing one. Fires `on_added`.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead.
    pub fn add_or_replace_component<T: SceneComponent>(&mut self, entity: Entity, component: T) {
        match self.registry.insert_or_replace(entity.id, component) {
            Ok(_) => T::on_added(self, entity.id),
            Err(err) => panic!("cannot attach component: {err}"),
        }
    }

    /// Shared access to a component the entity is known to have.
    ///
    /// # Panics
    ///
    /// Panics if the component is absent. Use
    /// [`get_component`](Self::get_component) for a fallible lookup.
    pub fn component<T: SceneComponent>(&self, entity: Entity) -> &T {
        self.registry.get(entity.id).unwrap_or_else(|| {
            panic!(
                "entity {} has no {} component",
                entity.id,
                std::any::type_name::<T>()
            )
        })
    }

    /// Mutable access to a component the entity is known to have.
    ///
    /// # Panics
    ///
    /// Panics if the component is absent.
    pub fn component_mut<T: SceneComponent>(&mut self, entity: Entity) -> &mut T {
        let id = entity.id;
        self.registry.get_mut(id).unwrap_or_else(|| {
            panic!(
                "entity {} has no {} component",
                id,
                std::any::type_name::<T>()
            )
        })
    }

    /// Shared access to a component, `None` if absent.
    pub fn get_component<T: SceneComponent>(&self, entity: Entity) -> Option<&T> {
        self.registry.get(entity.id)
    }

    /// Mutable access to a component, `None` if absent.
    pub fn get_component_mut<T: SceneComponent>(&mut self, entity: Entity) -> Option<&mut T> {
        self.registry.get_mut(entity.id)
    }

    /// Whether the entity has a component of type `T`.
    pub fn has_component<T: SceneComponent>(&self, entity: Entity) -> bool {
        self.registry.has::<T>(entity.id)
    }

    /// Detach and return a component, firing its `on_removed` hook first.
    /// `None` if absent.
    pub fn remove_component<T: SceneComponent>(&mut self, entity: Entity) -> Option<T> {
        if !self.registry.has::<T>(entity.id) {
            return None;
        }
        T::on_removed(self, entity.id);
        self.registry.remove(entity.id)
    }

    /// Insert-or-panic for internal attach paths where the entity is known
    /// to be alive.
    fn attach<T: 'static>(&mut self, id: EntityId, value: T) {
        if let Err(err) = self.registry.insert(id, value) {
            panic!("cannot attach component: {err}");
        }
    }

    // -- runtime session ----------------------------------------------------

    /// Start a play session: bind the script host, instantiate scripts,
    /// snapshot collider scales, and build the physics session. Calling
    /// this while already playing is a no-op.
    pub fn on_runtime_start(&mut self) {
        if self.is_playing {
            return;
        }
        self.is_playing = true;

        let host = self.script_host();
        host.borrow_mut().set_scene_context(self.uuid);
        for (id, module) in self.scripted_entities() {
            if host.borrow().module_exists(&module) {
                host.borrow_mut()
                    .instantiate_entity_class(Entity::new(id, self.uuid));
            }
        }

        // Colliders bake the transform scale at session start; editing the
        // transform mid-session does not resize the collider.
        let boxed: Vec<EntityId> = self
            .registry
            .view::<BoxCollider2dComponent>()
            .map(|(id, _)| id)
            .collect();
        for id in boxed {
            let scale = self
                .registry
                .get::<TransformComponent>(id)
                .map(|t| Vec2::new(t.scale.x, t.scale.y));
            if let (Some(scale), Some(bc)) =
                (scale, self.registry.get_mut::<BoxCollider2dComponent>(id))
            {
                bc.scale = scale;
            }
        }

        self.physics.init(&mut self.registry);
        tracing::info!(scene = %self.uuid, "runtime started");
    }

    /// Stop the play session and tear down physics. Idempotent.
    pub fn on_runtime_stop(&mut self) {
        if !self.is_playing {
            return;
        }
        self.is_playing = false;
        self.physics.shutdown(&mut self.registry);
        tracing::info!(scene = %self.uuid, "runtime stopped");
    }

    /// Advance the simulation by `ts` seconds.
    ///
    /// Runs every frame, paused or not; only the render/script traversal
    /// stops while paused.
    pub fn on_update(&mut self, ts: f32) {
        self.physics.simulate(ts, &mut self.registry);
    }

    /// The runtime frame traversal: pick the primary camera, run the 2D and
    /// 3D passes, then update scripts.
    ///
    /// Without a primary camera the render passes are skipped entirely, but
    /// script updates still run.
    pub fn on_update_runtime(&mut self, ts: f32, renderer: &mut dyn SceneRenderer) {
        let mut main_camera: Option<(Mat4, Vec3)> = None;
        for (id, cam) in self.registry.view::<CameraComponent>() {
            if !cam.primary {
                continue;
            }
            if let Some(t) = self.registry.get::<TransformComponent>(id) {
                main_camera = Some((
                    cam.camera.projection() * t.matrix().inverse(),
                    t.translation,
                ));
                break;
            }
        }

        if let Some((view_projection, camera_position)) = main_camera {
            self.render_passes(view_projection, camera_position, renderer);
        }

        self.update_scripts(ts);
    }

    /// The editor frame traversal: render with an external camera and draw
    /// collider-bounds overlays. Scripts do not run in the editor.
    pub fn on_update_editor(
        &mut self,
        _ts: f32,
        camera: &EditorCamera,
        renderer: &mut dyn SceneRenderer,
    ) {
        self.render_passes(camera.view_projection, camera.position, renderer);

        renderer.begin_wireframe();
        for (_, transform, bc) in self
            .registry
            .group::<TransformComponent, BoxCollider2dComponent>()
        {
            if !bc.show_bounds {
                continue;
            }
            // Lift the overlay slightly above the sprite plane.
            let overlay = transform.matrix()
                * Mat4::from_translation(Vec3::new(bc.offset.x, bc.offset.y, 0.01))
                * Mat4::from_scale(Vec3::new(bc.size.x, bc.size.y, 1.0));
            renderer.draw_debug_quad(overlay);
        }
        renderer.end_wireframe();
    }

    /// Record the viewport size and push it to every camera that does not
    /// keep a fixed aspect ratio.
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
        let cameras: Vec<EntityId> = self
            .registry
            .view::<CameraComponent>()
            .map(|(id, _)| id)
            .collect();
        for id in cameras {
            if let Some(cam) = self.registry.get_mut::<CameraComponent>(id) {
                if !cam.fixed_aspect_ratio {
                    cam.camera.set_viewport_size(width, height);
                }
            }
        }
    }

    /// The first entity whose camera is marked primary, in component store
    /// order.
    pub fn primary_camera_entity(&self) -> Option<Entity> {
        self.registry
            .view::<CameraComponent>()
            .find(|(_, cam)| cam.primary)
            .map(|(id, _)| Entity::new(id, self.uuid))
    }

    fn render_passes(
        &mut self,
        view_projection: Mat4,
        viewer: Vec3,
        renderer: &mut dyn SceneRenderer,
    ) {
        // 2D pass.
        renderer.begin_scene(view_projection);
        for (_, transform, sprite) in self
            .registry
            .group::<TransformComponent, SpriteRendererComponent>()
        {
            renderer.draw_sprite(transform.matrix(), sprite);
        }
        renderer.end_scene();

        // 3D pass.
        self.lights.rebuild(&self.registry);
        for (_, transform, mesh) in self.registry.group::<TransformComponent, MeshComponent>() {
            renderer.render_lights(&self.lights, viewer, &mesh.material);
            renderer.submit_mesh(mesh, transform.matrix());
        }
    }

    fn update_scripts(&mut self, ts: f32) {
        let host = self.script_host();
        for (id, module) in self.scripted_entities() {
            if host.borrow().module_exists(&module) {
                let entity = Entity::new(id, self.uuid);
                host.borrow_mut().on_update_entity(entity, ts);
                host.borrow_mut().on_fixed_update_entity(entity, FIXED_TIMESTEP);
            }
        }
    }

    fn scripted_entities(&self) -> Vec<(EntityId, String)> {
        self.registry
            .view::<ScriptComponent>()
            .map(|(id, script)| (id, script.module_name.clone()))
            .collect()
    }

    // -- copy engine --------------------------------------------------------

    /// Replicate this scene's entities into `target`.
    ///
    /// Entity UUIDs are preserved; all components are deep-copied with
    /// runtime state cleared; the target's own UUID, script host, and play
    /// state are untouched. If the target's script host already holds
    /// instances for it, per-entity script data is copied as well.
    ///
    /// # Panics
    ///
    /// Panics if `target` already contains an entity with a UUID present in
    /// this scene.
    pub fn copy_scene_to(&self, target: &mut Scene) {
        target.viewport_width = self.viewport_width;
        target.viewport_height = self.viewport_height;

        for &src_id in self.registry.entities() {
            let Some(idc) = self.registry.get::<IdComponent>(src_id) else {
                continue;
            };
            let name = self
                .registry
                .get::<TagComponent>(src_id)
                .map(|t| t.tag.clone())
                .unwrap_or_default();
            target.create_entity_with_id(idc.id, &name);
        }

        self.copy_components::<TagComponent>(target);
        self.copy_components::<TransformComponent>(target);
        self.copy_components::<MeshComponent>(target);
        self.copy_components::<CameraComponent>(target);
        self.copy_components::<SpriteRendererComponent>(target);
        self.copy_components::<ScriptComponent>(target);
        self.copy_components::<RigidBody2dComponent>(target);
        self.copy_components::<BoxCollider2dComponent>(target);
        self.copy_components::<CircleCollider2dComponent>(target);
        self.copy_components::<PointLightComponent>(target);
        self.copy_components::<SkyLightComponent>(target);

        // Carry live script state across when the host tracks the target.
        let host = self.script_host();
        if host.borrow().has_entity_instances(target.uuid) {
            let scripted: Vec<(EntityId, Uuid)> = self
                .registry
                .view::<ScriptComponent>()
                .filter_map(|(id, _)| {
                    self.registry
                        .get::<IdComponent>(id)
                        .map(|idc| (id, idc.id))
                })
                .collect();
            for (src_id, uuid) in scripted {
                if let Some(&dst_id) = target.entity_map.get(&uuid) {
                    host.borrow_mut().copy_entity_script_data(
                        Entity::new(dst_id, target.uuid),
                        Entity::new(src_id, self.uuid),
                    );
                }
            }
        }
        tracing::debug!(
            source = %self.uuid,
            target = %target.uuid,
            entities = target.registry.entity_count(),
            "scene copied"
        );
    }

    /// Clone an entity within this scene.
    ///
    /// The copy gets a fresh UUID, the source's tag (if any), and a deep
    /// copy of every other supported component with runtime state cleared.
    pub fn duplicate_entity(&mut self, entity: Entity) -> Entity {
        let name = self
            .get_component::<TagComponent>(entity)
            .map(|t| t.tag.clone())
            .unwrap_or_default();
        let copy = self.create_entity(&name);
        self.copy_component_if_exists::<TransformComponent>(entity, copy);
        self.copy_component_if_exists::<SpriteRendererComponent>(entity, copy);
        self.copy_component_if_exists::<CameraComponent>(entity, copy);
        self.copy_component_if_exists::<ScriptComponent>(entity, copy);
        self.copy_component_if_exists::<RigidBody2dComponent>(entity, copy);
        self.copy_component_if_exists::<BoxCollider2dComponent>(entity, copy);
        self.copy_component_if_exists::<CircleCollider2dComponent>(entity, copy);
        self.copy_component_if_exists::<MeshComponent>(entity, copy);
        self.copy_component_if_exists::<PointLightComponent>(entity, copy);
        self.copy_component_if_exists::<SkyLightComponent>(entity, copy);
        copy
    }

    fn copy_components<T: SceneComponent>(&self, target: &mut Scene) {
        let copies: Vec<(Uuid, T)> = self
            .registry
            .view::<T>()
            .filter_map(|(id, comp)| {
                self.registry
                    .get::<IdComponent>(id)
                    .map(|idc| (idc.id, comp.clone()))
            })
            .collect();
        for (uuid, mut comp) in copies {
            let Some(&dst_id) = target.entity_map.get(&uuid) else {
                continue;
            };
            comp.clear_runtime_state();
            target.add_or_replace_component(Entity::new(dst_id, target.uuid), comp);
        }
    }

    fn copy_component_if_exists<T: SceneComponent>(&mut self, from: Entity, to: Entity) {
        if let Some(mut comp) = self.registry.get::<T>(from.id).cloned() {
            comp.clear_runtime_state();
            self.add_or_replace_component(to, comp);
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        let host = self.script_host();
        host.borrow_mut().scene_destructed(self.uuid);
        directory::unregister(self.uuid);
        tracing::debug!(scene = %self.uuid, "scene destroyed");
    }
}
