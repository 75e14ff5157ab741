//! Shared test doubles: a renderer and a script host that record every
//! call so traversal order and content can be asserted.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use ember_scene::prelude::*;
use glam::{Mat4, Vec3};

static TRACING: Once = Once::new();

/// Install a fmt subscriber once so `RUST_LOG` controls test log output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// RecordingRenderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    BeginScene(Mat4),
    Sprite(Mat4),
    EndScene,
    Lights {
        sky: usize,
        point: usize,
        viewer: Vec3,
    },
    Mesh(String),
    BeginWireframe,
    DebugQuad(Mat4),
    EndWireframe,
}

/// Records the exact call sequence a traversal produces.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&RenderEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl SceneRenderer for RecordingRenderer {
    fn begin_scene(&mut self, view_projection: Mat4) {
        self.events.push(RenderEvent::BeginScene(view_projection));
    }

    fn draw_sprite(&mut self, transform: Mat4, _sprite: &SpriteRendererComponent) {
        self.events.push(RenderEvent::Sprite(transform));
    }

    fn end_scene(&mut self) {
        self.events.push(RenderEvent::EndScene);
    }

    fn render_lights(&mut self, lights: &LightEnvironment, viewer: Vec3, _material: &Material) {
        self.events.push(RenderEvent::Lights {
            sky: lights.sky_lights.len(),
            point: lights.point_lights.len(),
            viewer,
        });
    }

    fn submit_mesh(&mut self, mesh: &MeshComponent, _transform: Mat4) {
        self.events.push(RenderEvent::Mesh(mesh.asset_path.clone()));
    }

    fn begin_wireframe(&mut self) {
        self.events.push(RenderEvent::BeginWireframe);
    }

    fn draw_debug_quad(&mut self, transform: Mat4) {
        self.events.push(RenderEvent::DebugQuad(transform));
    }

    fn end_wireframe(&mut self) {
        self.events.push(RenderEvent::EndWireframe);
    }
}

// ---------------------------------------------------------------------------
// RecordingScriptHost
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SetContext(Uuid),
    Instantiate(Entity),
    Init(Entity),
    Destroyed { scene: Uuid, entity: Uuid },
    Update(Entity, f32),
    FixedUpdate(Entity, f32),
    CopyData { dst: Entity, src: Entity },
    SceneDestructed(Uuid),
}

/// A script host that knows a configurable set of modules and records
/// every callback.
#[derive(Debug, Default)]
pub struct RecordingScriptHost {
    pub modules: HashSet<String>,
    pub scenes_with_instances: HashSet<Uuid>,
    pub calls: Vec<HostCall>,
}

impl RecordingScriptHost {
    pub fn with_modules(modules: &[&str]) -> Self {
        Self {
            modules: modules.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Wrap in the shared handle form scenes expect, keeping the concrete
    /// handle for assertions.
    pub fn shared(self) -> (Rc<RefCell<RecordingScriptHost>>, ScriptHostHandle) {
        let concrete = Rc::new(RefCell::new(self));
        let handle: ScriptHostHandle = concrete.clone();
        (concrete, handle)
    }

    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl ScriptHost for RecordingScriptHost {
    fn set_scene_context(&mut self, scene: Uuid) {
        self.calls.push(HostCall::SetContext(scene));
    }

    fn module_exists(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    fn instantiate_entity_class(&mut self, entity: Entity) {
        self.scenes_with_instances.insert(entity.scene);
        self.calls.push(HostCall::Instantiate(entity));
    }

    fn init_script_entity(&mut self, entity: Entity) {
        self.calls.push(HostCall::Init(entity));
    }

    fn script_component_destroyed(&mut self, scene: Uuid, entity: Uuid) {
        self.calls.push(HostCall::Destroyed { scene, entity });
    }

    fn on_update_entity(&mut self, entity: Entity, ts: f32) {
        self.calls.push(HostCall::Update(entity, ts));
    }

    fn on_fixed_update_entity(&mut self, entity: Entity, fixed_ts: f32) {
        self.calls.push(HostCall::FixedUpdate(entity, fixed_ts));
    }

    fn has_entity_instances(&self, scene: Uuid) -> bool {
        self.scenes_with_instances.contains(&scene)
    }

    fn copy_entity_script_data(&mut self, dst: Entity, src: Entity) {
        self.calls.push(HostCall::CopyData { dst, src });
    }

    fn scene_destructed(&mut self, scene: Uuid) {
        self.calls.push(HostCall::SceneDestructed(scene));
    }
}

// ---------------------------------------------------------------------------
// Temp files
// ---------------------------------------------------------------------------

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A unique scratch path for a scene file. Callers clean up with
/// `std::fs::remove_file`.
pub fn temp_scene_path(label: &str) -> PathBuf {
    let n = FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "ember-scene-{label}-{}-{n}.json",
        std::process::id()
    ))
}
