//! Scene (de)serialization.
//!
//! Scenes persist as pretty-printed JSON documents:
//!
//! ```json
//! {
//!   "Version": 1,
//!   "Scene": 12345,
//!   "Entities": [
//!     {
//!       "Entity": 67890,
//!       "TagComponent": { "Tag": "Player" },
//!       "TransformComponent": { "Translation": [0.0, 1.0, 0.0], ... }
//!     }
//!   ]
//! }
//! ```
//!
//! Only present components are written; runtime-only fields never appear.
//! Loading recreates entities through the scene's normal creation path, so
//! identity invariants and component hooks apply to deserialized entities
//! too. A file that references mesh assets missing from disk still loads
//! every entity; the missing paths are collected and reported together at
//! the end.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use ember_ecs::entity::EntityId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::components::{
    BoxCollider2dComponent, CameraComponent, CircleCollider2dComponent, IdComponent,
    MeshComponent, PointLightComponent, RigidBody2dComponent, SceneComponent, ScriptComponent,
    SkyLightComponent, SpriteRendererComponent, TagComponent, TransformComponent,
};
use crate::scene::{Scene, SceneHandle};
use crate::uuid::Uuid;

/// Version written into scene documents.
pub const SCENE_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a scene file failed to load.
#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene file: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document has no top-level `Scene` id; nothing was loaded.
    #[error("scene file has no top-level Scene id")]
    MissingSceneKey,
    /// Mesh components referenced assets that are not on disk. The scene
    /// was still populated; the listed meshes have no loaded handle.
    #[error("scene references missing mesh assets: {}", .0.join(", "))]
    MissingAssets(Vec<String>),
}

// ---------------------------------------------------------------------------
// SceneSerializer
// ---------------------------------------------------------------------------

/// Reads and writes one scene's entities.
pub struct SceneSerializer {
    scene: SceneHandle,
}

impl SceneSerializer {
    /// Bind a serializer to a scene.
    pub fn new(scene: &SceneHandle) -> Self {
        Self {
            scene: Rc::clone(scene),
        }
    }

    /// Write the scene to `path` as pretty JSON.
    ///
    /// Failures are logged, not returned: an unwritable destination leaves
    /// the scene untouched and produces no partial file.
    pub fn serialize(&self, path: &Path) {
        let scene = self.scene.borrow();
        let document = build_document(&scene);
        let text = match serde_json::to_string_pretty(&document) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(scene = %scene.uuid(), %err, "failed to encode scene");
                return;
            }
        };
        if let Err(err) = fs::write(path, text) {
            tracing::error!(
                path = %path.display(),
                %err,
                "failed to write scene file"
            );
        }
    }

    /// Populate the bound scene from a file written by
    /// [`serialize`](Self::serialize).
    ///
    /// Entities are created with their stored UUIDs; optional fields absent
    /// from the file fall back to their documented defaults.
    ///
    /// # Errors
    ///
    /// * [`SceneLoadError::MissingSceneKey`] if the document has no `Scene`
    ///   id -- the scene is left as it was.
    /// * [`SceneLoadError::Parse`] / [`SceneLoadError::Io`] on malformed
    ///   input; entities processed before the failure remain.
    /// * [`SceneLoadError::MissingAssets`] if any mesh path is not on disk;
    ///   all entities are still created.
    ///
    /// # Panics
    ///
    /// Panics if the file contains an entity UUID already present in the
    /// scene.
    pub fn deserialize(&self, path: &Path) -> Result<(), SceneLoadError> {
        let text = fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&text)?;
        let scene_id = document
            .get("Scene")
            .and_then(Value::as_u64)
            .ok_or(SceneLoadError::MissingSceneKey)?;
        tracing::debug!(
            scene = scene_id,
            path = %path.display(),
            "loading scene file"
        );

        let mut missing = Vec::new();
        {
            let mut scene = self.scene.borrow_mut();
            if let Some(entries) = document.get("Entities").and_then(Value::as_array) {
                for entry in entries {
                    load_entity(&mut scene, entry, &mut missing)?;
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            tracing::error!(
                paths = ?missing,
                "scene references mesh assets that are not on disk"
            );
            Err(SceneLoadError::MissingAssets(missing))
        }
    }
}

// ---------------------------------------------------------------------------
// Document building
// ---------------------------------------------------------------------------

fn build_document(scene: &Scene) -> Value {
    let mut entities = Vec::new();
    for &id in scene.registry().entities() {
        // Entities without an identity are runtime-internal; skip them.
        let Some(idc) = scene.registry().get::<IdComponent>(id) else {
            continue;
        };
        let mut entry = Map::new();
        entry.insert("Entity".to_owned(), json!(idc.id));
        write_component::<TagComponent>(scene, id, "TagComponent", &mut entry);
        write_component::<TransformComponent>(scene, id, "TransformComponent", &mut entry);
        write_component::<CameraComponent>(scene, id, "CameraComponent", &mut entry);
        write_component::<SpriteRendererComponent>(scene, id, "SpriteRendererComponent", &mut entry);
        write_component::<MeshComponent>(scene, id, "MeshComponent", &mut entry);
        write_component::<ScriptComponent>(scene, id, "ScriptComponent", &mut entry);
        write_component::<RigidBody2dComponent>(scene, id, "RigidBody2DComponent", &mut entry);
        write_component::<BoxCollider2dComponent>(scene, id, "BoxCollider2DComponent", &mut entry);
        write_component::<CircleCollider2dComponent>(
            scene,
            id,
            "CircleCollider2DComponent",
            &mut entry,
        );
        write_component::<PointLightComponent>(scene, id, "PointLightComponent", &mut entry);
        write_component::<SkyLightComponent>(scene, id, "SkyLightComponent", &mut entry);
        entities.push(Value::Object(entry));
    }
    json!({
        "Version": SCENE_FORMAT_VERSION,
        "Scene": scene.uuid(),
        "Entities": entities,
    })
}

fn write_component<T: SceneComponent + Serialize>(
    scene: &Scene,
    id: EntityId,
    key: &str,
    entry: &mut Map<String, Value>,
) {
    if let Some(comp) = scene.registry().get::<T>(id) {
        match serde_json::to_value(comp) {
            Ok(value) => {
                entry.insert(key.to_owned(), value);
            }
            Err(err) => {
                tracing::error!(component = key, %err, "failed to serialize component");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Document loading
// ---------------------------------------------------------------------------

fn load_entity(
    scene: &mut Scene,
    entry: &Value,
    missing: &mut Vec<String>,
) -> Result<(), SceneLoadError> {
    let Some(uuid) = entry.get("Entity").and_then(Value::as_u64) else {
        tracing::warn!("skipping entity entry without an Entity id");
        return Ok(());
    };
    let name = entry
        .get("TagComponent")
        .and_then(|tag| tag.get("Tag"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let entity = scene.create_entity_with_id(Uuid::from_raw(uuid), name);

    // Created entities already carry a default transform; overwrite it.
    read_component::<TransformComponent>(scene, entity, entry, "TransformComponent")?;
    read_component::<CameraComponent>(scene, entity, entry, "CameraComponent")?;
    read_component::<SpriteRendererComponent>(scene, entity, entry, "SpriteRendererComponent")?;
    read_component::<ScriptComponent>(scene, entity, entry, "ScriptComponent")?;
    read_component::<RigidBody2dComponent>(scene, entity, entry, "RigidBody2DComponent")?;
    read_component::<BoxCollider2dComponent>(scene, entity, entry, "BoxCollider2DComponent")?;
    read_component::<CircleCollider2dComponent>(scene, entity, entry, "CircleCollider2DComponent")?;
    read_component::<PointLightComponent>(scene, entity, entry, "PointLightComponent")?;
    read_component::<SkyLightComponent>(scene, entity, entry, "SkyLightComponent")?;

    if let Some(value) = entry.get("MeshComponent") {
        let mesh: MeshComponent = serde_json::from_value(value.clone())?;
        if !mesh.asset_path.is_empty() && !Path::new(&mesh.asset_path).exists() {
            missing.push(mesh.asset_path.clone());
        }
        scene.add_or_replace_component(entity, mesh);
    }
    Ok(())
}

fn read_component<T: SceneComponent + DeserializeOwned>(
    scene: &mut Scene,
    entity: crate::entity::Entity,
    entry: &Value,
    key: &str,
) -> Result<(), SceneLoadError> {
    if let Some(value) = entry.get(key) {
        let comp: T = serde_json::from_value(value.clone())?;
        scene.add_or_replace_component(entity, comp);
    }
    Ok(())
}
