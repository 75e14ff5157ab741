//! Scene lifecycle: entity creation, identity invariants, component hooks,
//! the scene directory, and entity duplication.

mod common;

use ember_scene::prelude::*;
use glam::{Vec2, Vec3};

use common::{HostCall, RecordingScriptHost};

#[test]
fn created_entities_carry_id_and_transform() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    let e = scene.create_entity("Player");

    assert!(scene.has_component::<IdComponent>(e));
    assert!(scene.has_component::<TransformComponent>(e));
    assert_eq!(scene.component::<TagComponent>(e).tag, "Player");
    assert_eq!(scene.component::<TransformComponent>(e).scale, Vec3::ONE);
}

#[test]
fn unnamed_entities_have_no_tag() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    let e = scene.create_entity("");
    assert!(!scene.has_component::<TagComponent>(e));
    assert!(scene.has_component::<IdComponent>(e));
}

#[test]
fn entity_map_tracks_uuid() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    let e = scene.create_entity_with_id(Uuid::from_raw(99), "Thing");
    assert_eq!(scene.entity_by_uuid(Uuid::from_raw(99)), Some(e));
    assert_eq!(scene.entity_uuid(e), Some(Uuid::from_raw(99)));

    scene.destroy_entity(e).unwrap();
    assert_eq!(scene.entity_by_uuid(Uuid::from_raw(99)), None);
}

#[test]
#[should_panic(expected = "already exists")]
fn duplicate_uuid_panics() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    scene.create_entity_with_id(Uuid::from_raw(7), "A");
    scene.create_entity_with_id(Uuid::from_raw(7), "B");
}

#[test]
#[should_panic(expected = "already has a")]
fn double_add_component_panics() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    let e = scene.create_entity("E");
    scene.add_component(e, SpriteRendererComponent::default());
    scene.add_component(e, SpriteRendererComponent::default());
}

#[test]
fn destroy_stale_entity_errors() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    let e = scene.create_entity("E");
    scene.destroy_entity(e).unwrap();
    assert!(scene.destroy_entity(e).is_err());
}

#[test]
fn find_entity_by_tag_returns_first_created() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    let first = scene.create_entity("Enemy");
    let _second = scene.create_entity("Enemy");
    assert_eq!(scene.find_entity_by_tag("Enemy"), Some(first));
    assert_eq!(scene.find_entity_by_tag("Missing"), None);
}

#[test]
fn camera_added_after_resize_picks_up_viewport() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();
    scene.on_viewport_resize(1920, 1080);

    let e = scene.create_entity("Cam");
    scene.add_component(e, CameraComponent::default());
    let cam = scene.component::<CameraComponent>(e);
    assert!((cam.camera.aspect_ratio - 1920.0 / 1080.0).abs() < 1e-6);
}

#[test]
fn viewport_resize_skips_fixed_aspect_cameras() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();

    let free = scene.create_entity("Free");
    scene.add_component(free, CameraComponent::default());
    let fixed = scene.create_entity("Fixed");
    scene.add_component(
        fixed,
        CameraComponent {
            fixed_aspect_ratio: true,
            ..Default::default()
        },
    );

    scene.on_viewport_resize(200, 100);
    assert!((scene.component::<CameraComponent>(free).camera.aspect_ratio - 2.0).abs() < 1e-6);
    assert_eq!(scene.component::<CameraComponent>(fixed).camera.aspect_ratio, 0.0);
}

#[test]
fn primary_camera_is_first_in_store_order() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();

    let a = scene.create_entity("A");
    scene.add_component(a, CameraComponent::default());
    let b = scene.create_entity("B");
    scene.add_component(b, CameraComponent::default());

    assert_eq!(scene.primary_camera_entity(), Some(a));

    // Demoting the first makes the second win.
    scene.component_mut::<CameraComponent>(a).primary = false;
    assert_eq!(scene.primary_camera_entity(), Some(b));
}

#[test]
fn script_hooks_fire_on_add_remove_and_destroy() {
    let (host, handle) = RecordingScriptHost::with_modules(&["game.Player"]).shared();
    let scene = Scene::with_script_host(handle);
    let mut scene = scene.borrow_mut();

    let e = scene.create_entity("Scripted");
    scene.add_component(e, ScriptComponent::new("game.Player"));
    assert_eq!(
        host.borrow().count(|c| matches!(c, HostCall::Init(_))),
        1
    );

    let uuid = scene.entity_uuid(e).unwrap();
    scene.remove_component::<ScriptComponent>(e);
    assert!(host
        .borrow()
        .calls
        .contains(&HostCall::Destroyed { scene: scene.uuid(), entity: uuid }));

    // Re-add and destroy the whole entity: same notification path.
    scene.add_component(e, ScriptComponent::new("game.Player"));
    scene.destroy_entity(e).unwrap();
    assert_eq!(
        host.borrow()
            .count(|c| matches!(c, HostCall::Destroyed { .. })),
        2
    );
}

#[test]
fn directory_resolves_live_scenes_only() {
    let scene = Scene::new();
    let uuid = scene.borrow().uuid();
    assert!(scene_by_uuid(uuid).is_some());

    drop(scene);
    assert!(scene_by_uuid(uuid).is_none());
}

#[test]
fn drop_notifies_script_host() {
    let (host, handle) = RecordingScriptHost::default().shared();
    let scene = Scene::with_script_host(handle);
    let uuid = scene.borrow().uuid();
    drop(scene);
    assert!(host
        .borrow()
        .calls
        .contains(&HostCall::SceneDestructed(uuid)));
}

#[test]
fn duplicate_entity_copies_components_with_fresh_identity() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();

    let src = scene.create_entity("Crate");
    scene.component_mut::<TransformComponent>(src).translation = Vec3::new(1.0, 2.0, 3.0);
    scene.add_component(
        src,
        SpriteRendererComponent {
            tiling_factor: 4.0,
            ..Default::default()
        },
    );
    scene.add_component(
        src,
        BoxCollider2dComponent {
            size: Vec2::new(2.0, 3.0),
            ..Default::default()
        },
    );

    let copy = scene.duplicate_entity(src);
    assert_ne!(scene.entity_uuid(copy), scene.entity_uuid(src));
    assert_eq!(scene.component::<TagComponent>(copy).tag, "Crate");
    assert_eq!(
        scene.component::<TransformComponent>(copy).translation,
        Vec3::new(1.0, 2.0, 3.0)
    );
    assert_eq!(scene.component::<SpriteRendererComponent>(copy).tiling_factor, 4.0);
    assert_eq!(scene.component::<BoxCollider2dComponent>(copy).size, Vec2::new(2.0, 3.0));

    // Deep copy: mutating the source leaves the copy alone.
    scene.component_mut::<TransformComponent>(src).translation = Vec3::ZERO;
    assert_eq!(
        scene.component::<TransformComponent>(copy).translation,
        Vec3::new(1.0, 2.0, 3.0)
    );
}

#[test]
fn duplicate_during_play_gets_fresh_runtime_state() {
    let scene = Scene::new();
    let mut scene = scene.borrow_mut();

    let src = scene.create_entity("Body");
    scene.add_component(
        src,
        RigidBody2dComponent {
            body_type: BodyType::Dynamic,
            ..Default::default()
        },
    );
    scene.add_component(src, BoxCollider2dComponent::default());
    scene.on_runtime_start();
    assert!(scene.component::<RigidBody2dComponent>(src).runtime_body.is_some());

    let copy = scene.duplicate_entity(src);
    assert!(scene.component::<RigidBody2dComponent>(copy).runtime_body.is_none());
    assert!(scene
        .component::<BoxCollider2dComponent>(copy)
        .runtime_fixture
        .is_none());
    scene.on_runtime_stop();
}

#[test]
fn duplicating_script_entity_fires_init_hook() {
    let (host, handle) = RecordingScriptHost::with_modules(&["game.Turret"]).shared();
    let scene = Scene::with_script_host(handle);
    let mut scene = scene.borrow_mut();

    let src = scene.create_entity("Turret");
    scene.add_component(src, ScriptComponent::new("game.Turret"));
    host.borrow_mut().calls.clear();

    let copy = scene.duplicate_entity(src);
    assert_eq!(
        host.borrow().calls,
        vec![HostCall::Init(copy)],
        "the copied script component must announce itself to the host"
    );
}
