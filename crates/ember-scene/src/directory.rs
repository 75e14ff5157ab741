//! The scene directory.
//!
//! A thread-local map from scene UUID to a weak scene handle. Scenes
//! register themselves on construction and unregister on drop, so the
//! directory never keeps a scene alive and a stale entry simply fails to
//! upgrade. Thread-locality matches the engine's single-threaded
//! cooperative model and keeps concurrently running tests isolated.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::scene::{Scene, SceneHandle};
use crate::uuid::Uuid;

thread_local! {
    static SCENES: RefCell<HashMap<Uuid, Weak<RefCell<Scene>>>> =
        RefCell::new(HashMap::new());
}

pub(crate) fn register(uuid: Uuid, scene: &SceneHandle) {
    SCENES.with(|map| {
        map.borrow_mut().insert(uuid, Rc::downgrade(scene));
    });
}

pub(crate) fn unregister(uuid: Uuid) {
    SCENES.with(|map| {
        map.borrow_mut().remove(&uuid);
    });
}

/// Look up a live scene by UUID.
pub fn scene_by_uuid(uuid: Uuid) -> Option<SceneHandle> {
    SCENES.with(|map| map.borrow().get(&uuid).and_then(Weak::upgrade))
}

/// Number of live scenes registered on this thread.
pub fn scene_count() -> usize {
    SCENES.with(|map| {
        map.borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    })
}
