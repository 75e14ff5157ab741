//! rapier2d-backed physics sessions.
//!
//! A [`Physics2d`] owns the rapier pipeline for one scene. The session is
//! created from component data at runtime start ([`Physics2d::init`]),
//! stepped every update ([`Physics2d::simulate`]), and torn down at runtime
//! stop ([`Physics2d::shutdown`]). Outside of a session every call is a
//! no-op, which is what makes the scene's update path safe to run while
//! stopped.
//!
//! rapier owns the body and collider storage; the ECS side holds opaque
//! [`BodyHandle`] / [`FixtureHandle`] values in its components so gameplay
//! code can tell whether an entity is live in the simulation.

use std::collections::HashMap;

use ember_ecs::entity::EntityId;
use ember_ecs::registry::Registry;
use rapier2d::prelude::*;

use crate::components::{
    BodyType, BoxCollider2dComponent, CircleCollider2dComponent, CollisionDetection,
    RigidBody2dComponent, SleepType, TransformComponent,
};

/// Opaque handle to a body in a live physics session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHandle(pub(crate) RigidBodyHandle);

/// Opaque handle to a collider in a live physics session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureHandle(pub(crate) ColliderHandle);

const GRAVITY_Y: f32 = -9.81;

// ---------------------------------------------------------------------------
// Physics2d
// ---------------------------------------------------------------------------

/// The 2D physics session of a single scene.
pub struct Physics2d {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    entity_to_body: HashMap<EntityId, RigidBodyHandle>,
    initialized: bool,
}

impl Default for Physics2d {
    fn default() -> Self {
        Self::new()
    }
}

impl Physics2d {
    /// Create an idle (uninitialized) physics state.
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, GRAVITY_Y],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            entity_to_body: HashMap::new(),
            initialized: false,
        }
    }

    /// Whether a session is live.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of bodies in the live session.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Build the rapier world from the registry's rigid-body entities.
    ///
    /// Every entity with a [`RigidBody2dComponent`] gets a body placed at
    /// its transform (xy translation, z rotation); attached box/circle
    /// colliders become rapier colliders. Session handles are written back
    /// into the components. A second call while live is a no-op.
    pub fn init(&mut self, registry: &mut Registry) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let bodies: Vec<EntityId> = registry
            .view::<RigidBody2dComponent>()
            .map(|(id, _)| id)
            .collect();

        for id in bodies {
            let Some(transform) = registry.get::<TransformComponent>(id).copied() else {
                continue;
            };
            let Some(rb) = registry.get::<RigidBody2dComponent>(id).cloned() else {
                continue;
            };

            let mut builder = match rb.body_type {
                BodyType::Static => RigidBodyBuilder::fixed(),
                BodyType::Dynamic => RigidBodyBuilder::dynamic()
                    .gravity_scale(rb.gravity_scale)
                    .ccd_enabled(rb.collision_detection == CollisionDetection::Continuous),
                BodyType::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
            };
            builder = builder
                .translation(vector![transform.translation.x, transform.translation.y])
                .rotation(transform.rotation.z);
            if rb.fixed_rotation {
                builder = builder.lock_rotations();
            }
            builder = match rb.sleep_type {
                SleepType::NeverSleep => builder.can_sleep(false),
                SleepType::Sleep => builder.sleeping(true),
                SleepType::Awake => builder,
            };

            let body_handle = self.rigid_body_set.insert(builder.build());
            self.entity_to_body.insert(id, body_handle);
            if let Some(rb) = registry.get_mut::<RigidBody2dComponent>(id) {
                rb.runtime_body = Some(BodyHandle(body_handle));
            }

            if let Some(bc) = registry.get::<BoxCollider2dComponent>(id).cloned() {
                let collider =
                    ColliderBuilder::cuboid(0.5 * bc.size.x * bc.scale.x, 0.5 * bc.size.y * bc.scale.y)
                        .translation(vector![bc.offset.x, bc.offset.y])
                        .density(bc.density)
                        .friction(bc.friction)
                        .build();
                let fixture = self.collider_set.insert_with_parent(
                    collider,
                    body_handle,
                    &mut self.rigid_body_set,
                );
                if let Some(bc) = registry.get_mut::<BoxCollider2dComponent>(id) {
                    bc.runtime_fixture = Some(FixtureHandle(fixture));
                }
            }

            if let Some(cc) = registry.get::<CircleCollider2dComponent>(id).cloned() {
                let collider = ColliderBuilder::ball(cc.radius)
                    .translation(vector![cc.offset.x, cc.offset.y])
                    .density(cc.density)
                    .friction(cc.friction)
                    .build();
                let fixture = self.collider_set.insert_with_parent(
                    collider,
                    body_handle,
                    &mut self.rigid_body_set,
                );
                if let Some(cc) = registry.get_mut::<CircleCollider2dComponent>(id) {
                    cc.runtime_fixture = Some(FixtureHandle(fixture));
                }
            }
        }

        tracing::debug!(bodies = self.rigid_body_set.len(), "physics session created");
    }

    /// Tear the session down and invalidate all runtime handles.
    /// A call while idle is a no-op.
    pub fn shutdown(&mut self, registry: &mut Registry) {
        if !self.initialized {
            return;
        }
        *self = Self::new();

        for (_, rb) in registry.view_mut::<RigidBody2dComponent>() {
            rb.runtime_body = None;
        }
        for (_, bc) in registry.view_mut::<BoxCollider2dComponent>() {
            bc.runtime_fixture = None;
        }
        for (_, cc) in registry.view_mut::<CircleCollider2dComponent>() {
            cc.runtime_fixture = None;
        }

        tracing::debug!("physics session destroyed");
    }

    /// Step the session by `ts` seconds and write body poses back into the
    /// entities' transforms. A call while idle is a no-op.
    pub fn simulate(&mut self, ts: f32, registry: &mut Registry) {
        if !self.initialized {
            return;
        }
        self.integration_params.dt = ts;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // Write back in sorted entity order so the traversal is
        // deterministic regardless of map iteration order.
        let mut registered: Vec<(EntityId, RigidBodyHandle)> =
            self.entity_to_body.iter().map(|(&e, &h)| (e, h)).collect();
        registered.sort_by_key(|(e, _)| *e);

        for (entity, handle) in registered {
            let Some(body) = self.rigid_body_set.get(handle) else {
                continue;
            };
            if let Some(transform) = registry.get_mut::<TransformComponent>(entity) {
                let pos = body.translation();
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
                transform.rotation.z = body.rotation().angle();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
