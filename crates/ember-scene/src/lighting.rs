//! Per-frame light aggregation.
//!
//! Before the 3D pass the scene flattens its light-carrying entities into a
//! [`LightEnvironment`], which is handed to the renderer together with each
//! mesh's material and the viewer position.

use ember_ecs::registry::Registry;
use glam::Vec3;

use crate::components::{PointLightComponent, SkyLightComponent, TransformComponent};

/// Flattened sky light record.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Flattened point light record. `position` is the owning entity's
/// translation at rebuild time.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

/// All lights visible this frame.
#[derive(Debug, Clone, Default)]
pub struct LightEnvironment {
    pub sky_lights: Vec<SkyLight>,
    pub point_lights: Vec<PointLight>,
}

impl LightEnvironment {
    /// Rebuild from the registry's current light components.
    pub fn rebuild(&mut self, registry: &Registry) {
        self.sky_lights.clear();
        self.point_lights.clear();

        for (_, sky) in registry.view::<SkyLightComponent>() {
            self.sky_lights.push(SkyLight {
                color: sky.color,
                intensity: sky.intensity,
            });
        }

        for (_, transform, light) in registry.group::<TransformComponent, PointLightComponent>() {
            self.point_lights.push(PointLight {
                position: transform.translation,
                color: light.color,
                intensity: light.intensity,
                constant: light.constant,
                linear: light.linear,
                quadratic: light.quadratic,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_collects_lights_and_positions() {
        let mut registry = Registry::new();

        let sky = registry.spawn();
        registry
            .insert(sky, SkyLightComponent { color: Vec3::ONE, intensity: 0.3 })
            .unwrap();

        let lamp = registry.spawn();
        registry
            .insert(
                lamp,
                TransformComponent {
                    translation: Vec3::new(4.0, 5.0, 6.0),
                    ..Default::default()
                },
            )
            .unwrap();
        registry.insert(lamp, PointLightComponent::default()).unwrap();

        let mut env = LightEnvironment::default();
        env.rebuild(&registry);
        assert_eq!(env.sky_lights.len(), 1);
        assert_eq!(env.point_lights.len(), 1);
        assert_eq!(env.point_lights[0].position, Vec3::new(4.0, 5.0, 6.0));

        // Rebuild replaces, not appends.
        env.rebuild(&registry);
        assert_eq!(env.sky_lights.len(), 1);
        assert_eq!(env.point_lights.len(), 1);
    }

    #[test]
    fn point_light_without_transform_is_skipped() {
        let mut registry = Registry::new();
        let lamp = registry.spawn();
        registry.insert(lamp, PointLightComponent::default()).unwrap();

        let mut env = LightEnvironment::default();
        env.rebuild(&registry);
        assert!(env.point_lights.is_empty());
    }
}
