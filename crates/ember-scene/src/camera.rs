//! Scene camera projection math.
//!
//! A [`SceneCamera`] stores projection parameters for both perspective and
//! orthographic modes and keeps a runtime aspect ratio fed in by
//! [`Scene::on_viewport_resize`](crate::scene::Scene::on_viewport_resize).
//! The aspect ratio is viewport state, not authored data, so it is not
//! persisted.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Which projection a [`SceneCamera`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionType {
    #[default]
    Perspective,
    Orthographic,
}

/// Projection parameters for a scene camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SceneCamera {
    /// Active projection mode.
    #[serde(default)]
    pub projection_type: ProjectionType,
    /// Vertical field of view in radians.
    #[serde(rename = "PerspectiveFOV", default = "default_fov")]
    pub perspective_fov: f32,
    #[serde(default = "default_perspective_near")]
    pub perspective_near: f32,
    #[serde(default = "default_perspective_far")]
    pub perspective_far: f32,
    /// Vertical extent of the orthographic view volume.
    #[serde(default = "default_ortho_size")]
    pub orthographic_size: f32,
    #[serde(default = "default_ortho_near")]
    pub orthographic_near: f32,
    #[serde(default = "default_ortho_far")]
    pub orthographic_far: f32,
    /// Viewport aspect ratio (width / height). Zero until a viewport size
    /// has been applied.
    #[serde(skip)]
    pub aspect_ratio: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            projection_type: ProjectionType::Perspective,
            perspective_fov: default_fov(),
            perspective_near: default_perspective_near(),
            perspective_far: default_perspective_far(),
            orthographic_size: default_ortho_size(),
            orthographic_near: default_ortho_near(),
            orthographic_far: default_ortho_far(),
            aspect_ratio: 0.0,
        }
    }
}

impl SceneCamera {
    /// Update the aspect ratio from a viewport size. Zero-sized viewports
    /// are ignored.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// The projection matrix for the current parameters.
    ///
    /// Falls back to a square aspect ratio if no viewport size has been
    /// applied yet.
    pub fn projection(&self) -> Mat4 {
        let aspect = if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else {
            1.0
        };
        match self.projection_type {
            ProjectionType::Perspective => Mat4::perspective_rh(
                self.perspective_fov,
                aspect,
                self.perspective_near,
                self.perspective_far,
            ),
            ProjectionType::Orthographic => {
                let half_w = self.orthographic_size * aspect * 0.5;
                let half_h = self.orthographic_size * 0.5;
                Mat4::orthographic_rh(
                    -half_w,
                    half_w,
                    -half_h,
                    half_h,
                    self.orthographic_near,
                    self.orthographic_far,
                )
            }
        }
    }
}

fn default_fov() -> f32 {
    std::f32::consts::FRAC_PI_4
}

fn default_perspective_near() -> f32 {
    0.01
}

fn default_perspective_far() -> f32 {
    1000.0
}

fn default_ortho_size() -> f32 {
    10.0
}

fn default_ortho_near() -> f32 {
    -1.0
}

fn default_ortho_far() -> f32 {
    1.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_size_updates_aspect() {
        let mut cam = SceneCamera::default();
        cam.set_viewport_size(1920, 1080);
        assert!((cam.aspect_ratio - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut cam = SceneCamera::default();
        cam.set_viewport_size(1280, 720);
        let before = cam.aspect_ratio;
        cam.set_viewport_size(0, 720);
        assert_eq!(cam.aspect_ratio, before);
    }

    #[test]
    fn orthographic_projection_uses_size() {
        let mut cam = SceneCamera {
            projection_type: ProjectionType::Orthographic,
            ..Default::default()
        };
        cam.set_viewport_size(100, 100);
        let proj = cam.projection();
        // A point at the top edge of the view volume maps to y = 1.
        let top = proj * glam::Vec4::new(0.0, cam.orthographic_size * 0.5, 0.0, 1.0);
        assert!((top.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn aspect_ratio_not_serialized() {
        let mut cam = SceneCamera::default();
        cam.set_viewport_size(1920, 1080);
        let value = serde_json::to_value(&cam).unwrap();
        assert!(value.get("AspectRatio").is_none());
        let back: SceneCamera = serde_json::from_value(value).unwrap();
        assert_eq!(back.aspect_ratio, 0.0);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let cam: SceneCamera =
            serde_json::from_value(serde_json::json!({ "ProjectionType": "Perspective" }))
                .unwrap();
        assert_eq!(cam.perspective_far, 1000.0);
        assert_eq!(cam.orthographic_size, 10.0);
    }
}
