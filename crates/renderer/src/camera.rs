//! Fixed look-at cameras

use glam::{Mat4, Vec3};

/// Vertical field of view in degrees
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Camera defined by eye position, look-at target and up vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub const fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
        }
    }

    /// World to view transform (right-handed, camera looks down -Z)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// OpenGL clip-space projection for the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Selectable cameras, keys `0`-`3`
///
/// The top-down camera uses -Z as up since +Y is parallel to its view
/// direction.
pub const CAMERA_TABLE: [Camera; 4] = [
    Camera::new(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(0.1), Vec3::Y),
    Camera::new(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, Vec3::NEG_Z),
    Camera::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y),
    Camera::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y),
];
