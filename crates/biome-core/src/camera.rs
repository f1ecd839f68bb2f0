//! Perspective camera orbiting the origin at a clamped distance.

use crate::constants::*;
use glam::{Mat4, Vec3};

/// Right-handed perspective camera on the +Z axis looking at the origin.
///
/// Only zoom input changes `distance`, and only resize changes `aspect`; the
/// scene itself rotates in front of the camera.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    distance: f32,
    min_distance: f32,
    max_distance: f32,
}

impl CameraState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fov_degrees: CAMERA_FOV_DEGREES,
            aspect: aspect_ratio(width, height),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            distance: CAMERA_START_DISTANCE,
            min_distance: CAMERA_MIN_DISTANCE,
            max_distance: CAMERA_MAX_DISTANCE,
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn distance_bounds(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    /// Move the camera by `delta` world units, clamped to the allowed range.
    /// Non-finite deltas are ignored.
    pub fn zoom_by(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.distance = (self.distance + delta).clamp(self.min_distance, self.max_distance);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }
}

#[inline]
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped_both_ways() {
        let mut cam = CameraState::new(800, 600);
        cam.zoom_by(-1_000.0);
        assert_eq!(cam.distance(), CAMERA_MIN_DISTANCE);
        cam.zoom_by(1_000.0);
        assert_eq!(cam.distance(), CAMERA_MAX_DISTANCE);
    }

    #[test]
    fn nan_zoom_is_ignored() {
        let mut cam = CameraState::new(800, 600);
        cam.zoom_by(f32::NAN);
        assert_eq!(cam.distance(), CAMERA_START_DISTANCE);
    }

    #[test]
    fn zero_height_keeps_aspect_finite() {
        let mut cam = CameraState::new(640, 0);
        assert!(cam.aspect.is_finite());
        cam.resize(0, 0);
        assert_eq!(cam.aspect, 1.0);
        assert!(cam.projection_matrix().is_finite());
    }

    #[test]
    fn eye_follows_distance() {
        let mut cam = CameraState::new(100, 100);
        cam.zoom_by(10.0);
        assert_eq!(cam.eye(), Vec3::new(0.0, 0.0, CAMERA_START_DISTANCE + 10.0));
    }
}
