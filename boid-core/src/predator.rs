//! Turning pointer input into the repellent ray the flock flees from.

use crate::vector::{tan, Ray, Vector3D};

/// Pointer state for one frame, in normalized device coordinates (-1..1)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerInput {
    pub ndc_x: f32,
    pub ndc_y: f32,
    pub engaged: bool,
}

impl PointerInput {
    pub fn engaged(ndc_x: f32, ndc_y: f32) -> Self {
        Self {
            ndc_x,
            ndc_y,
            engaged: true,
        }
    }

    pub fn released() -> Self {
        Self::default()
    }
}

/// Perspective camera transform supplied by the host; never moved by the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3D,
    pub target: Vector3D,
    pub up: Vector3D,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vector3D::splat(1.0),
            target: Vector3D::zero(),
            up: Vector3D::Y,
            fov_y: 75f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }
}

impl CameraPose {
    /// Pick ray from the camera through the given NDC point.
    pub fn ray_through(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);
        let half_height = tan(self.fov_y * 0.5);

        let direction =
            forward + right * (ndc_x * half_height * self.aspect) + up * (ndc_y * half_height);
        Ray::new(self.position, direction)
    }
}

/// The predator is either a ray the flock flees from, or nothing at all
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PredatorTarget {
    #[default]
    Idle,
    Engaged(Ray),
}

impl PredatorTarget {
    pub fn from_pointer(camera: &CameraPose, pointer: &PointerInput) -> Self {
        if pointer.engaged {
            PredatorTarget::Engaged(camera.ray_through(pointer.ndc_x, pointer.ndc_y))
        } else {
            PredatorTarget::Idle
        }
    }

    pub fn ray(&self) -> Option<&Ray> {
        match self {
            PredatorTarget::Engaged(ray) => Some(ray),
            PredatorTarget::Idle => None,
        }
    }

    pub fn is_engaged(&self) -> bool {
        matches!(self, PredatorTarget::Engaged(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_of_screen_looks_at_target() {
        let camera = CameraPose {
            position: Vector3D::new(0.0, 0.0, 5.0),
            ..CameraPose::default()
        };
        let ray = camera.ray_through(0.0, 0.0);
        assert!((ray.direction - (-Vector3D::Z)).magnitude() < 1e-5);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_pointer_offsets_follow_screen_axes() {
        let camera = CameraPose {
            position: Vector3D::new(0.0, 0.0, 5.0),
            fov_y: core::f32::consts::FRAC_PI_2,
            aspect: 1.0,
            ..CameraPose::default()
        };
        // tan(45°) == 1, so the corner ray is at 45° on both screen axes
        let ray = camera.ray_through(1.0, 1.0);
        let expected = Vector3D::new(1.0, 1.0, -1.0).normalize();
        assert!((ray.direction - expected).magnitude() < 1e-5);
    }

    #[test]
    fn test_released_pointer_is_idle() {
        let camera = CameraPose::default();
        let idle = PredatorTarget::from_pointer(&camera, &PointerInput::released());
        assert!(!idle.is_engaged());
        assert!(idle.ray().is_none());

        let engaged = PredatorTarget::from_pointer(&camera, &PointerInput::engaged(0.2, -0.4));
        assert!(engaged.ray().is_some());
    }
}
