//! Static obstacles and the ray queries the avoidance rule casts against them.

use alloc::vec::Vec;

use rand::Rng;

use crate::boid::random_point_in_box;
use crate::config::ObstacleLayout;
use crate::vector::{sign, sqrt, Axis, Ray, Vector3D};

/// Hits closer than this are treated as behind the ray origin.
pub const HIT_EPSILON: f32 = 1e-6;

/// Nearest intersection of a ray with a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub distance: f32,
    pub point: Vector3D,
    /// Unit surface normal oriented against the ray direction.
    pub normal: Vector3D,
}

/// Anything a steering ray can be cast against
pub trait Raycast {
    fn raycast(&self, ray: &Ray) -> Option<Hit>;
}

/// Axis-aligned box centred on the origin, seen from the inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub half_extents: Vector3D,
}

impl BoxCollider {
    pub fn new(half_extents: Vector3D) -> Self {
        Self { half_extents }
    }

    pub fn contains(&self, point: &Vector3D) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let h = self.half_extents.get(axis);
            let p = point.get(axis);
            p >= -h && p <= h
        })
    }
}

impl Raycast for BoxCollider {
    fn raycast(&self, ray: &Ray) -> Option<Hit> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut far_axis = Axis::X;

        for axis in Axis::ALL {
            let origin = ray.origin.get(axis);
            let direction = ray.direction.get(axis);
            let half = self.half_extents.get(axis);

            if direction == 0.0 {
                if origin < -half || origin > half {
                    return None;
                }
                continue;
            }

            let t1 = (-half - origin) / direction;
            let t2 = (half - origin) / direction;
            let (entry, exit) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

            if entry > t_near {
                t_near = entry;
            }
            if exit < t_far {
                t_far = exit;
                far_axis = axis;
            }
        }

        // The bounding volume is a container: only its inner walls are seen, so
        // the hit is always where the ray leaves the box.
        if t_near > t_far || t_far <= HIT_EPSILON {
            return None;
        }
        let (distance, axis) = (t_far, far_axis);

        let mut normal = Vector3D::zero();
        normal.set(axis, -sign(ray.direction.get(axis)));

        Some(Hit {
            distance,
            point: ray.at(distance),
            normal,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCollider {
    pub center: Vector3D,
    pub radius: f32,
}

impl SphereCollider {
    pub fn new(center: Vector3D, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Raycast for SphereCollider {
    fn raycast(&self, ray: &Ray) -> Option<Hit> {
        let offset = ray.origin - self.center;
        let b = offset.dot(&ray.direction);
        let c = offset.magnitude_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = sqrt(discriminant);
        let near = -b - root;
        let far = -b + root;
        let distance = if near > HIT_EPSILON {
            near
        } else if far > HIT_EPSILON {
            far
        } else {
            return None;
        };

        let point = ray.at(distance);
        let mut normal = (point - self.center).normalize();
        if normal.dot(&ray.direction) > 0.0 {
            normal = -normal;
        }

        Some(Hit {
            distance,
            point,
            normal,
        })
    }
}

/// Renderer-facing state of a spherical obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstaclePose {
    pub index: usize,
    pub center: Vector3D,
    pub radius: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Obstacle {
    shape: SphereCollider,
    visible: bool,
}

/// The bounding volume plus every spherical obstacle.
///
/// Only mutated between frames, by the driver reconciling it with the config.
#[derive(Debug, Clone)]
pub struct ColliderRegistry {
    bounds: BoxCollider,
    bounds_visible: bool,
    obstacles: Vec<Obstacle>,
}

impl ColliderRegistry {
    pub fn new(bounds: Vector3D) -> Self {
        Self {
            bounds: BoxCollider::new(bounds),
            bounds_visible: true,
            obstacles: Vec::new(),
        }
    }

    pub fn bounds(&self) -> &BoxCollider {
        &self.bounds
    }

    pub fn set_bounds(&mut self, half_extents: Vector3D) {
        if self.bounds.half_extents != half_extents {
            log::debug!("bounding volume resized to {:?}", half_extents);
            self.bounds.half_extents = half_extents;
        }
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &SphereCollider> + '_ {
        self.obstacles.iter().map(|o| &o.shape)
    }

    /// Add a sphere at an explicit position
    pub fn add_obstacle(&mut self, sphere: SphereCollider) {
        self.obstacles.push(Obstacle {
            shape: sphere,
            visible: true,
        });
    }

    /// Grow or shrink the sphere set to `layout.count`.
    ///
    /// New spheres are placed uniformly inside `bounds * spread`; surplus spheres
    /// are dropped newest first. Returns `(added, removed)`.
    pub fn resize_obstacles<R: Rng + ?Sized>(
        &mut self,
        layout: &ObstacleLayout,
        rng: &mut R,
    ) -> (usize, usize) {
        let mut added = 0;
        let mut removed = 0;

        let region = self.bounds.half_extents * layout.spread;
        while self.obstacles.len() < layout.count {
            let center = random_point_in_box(region, rng);
            self.add_obstacle(SphereCollider::new(center, layout.radius));
            added += 1;
        }
        while self.obstacles.len() > layout.count {
            self.obstacles.pop();
            removed += 1;
        }
        for obstacle in &mut self.obstacles {
            obstacle.shape.radius = layout.radius;
        }

        if added > 0 || removed > 0 {
            log::debug!(
                "obstacles resized to {} (+{} -{})",
                self.obstacles.len(),
                added,
                removed
            );
        }
        (added, removed)
    }

    /// Rendering flag only; hidden colliders still block rays.
    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        match self.obstacles.get_mut(index) {
            Some(obstacle) => {
                obstacle.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn set_bounds_visible(&mut self, visible: bool) {
        self.bounds_visible = visible;
    }

    pub fn bounds_visible(&self) -> bool {
        self.bounds_visible
    }

    pub fn obstacle_poses(&self) -> impl Iterator<Item = ObstaclePose> + '_ {
        self.obstacles
            .iter()
            .enumerate()
            .map(|(index, obstacle)| ObstaclePose {
                index,
                center: obstacle.shape.center,
                radius: obstacle.shape.radius,
                visible: obstacle.visible,
            })
    }
}

impl Raycast for ColliderRegistry {
    /// Globally nearest hit across the bounding volume and every sphere.
    fn raycast(&self, ray: &Ray) -> Option<Hit> {
        let mut nearest = self.bounds.raycast(ray);
        for obstacle in &self.obstacles {
            if let Some(hit) = obstacle.shape.raycast(ray) {
                if nearest.map_or(true, |best| hit.distance < best.distance) {
                    nearest = Some(hit);
                }
            }
        }
        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_box_hit_from_inside() {
        let bounds = BoxCollider::new(Vector3D::splat(3.0));
        let ray = Ray::new(Vector3D::new(1.0, 0.0, 0.0), Vector3D::X);

        let hit = bounds.raycast(&ray).expect("wall ahead");
        assert!(approx(hit.distance, 2.0));
        assert_eq!(hit.normal, -Vector3D::X);
        assert_eq!(hit.point, Vector3D::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_box_from_outside_sees_far_wall() {
        let bounds = BoxCollider::new(Vector3D::splat(1.0));
        let ray = Ray::new(Vector3D::new(0.0, 5.0, 0.0), -Vector3D::Y);

        let hit = bounds.raycast(&ray).expect("box below");
        assert!(approx(hit.distance, 6.0));
        assert_eq!(hit.normal, Vector3D::Y);
        assert!(bounds.contains(&Vector3D::new(0.5, -1.0, 0.0)));
        assert!(!bounds.contains(&ray.origin));
    }

    #[test]
    fn test_box_miss() {
        let bounds = BoxCollider::new(Vector3D::splat(1.0));
        let away = Ray::new(Vector3D::new(0.0, 5.0, 0.0), Vector3D::Y);
        assert!(bounds.raycast(&away).is_none());
        let parallel = Ray::new(Vector3D::new(0.0, 5.0, 0.0), Vector3D::X);
        assert!(bounds.raycast(&parallel).is_none());
    }

    #[test]
    fn test_sphere_hit_and_inside() {
        let sphere = SphereCollider::new(Vector3D::new(5.0, 0.0, 0.0), 1.0);

        let hit = sphere
            .raycast(&Ray::new(Vector3D::zero(), Vector3D::X))
            .expect("sphere ahead");
        assert!(approx(hit.distance, 4.0));
        assert_eq!(hit.normal, -Vector3D::X);

        let inside = sphere
            .raycast(&Ray::new(Vector3D::new(5.0, 0.0, 0.0), Vector3D::X))
            .expect("far wall");
        assert!(approx(inside.distance, 1.0));
        assert!(inside.normal.dot(&Vector3D::X) < 0.0);

        assert!(sphere
            .raycast(&Ray::new(Vector3D::zero(), -Vector3D::X))
            .is_none());
    }

    #[test]
    fn test_registry_returns_nearest() {
        let mut registry = ColliderRegistry::new(Vector3D::splat(10.0));
        registry.add_obstacle(SphereCollider::new(Vector3D::new(6.0, 0.0, 0.0), 1.0));
        registry.add_obstacle(SphereCollider::new(Vector3D::new(3.0, 0.0, 0.0), 1.0));

        let hit = registry
            .raycast(&Ray::new(Vector3D::zero(), Vector3D::X))
            .expect("hit");
        assert!(approx(hit.distance, 2.0));

        // Nothing but the wall in this direction
        let wall = registry
            .raycast(&Ray::new(Vector3D::zero(), Vector3D::Y))
            .expect("wall");
        assert!(approx(wall.distance, 10.0));
    }

    #[test]
    fn test_hidden_obstacle_still_blocks() {
        let mut registry = ColliderRegistry::new(Vector3D::splat(10.0));
        registry.add_obstacle(SphereCollider::new(Vector3D::new(3.0, 0.0, 0.0), 1.0));
        assert!(registry.set_visible(0, false));
        assert!(!registry.set_visible(4, false));

        let hit = registry
            .raycast(&Ray::new(Vector3D::zero(), Vector3D::X))
            .expect("hit");
        assert!(approx(hit.distance, 2.0));
        assert!(!registry.obstacle_poses().next().expect("pose").visible);
    }

    #[test]
    fn test_resize_obstacles() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut registry = ColliderRegistry::new(Vector3D::splat(3.0));
        let layout = ObstacleLayout {
            count: 5,
            radius: 0.25,
            spread: 0.5,
        };

        assert_eq!(registry.resize_obstacles(&layout, &mut rng), (5, 0));
        for sphere in registry.obstacles() {
            assert!(sphere.center.x.abs() <= 1.5);
            assert!(sphere.center.y.abs() <= 1.5);
            assert!(sphere.center.z.abs() <= 1.5);
            assert_eq!(sphere.radius, 0.25);
        }

        let kept: Vec<_> = registry.obstacles().take(2).copied().collect();
        let smaller = ObstacleLayout {
            count: 2,
            radius: 0.4,
            ..layout
        };
        assert_eq!(registry.resize_obstacles(&smaller, &mut rng), (0, 3));
        let after: Vec<_> = registry.obstacles().copied().collect();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].center, kept[0].center);
        assert_eq!(after[1].radius, 0.4);
    }
}
