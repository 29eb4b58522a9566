//! Swept collision queries
//!
//! The simulator never owns geometry. It asks a [`CollisionBackend`] whether
//! the motion over a sub-step strikes anything, and the backend answers with
//! the hit point, the surface normal and an opaque handle for the surface.
//!
//! [`PlaneWorld`] is a small analytic backend (infinite planes) used by the
//! demo binary and the tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Shape swept along the motion direction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollisionShape {
    /// Infinitely thin ray
    #[default]
    Ray,
    /// Sphere of the given radius
    Sphere {
        #[serde(default = "default_sphere_radius")]
        radius: f32,
    },
}

impl CollisionShape {
    /// Radius of the swept volume (zero for a ray)
    #[inline]
    pub fn radius(&self) -> f32 {
        match self {
            CollisionShape::Ray => 0.0,
            CollisionShape::Sphere { radius } => *radius,
        }
    }
}

fn default_sphere_radius() -> f32 {
    0.05
}

/// Layer mask passed through to the backend untouched by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionFilter(pub u32);

impl CollisionFilter {
    pub const ALL: Self = Self(!0);
    pub const NONE: Self = Self(0);

    /// Whether any layer bit is shared with `layers`
    #[inline]
    pub fn intersects(self, layers: u32) -> bool {
        self.0 & layers != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// A surface struck by a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepHit<S> {
    /// Contact point on the struck surface
    pub point: Vec3,
    /// Unit surface normal at the contact point
    pub normal: Vec3,
    /// Handle identifying the struck surface
    pub surface: S,
}

/// Read-only swept-shape query service.
///
/// `direction` need not be normalized. Implementations return the nearest
/// surface within `max_distance` along `direction`, or `None`.
pub trait CollisionBackend {
    type Surface;

    fn sweep(
        &self,
        origin: Vec3,
        shape: CollisionShape,
        direction: Vec3,
        max_distance: f32,
        filter: CollisionFilter,
    ) -> Option<SweepHit<Self::Surface>>;
}

/// Identifier of a surface in a [`PlaneWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// An infinite one-sided plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plane {
    pub id: SurfaceId,
    /// Any point on the plane
    pub point: Vec3,
    /// Unit normal of the solid side's face
    pub normal: Vec3,
    /// Layer bits tested against the query filter
    pub layers: u32,
}

impl Plane {
    pub fn new(id: SurfaceId, point: Vec3, normal: Vec3) -> Self {
        Self {
            id,
            point,
            normal: normal.normalize_or_zero(),
            layers: !0,
        }
    }

    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Signed distance from the plane to `p` (positive on the normal side)
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }

    /// Distance along unit `dir` at which a shape of `radius` starting at
    /// `origin` first touches the front face, if it is approaching.
    fn time_of_impact(&self, origin: Vec3, dir: Vec3, radius: f32) -> Option<f32> {
        let approach = dir.dot(self.normal);
        if approach >= 0.0 {
            // Parallel or moving away from the front face
            return None;
        }

        let gap = self.signed_distance(origin) - radius;
        if gap < 0.0 {
            // Starting behind (or inside) the face
            return None;
        }

        Some(gap / -approach)
    }
}

/// Collision backend made of analytic planes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaneWorld {
    pub planes: Vec<Plane>,
}

impl PlaneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, plane: Plane) -> &mut Self {
        self.planes.push(plane);
        self
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

impl CollisionBackend for PlaneWorld {
    type Surface = SurfaceId;

    fn sweep(
        &self,
        origin: Vec3,
        shape: CollisionShape,
        direction: Vec3,
        max_distance: f32,
        filter: CollisionFilter,
    ) -> Option<SweepHit<SurfaceId>> {
        let dir = direction.try_normalize()?;
        let radius = shape.radius();

        self.planes
            .iter()
            .filter(|plane| filter.intersects(plane.layers))
            .filter_map(|plane| {
                let t = plane.time_of_impact(origin, dir, radius)?;
                (t <= max_distance).then_some((t, plane))
            })
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(t, plane)| {
                // Sphere casts report the contact on the surface, not the center
                let center = origin + dir * t;
                SweepHit {
                    point: center - plane.normal * radius,
                    normal: plane.normal,
                    surface: plane.id,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_and_wall() -> PlaneWorld {
        let mut world = PlaneWorld::new();
        world
            .add(Plane::new(SurfaceId(1), Vec3::ZERO, Vec3::Y))
            .add(Plane::new(SurfaceId(2), Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_X).with_layers(0b10));
        world
    }

    #[test]
    fn test_ray_hits_floor() {
        let world = floor_and_wall();
        let hit = world
            .sweep(Vec3::new(0.0, 5.0, 0.0), CollisionShape::Ray, Vec3::NEG_Y, 10.0, CollisionFilter::ALL)
            .unwrap();

        assert_eq!(hit.surface, SurfaceId(1));
        assert!(hit.point.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_ray_out_of_range_misses() {
        let world = floor_and_wall();
        let hit = world.sweep(
            Vec3::new(0.0, 5.0, 0.0),
            CollisionShape::Ray,
            Vec3::NEG_Y,
            4.9,
            CollisionFilter::ALL,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_moving_away_misses() {
        let world = floor_and_wall();
        let hit = world.sweep(Vec3::new(0.0, 5.0, 0.0), CollisionShape::Ray, Vec3::Y, 100.0, CollisionFilter::ALL);
        assert!(hit.is_none());

        // Zero direction never hits
        let hit = world.sweep(Vec3::new(0.0, 5.0, 0.0), CollisionShape::Ray, Vec3::ZERO, 100.0, CollisionFilter::ALL);
        assert!(hit.is_none());
    }

    #[test]
    fn test_nearest_surface_wins() {
        let world = floor_and_wall();
        // Diagonal toward the wall (x = 10) and the floor (y = 0); floor is closer
        let hit = world
            .sweep(Vec3::new(5.0, 2.0, 0.0), CollisionShape::Ray, Vec3::new(1.0, -1.0, 0.0), 100.0, CollisionFilter::ALL)
            .unwrap();
        assert_eq!(hit.surface, SurfaceId(1));
        assert!(hit.point.abs_diff_eq(Vec3::new(7.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_filter_excludes_layers() {
        let world = floor_and_wall();
        let origin = Vec3::new(5.0, 2.0, 0.0);

        let hit = world.sweep(origin, CollisionShape::Ray, Vec3::X, 100.0, CollisionFilter(0b10)).unwrap();
        assert_eq!(hit.surface, SurfaceId(2));

        let hit = world.sweep(origin, CollisionShape::Ray, Vec3::X, 100.0, CollisionFilter(0b01));
        assert!(hit.is_none());

        let hit = world.sweep(origin, CollisionShape::Ray, Vec3::NEG_Y, 100.0, CollisionFilter::NONE);
        assert!(hit.is_none());
    }

    #[test]
    fn test_sphere_touches_earlier_than_ray() {
        let world = floor_and_wall();
        let shape = CollisionShape::Sphere { radius: 0.5 };
        let origin = Vec3::new(0.0, 5.0, 0.0);

        // Needs 4.5 units of travel before the sphere touches
        assert!(world.sweep(origin, shape, Vec3::NEG_Y, 4.4, CollisionFilter::ALL).is_none());
        let hit = world.sweep(origin, shape, Vec3::NEG_Y, 4.6, CollisionFilter::ALL).unwrap();

        // Contact point lies on the surface, below the sphere center
        assert!(hit.point.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert_eq!(hit.surface, SurfaceId(1));
    }

    #[test]
    fn test_collision_shape_json() {
        let shape: CollisionShape = serde_json::from_str(r#"{"kind":"sphere"}"#).unwrap();
        assert_eq!(shape, CollisionShape::Sphere { radius: 0.05 });

        let shape: CollisionShape = serde_json::from_str(r#"{"kind":"ray"}"#).unwrap();
        assert_eq!(shape.radius(), 0.0);
    }
}
