use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A half line in 3D, `origin + t * direction`.
///
/// The direction does not need to be unit length, so `t` is measured in multiples of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: DVec3,
    direction: DVec3,
}

impl Ray {
    /// Create a ray, or `None` if the direction is all zeros or not finite.
    pub fn new(origin: DVec3, direction: DVec3) -> Option<Self> {
        if direction == DVec3::ZERO || !direction.is_finite() || !origin.is_finite() {
            return None;
        }
        Some(Self { origin, direction })
    }

    /// The origin of the ray.
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// The direction of the ray.
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// The point at parameter `t`.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + t * self.direction
    }
}

/// An axis aligned bounding box with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// The minimum corner.
    pub min: DVec3,
    /// The maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// Create a box, or `None` if `min > max` on any axis.
    pub fn new(min: DVec3, max: DVec3) -> Option<Self> {
        if min.cmpgt(max).any() || !min.is_finite() || !max.is_finite() {
            return None;
        }
        Some(Self { min, max })
    }

    /// Check if a point lies inside the box, bounds included.
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// The parametric interval over which a ray crosses a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parameter where the ray enters the box. Negative when the origin is inside or past it.
    pub t_entry: f64,
    /// Parameter where the ray leaves the box.
    pub t_exit: f64,
}

/// How the slab test treats negative direction components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlabPolicy {
    /// Narrow the interval on every axis and reject boxes entirely behind the origin.
    #[default]
    Symmetric,
    /// Skip the narrowing on the y and z axes when their direction component is negative,
    /// and accept boxes behind the origin.
    ///
    /// This matches the behaviour of the capture application's intersector and only exists
    /// to compare results against it.
    SkipNegative,
}

/// Intersect a ray with a box using the symmetric slab test.
///
/// # Returns
///
/// The entry and exit parameters, or `None` if the ray misses the box or the box lies
/// entirely behind the origin.
///
/// A zero direction component constrains nothing when the origin lies between the bounds
/// of that axis and misses otherwise.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use carve_3d::ray::{intersect, Aabb, Ray};
///
/// let ray = Ray::new(DVec3::ZERO, DVec3::ONE).unwrap();
/// let bbox = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0)).unwrap();
///
/// let hit = intersect(&ray, &bbox).unwrap();
/// assert_eq!(hit.t_entry, -1.0);
/// assert_eq!(hit.t_exit, 1.0);
/// ```
pub fn intersect(ray: &Ray, bbox: &Aabb) -> Option<RayHit> {
    intersect_with_policy(ray, bbox, SlabPolicy::Symmetric)
}

/// Intersect a ray with a box using the given slab policy.
pub fn intersect_with_policy(ray: &Ray, bbox: &Aabb, policy: SlabPolicy) -> Option<RayHit> {
    let origin = ray.origin.to_array();
    let direction = ray.direction.to_array();
    let vmin = bbox.min.to_array();
    let vmax = bbox.max.to_array();

    let mut tmin = f64::NEG_INFINITY;
    let mut tmax = f64::INFINITY;

    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);

        if d == 0.0 {
            if o < vmin[axis] || o > vmax[axis] {
                return None;
            }
            continue;
        }

        if policy == SlabPolicy::SkipNegative && axis > 0 && d < 0.0 {
            continue;
        }

        let (t0, t1) = if d > 0.0 {
            ((vmin[axis] - o) / d, (vmax[axis] - o) / d)
        } else {
            ((vmax[axis] - o) / d, (vmin[axis] - o) / d)
        };

        if tmin > t1 || t0 > tmax {
            return None;
        }

        tmin = tmin.max(t0);
        tmax = tmax.min(t1);
    }

    if policy == SlabPolicy::Symmetric && tmax < 0.0 {
        return None;
    }

    Some(RayHit {
        t_entry: tmin,
        t_exit: tmax,
    })
}
