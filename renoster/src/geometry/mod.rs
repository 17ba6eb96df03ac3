//! Generic fixed-dimension point/vector types shared by the rest of the crate.
//!
//! `Normal3`/`Matrix4x4` live in sibling modules; everything here follows the
//! same style: thin generic structs, explicit operator impls, `f32`-only
//! inherent methods for geometric queries (length, normalize, cross...).

mod point;
mod vector;

pub use self::point::{Point2, Point3};
pub use self::vector::{Vector2, Vector3};

mod matrix;
mod normal;

pub use self::matrix::Matrix4x4;
pub use self::normal::Normal3;

use crate::{clamp, next_float_down, next_float_up, Normal3f, Point3f, Vector3f};

// Shading-frame trigonometric helpers: `w` is assumed expressed in the local
// BSDF coordinate frame, where z is the shading normal.
#[inline]
pub fn cos_theta(w: &Vector3f) -> f32 {
    w.z
}

#[inline]
pub fn cos2_theta(w: &Vector3f) -> f32 {
    w.z * w.z
}

#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> f32 {
    w.z.abs()
}

#[inline]
pub fn sin2_theta(w: &Vector3f) -> f32 {
    (1.0 - cos2_theta(w)).max(0.0)
}

#[inline]
pub fn sin_theta(w: &Vector3f) -> f32 {
    sin2_theta(w).sqrt()
}

#[inline]
pub fn tan_theta(w: &Vector3f) -> f32 {
    sin_theta(w) / cos_theta(w)
}

#[inline]
pub fn tan2_theta(w: &Vector3f) -> f32 {
    sin2_theta(w) / cos2_theta(w)
}

#[inline]
pub fn cos_phi(w: &Vector3f) -> f32 {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        0.0
    } else {
        clamp(w.x / sin_theta, -1.0, 1.0)
    }
}

#[inline]
pub fn sin_phi(w: &Vector3f) -> f32 {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        0.0
    } else {
        clamp(w.y / sin_theta, -1.0, 1.0)
    }
}

#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

#[inline]
pub fn face_forward_n(v1: &Normal3f, v2: &Normal3f) -> Normal3f {
    if v1.dotn(v2) < 0.0 {
        -(*v1)
    } else {
        *v1
    }
}

pub fn distance_squared(p1: &Point3f, p2: &Point3f) -> f32 {
    (*p2 - *p1).length_squared()
}

pub fn distance(p1: &Point3f, p2: &Point3f) -> f32 {
    (*p2 - *p1).length()
}

/// Nudges a ray origin off a surface along its normal, rounding each
/// component away from `p` so a spawned ray can't re-hit the surface it
/// just left.
#[inline]
pub fn offset_ray_origin(p: &Point3f, p_error: &Vector3f, n: &Normal3f, w: &Vector3f) -> Point3f {
    let d = n.abs().dot(p_error);
    let mut offset = Vector3f::from(*n) * d;
    if w.dotn(n) < 0.0 {
        offset = -offset;
    }
    let mut po = *p + offset;
    for i in 0..3 {
        if offset[i] > 0.0 {
            po[i] = next_float_up(po[i]);
        } else if offset[i] < 0.0 {
            po[i] = next_float_down(po[i]);
        }
    }
    po
}
