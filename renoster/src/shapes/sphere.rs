use std::f32::consts::PI;
use std::sync::Arc;

use bounds::Bounds3f;
use efloat::{solve_quadratic, EFloat};
use geometry::Normal3;
use interaction::{Interaction, SurfaceInteraction};
use paramset::ParamSet;
use ray::Ray;
use sampling::uniform_sample_sphere;
use shapes::Shape;
use transform::Transform;
use {clamp, gamma, Normal3f, Point2f, Point3f, Vector3f};

/// A (possibly partial, z-clipped) sphere, the one concrete `Shape` this
/// crate ships as a test fixture and minimal end-to-end geometry.
#[derive(Debug)]
pub struct Sphere {
    object_to_world: Transform,
    world_to_object: Transform,
    radius: f32,
    z_min: f32,
    z_max: f32,
    theta_min: f32,
    theta_max: f32,
    phi_max: f32,
    reverse_orientation: bool,
}

impl Sphere {
    pub fn new(
        object_to_world: Transform,
        radius: f32,
        z_min: f32,
        z_max: f32,
        phi_max: f32,
        reverse_orientation: bool,
    ) -> Sphere {
        let world_to_object = object_to_world.inverse();
        let zmin = clamp(f32::min(z_min, z_max), -radius, radius);
        let zmax = clamp(f32::max(z_min, z_max), -radius, radius);
        Sphere {
            object_to_world,
            world_to_object,
            radius,
            z_min: zmin,
            z_max: zmax,
            theta_min: clamp(zmax / radius, -1.0, 1.0).acos(),
            theta_max: clamp(zmin / radius, -1.0, 1.0).acos(),
            phi_max: clamp(phi_max, 0.0, 360.0).to_radians(),
            reverse_orientation,
        }
    }

    pub fn full(object_to_world: Transform, radius: f32) -> Sphere {
        Sphere::new(object_to_world, radius, -radius, radius, 360.0, false)
    }

    pub fn create(
        object_to_world: &Transform,
        reverse_orientation: bool,
        params: &ParamSet,
    ) -> Arc<dyn Shape> {
        let radius = params.find_one_float("radius", 1.0);
        let z_min = params.find_one_float("z_min", -radius);
        let z_max = params.find_one_float("z_max", radius);
        let phi_max = params.find_one_float("phi_max", 360.0);
        Arc::new(Sphere::new(
            object_to_world.clone(),
            radius,
            z_min,
            z_max,
            phi_max,
            reverse_orientation,
        ))
    }

    /// Finds the object-space hit point and its azimuthal angle, clipping
    /// against `z_min`/`z_max`/`phi_max` and retrying the far root when the
    /// near one falls outside the clipped wedge.
    fn basic_intersect(&self, ray: &Ray) -> Option<(f32, Point3f, f32)> {
        let (o, _) = self.world_to_object.transform_point(&ray.o);
        let (d, _) = self.world_to_object.transform_vector(&ray.d);

        let ox = EFloat::new(o.x, 0.0);
        let oy = EFloat::new(o.y, 0.0);
        let oz = EFloat::new(o.z, 0.0);
        let dx = EFloat::new(d.x, 0.0);
        let dy = EFloat::new(d.y, 0.0);
        let dz = EFloat::new(d.z, 0.0);

        let a = dx * dx + dy * dy + dz * dz;
        let b = (dx * ox + dy * oy + dz * oz) * 2.0;
        let r = EFloat::new(self.radius, 0.0);
        let c = ox * ox + oy * oy + oz * oz - r * r;

        let (t0, t1) = solve_quadratic(&a, &b, &c)?;
        if t0.upper_bound() > ray.t_max || t1.lower_bound() <= 0.0 {
            return None;
        }

        let mut using_t1 = false;
        let mut t_shape_hit = t0;
        if t_shape_hit.lower_bound() <= 0.0 {
            using_t1 = true;
            t_shape_hit = t1;
            if t_shape_hit.upper_bound() > ray.t_max {
                return None;
            }
        }

        let hit_point = |t: f32| -> (Point3f, f32) {
            let mut p = o + d * t;
            let scale = self.radius / Vector3f::new(p.x, p.y, p.z).length().max(1e-8);
            p = p * scale;
            if p.x == 0.0 && p.y == 0.0 {
                p.x = 1e-5 * self.radius;
            }
            let mut phi = p.y.atan2(p.x);
            if phi < 0.0 {
                phi += 2.0 * PI;
            }
            (p, phi)
        };

        let (mut p_hit, mut phi) = hit_point(f32::from(t_shape_hit));

        let out_of_wedge = |p: &Point3f, phi: f32| {
            (self.z_min > -self.radius && p.z < self.z_min)
                || (self.z_max < self.radius && p.z > self.z_max)
                || phi > self.phi_max
        };

        if out_of_wedge(&p_hit, phi) {
            if using_t1 || t1.upper_bound() > ray.t_max {
                return None;
            }
            t_shape_hit = t1;
            let (p2, phi2) = hit_point(f32::from(t_shape_hit));
            p_hit = p2;
            phi = phi2;
            if out_of_wedge(&p_hit, phi) {
                return None;
            }
        }

        Some((f32::from(t_shape_hit), p_hit, phi))
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<(SurfaceInteraction, f32)> {
        let (t_hit, p_hit, phi) = self.basic_intersect(ray)?;

        let u = phi / self.phi_max;
        let theta = clamp(p_hit.z / self.radius, -1.0, 1.0).acos();
        let v = (theta - self.theta_min) / (self.theta_max - self.theta_min);

        let z_radius = (p_hit.x * p_hit.x + p_hit.y * p_hit.y).sqrt();
        let inv_z_radius = 1.0 / z_radius.max(1e-8);
        let cos_phi = p_hit.x * inv_z_radius;
        let sin_phi = p_hit.y * inv_z_radius;

        let dpdu = Vector3f::new(-self.phi_max * p_hit.y, self.phi_max * p_hit.x, 0.0);
        let dtheta = self.theta_max - self.theta_min;
        let dpdv = Vector3f::new(p_hit.z * cos_phi, p_hit.z * sin_phi, -self.radius * theta.sin()) * dtheta;

        let d2p_duu = Vector3f::new(p_hit.x, p_hit.y, 0.0) * (-self.phi_max * self.phi_max);
        let d2p_duv = Vector3f::new(-sin_phi, cos_phi, 0.0) * (dtheta * p_hit.z * self.phi_max);
        let d2p_dvv = Vector3f::new(p_hit.x, p_hit.y, p_hit.z) * (-dtheta * dtheta);

        let e1 = dpdu.dot(&dpdu);
        let f1 = dpdu.dot(&dpdv);
        let g1 = dpdv.dot(&dpdv);
        let n = dpdu.cross(&dpdv).normalize();
        let e2 = n.dot(&d2p_duu);
        let f2 = n.dot(&d2p_duv);
        let g2 = n.dot(&d2p_dvv);

        let inv_egf2 = 1.0 / (e1 * g1 - f1 * f1).max(1e-12);
        let dndu = Normal3f::from(
            dpdu * ((f2 * f1 - e2 * g1) * inv_egf2) + dpdv * ((e2 * f1 - f2 * e1) * inv_egf2),
        );
        let dndv = Normal3f::from(
            dpdu * ((g2 * f1 - f2 * g1) * inv_egf2) + dpdv * ((f2 * f1 - g2 * e1) * inv_egf2),
        );

        let object_space_error = Vector3f::new(p_hit.x, p_hit.y, p_hit.z).abs() * gamma(5);

        let (p_world, transform_error) = self.object_to_world.transform_point(&p_hit);
        let p_error = object_space_error + transform_error;
        let (dpdu_world, _) = self.object_to_world.transform_vector(&dpdu);
        let (dpdv_world, _) = self.object_to_world.transform_vector(&dpdv);
        let dndu_world = self.object_to_world.transform_normal(&dndu);
        let dndv_world = self.object_to_world.transform_normal(&dndv);

        let si = SurfaceInteraction::new(
            p_world,
            p_error,
            Point2f::new(u, v),
            -ray.d,
            dpdu_world,
            dpdv_world,
            dndu_world,
            dndv_world,
            self,
        );

        Some((si, t_hit))
    }

    fn area(&self) -> f32 {
        self.phi_max * self.radius * (self.z_max - self.z_min)
    }

    fn object_bounds(&self) -> Bounds3f {
        Bounds3f::from_points(
            &Point3f::new(-self.radius, -self.radius, self.z_min),
            &Point3f::new(self.radius, self.radius, self.z_max),
        )
    }

    fn world_bounds(&self) -> Bounds3f {
        self.object_to_world.transform_bounds(&self.object_bounds())
    }

    fn sample(&self, u: &Point2f) -> (Interaction, f32) {
        let p_obj = Point3f::new(0.0, 0.0, 0.0) + uniform_sample_sphere(*u) * self.radius;
        let n_obj = Normal3::new(p_obj.x, p_obj.y, p_obj.z);
        let (p_world, p_error) = self.object_to_world.transform_point(&p_obj);
        let mut n_world = self.object_to_world.transform_normal(&n_obj).normalize();
        if self.reverse_orientation {
            n_world = -n_world;
        }

        let it = Interaction::new(p_world, p_error, Vector3f::new(0.0, 0.0, 0.0), n_world);
        (it, 1.0 / self.area())
    }

    fn reverse_orientation(&self) -> bool {
        self.reverse_orientation
    }

    fn transform_swaps_handedness(&self) -> bool {
        self.object_to_world.swaps_handedness()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sphere_bounds() {
        let s = Sphere::full(Transform::identity(), 2.0);
        let b = s.world_bounds();
        assert!((b.p_min.x - (-2.0)).abs() < 1e-5);
        assert!((b.p_max.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_area_matches_full_sphere_formula() {
        let radius = 3.0f32;
        let s = Sphere::full(Transform::identity(), radius);
        let expected = 4.0 * PI * radius * radius;
        assert!((s.area() - expected).abs() < 1e-3);
    }
}
