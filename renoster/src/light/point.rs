use std::f32::consts::PI;
use std::sync::Arc;

use {Point2f, Point3f, Transform, Vector3f};
use interaction::Interaction;
use light::{Light, LightFlags, VisibilityTester};
use paramset::ParamSet;
use ray::Ray;
use sampling::uniform_sample_sphere;
use spectrum::Spectrum;

#[derive(Debug)]
pub struct PointLight {
    id: u32,
    pos: Point3f,
    emission_colour: Spectrum,
}

impl PointLight {
    pub fn new(pos: Point3f, ec: Spectrum) -> PointLight {
        PointLight {
            id: super::get_next_id(),
            pos,
            emission_colour: ec,
        }
    }

    pub fn create(l2w: &Transform, params: &ParamSet) -> Arc<dyn Light> {
        let intensity = params.find_one_spectrum("I", Spectrum::white());
        let scale = params.find_one_spectrum("scale", Spectrum::white());
        let p = params.find_one_point3f("from", Point3f::new(0.0, 0.0, 0.0));
        Arc::new(PointLight::new(l2w.transform_point(&p).0, intensity * scale))
    }
}

impl Light for PointLight {
    fn id(&self) -> u32 {
        self.id
    }

    fn sample_li(&self,
                 isect: &Interaction,
                 _u: &Point2f)
                 -> (Spectrum, Vector3f, f32, VisibilityTester) {
        let wi = self.pos - isect.p;
        let r2 = wi.length_squared();
        let l_i = self.emission_colour / (4.0 * PI * r2);
        let vt = VisibilityTester::new(*isect, Interaction::from_point(&self.pos));

        (l_i, wi.normalize(), 1.0, vt)
    }

    fn pdf_li(&self, _si: &Interaction, _wi: &Vector3f) -> f32 {
        0.0
    }

    fn n_samples(&self) -> u32 {
        1
    }

    fn flags(&self) -> LightFlags {
        LightFlags::DELTA_POSITION
    }

    fn power(&self) -> Spectrum {
        4.0 * PI * self.emission_colour
    }

    fn sample_le(&self, _u_pos: &Point2f, u_dir: &Point2f) -> (Ray, Spectrum, f32) {
        let w = uniform_sample_sphere(*u_dir);
        let ray = Ray::new(self.pos, w);
        (ray, self.emission_colour, 1.0 / (4.0 * PI))
    }

    fn pdf_le(&self, _si: &Interaction, _w: &Vector3f) -> f32 {
        1.0 / (4.0 * PI)
    }
}
