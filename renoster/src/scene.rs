use std::collections::HashMap;
use std::sync::Arc;

use bounds::Bounds3f;
use interaction::{Interaction, SurfaceInteraction};
use light::{Light, LightFlags};
use primitive::Primitive;
use ray::Ray;
use sampler::Sampler;
use sampling::Distribution1D;
use spectrum::Spectrum;
use {Point3f, Vector3f};

stat_counter!("Intersections/Regular ray intersection tests",
              n_intersection_tests);
stat_counter!("Intersections/Shadow ray intersection tests",
              n_shadow_tests);
pub fn init_stats() {
    n_intersection_tests::init();
    n_shadow_tests::init();
}

pub struct Scene {
    pub lights: Vec<Arc<dyn Light>>,
    pub infinite_lights: Vec<Arc<dyn Light>>,
    aggregate: Arc<dyn Primitive>,
    light_distrib: Distribution1D,
    light_index: HashMap<u32, usize>,
}

impl Scene {
    pub fn new(aggregate: Arc<dyn Primitive>,
               lights: Vec<Arc<dyn Light>>)
               -> Scene {
        let mut scene = Scene {
            lights: Vec::new(),
            infinite_lights: Vec::new(),
            aggregate: aggregate,
            light_distrib: Distribution1D::new(&[1.0]),
            light_index: HashMap::new(),
        };

        let mut infinite_lights = Vec::new();

        for l in &lights {
            l.preprocess(&scene);
            if l.flags().contains(LightFlags::INFINITE) {
                infinite_lights.push(Arc::clone(&l));
            }
        }

        let weights = vec![1.0; lights.len().max(1)];
        let light_index = lights
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id(), i))
            .collect();

        scene.light_distrib = Distribution1D::new(&weights);
        scene.light_index = light_index;
        ::std::mem::replace(&mut scene.lights, lights);
        ::std::mem::replace(&mut scene.infinite_lights, infinite_lights);

        scene
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        n_intersection_tests::inc();
        self.aggregate.intersect(ray)
    }

    pub fn intersect_p(&self, ray: &Ray) -> bool {
        n_shadow_tests::inc();
        self.aggregate.intersect_p(ray)
    }

    pub fn world_bounds(&self) -> Bounds3f {
        self.aggregate.world_bounds()
    }

    /// Pick a light uniformly, sample a point on it visible from `ref_it`,
    /// and return the point sampled, the radiance it emits toward `ref_it`
    /// and the combined (light selection * direction) pdf.
    pub fn sample_direct(&self,
                          sampler: &mut dyn Sampler,
                          ref_it: &Interaction)
                          -> (Interaction, Spectrum, f32) {
        if self.lights.is_empty() {
            return (Interaction::empty(), Spectrum::black(), 0.0);
        }

        let (index, light_pdf) = self.light_distrib.sample_discrete(sampler.get_1d());
        let light = &self.lights[index];
        let (li, _wi, direct_pdf, vis) = light.sample_li(ref_it, &sampler.get_2d());

        let mut pdf = light_pdf * direct_pdf;
        if !pdf.is_finite() {
            pdf = 0.0;
        }

        (vis.p1, li, pdf)
    }

    /// The counterpart to `sample_direct`: given a surface point `pos` that
    /// was hit on a light, return the radiance it emits toward `ref_it` and
    /// the pdf `sample_direct` would have produced for that same light and
    /// direction.
    pub fn evaluate_direct(&self,
                            ref_it: &Interaction,
                            pos: &SurfaceInteraction)
                            -> (Spectrum, f32) {
        let light = match pos.primitive.and_then(|p| p.area_light()) {
            Some(light) => light,
            None => return (Spectrum::black(), 0.0),
        };

        let index = match self.light_index.get(&light.id()) {
            Some(&i) => i,
            None => return (Spectrum::black(), 0.0),
        };

        let wi = (pos.hit.p - ref_it.p).normalize();
        let radiance = light.l(&pos.hit, &(-wi));

        let mut pdf = self.light_distrib.pdf_discrete(index) * light.pdf_li(ref_it, &wi);
        if !pdf.is_finite() {
            pdf = 0.0;
        }

        (radiance, pdf)
    }

    /// Pick a light uniformly and sample an emitted ray leaving it, for
    /// light-tracing style integrators.
    pub fn sample_emission(&self, sampler: &mut dyn Sampler) -> (Ray, Spectrum, f32) {
        if self.lights.is_empty() {
            let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
            return (ray, Spectrum::black(), 0.0);
        }

        let (index, light_pdf) = self.light_distrib.sample_discrete(sampler.get_1d());
        let light = &self.lights[index];
        let (ray, le, dir_pdf) = light.sample_le(&sampler.get_2d(), &sampler.get_2d());

        let mut pdf = light_pdf * dir_pdf;
        if !pdf.is_finite() {
            pdf = 0.0;
        }

        (ray, le, pdf)
    }

    /// The counterpart to `sample_emission`: given a point `pos` hit on a
    /// light while tracing an emitted ray in direction `w`, return the
    /// radiance it emits and the pdf `sample_emission` would have produced.
    pub fn evaluate_emission(&self,
                              pos: &SurfaceInteraction,
                              w: &Vector3f)
                              -> (Spectrum, f32) {
        let light = match pos.primitive.and_then(|p| p.area_light()) {
            Some(light) => light,
            None => return (Spectrum::black(), 0.0),
        };

        let index = match self.light_index.get(&light.id()) {
            Some(&i) => i,
            None => return (Spectrum::black(), 0.0),
        };

        let radiance = light.l(&pos.hit, w);
        let mut pdf = self.light_distrib.pdf_discrete(index) * light.pdf_le(&pos.hit, w);
        if !pdf.is_finite() {
            pdf = 0.0;
        }

        (radiance, pdf)
    }
}
