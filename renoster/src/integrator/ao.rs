use arena::Allocator;

use bounds::Bounds2i;
use paramset::ParamSet;
use ray::Ray;
use sampler::Sampler;
use sampling::cosine_sample_hemisphere;
use scene::Scene;
use spectrum::Spectrum;
use {coordinate_system, Vector3f};

use integrator::SamplerIntegrator;

pub struct AmbientOcclusion {
    pixel_bounds: Bounds2i,
    n_samples: usize,
    max_dist: f32,
}

impl AmbientOcclusion {
    pub fn new(n_samples: usize, max_dist: f32) -> AmbientOcclusion {
        AmbientOcclusion {
            n_samples,
            max_dist,
            pixel_bounds: Bounds2i::new(),
        }
    }

    pub fn create(ps: &ParamSet) -> Box<dyn SamplerIntegrator> {
        let n_samples = ps.find_one_int("nsamples", 64);
        let max_dist = ps.find_one_float("maxdist", ::std::f32::INFINITY);
        Box::new(Self::new(n_samples as usize, max_dist))
    }
}

impl SamplerIntegrator for AmbientOcclusion {
    fn pixel_bounds(&self) -> &Bounds2i {
        &self.pixel_bounds
    }

    fn li(
        &self,
        scene: &Scene,
        ray: &mut Ray,
        sampler: &mut dyn Sampler,
        _arena: &Allocator,
        _depth: u32,
    ) -> Spectrum {
        let mut n_clear: usize = 0;

        if let Some(intersection) = scene.intersect(ray) {
            let n = intersection.hit.n;
            // Build an orthonormal frame around the shading normal so the
            // cosine-weighted samples drawn below are in tangent space
            // relative to the surface, not world space.
            let nv = Vector3f::new(n.x, n.y, n.z);
            let (tangent, bitangent) = coordinate_system(&nv);

            for _ in 0..self.n_samples {
                let u = sampler.get_2d();
                let local = cosine_sample_hemisphere(u);
                let w = tangent * local.x + bitangent * local.y + nv * local.z;

                let mut ao_ray = intersection.spawn_ray(&w);
                ao_ray.t_max = self.max_dist;
                if !scene.intersect_p(&ao_ray) {
                    n_clear += 1;
                }
            }
        }

        Spectrum::grey((n_clear as f32) / (self.n_samples as f32))
    }
}
