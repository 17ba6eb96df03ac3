use arena::Allocator;

use crate::bounds::Bounds2i;
use crate::integrator::{uniform_sample_all_light, uniform_sample_one_light, SamplerIntegrator};
use crate::material::TransportMode;
use crate::paramset::ParamSet;
use crate::ray::Ray;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;

pub enum LightStrategy {
    UniformSampleAll,
    UniformSampleOne,
}

/// Direct lighting only, no global illumination. Light sources are sampled
/// with multiple importance sampling rather than a single BSDF-independent
/// sample per light.
pub struct DirectLightingIntegrator {
    pixel_bounds: Bounds2i,
    light_strategy: LightStrategy,
    max_ray_depth: u8,
    n_light_samples: Vec<usize>,
}

impl DirectLightingIntegrator {
    pub fn new(light_strategy: LightStrategy, max_ray_depth: u8) -> DirectLightingIntegrator {
        DirectLightingIntegrator {
            pixel_bounds: Bounds2i::new(),
            light_strategy,
            max_ray_depth,
            n_light_samples: Vec::new(),
        }
    }

    pub fn create(ps: &ParamSet) -> Box<dyn SamplerIntegrator> {
        let max_depth = ps.find_one_int("maxdepth", 5);
        let strategy = ps.find_one_string("strategy", "all".into());
        let light_strategy = match strategy.as_str() {
            "one" => LightStrategy::UniformSampleOne,
            "all" => LightStrategy::UniformSampleAll,
            _ => {
                error!(
                    "Strategy \"{}\" for direct lighting unknown. Using \"all\".",
                    strategy
                );
                LightStrategy::UniformSampleAll
            }
        };
        Box::new(Self::new(light_strategy, max_depth as u8))
    }
}

impl SamplerIntegrator for DirectLightingIntegrator {
    fn pixel_bounds(&self) -> &Bounds2i {
        &self.pixel_bounds
    }

    fn preprocess(&mut self, scene: std::sync::Arc<Scene>, _sampler: &mut dyn Sampler) {
        if let LightStrategy::UniformSampleAll = self.light_strategy {
            // Compute number of samples to use for each light
            for light in &scene.lights {
                self.n_light_samples.push(light.n_samples() as usize);
            }
            // TODO: request the arrays needed for each light's samples once
            // a per-pixel sample request hook exists on the sampler trait.
        }
    }

    fn li(
        &self,
        scene: &Scene,
        ray: &mut Ray,
        sampler: &mut dyn Sampler,
        arena: &Allocator<'_>,
        depth: u32,
    ) -> Spectrum {
        let mut colour = Spectrum::black();

        match scene.intersect(ray) {
            Some(mut isect) => {
                let wo = isect.hit.wo;

                isect.compute_scattering_functions(ray, TransportMode::RADIANCE, false, arena);

                if isect.bsdf.is_none() {
                    let mut r = isect.spawn_ray(&ray.d);
                    return self.li(scene, &mut r, sampler, arena, depth);
                }
                let bsdf = isect.bsdf.clone().unwrap();

                colour += isect.le(&wo);
                if !scene.lights.is_empty() {
                    colour += match self.light_strategy {
                        LightStrategy::UniformSampleAll => {
                            uniform_sample_all_light(&isect, scene, sampler, &self.n_light_samples)
                        }
                        LightStrategy::UniformSampleOne => {
                            uniform_sample_one_light(&isect, scene, sampler, None)
                        }
                    }
                }

                if depth + 1 < u32::from(self.max_ray_depth) {
                    colour +=
                        self.specular_reflection(ray, &isect, scene, &bsdf, sampler, arena, depth);
                    colour += self
                        .specular_transmission(ray, &isect, scene, &bsdf, sampler, arena, depth);
                }
            }
            None => {
                colour = scene
                    .lights
                    .iter()
                    .fold(Spectrum::black(), |c, l| c + l.le(ray));
            }
        }

        colour
    }
}
