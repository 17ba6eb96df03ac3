use num::Zero;

use {Point2f, Point2i};
use camera::CameraSample;
use paramset::ParamSet;
use rng::RNG;
use sampler::Sampler;

/// A sampler that draws every dimension from an independent uniform random
/// variable. No stratification, no low-discrepancy structure: each call to
/// `get_1d`/`get_2d` is a fresh draw from the underlying RNG.
#[derive(Clone)]
pub struct IndependentSampler {
    spp: usize,
    seed: u64,
    current_pixel_sample_index: usize,
    sample_1d_array_sizes: Vec<usize>,
    sample_2d_array_sizes: Vec<usize>,
    sample_array_1d: Vec<Vec<f32>>,
    sample_array_2d: Vec<Vec<Point2f>>,
    array_1d_offset: usize,
    array_2d_offset: usize,
    rng: RNG,
}

impl IndependentSampler {
    pub fn new(spp: usize, seed: u64) -> IndependentSampler {
        let mut rng = RNG::new();
        rng.set_sequence(seed);
        IndependentSampler {
            spp,
            seed,
            current_pixel_sample_index: 0,
            sample_1d_array_sizes: Vec::new(),
            sample_2d_array_sizes: Vec::new(),
            sample_array_1d: Vec::new(),
            sample_array_2d: Vec::new(),
            array_1d_offset: 0,
            array_2d_offset: 0,
            rng,
        }
    }

    pub fn create(ps: &mut ParamSet) -> Box<dyn Sampler> {
        let nsamples = ps.find_one_int("pixelsamples", 16);
        let seed = ps.find_one_int("seed", 0);
        Box::new(Self::new(nsamples as usize, seed as u64))
    }
}

impl Sampler for IndependentSampler {
    fn start_pixel(&mut self, _p: &Point2i) {
        for i in 0..self.sample_1d_array_sizes.len() {
            let n = self.sample_1d_array_sizes[i] * self.spp;
            for v in self.sample_array_1d[i][..n].iter_mut() {
                *v = self.rng.uniform_f32();
            }
        }
        for i in 0..self.sample_2d_array_sizes.len() {
            let n = self.sample_2d_array_sizes[i] * self.spp;
            for v in self.sample_array_2d[i][..n].iter_mut() {
                *v = Point2f::new(self.rng.uniform_f32(), self.rng.uniform_f32());
            }
        }
        self.current_pixel_sample_index = 0;
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
    }

    fn get_1d(&mut self) -> f32 {
        self.rng.uniform_f32()
    }

    fn get_2d(&mut self) -> Point2f {
        Point2f::new(self.rng.uniform_f32(), self.rng.uniform_f32())
    }

    fn get_camera_sample(&mut self, p_raster: &Point2i) -> CameraSample {
        let s = self.get_2d();
        let p_film = Point2f::new(p_raster.x as f32 + s.x, p_raster.y as f32 + s.y);
        let p_lens = self.get_2d();

        CameraSample {
            p_film,
            p_lens,
            time: self.get_1d(),
        }
    }

    fn request_1d_array(&mut self, n: usize) {
        self.sample_1d_array_sizes.push(n);
        self.sample_array_1d.push(vec![0.0; n * self.spp]);
    }

    fn request_2d_array(&mut self, n: usize) {
        self.sample_2d_array_sizes.push(n);
        self.sample_array_2d.push(vec![Point2f::zero(); n * self.spp]);
    }

    fn round_count(&self, count: usize) -> usize {
        count
    }

    fn get_1d_array(&mut self, n: usize) -> Option<&[f32]> {
        if self.array_1d_offset == self.sample_array_1d.len() {
            return None;
        }
        assert_eq!(self.sample_1d_array_sizes[self.array_1d_offset], n);
        assert!(self.current_pixel_sample_index < self.spp);
        let res = &self.sample_array_1d[self.array_1d_offset]
            [(self.current_pixel_sample_index * n)..];
        self.array_1d_offset += 1;
        Some(res)
    }

    fn get_2d_array(&mut self, n: usize) -> Option<&[Point2f]> {
        if self.array_2d_offset == self.sample_array_2d.len() {
            return None;
        }
        assert_eq!(self.sample_2d_array_sizes[self.array_2d_offset], n);
        assert!(self.current_pixel_sample_index < self.spp);
        let res = &self.sample_array_2d[self.array_2d_offset]
            [(self.current_pixel_sample_index * n)..];
        self.array_2d_offset += 1;
        Some(res)
    }

    fn start_next_sample(&mut self) -> bool {
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
        self.current_pixel_sample_index += 1;
        self.current_pixel_sample_index < self.spp
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng.set_sequence(seed);
    }

    fn spp(&self) -> usize {
        self.spp
    }

    fn box_clone(&self) -> Box<dyn Sampler> {
        Box::new(self.clone())
    }

    fn current_sample_number(&self) -> usize {
        self.current_pixel_sample_index
    }
}
