use std::sync::atomic::{Ordering, AtomicU32};
use std::f32;
use std::sync::Arc;

use parking_lot::Mutex;

use anyhow::Result;

use {clamp, Point2f, Point2i, Vector2f};
use bounds::{Bounds2f, Bounds2i};
use filter::Filter;
use imageio;
use paramset::ParamSet;
use sampler::Sampler;
use sampling::Distribution2D;
use spectrum::Spectrum;

const FILTER_SIZE: usize = 16;
const FILTER_TABLE_SIZE: usize = FILTER_SIZE * FILTER_SIZE;

/// How a pixel-sample position and its film contribution are derived.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SampleMode {
    /// A sample is placed uniformly at `pixel + u` and splatted to every
    /// pixel within the filter's support, weighted by the filter.
    Convolution,
    /// A sample offset is drawn from the filter's own distribution and
    /// deposited into exactly one pixel, with the filter's pdf dividing
    /// out the sample's contribution instead of a per-pixel weight.
    Importance,
}

/// Tabulates a `Filter` over its support for two purposes: a fast
/// nearest-cell `evaluate()` used while splatting in convolution mode (one
/// quadrant only, relying on filter symmetry), and a `Distribution2D` over
/// `|f|` spanning the filter's full support, used to importance-sample an
/// offset in importance mode.
pub struct FilterTable {
    quadrant: Box<[f32]>,
    radius: Vector2f,
    inv_radius: Vector2f,
    distrib: Distribution2D,
}

impl FilterTable {
    fn new(filter: &dyn Filter) -> FilterTable {
        let (xwidth, ywidth) = filter.width();

        let mut quadrant = vec![0f32; FILTER_TABLE_SIZE];
        for y in 0..FILTER_SIZE {
            let fy = (y as f32 + 0.5) * (ywidth / FILTER_SIZE as f32);
            for x in 0..FILTER_SIZE {
                let fx = (x as f32 + 0.5) * (xwidth / FILTER_SIZE as f32);
                quadrant[y * FILTER_SIZE + x] = filter.evaluate(fx, fy);
            }
        }

        // Full (unmirrored) grid over the filter's entire support, so that
        // alternating-sign filters (e.g. Mitchell) are importance-sampled
        // correctly rather than assumed symmetric.
        let full_size = 2 * FILTER_SIZE;
        let mut full = Vec::with_capacity(full_size * full_size);
        for y in 0..full_size {
            let fy = ((y as f32 + 0.5) / full_size as f32 - 0.5) * 2.0 * ywidth;
            for x in 0..full_size {
                let fx = ((x as f32 + 0.5) / full_size as f32 - 0.5) * 2.0 * xwidth;
                full.push(filter.evaluate(fx, fy).abs());
            }
        }

        FilterTable {
            quadrant: quadrant.into_boxed_slice(),
            radius: Vector2f::new(xwidth, ywidth),
            inv_radius: Vector2f::new(1.0 / xwidth, 1.0 / ywidth),
            distrib: Distribution2D::new(&full, full_size, full_size),
        }
    }

    pub fn radius(&self) -> Vector2f {
        self.radius
    }

    /// Nearest-cell lookup of the filter's value at offset `(dx, dy)` from
    /// a pixel center, relying on the filter's assumed symmetry to fold
    /// the lookup into one quadrant.
    pub fn evaluate(&self, dx: f32, dy: f32) -> f32 {
        let fx = (dx.abs() * self.inv_radius.x * FILTER_SIZE as f32)
            .floor()
            .min(FILTER_SIZE as f32 - 1.0) as usize;
        let fy = (dy.abs() * self.inv_radius.y * FILTER_SIZE as f32)
            .floor()
            .min(FILTER_SIZE as f32 - 1.0) as usize;
        self.quadrant[fy * FILTER_SIZE + fx]
    }

    /// Importance-samples an offset from a pixel center, weighted by the
    /// filter's absolute value over its full support. Returns the offset
    /// and its pdf with respect to that offset (not the `[0, 1)` table
    /// space `Distribution2D` samples in).
    pub fn sample(&self, u: &Point2f) -> (Point2f, f32) {
        let (p, pdf_unit_square) = self.distrib.sample_continuous(u);
        let offset = Point2f::new(
            (p.x - 0.5) * 2.0 * self.radius.x,
            (p.y - 0.5) * 2.0 * self.radius.y,
        );
        // p -> offset has Jacobian (2*radius.x, 2*radius.y); dividing by
        // the resulting area converts the unit-square density into a
        // density over the offset.
        let pdf = pdf_unit_square / (4.0 * self.radius.x * self.radius.y);

        (offset, pdf)
    }
}

#[derive(Default)]
struct AtomicFloat {
    bits: AtomicU32,
}

impl AtomicFloat {
    pub fn new(v: f32) -> AtomicFloat {
        AtomicFloat { bits: AtomicU32::new(v.to_bits()) }
    }

    pub fn as_float(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[derive(Default)]
struct Pixel {
    xyz: [f32; 3],
    filter_weight_sum: f32,
    splat_xyz: [AtomicFloat; 3],
    _pad: f32,
}

pub struct Film {
    pub full_resolution: Point2i,
    pub _diagonal: f32,
    pub filename: String,
    pub cropped_pixel_bounds: Bounds2i,
    pixels: Mutex<Vec<Pixel>>,
    filter_table: Arc<FilterTable>,
    filter_radius: Vector2f,
    sample_mode: SampleMode,
    scale: f32,
}

impl Film {
    pub fn new(resolution: Point2i,
               cropwindow: Bounds2f,
               filter: Box<dyn Filter + Sync + Send>,
               diagonal: f32,
               filename: &str,
               scale: f32,
               sample_mode: SampleMode)
               -> Film {
        let cropped_pixel_bounds =
            Bounds2i::from_points(&Point2i::new((resolution.x as f32 * cropwindow.p_min.x).ceil() as
                                                i32,
                                                (resolution.y as f32 * cropwindow.p_min.y).ceil() as
                                                i32),
                                  &Point2i::new((resolution.x as f32 * cropwindow.p_max.x).ceil() as
                                                i32,
                                                (resolution.y as f32 * cropwindow.p_max.y).ceil() as
                                                i32));

        info!("Created film with full resolution {}. Crop window of {} -> cropped_pixel_bounds {}",
              resolution,
              cropwindow,
              cropped_pixel_bounds);
        let mut pixels = Vec::with_capacity(cropped_pixel_bounds.area() as usize);
        pixels.resize_with(cropped_pixel_bounds.area() as usize, Pixel::default);

        let filter_table = FilterTable::new(&*filter);
        let filter_radius = filter_table.radius();

        Film {
            full_resolution: resolution,
            pixels: Mutex::new(pixels),
            filter_table: Arc::new(filter_table),
            filter_radius,
            sample_mode,
            cropped_pixel_bounds: cropped_pixel_bounds,
            scale: scale,
            _diagonal: diagonal * 0.001,
            filename: filename.to_owned(),
        }
    }

    pub fn create(ps: &mut ParamSet, filter: Box<dyn Filter + Send + Sync>) -> Box<Film> {
        let mut filename = ps.find_one_string("filename", "".into());
        if filename == "" {
            filename = "image.png".into();
        } else {
            filename = String::from("rt-") + &filename;
        }
        let xres = ps.find_one_int("xresolution", 1280);
        let yres = ps.find_one_int("yresolution", 720);
        let mut crop = Bounds2f::from_points(&Point2f::new(0.0, 0.0), &Point2f::new(1.0, 1.0));
        if let Some(cr) = ps.find_float("cropwindow") {
            if cr.len() == 4 {
                crop.p_min.x = clamp(f32::min(cr[0], cr[1]), 0.0, 1.0);
                crop.p_max.x = clamp(f32::max(cr[0], cr[1]), 0.0, 1.0);
                crop.p_min.y = clamp(f32::min(cr[2], cr[3]), 0.0, 1.0);
                crop.p_max.y = clamp(f32::max(cr[2], cr[3]), 0.0, 1.0);
            } else {
                warn!("\"cropwindow\" expected 4 values");
            }
        }
        let scale = ps.find_one_float("scale", 1.0);
        let diagonal = ps.find_one_float("diagonal", 35.0);
        let sample_mode = match &ps.find_one_string("samplemode", "convolution".into())[..] {
            "importance" => SampleMode::Importance,
            _ => SampleMode::Convolution,
        };
        // TODO max_sample_luminance
        Box::new(Film::new(Point2i::new(xres, yres),
                           crop,
                           filter,
                           diagonal,
                           &filename,
                           scale,
                           sample_mode))
    }

    pub fn get_film_tile(&self, sample_bounds: &Bounds2i) -> FilmTile {
        let float_bounds: Bounds2f = (*sample_bounds).into();
        let float_cropped_pixel_bounds: Bounds2f = self.cropped_pixel_bounds.into();

        let tile_pixel_bounds = match self.sample_mode {
            SampleMode::Convolution => {
                let half_pixel = Vector2f::new(0.5, 0.5);
                // This is a bit clunky but we need to do all the computations as floats as the
                // numbers can temporarily be negative which would cause u32 to wrap around.
                let p0 = ceil(float_bounds.p_min - half_pixel - self.filter_radius);
                let p1 = floor(float_bounds.p_max - half_pixel + self.filter_radius +
                               Vector2f::new(1.0, 1.0));
                let sample_extent_bounds = Bounds2f::from_points(&p0, &p1);
                Bounds2i::from(Bounds2f::intersect(&sample_extent_bounds,
                                                   &float_cropped_pixel_bounds))
            }
            SampleMode::Importance => {
                Bounds2i::from(Bounds2f::intersect(&float_bounds, &float_cropped_pixel_bounds))
            }
        };

        FilmTile::new(&tile_pixel_bounds,
                      &self.filter_radius,
                      Arc::clone(&self.filter_table),
                      self.sample_mode)
    }

    pub fn merge_film_tile(&self, tile: &FilmTile) {
        let mut pixels = self.pixels.lock();
        for pixel in &tile.get_pixel_bounds() {
            let tile_pixel = tile.get_pixel(&pixel);
            let pidx = {
                let width = self.cropped_pixel_bounds.p_max.x - self.cropped_pixel_bounds.p_min.x;
                ((pixel.y - self.cropped_pixel_bounds.p_min.y) * width +
                 (pixel.x - self.cropped_pixel_bounds.p_min.x)) as usize
            };
            let xyz = tile_pixel.contrib_sum.to_xyz();
            for i in 0..3 {
                pixels[pidx].xyz[i] += xyz[i];
            }
            pixels[pidx].filter_weight_sum += tile_pixel.filter_weight_sum;
        }
    }

    pub fn write_image(&self) -> Result<()> {
        info!("Converting image to RGB and computing final weighted pixel values");
        let splat_scale = 1.0; // TODO
        let pixels = self.pixels.lock();
        let mut rgb = Vec::with_capacity(3 * self.cropped_pixel_bounds.area() as usize);
        for p in &self.cropped_pixel_bounds {
            // Convert pixel XYZ color to RGB
            let pixel_idx = self.get_pixel_idx(&p);
            let pixel = &pixels[pixel_idx];
            let mut rgb_pixel = Spectrum::from_xyz(&pixel.xyz);

            // Normalize pixel with weight sum
            let filter_weight_sum = pixel.filter_weight_sum;
            if filter_weight_sum != 0.0 {
                let inv_wt = 1.0 / filter_weight_sum;
                rgb_pixel[0] = f32::max(0.0, rgb_pixel[0] * inv_wt);
                rgb_pixel[1] = f32::max(0.0, rgb_pixel[1] * inv_wt);
                rgb_pixel[2] = f32::max(0.0, rgb_pixel[2] * inv_wt);
            }

            let splat_xyz = [pixel.splat_xyz[0].as_float(),
                             pixel.splat_xyz[1].as_float(),
                             pixel.splat_xyz[2].as_float()];
            let mut splat_rgb = Spectrum::from_xyz(&splat_xyz);
            rgb_pixel[0] += splat_scale * splat_rgb[0];
            rgb_pixel[1] += splat_scale * splat_rgb[1];
            rgb_pixel[2] += splat_scale * splat_rgb[2];

            // Scale pixel value by scale
            rgb_pixel[0] *= self.scale;
            rgb_pixel[1] *= self.scale;
            rgb_pixel[2] *= self.scale;

            rgb.push(rgb_pixel[0]);
            rgb.push(rgb_pixel[1]);
            rgb.push(rgb_pixel[2]);
        }

        // Write RGB image
        info!("Writing image {} with bounds {}",
              self.filename,
              self.cropped_pixel_bounds);
        imageio::write_image(&self.filename,
                             &rgb[..],
                             &self.cropped_pixel_bounds,
                             self.full_resolution)
    }

    pub fn get_sample_bounds(&self) -> Bounds2i {
        match self.sample_mode {
            SampleMode::Convolution => {
                let half = Vector2f::new(0.5, 0.5);
                let float_bounds =
                    Bounds2f::from_points(&floor(Point2f::from(self.cropped_pixel_bounds.p_min) + half -
                                                 self.filter_radius),
                                          &ceil(Point2f::from(self.cropped_pixel_bounds.p_max) - half +
                                                self.filter_radius));

                float_bounds.into()
            }
            SampleMode::Importance => self.cropped_pixel_bounds,
        }
    }

    fn get_pixel_idx(&self, p: &Point2i) -> usize {
        assert!(self.cropped_pixel_bounds.inside_exclusive(p));
        let width = self.cropped_pixel_bounds.p_max.x - self.cropped_pixel_bounds.p_min.x;
        let offset = (p.x - self.cropped_pixel_bounds.p_min.x) +
                     (p.y - self.cropped_pixel_bounds.p_min.y) * width;
        offset as usize
    }
}

pub struct FilmTile {
    pixel_bounds: Bounds2i,
    filter_radius: Vector2f,
    filter_table: Arc<FilterTable>,
    sample_mode: SampleMode,
    pub pixels: Vec<FilmTilePixel>,
}

impl FilmTile {
    pub fn new(pixel_bounds: &Bounds2i,
               filter_radius: &Vector2f,
               filter_table: Arc<FilterTable>,
               sample_mode: SampleMode)
               -> FilmTile {
        FilmTile {
            pixel_bounds: *pixel_bounds,
            filter_radius: *filter_radius,
            filter_table,
            sample_mode,
            pixels: vec![FilmTilePixel::default(); pixel_bounds.area() as usize],
        }
    }

    pub fn sample_mode(&self) -> SampleMode {
        self.sample_mode
    }

    /// Draws a film-space sample position for pixel `p`. Returns the
    /// position and the pdf with which it was drawn: always `1.0` in
    /// convolution mode, the filter's own pdf in importance mode.
    pub fn sample_pixel(&self, p: &Point2i, sampler: &mut dyn Sampler) -> (Point2f, f32) {
        match self.sample_mode {
            SampleMode::Convolution => {
                let u = sampler.get_2d();
                (Point2f::new(p.x as f32 + u.x, p.y as f32 + u.y), 1.0)
            }
            SampleMode::Importance => {
                let u = sampler.get_2d();
                let (offset, pdf) = self.filter_table.sample(&u);
                (Point2f::new(p.x as f32 + 0.5 + offset.x, p.y as f32 + 0.5 + offset.y), pdf)
            }
        }
    }

    /// Accumulates `colour` sampled at `p_film` with pdf `pdf` (`1.0` in
    /// convolution mode). Convolution mode splats the contribution,
    /// filter-weighted, to every pixel within the filter's support;
    /// importance mode deposits `colour / pdf` into the single pixel the
    /// sample landed in.
    pub fn add_sample(&mut self, p_film: &Point2f, colour: Spectrum, pdf: f32) {
        if colour.has_nan() {
            warn!("colour has NaNs! Ignoring");
            return;
        }

        match self.sample_mode {
            SampleMode::Convolution => self.add_sample_convolution(p_film, colour),
            SampleMode::Importance => self.add_sample_importance(p_film, colour, pdf),
        }
    }

    fn add_sample_convolution(&mut self, p_film: &Point2f, colour: Spectrum) {
        let float_pixel_bounds: Bounds2f = self.pixel_bounds.into();
        // Convert to discrete pixel space
        let p_film_discrete = *p_film - Vector2f::new(0.5, 0.5);
        // compute sample raster extent (i.e. how many pixels are affected)
        // (x0, y0) -> (x1, y1) is the zone of the image affected by the sample
        let p0_f = ceil(p_film_discrete - self.filter_radius);

        let p1_f = floor(p_film_discrete + self.filter_radius + Vector2f::new(1.0, 1.0));

        let bounds: Bounds2i = Bounds2i::from(Bounds2f::intersect(&Bounds2f::from_points(&p0_f,
                                                                                         &p1_f),
                                                                  &float_pixel_bounds));
        let (p0, p1) = (bounds.p_min, bounds.p_max);

        assert!(p1.x >= p0.x && p1.y >= p0.y,
                format!("p_film={}, p0={}, p1={}, pixel_bounds={:?}",
                        p_film,
                        p0,
                        p1,
                        self.pixel_bounds));

        // Add this sample's contribution to all the affected pixels
        for y in p0.y..p1.y {
            let dy = y as f32 - p_film_discrete.y;
            for x in p0.x..p1.x {
                let dx = x as f32 - p_film_discrete.x;
                let filter_weight = self.filter_table.evaluate(dx, dy);
                let idx = self.get_pixel_index(&Point2i::new(x, y));
                let pixel = &mut self.pixels[idx];
                pixel.contrib_sum += colour * filter_weight;
                pixel.filter_weight_sum += filter_weight;
            }
        }
    }

    fn add_sample_importance(&mut self, p_film: &Point2f, colour: Spectrum, pdf: f32) {
        if pdf <= 0.0 {
            return;
        }

        let p = Point2i::new(p_film.x.floor() as i32, p_film.y.floor() as i32);
        if !self.pixel_bounds.inside_exclusive(&p) {
            return;
        }

        let weighted = colour / pdf;
        if weighted.has_nan() {
            return;
        }

        let idx = self.get_pixel_index(&p);
        let pixel = &mut self.pixels[idx];
        pixel.contrib_sum += weighted;
        pixel.filter_weight_sum += 1.0;
    }

    pub fn get_pixel<'a>(&'a self, p: &Point2i) -> &'a FilmTilePixel {
        &self.pixels[self.get_pixel_index(p)]
    }

    pub fn get_pixel_bounds(&self) -> Bounds2i {
        self.pixel_bounds
    }

    fn get_pixel_index(&self, p: &Point2i) -> usize {
        let width = self.pixel_bounds.p_max.x - self.pixel_bounds.p_min.x;
        let pidx = (p.y - self.pixel_bounds.p_min.y) * width + (p.x - self.pixel_bounds.p_min.x);
        pidx as usize
    }
}

#[derive(Clone, Default)]
pub struct FilmTilePixel {
    contrib_sum: Spectrum,
    filter_weight_sum: f32,
}

fn ceil(p: Point2f) -> Point2f {
    Point2f::new(p.x.ceil(), p.y.ceil())
}

fn floor(p: Point2f) -> Point2f {
    Point2f::new(p.x.floor(), p.y.floor())
}
