//! CIE 1931 standard observer colour matching functions.
//!
//! Tabulated on the classic 360-830nm, 1nm pbrt grid using the multi-lobe
//! Gaussian fit to the standard observer from Wyman, Sloan & Shirley,
//! "Simple Analytic Approximations to the CIE XYZ Color Matching
//! Functions" (JCGT 2013), which reproduces the tabulated CMFs to within
//! about 1e-3.

use lazy_static::lazy_static;

pub const CIE_LAMBDA_START: f32 = 360.0;
pub const CIE_LAMBDA_END: f32 = 830.0;
pub const N_CIE_SAMPLES: usize = 471;
pub const CIE_Y_INTEGRAL: f32 = 106.856895;

fn gaussian(x: f32, alpha: f32, mu: f32, sigma1: f32, sigma2: f32) -> f32 {
    let sigma = if x < mu { sigma1 } else { sigma2 };
    let t = (x - mu) / sigma;
    alpha * (-(t * t) / 2.0).exp()
}

fn x_fit(lambda: f32) -> f32 {
    gaussian(lambda, 1.056, 599.8, 37.9, 31.0) + gaussian(lambda, 0.362, 442.0, 16.0, 26.7)
        - gaussian(lambda, 0.065, 501.1, 20.4, 26.2)
}

fn y_fit(lambda: f32) -> f32 {
    gaussian(lambda, 0.821, 568.8, 46.9, 40.5) + gaussian(lambda, 0.286, 530.9, 16.3, 31.1)
}

fn z_fit(lambda: f32) -> f32 {
    gaussian(lambda, 1.217, 437.0, 11.8, 36.0) + gaussian(lambda, 0.681, 459.0, 26.0, 13.8)
}

lazy_static! {
    pub static ref CIE_LAMBDA: [f32; N_CIE_SAMPLES] = {
        let mut v = [0.0f32; N_CIE_SAMPLES];
        for (i, l) in v.iter_mut().enumerate() {
            *l = CIE_LAMBDA_START + i as f32;
        }
        v
    };
    pub static ref CIE_X: [f32; N_CIE_SAMPLES] = {
        let mut v = [0.0f32; N_CIE_SAMPLES];
        for (i, x) in v.iter_mut().enumerate() {
            *x = x_fit(CIE_LAMBDA_START + i as f32);
        }
        v
    };
    pub static ref CIE_Y: [f32; N_CIE_SAMPLES] = {
        let mut v = [0.0f32; N_CIE_SAMPLES];
        for (i, y) in v.iter_mut().enumerate() {
            *y = y_fit(CIE_LAMBDA_START + i as f32);
        }
        v
    };
    pub static ref CIE_Z: [f32; N_CIE_SAMPLES] = {
        let mut v = [0.0f32; N_CIE_SAMPLES];
        for (i, z) in v.iter_mut().enumerate() {
            *z = z_fit(CIE_LAMBDA_START + i as f32);
        }
        v
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_peaks_near_555nm() {
        let peak_index = CIE_Y
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let peak_lambda = CIE_LAMBDA[peak_index];
        assert!((peak_lambda - 555.0).abs() < 5.0);
    }
}
