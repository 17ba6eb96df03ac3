use std::fmt::Debug;

use interaction::SurfaceInteraction;
use spectrum::Spectrum;

mod constant;

pub use self::constant::ConstantTexture;

pub trait Texture<T>: Debug + Send + Sync {
    fn evaluate(&self, si: &SurfaceInteraction) -> T;
}

// Some convenient aliases
pub type TextureSpectrum = dyn Texture<Spectrum>;
pub type TextureFloat = dyn Texture<f32>;
