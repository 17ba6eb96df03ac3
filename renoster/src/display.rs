use anyhow::Result;

use crate::bounds::Bounds2i;
use crate::film::Film;

/// A sink that the renderer can push finished tiles to as they complete.
///
/// Non-interactive by design (no live/progressive preview, per spec); the
/// one concrete implementation shipped in-tree, `ImageDisplay`, only does
/// anything at `close()`, when it asks the film to write out the final
/// image. `write_tile` exists so a future sink (e.g. a progressive PNG
/// dump, or an interactive window) can hook in without changing the
/// renderer's call sites.
pub trait Display: Send + Sync {
    fn open(&mut self, _film: &Film) {}

    fn write_tile(&mut self, _film: &Film, _tile_bounds: &Bounds2i) {}

    fn close(&mut self, film: &Film) -> Result<()>;
}

#[derive(Default)]
pub struct NoopDisplay;

impl Display for NoopDisplay {
    fn close(&mut self, _film: &Film) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct ImageDisplay;

impl Display for ImageDisplay {
    fn close(&mut self, film: &Film) -> Result<()> {
        film.write_image()
    }
}
