use std::sync::atomic::{AtomicUsize, Ordering};

use log::warn;

use crate::Point2i;

/// Order in which tiles are handed out to worker threads.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IssueOrder {
    Horizontal,
    Vertical,
    Spiral,
}

/// Hands out tile coordinates (not pixel bounds) to worker threads,
/// each tile issued exactly once. `n_tiles` is the tile grid extent, not
/// the pixel extent; callers turn the returned `Point2i` into a pixel
/// `Bounds2i` themselves (see `renderer::render`).
pub struct TileGenerator {
    n_tiles: Point2i,
    order: IssueOrder,
    counter: AtomicUsize,
    warned: AtomicUsize,
}

impl TileGenerator {
    pub fn new(n_tiles: Point2i, order: IssueOrder) -> TileGenerator {
        TileGenerator {
            n_tiles,
            order,
            counter: AtomicUsize::new(0),
            warned: AtomicUsize::new(0),
        }
    }

    pub fn num_tiles(&self) -> usize {
        (self.n_tiles.x * self.n_tiles.y) as usize
    }

    /// Returns the next tile coordinate to render, or `None` once every
    /// tile has been issued. Safe to call concurrently from any number of
    /// worker threads; each index is handed out exactly once.
    pub fn next(&self) -> Option<Point2i> {
        let c = self.counter.fetch_add(1, Ordering::AcqRel);
        if c >= self.num_tiles() {
            return None;
        }

        match self.order {
            IssueOrder::Horizontal => Some(self.horizontal(c)),
            IssueOrder::Vertical => Some(self.vertical(c)),
            IssueOrder::Spiral => {
                if self.warned.fetch_add(1, Ordering::Relaxed) == 0 {
                    warn!("Spiral tile issue order is not implemented; falling back to horizontal order.");
                }
                Some(self.horizontal(c))
            }
        }
    }

    fn horizontal(&self, c: usize) -> Point2i {
        let width = self.n_tiles.x as usize;
        Point2i::new((c % width) as i32, (c / width) as i32)
    }

    fn vertical(&self, c: usize) -> Point2i {
        let height = self.n_tiles.y as usize;
        Point2i::new((c / height) as i32, (c % height) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_order_covers_every_tile_exactly_once() {
        let gen = TileGenerator::new(Point2i::new(3, 2), IssueOrder::Horizontal);
        let mut seen = Vec::new();
        while let Some(t) = gen.next() {
            seen.push(t);
        }
        assert_eq!(seen.len(), 6);
        seen.sort_by_key(|p| (p.y, p.x));
        assert_eq!(seen[0], Point2i::new(0, 0));
        assert_eq!(seen[5], Point2i::new(2, 1));
        assert_eq!(gen.next(), None);
    }

    #[test]
    fn vertical_order_covers_every_tile_exactly_once() {
        let gen = TileGenerator::new(Point2i::new(2, 3), IssueOrder::Vertical);
        let mut seen = Vec::new();
        while let Some(t) = gen.next() {
            seen.push(t);
        }
        assert_eq!(seen.len(), 6);
        seen.sort_by_key(|p| (p.x, p.y));
        assert_eq!(seen[0], Point2i::new(0, 0));
        assert_eq!(seen[5], Point2i::new(1, 2));
    }

    #[test]
    fn spiral_falls_back_to_horizontal() {
        let gen = TileGenerator::new(Point2i::new(2, 2), IssueOrder::Spiral);
        assert_eq!(gen.next(), Some(Point2i::new(0, 0)));
        assert_eq!(gen.next(), Some(Point2i::new(1, 0)));
    }
}
