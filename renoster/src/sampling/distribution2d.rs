use crate::sampling::Distribution1D;
use crate::Point2f;

/// A 2D piecewise-constant distribution, built as a marginal distribution
/// over rows stacked on top of a conditional distribution per row. Used to
/// importance-sample functions tabulated on a grid (e.g. a pixel filter).
pub struct Distribution2D {
    p_conditional_v: Vec<Distribution1D>,
    p_marginal: Distribution1D,
}

impl Distribution2D {
    pub fn new(func: &[f32], nu: usize, nv: usize) -> Distribution2D {
        assert_eq!(func.len(), nu * nv);

        let mut p_conditional_v = Vec::with_capacity(nv);
        for v in 0..nv {
            p_conditional_v.push(Distribution1D::new(&func[v * nu..(v + 1) * nu]));
        }

        let marginal_func: Vec<f32> = p_conditional_v.iter().map(|d| d.func_int).collect();

        Distribution2D {
            p_conditional_v,
            p_marginal: Distribution1D::new(&marginal_func),
        }
    }

    /// Samples a point in `[0, 1) x [0, 1)` and its pdf with respect to
    /// that unit square.
    pub fn sample_continuous(&self, u: &Point2f) -> (Point2f, f32) {
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u.y);
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u.x);

        (Point2f::new(d0, d1), pdf0 * pdf1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_continuous_is_in_unit_square() {
        let func = [1.0, 1.0, 1.0, 1.0, 3.0, 1.0];
        let distrib = Distribution2D::new(&func, 3, 2);

        for &(ux, uy) in &[(0.0, 0.0), (0.25, 0.75), (0.999, 0.001)] {
            let (p, pdf) = distrib.sample_continuous(&Point2f::new(ux, uy));
            assert!(p.x >= 0.0 && p.x < 1.0);
            assert!(p.y >= 0.0 && p.y < 1.0);
            assert!(pdf > 0.0);
        }
    }

    #[test]
    fn uniform_function_has_uniform_pdf() {
        let func = [1.0; 4];
        let distrib = Distribution2D::new(&func, 2, 2);
        let (_, pdf) = distrib.sample_continuous(&Point2f::new(0.1, 0.9));
        assert!((pdf - 1.0).abs() < 1e-5);
    }
}
