use std::sync::Arc;

use arena::Allocator;

use interaction::SurfaceInteraction;
use texture::Texture;
use {Vector2f, Vector3f};

mod matte;

pub use self::matte::MatteMaterial;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum TransportMode {
    RADIANCE,
    IMPORTANCE,
}

pub trait Material: ::std::fmt::Debug + Send + Sync {
    fn compute_scattering_functions<'a, 'b>(
        &self,
        si: &mut SurfaceInteraction<'a, 'b>,
        mode: TransportMode,
        allow_multiple_lobes: bool,
        arena: &'b Allocator<'_>,
    );
}

/// Perturb the shading geometry of `si` according to the bump map `d`, by
/// finite-differencing the displacement in the u and v directions.
pub fn bump(d: &Arc<dyn Texture<f32> + Send + Sync>, si: &mut SurfaceInteraction<'_, '_>) {
    let mut si_eval = si.clone();

    let mut du = 0.5 * (si.dudx.abs() + si.dudy.abs());
    if du == 0.0 {
        du = 0.0005;
    }
    si_eval.hit.p = si.hit.p + du * si.shading.dpdu;
    si_eval.uv = si.uv + Vector2f::new(du, 0.0);
    si_eval.shading.n = (si.shading.dpdu.cross(&si.shading.dpdv) + du * si.dndu).normalize();
    let u_displace = d.evaluate(&si_eval);

    let mut dv = 0.5 * (si.dvdx.abs() + si.dvdy.abs());
    if dv == 0.0 {
        dv = 0.0005;
    }
    si_eval.hit.p = si.hit.p + dv * si.shading.dpdv;
    si_eval.uv = si.uv + Vector2f::new(dv, 0.0);
    si_eval.shading.n = (si.shading.dpdv.cross(&si.shading.dpdv) + dv * si.dndv).normalize();
    let v_displace = d.evaluate(&si_eval);

    let displace = d.evaluate(si);

    let dpdu = si.shading.dpdu + (u_displace - displace) / du * Vector3f::from(si.shading.n)
        + displace * Vector3f::from(si.dndu);
    let dpdv = si.shading.dpdv + (v_displace - displace) / dv * Vector3f::from(si.shading.n)
        + displace * Vector3f::from(si.dndv);
    let dndu = si.shading.dndu;
    let dndv = si.shading.dndv;
    si.set_shading_geometry(&dpdu, &dpdv, &dndu, &dndv, false);
}
