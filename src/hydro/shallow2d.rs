use serde::{Deserialize, Serialize};
use super::{FluxModel, DRY_THRESHOLD};




/// Standard gravitational acceleration used by the default model.
pub const GRAVITY: f32 = 9.8;




#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]


/**
 * The 2D shallow-water equations in conservative form. The fields are the
 * water height `h` and the momenta `hu`, `hv`:
 *
 * ```text
 * F = (hu, hu^2/h + g h^2/2, hu hv/h)
 * G = (hv, hu hv/h, hv^2/h + g h^2/2)
 * ```
 */
pub struct ShallowWater {
    pub gravity: f32,
}




// ============================================================================
impl ShallowWater {
    pub fn new(gravity: f32) -> Self {
        Self { gravity }
    }
}

impl Default for ShallowWater {
    fn default() -> Self {
        Self::new(GRAVITY)
    }
}




// ============================================================================
impl FluxModel for ShallowWater {

    fn num_fields(&self) -> usize {
        3
    }

    fn flux(&self, fu: &mut [f32], gu: &mut [f32], u: &[f32], ncell: usize, field_stride: usize) {
        let (h, hu, hv) = fields(u, ncell, field_stride);
        let (fh, fhu, fhv) = fields_mut(fu, ncell, field_stride);
        let (gh, ghu, ghv) = fields_mut(gu, ncell, field_stride);

        fh.copy_from_slice(hu);
        gh.copy_from_slice(hv);

        let half_g = 0.5 * self.gravity;

        for i in 0..ncell {
            let (hi, hui, hvi) = (h[i], hu[i], hv[i]);
            let inv_h = if hi.abs() > DRY_THRESHOLD { 1.0 / hi } else { 0.0 };
            let pressure = half_g * hi * hi;
            let cross = hui * hvi * inv_h;
            fhu[i] = hui * hui * inv_h + pressure;
            fhv[i] = cross;
            ghu[i] = cross;
            ghv[i] = hvi * hvi * inv_h + pressure;
        }
    }

    fn speed(&self, cxy: &mut [f32; 2], u: &[f32], ncell: usize, field_stride: usize) {
        let (h, hu, hv) = fields(u, ncell, field_stride);
        let mut cx = cxy[0];
        let mut cy = cxy[1];

        for i in 0..ncell {
            let hi = h[i];
            if hi.abs() < DRY_THRESHOLD {
                continue;
            }
            let inv_h = 1.0 / hi;
            let root_gh = (self.gravity * hi).sqrt();
            cx = cx.max((hu[i] * inv_h).abs() + root_gh);
            cy = cy.max((hv[i] * inv_h).abs() + root_gh);
        }
        cxy[0] = cx;
        cxy[1] = cy;
    }
}




// ============================================================================
fn fields(u: &[f32], ncell: usize, stride: usize) -> (&[f32], &[f32], &[f32]) {
    (&u[..ncell], &u[stride..stride + ncell], &u[2 * stride..2 * stride + ncell])
}

fn fields_mut(u: &mut [f32], ncell: usize, stride: usize) -> (&mut [f32], &mut [f32], &mut [f32]) {
    let (a, rest) = u.split_at_mut(stride);
    let (b, c) = rest.split_at_mut(stride);
    (&mut a[..ncell], &mut b[..ncell], &mut c[..ncell])
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::ShallowWater;
    use crate::hydro::{FluxModel, WAVE_SPEED_SEED};

    #[test]
    fn still_water_has_only_pressure_flux() {
        let model = ShallowWater::new(10.0);
        let u = [2.0, 0.0, 0.0];
        let mut f = [0.0; 3];
        let mut g = [0.0; 3];
        model.flux(&mut f, &mut g, &u, 1, 1);
        assert_eq!(f, [0.0, 20.0, 0.0]);
        assert_eq!(g, [0.0, 0.0, 20.0]);
    }

    #[test]
    fn flux_uses_field_stride() {
        let model = ShallowWater::new(10.0);
        // Two cells, stride of three leaves a gap that must not be touched.
        let u = [1.0, 2.0, -1.0, 2.0, 4.0, -1.0, 0.0, 0.0];
        let mut f = [7.0; 8];
        let mut g = [7.0; 8];
        model.flux(&mut f, &mut g, &u, 2, 3);
        assert_eq!(f[0], 2.0);
        assert_eq!(f[1], 4.0);
        assert_eq!(f[2], 7.0);
        assert_eq!(f[3], 2.0 * 2.0 / 1.0 + 5.0);
        assert_eq!(f[4], 4.0 * 4.0 / 2.0 + 20.0);
        assert_eq!(g[6], 5.0);
        assert_eq!(g[7], 20.0);
    }

    #[test]
    fn speed_is_velocity_plus_celerity() {
        let model = ShallowWater::new(10.0);
        let u = [0.1, 0.3, -0.2];
        let mut cxy = [WAVE_SPEED_SEED; 2];
        model.speed(&mut cxy, &u, 1, 1);
        let c = (10.0f32 * 0.1).sqrt();
        assert!((cxy[0] - (3.0 + c)).abs() < 1e-5);
        assert!((cxy[1] - (2.0 + c)).abs() < 1e-5);
    }

    #[test]
    fn dry_cells_do_not_contribute_speed() {
        let model = ShallowWater::default();
        let u = [0.0, 5.0, 5.0];
        let mut cxy = [WAVE_SPEED_SEED; 2];
        model.speed(&mut cxy, &u, 1, 1);
        assert_eq!(cxy, [WAVE_SPEED_SEED; 2]);
    }
}
