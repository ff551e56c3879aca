use serde::{Deserialize, Serialize};
use super::FluxModel;




#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]


/**
 * Scalar linear advection `u_t + a u_x + b u_y = 0` with a constant
 * velocity `(a, b)`. Every profile is carried unchanged at that velocity,
 * which makes it the reference model for transport and wrap-around checks.
 */
pub struct Advection {
    pub velocity: (f32, f32),
}




// ============================================================================
impl Advection {
    pub fn new(a: f32, b: f32) -> Self {
        Self { velocity: (a, b) }
    }
}

impl FluxModel for Advection {

    fn num_fields(&self) -> usize {
        1
    }

    fn flux(&self, fu: &mut [f32], gu: &mut [f32], u: &[f32], ncell: usize, _field_stride: usize) {
        let (a, b) = self.velocity;

        for ((f, g), u) in fu[..ncell].iter_mut().zip(&mut gu[..ncell]).zip(&u[..ncell]) {
            *f = a * u;
            *g = b * u;
        }
    }

    fn speed(&self, cxy: &mut [f32; 2], _u: &[f32], ncell: usize, _field_stride: usize) {
        if ncell > 0 {
            cxy[0] = cxy[0].max(self.velocity.0.abs());
            cxy[1] = cxy[1].max(self.velocity.1.abs());
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::Advection;
    use crate::hydro::{FluxModel, WAVE_SPEED_SEED};

    #[test]
    fn flux_scales_with_velocity() {
        let model = Advection::new(2.0, -1.0);
        let u = [1.0, 3.0];
        let mut f = [0.0; 2];
        let mut g = [0.0; 2];
        model.flux(&mut f, &mut g, &u, 2, 2);
        assert_eq!(f, [2.0, 6.0]);
        assert_eq!(g, [-1.0, -3.0]);
    }

    #[test]
    fn speed_is_velocity_magnitude() {
        let model = Advection::new(-2.0, 0.5);
        let mut cxy = [WAVE_SPEED_SEED; 2];
        model.speed(&mut cxy, &[1.0], 1, 1);
        assert_eq!(cxy, [2.0, 0.5]);
    }
}
