//! Physical models that plug into the central scheme. A model supplies the
//! conservative fluxes in both directions and the largest characteristic
//! speeds; the scheme needs nothing else from the physics.

pub mod advection;
pub mod shallow2d;

pub use advection::Advection;
pub use shallow2d::ShallowWater;




/// Initial value of a wave-speed accumulator. It is positive so that the
/// CFL ratio never divides by zero, and small enough that any physical speed
/// replaces it under `max`.
pub const WAVE_SPEED_SEED: f32 = 1.0e-15;

/// Cells whose leading field is below this magnitude are treated as dry:
/// they contribute nothing to wave speeds and produce no velocity terms.
pub const DRY_THRESHOLD: f32 = 1.0e-5;




/**
 * Flux and wave-speed evaluation for a hyperbolic system of conservation
 * laws `u_t + F(u)_x + G(u)_y = 0`.
 *
 * Both methods act on a run of `ncell` consecutive cells. Field `k` of cell
 * `i` is found at `u[k * field_stride + i]`, so the slices passed in must be
 * at least `(num_fields - 1) * field_stride + ncell` long. Implementations
 * must be pure functions of their inputs.
 */
pub trait FluxModel: Send + Sync {

    /// The number of conserved fields the model operates on.
    fn num_fields(&self) -> usize;

    /// Fill `fu` and `gu` with the x- and y-direction fluxes of `u`.
    fn flux(&self, fu: &mut [f32], gu: &mut [f32], u: &[f32], ncell: usize, field_stride: usize);

    /// Raise `cxy[0]` and `cxy[1]` to the largest x- and y-direction
    /// characteristic speeds found in `u`. This is a max-reduction, so
    /// partial results over disjoint runs may be combined in any order.
    fn speed(&self, cxy: &mut [f32; 2], u: &[f32], ncell: usize, field_stride: usize);
}




/// Combine two partial wave-speed reductions.
pub fn max_speeds(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    [a[0].max(b[0]), a[1].max(b[1])]
}
