//! The Jiang–Tadmor staggered central scheme.
//!
//! Each sub-step is a predictor (half step from limited flux slopes)
//! followed by a corrector (staggered average plus flux differences at the
//! half step). The corrector's output lives on the grid staggered by half a
//! cell in each direction on even sub-steps, and is shifted back onto the
//! primary grid on odd sub-steps, so data returns to primary indexing after
//! every parity pair.
//!
//! For the corrector we write
//!
//! ```text
//! v(i, j) = (s(i, j+1) + s(i, j)) - (d(i, j+1) - d(i, j))
//! ```
//!
//! where `s` collects the state and x-direction terms of a row and `d` the
//! y-direction terms. Only two rows of `s` and `d` are alive at any time.

use std::mem;
use crate::grid::{Layout, StepBuffers};
use crate::hydro::FluxModel;
use super::limiter::{limited_deriv_across, limited_deriv_row};




/// Which of the two interleaved grids a sub-step writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}




// ============================================================================
impl Parity {

    /// Offset, in cells along both axes, of the corrector's output.
    pub fn shift(self) -> usize {
        match self {
            Parity::Even => 0,
            Parity::Odd => 1,
        }
    }
}




/// Time step and cell spacing of a sub-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSize {
    pub dt: f32,
    pub dx: f32,
    pub dy: f32,
}




// ============================================================================
impl StepSize {

    fn dtcdx2(&self) -> f32 {
        0.5 * self.dt / self.dx
    }

    fn dtcdy2(&self) -> f32 {
        0.5 * self.dt / self.dy
    }
}




/**
 * Take one sub-step: read `buffers.current`, write `buffers.staged`.
 *
 * The output covers the interior of `layout` shifted by the parity. Input
 * must be valid on the interior extended by `ng` cells; in practice this
 * means the ghost margin has been filled, or the layout is an expanded view
 * of a buffer whose outer two rings are the only invalid cells.
 */
pub fn step<M>(buffers: &mut StepBuffers, layout: &Layout, model: &M, parity: Parity, size: StepSize)
where
    M: FluxModel + ?Sized,
{
    let StepBuffers { current, staged, f, g, scratch } = buffers;
    let w = layout.nx_all();
    let h = layout.ny_all();
    let stride = layout.field_stride();

    model.flux(f, g, current, stride, stride);

    predict(staged, scratch, current, f, g, size, layout);

    // Fluxes at the half step
    for y in 1..h - 1 {
        let start = layout.index(0, 1, y);
        model.flux(&mut f[start..], &mut g[start..], &staged[start..], w - 2, stride);
    }

    correct(staged, scratch, current, f, g, size, layout, parity);
}




/**
 * Advance a ghost-filled buffer set by a parity pair of sub-steps with the
 * same `dt`. The even sub-step runs on the domain expanded by two cells so
 * that the odd sub-step still has a valid two-cell margin; no exchange is
 * needed in between. The result is left in `buffers.current`.
 */
pub fn step_pair<M>(buffers: &mut StepBuffers, layout: &Layout, model: &M, size: StepSize)
where
    M: FluxModel + ?Sized,
{
    step(buffers, &layout.expand(2), model, Parity::Even, size);
    buffers.swap();
    step(buffers, layout, model, Parity::Odd, size);
    buffers.swap();
}




// ============================================================================
fn predict(
    v: &mut [f32],
    scratch: &mut [f32],
    u: &[f32],
    f: &[f32],
    g: &[f32],
    size: StepSize,
    layout: &Layout)
{
    let w = layout.nx_all();
    let h = layout.ny_all();
    let dtcdx2 = size.dtcdx2();
    let dtcdy2 = size.dtcdy2();
    let (fx, rest) = scratch.split_at_mut(w);
    let gy = &mut rest[..w];

    for k in 0..layout.nfield() {
        for y in 1..h - 1 {
            let row = layout.row(k, y);
            limited_deriv_row(fx, &f[row.clone()]);
            limited_deriv_across(gy, &g[layout.row(k, y - 1)], &g[row.clone()], &g[layout.row(k, y + 1)]);

            let vk = &mut v[row.clone()];
            let uk = &u[row];

            for x in 1..w - 1 {
                vk[x] = uk[x] - dtcdx2 * fx[x] - dtcdy2 * gy[x];
            }
        }
    }
}




#[allow(clippy::too_many_arguments)]
fn correct_sd(
    s: &mut [f32],
    d: &mut [f32],
    ux: &[f32],
    uy: &[f32],
    u: &[f32],
    f: &[f32],
    g: &[f32],
    dtcdx2: f32,
    dtcdy2: f32,
    xlo: usize,
    xhi: usize)
{
    for x in xlo..xhi {
        s[x] =
            0.2500 * (u [x] + u [x + 1]) +
            0.0625 * (ux[x] - ux[x + 1]) +
            dtcdx2 * (f [x] - f [x + 1]);
    }
    for x in xlo..xhi {
        d[x] =
            0.0625 * (uy[x] + uy[x + 1]) +
            dtcdy2 * (g [x] + g [x + 1]);
    }
}




#[allow(clippy::too_many_arguments)]
fn correct(
    v: &mut [f32],
    scratch: &mut [f32],
    u: &[f32],
    f: &[f32],
    g: &[f32],
    size: StepSize,
    layout: &Layout,
    parity: Parity)
{
    let w = layout.nx_all();
    let p = parity.shift();
    let xlo = layout.ng() - p;
    let xhi = layout.nx() + layout.ng() - p;
    let ylo = layout.ng() - p;
    let yhi = layout.ny() + layout.ng() - p;
    let dtcdx2 = size.dtcdx2();
    let dtcdy2 = size.dtcdy2();

    assert!(0 < xlo && xlo < xhi && xhi + 1 < w);
    assert!(0 < ylo && ylo < yhi && yhi + 1 < layout.ny_all());

    let (ux, rest) = scratch.split_at_mut(w);
    let (uy, rest) = rest.split_at_mut(w);
    let (s0, rest) = rest.split_at_mut(w);
    let (d0, rest) = rest.split_at_mut(w);
    let (s1, rest) = rest.split_at_mut(w);
    let d1 = &mut rest[..w];

    let mut s0 = s0;
    let mut d0 = d0;
    let mut s1 = s1;
    let mut d1 = d1;

    for k in 0..layout.nfield() {
        let mut row_sd = |y: usize, s: &mut [f32], d: &mut [f32]| {
            let row = layout.row(k, y);
            limited_deriv_row(ux, &u[row.clone()]);
            limited_deriv_across(uy, &u[layout.row(k, y - 1)], &u[row.clone()], &u[layout.row(k, y + 1)]);
            correct_sd(s, d, ux, uy, &u[row.clone()], &f[row.clone()], &g[row], dtcdx2, dtcdy2, xlo, xhi);
        };

        row_sd(ylo, &mut s1[..], &mut d1[..]);

        for y in ylo..yhi {
            mem::swap(&mut s0, &mut s1);
            mem::swap(&mut d0, &mut d1);

            row_sd(y + 1, &mut s1[..], &mut d1[..]);

            let out = layout.index(k, p, y + p);
            let vk = &mut v[out..out + xhi];

            for x in xlo..xhi {
                vk[x] = (s1[x] + s0[x]) - (d1[x] - d0[x]);
            }
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{step, step_pair, Parity, StepSize};
    use crate::grid::{Layout, StepBuffers};
    use crate::hydro::{Advection, ShallowWater};

    const SIZE: StepSize = StepSize { dt: 0.01, dx: 0.1, dy: 0.1 };

    fn ramp(layout: &Layout) -> StepBuffers {
        let mut buffers = StepBuffers::allocate(layout).unwrap();
        for (x, y) in layout.padded().iter() {
            buffers.current[layout.index(0, x as usize, y as usize)] = x as f32 + 2.0 * y as f32;
        }
        buffers
    }

    #[test]
    fn even_step_lands_on_staggered_grid() {
        let layout = Layout::new(8, 8, 4, 1);
        let mut buffers = ramp(&layout);
        let still = Advection::new(0.0, 0.0);

        step(&mut buffers, &layout, &still, Parity::Even, SIZE);

        for (x, y) in layout.interior().iter() {
            let value = buffers.staged[layout.index(0, x as usize, y as usize)];
            assert_eq!(value, (x as f32 + 0.5) + 2.0 * (y as f32 + 0.5));
        }
    }

    #[test]
    fn parity_pair_returns_to_primary_grid() {
        let layout = Layout::new(8, 8, 4, 1);
        let mut buffers = ramp(&layout);
        let still = Advection::new(0.0, 0.0);

        step_pair(&mut buffers, &layout, &still, SIZE);

        for (x, y) in layout.interior().iter() {
            let value = buffers.current[layout.index(0, x as usize, y as usize)];
            assert_eq!(value, x as f32 + 2.0 * y as f32);
        }
    }

    #[test]
    fn lake_at_rest_is_steady() {
        let layout = Layout::new(6, 10, 4, 3);
        let mut buffers = StepBuffers::allocate(&layout).unwrap();
        for value in &mut buffers.current[layout.plane(0)] {
            *value = 1.0;
        }
        let model = ShallowWater::default();

        step_pair(&mut buffers, &layout, &model, SIZE);

        for (x, y) in layout.interior().iter() {
            let (x, y) = (x as usize, y as usize);
            assert_eq!(buffers.current[layout.index(0, x, y)], 1.0);
            assert_eq!(buffers.current[layout.index(1, x, y)], 0.0);
            assert_eq!(buffers.current[layout.index(2, x, y)], 0.0);
        }
    }

    #[test]
    fn uniform_flow_is_steady() {
        let layout = Layout::new(8, 8, 4, 1);
        let mut buffers = StepBuffers::allocate(&layout).unwrap();
        for value in &mut buffers.current {
            *value = 0.75;
        }
        let model = Advection::new(1.0, -0.5);

        step_pair(&mut buffers, &layout, &model, SIZE);

        for (x, y) in layout.interior().iter() {
            assert_eq!(buffers.current[layout.index(0, x as usize, y as usize)], 0.75);
        }
    }
}
