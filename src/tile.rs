use crate::error::Error;
use crate::grid::{copy_plane, Layout, StepBuffers};
use crate::hydro::FluxModel;
use crate::index_space::IndexSpace;
use crate::meshing::extend_tile;
use crate::solvers::{step_pair, StepSize};




/**
 * One block of a partitioned grid, with a private buffer set. A tile knows
 * where it sits in the partition and nothing about its neighbours: every
 * macro-iteration it is rebuilt from the global state, advanced, and its
 * interior written back.
 */
pub struct Tile {
    index: (usize, usize),
    counts: (usize, usize),
    layout: Layout,
    buffers: StepBuffers,
}




// ============================================================================
impl Tile {

    /// Allocate the tile at `index` of a `counts` partition of the global
    /// layout. The partition is assumed to have been validated.
    pub fn new(index: (usize, usize), counts: (usize, usize), global: &Layout) -> Result<Self, Error> {
        let layout = Layout::new(
            global.nx() / counts.0,
            global.ny() / counts.1,
            global.ng(),
            global.nfield());

        Ok(Self {
            index,
            counts,
            layout,
            buffers: StepBuffers::allocate(&layout)?,
        })
    }

    pub fn index(&self) -> (usize, usize) {
        self.index
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The tile's own cells, in the padded coordinates of the global layout.
    pub fn global_space(&self, global: &Layout) -> IndexSpace {
        let ng = global.ng() as i64;
        let x0 = (self.index.0 * self.layout.nx()) as i64 + ng;
        let y0 = (self.index.1 * self.layout.ny()) as i64 + ng;
        IndexSpace::new(
            x0..x0 + self.layout.nx() as i64,
            y0..y0 + self.layout.ny() as i64)
    }

    /// Halo exchange: fill the whole padded buffer from the global state.
    pub fn extend_from(&mut self, global: &[f32], global_layout: &Layout) {
        extend_tile(
            &mut self.buffers.current,
            self.index,
            self.counts,
            &self.layout,
            global,
            global_layout);
    }

    /// Both parity sub-steps on the tile's own buffers.
    pub fn advance<M>(&mut self, model: &M, size: StepSize)
    where
        M: FluxModel + ?Sized,
    {
        step_pair(&mut self.buffers, &self.layout, model, size);
    }

    /// Exchange and advance, as one unit of work.
    pub fn update<M>(&mut self, global: &[f32], global_layout: &Layout, model: &M, size: StepSize)
    where
        M: FluxModel + ?Sized,
    {
        self.extend_from(global, global_layout);
        self.advance(model, size);
    }

    /// Write the interior of field `k` into the matching plane of the global
    /// state.
    pub fn copy_interior_into(&self, k: usize, plane: &mut [f32], global_layout: &Layout) {
        copy_plane(
            plane,
            global_layout,
            &self.global_space(global_layout),
            &self.buffers.current[self.layout.plane(k)],
            &self.layout,
            &self.layout.interior());
    }
}
