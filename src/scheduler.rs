//! Domain decomposition and the parallel macro-iteration.
//!
//! The global grid is split into a fixed `px x py` partition of equal tiles.
//! Every macro-iteration each tile is rebuilt from the frozen global state,
//! advanced by both parity sub-steps, and written back only after all tiles
//! have finished. The degree of parallelism comes from the configuration.

use std::fmt;
use std::mem;
use std::str::FromStr;
use std::sync::Arc;
use crossbeam_channel::unbounded;
use log::trace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::grid::{Layout, StepBuffers};
use crate::hydro::{max_speeds, FluxModel, WAVE_SPEED_SEED};
use crate::meshing::periodic_wrap;
use crate::solvers::{step_pair, StepSize};
use crate::thread_pool::ThreadPool;
use crate::tile::Tile;




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * The shape of the tile grid: `px` tiles along x by `py` tiles along y.
 * Each factor must evenly divide the cell count on its axis, and the
 * resulting tiles must be at least as wide as the ghost margin.
 */
pub struct Partition {
    pub px: usize,
    pub py: usize,
}




// ============================================================================
impl Partition {

    pub fn new(px: usize, py: usize) -> Self {
        Self { px, py }
    }

    /// The trivial partition: the whole domain is updated in place.
    pub fn single() -> Self {
        Self::new(1, 1)
    }

    pub fn is_single(&self) -> bool {
        self.px == 1 && self.py == 1
    }

    pub fn num_tiles(&self) -> usize {
        self.px * self.py
    }

    /// Check the partition against a grid layout.
    pub fn validate(&self, layout: &Layout) -> Result<(), Error> {
        let (nx, ny) = (layout.nx(), layout.ny());

        if self.px == 0 || self.py == 0 || nx % self.px != 0 || ny % self.py != 0 {
            return Err(Error::InvalidPartition { px: self.px, py: self.py, nx, ny });
        }
        let tile = (nx / self.px, ny / self.py);

        if tile.0 < layout.ng() || tile.1 < layout.ng() {
            return Err(Error::TileTooSmall { tile, ghost_width: layout.ng() });
        }
        Ok(())
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}x{}", self.px, self.py)
    }
}

impl FromStr for Partition {
    type Err = String;

    /// Parse a partition written as `PXxPY`, for example `4x2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (px, py) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| format!("expected PXxPY, got '{}'", s))?;
        let parse = |n: &str| n.trim().parse::<usize>().map_err(|e| format!("{} in '{}'", e, s));
        Ok(Self::new(parse(px)?, parse(py)?))
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * How tile updates are executed.
 */
pub enum ExecutionMode {
    /// Everything runs on a single worker.
    Serial,

    /// A dedicated rayon pool of the given size; tiles are updated by a
    /// parallel iterator and joined before the back-copy.
    Threads(usize),

    /// Tiles are moved to a pool of the given size whose threads are pinned
    /// to physical cores, and returned over a channel.
    Pinned(usize),
}




// ============================================================================
impl ExecutionMode {

    pub fn num_threads(&self) -> usize {
        match self {
            ExecutionMode::Serial => 1,
            ExecutionMode::Threads(n) | ExecutionMode::Pinned(n) => *n,
        }
    }
}




/**
 * Owns the tile pool and the worker threads, and performs the parallel
 * pieces of a macro-iteration: the wave-speed reduction, the tile updates
 * with their halo exchange and back-copy, and the positivity scan.
 */
pub struct Scheduler {
    partition: Partition,
    mode: ExecutionMode,
    pool: rayon::ThreadPool,
    pinned: Option<ThreadPool>,
    tiles: Vec<Tile>,
}




// ============================================================================
impl Scheduler {

    /// Validate the partition and build the worker threads and tile buffers.
    /// Tiles are allocated here once and reused by every macro-iteration.
    pub fn new(partition: Partition, mode: ExecutionMode, layout: &Layout) -> Result<Self, Error> {
        partition.validate(layout)?;

        let num_threads = mode.num_threads();

        if num_threads == 0 {
            return Err(Error::NoWorkers);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|n| format!("central2d-{}", n))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        let pinned = match mode {
            ExecutionMode::Pinned(n) => Some(ThreadPool::new(n)?),
            _ => None,
        };

        let mut tiles = Vec::new();

        if !partition.is_single() {
            let counts = (partition.px, partition.py);
            for py in 0..partition.py {
                for px in 0..partition.px {
                    tiles.push(Tile::new((px, py), counts, layout)?);
                }
            }
        }

        Ok(Self { partition, mode, pool, pinned, tiles })
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Largest characteristic speeds over the interior of `u`, seeded with a
    /// tiny positive value.
    pub fn max_wave_speed<M>(&self, model: &M, u: &[f32], layout: &Layout) -> [f32; 2]
    where
        M: FluxModel + ?Sized,
    {
        let ng = layout.ng();
        let nx = layout.nx();
        let stride = layout.field_stride();

        self.pool.install(|| {
            (ng..ng + layout.ny())
                .into_par_iter()
                .map(|y| {
                    let mut cxy = [WAVE_SPEED_SEED; 2];
                    model.speed(&mut cxy, &u[layout.index(0, ng, y)..], nx, stride);
                    cxy
                })
                .reduce(|| [WAVE_SPEED_SEED; 2], max_speeds)
        })
    }

    /**
     * Advance the global state in `buffers.current` by one macro-iteration
     * (two sub-steps of `size.dt`). For a single-tile partition the ghost
     * margin is wrapped and the sub-steps run in place; otherwise every tile
     * is exchanged and advanced concurrently, then copied back.
     */
    pub fn advance<M>(&mut self, model: &Arc<M>, buffers: &mut StepBuffers, layout: &Layout, size: StepSize) -> Result<(), Error>
    where
        M: FluxModel + 'static,
    {
        if self.partition.is_single() {
            periodic_wrap(&mut buffers.current, layout);
            step_pair(buffers, layout, model.as_ref(), size);
            return Ok(());
        }
        if self.tiles.len() != self.partition.num_tiles() {
            return Err(Error::WorkerLost);
        }

        match &self.pinned {
            None => {
                let global = &buffers.current;
                let tiles = &mut self.tiles;
                let model = model.as_ref();

                self.pool.install(|| {
                    tiles.par_iter_mut().for_each(|tile| {
                        trace!("tile {:?}: exchange and advance", tile.index());
                        tile.update(global, layout, model, size);
                    })
                });
            }
            Some(workers) => {
                advance_pinned(workers, &mut self.tiles, model, buffers, layout, size)?;
            }
        }

        let tiles = &self.tiles;
        let u = &mut buffers.current;

        self.pool.install(|| {
            u.par_chunks_mut(layout.field_stride())
                .enumerate()
                .for_each(|(k, plane)| {
                    for tile in tiles {
                        tile.copy_interior_into(k, plane, layout)
                    }
                })
        });
        Ok(())
    }

    /// Fail with the first interior cell (in row order) whose leading field
    /// is not strictly positive. NaN counts as non-positive.
    pub fn check_positivity(&self, u: &[f32], layout: &Layout) -> Result<(), Error> {
        let nx = layout.nx();

        let found = self.pool.install(|| {
            (0..layout.ny())
                .into_par_iter()
                .find_map_first(|iy| {
                    let start = layout.offset(0, 0, iy as i64);
                    let row = &u[start..start + nx];
                    row.iter()
                        .position(|h| h.is_nan() || *h <= 0.0)
                        .map(|ix| (ix, iy, row[ix]))
                })
        });

        match found {
            Some((x, y, value)) => Err(Error::NonPositiveHeight { x, y, value }),
            None => Ok(()),
        }
    }
}




/**
 * Pinned execution: tile `n` always goes to worker `n % num_threads`, so a
 * tile stays on the same core from one macro-iteration to the next. Each
 * tile is moved into a job together with a shared handle on the frozen
 * global state, and sent back over a channel once advanced. The global
 * buffer is taken out of `buffers` for the duration and put back before
 * returning, on success or failure.
 */
fn advance_pinned<M>(
    workers: &ThreadPool,
    tiles: &mut Vec<Tile>,
    model: &Arc<M>,
    buffers: &mut StepBuffers,
    layout: &Layout,
    size: StepSize) -> Result<(), Error>
where
    M: FluxModel + 'static,
{
    let global = Arc::new(mem::take(&mut buffers.current));
    let (sender, receiver) = unbounded();
    let expected = tiles.len();
    let mut result = Ok(());

    for (n, mut tile) in tiles.drain(..).enumerate() {
        let worker = n % workers.num_threads();
        let global = Arc::clone(&global);
        let model = Arc::clone(model);
        let sender = sender.clone();
        let layout = *layout;

        let spawned = workers.spawn_on(Some(worker), move || {
            trace!("tile {:?}: exchange and advance (pinned)", tile.index());
            tile.update(&global, &layout, model.as_ref(), size);
            drop(global);
            sender.send(tile).ok();
        });

        if let Err(e) = spawned {
            result = Err(e);
            break;
        }
    }
    drop(sender);

    for tile in receiver.iter().take(expected) {
        tiles.push(tile);
    }
    if result.is_ok() && tiles.len() != expected {
        result = Err(Error::WorkerLost);
    }

    buffers.current = Arc::try_unwrap(global).unwrap_or_else(|shared| (*shared).clone());
    result
}
