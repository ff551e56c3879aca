use std::sync::Arc;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::grid::{Layout, StepBuffers, MIN_GHOST_WIDTH};
use crate::hydro::FluxModel;
use crate::scheduler::{ExecutionMode, Partition, Scheduler};
use crate::solvers::StepSize;




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]


/**
 * Run parameters that stay fixed for the life of a simulation. Missing
 * fields take their default values when deserialized.
 */
pub struct SimulationConfig {
    /// Physical extent of the domain along x.
    pub width: f64,
    /// Physical extent of the domain along y.
    pub height: f64,
    pub nx: usize,
    pub ny: usize,
    /// Fraction of the largest stable time step actually taken.
    pub cfl: f64,
    pub ghost_width: usize,
    pub partition: Partition,
    pub execution: ExecutionMode,
}




// ============================================================================
impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 2.0,
            nx: 200,
            ny: 200,
            cfl: 0.45,
            ghost_width: MIN_GHOST_WIDTH,
            partition: Partition::new(2, 2),
            execution: ExecutionMode::Threads(4),
        }
    }
}

impl SimulationConfig {

    /// Check everything that does not depend on the flux model, and return
    /// the grid layout for a model with `nfield` fields.
    pub fn validate(&self, nfield: usize) -> Result<Layout, Error> {
        let positive = |x: f64| x.is_finite() && x > 0.0;

        if !positive(self.width) || !positive(self.height) {
            return Err(Error::InvalidDomain { width: self.width, height: self.height });
        }
        if self.nx == 0 || self.ny == 0 {
            return Err(Error::InvalidCellCount { nx: self.nx, ny: self.ny });
        }
        if !positive(self.cfl) || self.cfl > 1.0 {
            return Err(Error::InvalidCfl(self.cfl));
        }
        if self.ghost_width < MIN_GHOST_WIDTH {
            return Err(Error::GhostWidthTooSmall { ghost_width: self.ghost_width, minimum: MIN_GHOST_WIDTH });
        }
        if nfield == 0 {
            return Err(Error::FieldCountMismatch { expected: 1, found: 0 });
        }
        let layout = Layout::new(self.nx, self.ny, self.ghost_width, nfield);

        self.partition.validate(&layout)?;

        if self.execution.num_threads() == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(layout)
    }

    pub fn dx(&self) -> f64 {
        self.width / self.nx as f64
    }

    pub fn dy(&self) -> f64 {
        self.height / self.ny as f64
    }
}




/**
 * A periodic 2D simulation driven by a flux model. The simulation owns the
 * global state and its work buffers; the scheduler owns the tiles and the
 * worker threads. Only the state, the clock and the step counter change
 * after construction.
 */
pub struct Simulation<M> {
    config: SimulationConfig,
    model: Arc<M>,
    layout: Layout,
    buffers: StepBuffers,
    scheduler: Scheduler,
    time: f64,
    steps: u64,
    initialized: bool,
}




// ============================================================================
impl<M> Simulation<M>
where
    M: FluxModel + 'static,
{

    /// Validate the configuration against the model, and allocate every
    /// buffer the run will need.
    pub fn new(config: SimulationConfig, model: M) -> Result<Self, Error> {
        let layout = config.validate(model.num_fields())?;
        let buffers = StepBuffers::allocate(&layout)?;
        let scheduler = Scheduler::new(config.partition, config.execution, &layout)?;

        info!(
            "{}x{} cells, {} fields, partition {}, {:?}",
            layout.nx(), layout.ny(), layout.nfield(), config.partition, config.execution);

        Ok(Self {
            config,
            model: Arc::new(model),
            layout,
            buffers,
            scheduler,
            time: 0.0,
            steps: 0,
            initialized: false,
        })
    }

    /**
     * Set the initial condition. The callback is invoked once per interior
     * cell with the physical coordinates of the cell centre, and writes one
     * value per field into the slice it is given (zeroed beforehand).
     */
    pub fn initialize<F>(&mut self, mut init: F)
    where
        F: FnMut((f32, f32), &mut [f32]),
    {
        let dx = self.config.dx() as f32;
        let dy = self.config.dy() as f32;
        let mut cell = vec![0.0; self.layout.nfield()];

        for iy in 0..self.layout.ny() as i64 {
            for ix in 0..self.layout.nx() as i64 {
                let centre = ((ix as f32 + 0.5) * dx, (iy as f32 + 0.5) * dy);
                cell.fill(0.0);
                init(centre, &mut cell);

                for (k, value) in cell.iter().enumerate() {
                    self.buffers.current[self.layout.offset(k, ix, iy)] = *value;
                }
            }
        }
        self.initialized = true;
    }

    /**
     * Advance the solution by `elapsed` time units from the current time,
     * and return the number of sub-steps taken (always even). Every
     * macro-iteration picks a fresh CFL time step; the last one is shortened
     * to land exactly on the target time.
     *
     * On a blow-up the state is left as the failing iteration produced it,
     * while the clock and step counter reflect the iterations completed
     * before it.
     */
    pub fn run(&mut self, elapsed: f64) -> Result<u64, Error> {
        if !elapsed.is_finite() {
            return Err(Error::InvalidTime(elapsed));
        }
        if !self.initialized {
            return Err(Error::Uninitialized);
        }
        if elapsed <= 0.0 {
            return Ok(0);
        }

        info!("advance t = {:.6} by {:.6}", self.time, elapsed);

        let t_final = self.time + elapsed;
        let dx = self.config.dx() as f32;
        let dy = self.config.dy() as f32;
        let cfl = self.config.cfl as f32;
        let mut taken = 0;
        let mut done = false;

        while !done {
            let [cx, cy] = self.scheduler.max_wave_speed(self.model.as_ref(), &self.buffers.current, &self.layout);
            let mut dt = (cfl / (cx / dx).max(cy / dy)) as f64;

            if self.time + 2.0 * dt >= t_final {
                dt = (t_final - self.time) / 2.0;
                done = true;
            }
            debug!("t = {:.6} dt = {:.3e} speeds = ({:.4}, {:.4})", self.time, dt, cx, cy);

            let size = StepSize { dt: dt as f32, dx, dy };

            self.scheduler.advance(&self.model, &mut self.buffers, &self.layout, size)?;
            self.scheduler
                .check_positivity(&self.buffers.current, &self.layout)
                .map_err(|e| {
                    error!("{} at t = {:.6} after {} steps", e, self.time, self.steps);
                    e
                })?;

            self.time = if done { t_final } else { self.time + 2.0 * dt };
            self.steps += 2;
            taken += 2;
        }
        Ok(taken)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Total number of sub-steps taken since construction.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// The padded global state, field-major. Ghost cells hold whatever the
    /// last exchange left there.
    pub fn state(&self) -> &[f32] {
        &self.buffers.current
    }

    /// Field `k` at interior cell `(ix, iy)`.
    pub fn value(&self, k: usize, ix: usize, iy: usize) -> f32 {
        self.buffers.current[self.layout.offset(k, ix as i64, iy as i64)]
    }

    /// Area of one cell, in physical units.
    pub fn cell_area(&self) -> f64 {
        self.config.dx() * self.config.dy()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::measure(&self.buffers.current, &self.layout, self.cell_area())
    }

    /**
     * The leading field at every `stride`-th interior cell along both axes,
     * row-major, together with the sampled dimensions `(nx / stride, ny /
     * stride)`.
     */
    pub fn sample(&self, stride: usize) -> ((usize, usize), Vec<f32>) {
        let stride = stride.max(1);
        let (sx, sy) = (self.layout.nx() / stride, self.layout.ny() / stride);
        let mut data = Vec::with_capacity(sx * sy);

        for j in 0..sy {
            for i in 0..sx {
                data.push(self.value(0, i * stride, j * stride));
            }
        }
        ((sx, sy), data)
    }

    /// Replace the clock, step counter and interior state, as when resuming
    /// from a checkpoint. `data` holds `nfield` planes of `nx * ny` interior
    /// values.
    pub(crate) fn load(&mut self, time: f64, steps: u64, data: &[f32]) -> Result<(), Error> {
        let (nx, ny) = (self.layout.nx(), self.layout.ny());
        let expected = self.layout.nfield() * nx * ny;

        if data.len() != expected {
            return Err(Error::Checkpoint(format!("expected {} values, found {}", expected, data.len())));
        }
        if !time.is_finite() {
            return Err(Error::InvalidTime(time));
        }
        for (n, value) in data.iter().enumerate() {
            let (k, rest) = (n / (nx * ny), n % (nx * ny));
            let (iy, ix) = (rest / nx, rest % nx);
            self.buffers.current[self.layout.offset(k, ix as i64, iy as i64)] = *value;
        }
        self.time = time;
        self.steps = steps;
        self.initialized = true;
        Ok(())
    }

    /// The interior state, `nfield` planes of `nx * ny` values.
    pub fn interior(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.layout.nfield() * self.layout.nx() * self.layout.ny());

        for k in 0..self.layout.nfield() {
            for iy in 0..self.layout.ny() {
                let start = self.layout.offset(k, 0, iy as i64);
                data.extend_from_slice(&self.buffers.current[start..start + self.layout.nx()]);
            }
        }
        data
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Simulation, SimulationConfig};
    use crate::error::Error;
    use crate::hydro::{FluxModel, ShallowWater};
    use crate::scheduler::{ExecutionMode, Partition};

    /// A model whose flux evaluation always panics, taking down whichever
    /// worker thread runs it.
    struct PanickingFlux;

    impl FluxModel for PanickingFlux {
        fn num_fields(&self) -> usize {
            1
        }

        fn flux(&self, _: &mut [f32], _: &mut [f32], _: &[f32], _: usize, _: usize) {
            panic!("flux evaluation failed");
        }

        fn speed(&self, cxy: &mut [f32; 2], _: &[f32], _: usize, _: usize) {
            cxy[0] = cxy[0].max(1.0);
            cxy[1] = cxy[1].max(1.0);
        }
    }

    fn small() -> SimulationConfig {
        SimulationConfig {
            nx: 16,
            ny: 16,
            partition: Partition::new(2, 2),
            execution: ExecutionMode::Threads(2),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn default_config_matches_the_driver_defaults() {
        let config = SimulationConfig::default();
        assert_eq!((config.width, config.height), (2.0, 2.0));
        assert_eq!((config.nx, config.ny), (200, 200));
        assert_eq!(config.cfl, 0.45);
        assert_eq!(config.ghost_width, 4);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let check = |config: SimulationConfig| Simulation::new(config, ShallowWater::default()).err();

        assert!(matches!(check(SimulationConfig { cfl: 0.0, ..small() }), Some(Error::InvalidCfl(_))));
        assert!(matches!(check(SimulationConfig { cfl: 1.5, ..small() }), Some(Error::InvalidCfl(_))));
        assert!(matches!(check(SimulationConfig { width: -1.0, ..small() }), Some(Error::InvalidDomain { .. })));
        assert!(matches!(check(SimulationConfig { nx: 0, ..small() }), Some(Error::InvalidCellCount { .. })));
        assert!(matches!(check(SimulationConfig { ghost_width: 2, ..small() }), Some(Error::GhostWidthTooSmall { .. })));
        assert!(matches!(check(SimulationConfig { nx: 15, ..small() }), Some(Error::InvalidPartition { .. })));
        assert!(matches!(check(SimulationConfig { partition: Partition::new(8, 1), ..small() }), Some(Error::TileTooSmall { .. })));
        assert!(matches!(check(SimulationConfig { execution: ExecutionMode::Threads(0), ..small() }), Some(Error::NoWorkers)));
    }

    #[test]
    fn initial_condition_sees_cell_centres() {
        let config = SimulationConfig { width: 4.0, height: 2.0, ..small() };
        let mut sim = Simulation::new(config, ShallowWater::default()).unwrap();
        let mut calls = 0;

        sim.initialize(|(x, y), u| {
            calls += 1;
            u[0] = x;
            u[2] = y;
        });
        assert_eq!(calls, 256);
        assert_eq!(sim.value(0, 0, 0), 0.125);
        assert_eq!(sim.value(2, 0, 0), 0.0625);
        assert_eq!(sim.value(0, 15, 3), 3.875);
        assert_eq!(sim.value(1, 15, 3), 0.0);
    }

    #[test]
    fn run_requires_an_initial_condition() {
        let mut sim = Simulation::new(small(), ShallowWater::default()).unwrap();
        assert!(matches!(sim.run(0.1), Err(Error::Uninitialized)));
    }

    #[test]
    fn non_positive_or_invalid_elapsed_time() {
        let mut sim = Simulation::new(small(), ShallowWater::default()).unwrap();
        sim.initialize(|_, u| u[0] = 1.0);
        assert_eq!(sim.run(0.0).unwrap(), 0);
        assert_eq!(sim.run(-1.0).unwrap(), 0);
        assert!(matches!(sim.run(f64::NAN), Err(Error::InvalidTime(_))));
        assert_eq!(sim.steps(), 0);
    }

    #[test]
    fn run_lands_on_the_target_time() {
        let mut sim = Simulation::new(small(), ShallowWater::default()).unwrap();
        sim.initialize(|(x, _), u| u[0] = 1.0 + 0.1 * x);

        let steps = sim.run(0.05).unwrap();
        assert!(steps > 0 && steps % 2 == 0);
        assert_eq!(sim.time(), 0.05);

        let more = sim.run(0.05).unwrap();
        assert_eq!(sim.steps(), steps + more);
        assert!((sim.time() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn sampled_field_is_row_major() {
        let mut sim = Simulation::new(small(), ShallowWater::default()).unwrap();
        sim.initialize(|(x, y), u| u[0] = 100.0 * y + x);
        let ((sx, sy), data) = sim.sample(4);

        assert_eq!((sx, sy), (4, 4));
        assert_eq!(data.len(), 16);
        assert_eq!(data[1], sim.value(0, 4, 0));
        assert_eq!(data[4], sim.value(0, 0, 4));
    }

    #[test]
    fn oversized_grid_fails_to_allocate() {
        let config = SimulationConfig {
            nx: 1 << 22,
            ny: 1 << 22,
            partition: Partition::single(),
            execution: ExecutionMode::Serial,
            ..SimulationConfig::default()
        };
        match Simulation::new(config, ShallowWater::default()) {
            Err(e) => {
                assert!(matches!(e, Error::Allocation { .. }));
                assert!(!e.is_blow_up());
            }
            Ok(_) => panic!("expected an allocation failure"),
        }
    }

    #[test]
    fn lost_pinned_worker_keeps_the_state() {
        let config = SimulationConfig {
            nx: 16,
            ny: 16,
            partition: Partition::new(2, 2),
            execution: ExecutionMode::Pinned(2),
            ..SimulationConfig::default()
        };
        let mut sim = Simulation::new(config, PanickingFlux).unwrap();
        sim.initialize(|_, u| u[0] = 1.0);

        assert!(matches!(sim.run(0.01), Err(Error::WorkerLost)));
        assert_eq!(sim.state().len(), sim.layout().len());
        assert!(sim.interior().iter().all(|&v| v == 1.0));
        assert_eq!((sim.steps(), sim.time()), (0, 0.0));

        assert!(matches!(sim.run(0.01), Err(Error::WorkerLost)));
    }
}
