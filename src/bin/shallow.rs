use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use signal_hook::consts::{SIGINT, SIGTERM};
use simple_logger::SimpleLogger;
use central2d::{
    Checkpoint,
    Error,
    ExecutionMode,
    Partition,
    Scenario,
    ShallowWater,
    Simulation,
    SimulationConfig,
    VizWriter,
};




#[derive(Debug, Parser)]
#[clap(version, about = "Shallow-water simulation on a periodic grid")]
struct Opts {
    /// Physical width of the domain
    #[clap(long, default_value = "2.0")]
    width: f64,

    /// Physical height of the domain (defaults to the width)
    #[clap(long)]
    height: Option<f64>,

    /// CFL factor, in (0, 1]
    #[clap(long, default_value = "0.45")]
    cfl: f64,

    /// Simulated time between output frames
    #[clap(long, default_value = "0.01")]
    frame_time: f64,

    #[clap(long, default_value = "200")]
    nx: usize,

    /// Cells along y (defaults to nx)
    #[clap(long)]
    ny: Option<usize>,

    /// Output every vskip-th cell in each direction
    #[clap(long, default_value = "1")]
    vskip: usize,

    #[clap(long, default_value = "50")]
    frames: usize,

    /// Raster output file
    #[clap(long, default_value = "sim.out")]
    out: PathBuf,

    #[clap(short = 't', long, default_value = "4")]
    threads: usize,

    /// Tile grid, written PXxPY
    #[clap(short = 'p', long, default_value = "2x2")]
    partition: Partition,

    /// Run tiles on threads pinned to physical cores
    #[clap(long)]
    pinned: bool,

    /// One of dam_break, pond, river, wave, bump
    #[clap(short = 's', long, default_value = "dam_break")]
    scenario: Scenario,

    /// Write a CBOR checkpoint here when the run ends
    #[clap(long)]
    checkpoint: Option<PathBuf>,

    /// Resume from a CBOR checkpoint instead of the scenario
    #[clap(long)]
    resume: Option<PathBuf>,

    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}




// ============================================================================
impl Opts {
    fn config(&self) -> SimulationConfig {
        let execution = if self.pinned {
            ExecutionMode::Pinned(self.threads)
        } else if self.threads == 1 {
            ExecutionMode::Serial
        } else {
            ExecutionMode::Threads(self.threads)
        };

        SimulationConfig {
            width: self.width,
            height: self.height.unwrap_or(self.width),
            nx: self.nx,
            ny: self.ny.unwrap_or(self.nx),
            cfl: self.cfl,
            partition: self.partition,
            execution,
            ..SimulationConfig::default()
        }
    }
}




// ============================================================================
fn solution_check(sim: &Simulation<ShallowWater>) {
    let d = sim.diagnostics();
    let (px, py) = d.momentum();
    println!("-\n  Volume: {:e}\n  Momentum: ({:e}, {:e})\n  Range: [{:e}, {:e}]", d.volume(), px, py, d.min, d.max);
}

fn run(opts: &Opts, stop: &AtomicBool) -> Result<(), Error> {
    let config = opts.config();

    let mut sim = match &opts.resume {
        Some(path) => {
            info!("resuming from {}", path.display());
            Checkpoint::load(path)?.restore_with(config.clone(), ShallowWater::default())?
        }
        None => {
            let mut sim = Simulation::new(config.clone(), ShallowWater::default())?;
            sim.initialize(opts.scenario.initial_condition((config.width as f32, config.height as f32)));
            sim
        }
    };

    println!(
        "{} {} {} {} {} {} {}",
        config.width, config.height, config.nx, config.ny, config.cfl, opts.frames, opts.frame_time);
    solution_check(&sim);

    let vskip = opts.vskip.max(1);
    let (dims, frame) = sim.sample(vskip);
    let mut viz = VizWriter::create(&opts.out, dims)?;
    viz.write_frame(&frame)?;

    let mut compute_time = 0.0;
    let mut total_steps = 0;

    for _ in 0..opts.frames {
        if stop.load(Ordering::Relaxed) {
            warn!("stopping early at t = {:.6}", sim.time());
            break;
        }
        let start = Instant::now();
        let steps = sim.run(opts.frame_time)?;
        let elapsed = start.elapsed().as_secs_f64();

        solution_check(&sim);
        compute_time += elapsed;
        total_steps += steps;

        println!("  Time: {:e} ({:e} for {} steps)", elapsed, elapsed / steps.max(1) as f64, steps);
        viz.write_frame(&sim.sample(vskip).1)?;
    }
    viz.flush()?;

    println!("Total compute time: {:e}", compute_time);
    info!("{} steps, {:e} s per step", total_steps, compute_time / total_steps.max(1) as f64);

    if let Some(path) = &opts.checkpoint {
        Checkpoint::capture(&sim).save(path)?;
        info!("wrote checkpoint {}", path.display());
    }
    Ok(())
}




// ============================================================================
fn main() {
    let opts = Opts::parse();

    if let Err(e) = SimpleLogger::new().with_level(opts.log_level).init() {
        eprintln!("{}", e);
    }

    let stop = Arc::new(AtomicBool::new(false));

    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&stop)) {
            warn!("could not register signal {}: {}", signal, e);
        }
    }

    if let Err(e) = run(&opts, &stop) {
        error!("{}", e);
        std::process::exit(exit_code(&e));
    }
}




/// A numerical blow-up exits with 2, any other failure with 1.
fn exit_code(e: &Error) -> i32 {
    if e.is_blow_up() {
        2
    } else {
        1
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::exit_code;
    use central2d::Error;

    #[test]
    fn blow_up_has_its_own_exit_code() {
        assert_eq!(exit_code(&Error::NonPositiveHeight { x: 0, y: 0, value: -1.0 }), 2);
        assert_eq!(exit_code(&Error::InvalidCfl(2.0)), 1);
        assert_eq!(exit_code(&Error::Allocation { bytes: 8 }), 1);
    }
}
