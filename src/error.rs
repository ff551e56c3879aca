use std::error;
use std::fmt;
use std::io;




#[derive(Debug)]

/**
 * Error to represent an invalid configuration, a numerical blow-up, or a
 * failure of the resources backing a simulation.
 */
pub enum Error {
    InvalidDomain { width: f64, height: f64 },
    InvalidCellCount { nx: usize, ny: usize },
    InvalidCfl(f64),
    GhostWidthTooSmall { ghost_width: usize, minimum: usize },
    FieldCountMismatch { expected: usize, found: usize },
    InvalidPartition { px: usize, py: usize, nx: usize, ny: usize },
    TileTooSmall { tile: (usize, usize), ghost_width: usize },
    NoWorkers,
    NonPositiveHeight { x: usize, y: usize, value: f32 },
    Allocation { bytes: usize },
    Uninitialized,
    InvalidTime(f64),
    ThreadPool(String),
    WorkerLost,
    Io(io::Error),
    Checkpoint(String),
}




// ============================================================================
impl Error {

    /// Whether this error is a numerical blow-up, as opposed to a
    /// configuration or resource problem.
    pub fn is_blow_up(&self) -> bool {
        matches!(self, Error::NonPositiveHeight { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            InvalidDomain { width, height } => write!(fmt, "invalid domain size: {} x {}", width, height),
            InvalidCellCount { nx, ny } => write!(fmt, "invalid cell count: {} x {}", nx, ny),
            InvalidCfl(cfl) => write!(fmt, "CFL factor must be in (0, 1], got {}", cfl),
            GhostWidthTooSmall { ghost_width, minimum } => {
                write!(fmt, "ghost width {} is smaller than the required {}", ghost_width, minimum)
            }
            FieldCountMismatch { expected, found } => {
                write!(fmt, "flux model expects {} fields, configuration has {}", expected, found)
            }
            InvalidPartition { px, py, nx, ny } => {
                write!(fmt, "partition {}x{} does not evenly divide the {}x{} grid", px, py, nx, ny)
            }
            TileTooSmall { tile, ghost_width } => {
                write!(fmt, "tile {}x{} is narrower than the ghost width {}", tile.0, tile.1, ghost_width)
            }
            NoWorkers => write!(fmt, "at least one worker thread is required"),
            NonPositiveHeight { x, y, value } => {
                write!(fmt, "non-positive height {} at cell ({}, {})", value, x, y)
            }
            Allocation { bytes } => write!(fmt, "failed to allocate {} bytes of grid storage", bytes),
            Uninitialized => write!(fmt, "simulation has no initial condition"),
            InvalidTime(t) => write!(fmt, "invalid elapsed time: {}", t),
            ThreadPool(msg) => write!(fmt, "could not build thread pool: {}", msg),
            WorkerLost => write!(fmt, "a worker thread exited before returning its tile"),
            Io(e) => write!(fmt, "i/o error: {}", e),
            Checkpoint(msg) => write!(fmt, "checkpoint error: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
