pub mod central2d;
pub mod limiter;

pub use central2d::{step, step_pair, Parity, StepSize};
