//! Central2d is a solver for two-dimensional hyperbolic conservation laws on
//! periodic, uniformly spaced grids, like the shallow-water equations. It
//! uses the Jiang-Tadmor central scheme: a limited predictor-corrector step
//! that alternates between the primary grid and a grid staggered by half a
//! cell, so no Riemann solver is needed. The grid can be split into a fixed
//! array of tiles which are advanced in parallel, each with its own ghost
//! margin filled from the global state before every pair of sub-steps.
//!
//! The physics is pluggable through the [`FluxModel`] trait; the shallow
//! water equations and scalar advection are provided.

pub mod checkpoint;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod hydro;
pub mod index_space;
pub mod meshing;
pub mod scenario;
pub mod scheduler;
pub mod simulation;
pub mod solvers;
pub mod thread_pool;
pub mod tile;
pub mod viz;

pub use checkpoint::Checkpoint;
pub use diagnostics::Diagnostics;
pub use error::Error;
pub use hydro::{Advection, FluxModel, ShallowWater};
pub use scenario::Scenario;
pub use scheduler::{ExecutionMode, Partition};
pub use simulation::{Simulation, SimulationConfig};
pub use viz::VizWriter;
