//! # Carom
//!
//! Carom is a crate simulating elastic collisions between circular (2D) or spherical (3D) bodies
//! bouncing inside an axis-aligned box.
//!
//! ## Goals
//!
//! The main goal of this crate is to provide a small, deterministic collision core that can be
//! driven by any rendering or input layer. It does not draw anything, it only advances bodies
//! tick after tick and exposes their state.
//!
//! Neighbour discovery goes through a uniform bucket [`Grid`](grid::Grid): each body only tests
//! the bodies of the 3x3 (or 3x3x3) block of buckets around it instead of the whole population.
//!
//! Aggregate statistics and impulse application can run on multiple CPU threads thanks to
//! [rayon](https://github.com/rayon-rs/rayon). Enable the "parallel" feature to use them.
//!
//! # Using Carom
//!
//! ## Setting up the simulation
//!
//! A [`Simulation`](simulation::Simulation) is either filled at random from a
//! [`SimulationConfig`](config::SimulationConfig):
//!
//! ```
//! # use carom::prelude::*;
//! let config = SimulationConfig::planar().with_population(100).with_seed(1);
//! let simulation = Simulation::random(&config).unwrap();
//!
//! assert_eq!(simulation.len(), 100);
//! ```
//!
//! or by spawning bodies one by one in an empty domain, their radius following from their mass:
//!
//! ```
//! # use carom::prelude::*;
//! let mut simulation = Simulation::new(&[600.0, 400.0, 400.0], &[20.0; 3], Damping::uniform(0.98))
//!     .unwrap();
//!
//! let id = simulation
//!     .spawn(Vector::from([300.0, 200.0, 200.0]), Vector::from([1.0, 0.0, -2.0]), 20.0)
//!     .unwrap();
//!
//! assert_eq!(simulation.particles()[id].radius(), 10.0);
//! ```
//!
//! ## Advancing and reading the simulation
//!
//! Each call to [`step`](simulation::Simulation::step) integrates every body, bounces it off the
//! walls and resolves its contacts.
//!
//! ```
//! # use carom::prelude::*;
//! # let config = SimulationConfig::planar().with_population(100).with_seed(1);
//! # let mut simulation = Simulation::random(&config).unwrap();
//! let mut history = EnergyHistory::new(stats::PLANAR_HISTORY);
//!
//! for _ in 0..10 {
//!     simulation.step().unwrap();
//!     history.push(simulation.kinetic_energy());
//! }
//!
//! for particle in &simulation {
//!     let (position, radius) = (particle.position(), particle.radius());
//!     // draw...
//! #   let _ = (position, radius);
//! }
//! ```

#![warn(missing_docs)]

pub mod algebra;

/// Error type shared by every fallible operation.
pub mod error;

/// Uniform bucket grid indexing particles by position.
pub mod grid;

/// Rigid bodies and their collision response.
pub mod particle;

/// Population of particles advanced tick by tick.
pub mod simulation;

/// Construction-time parameters and presets.
pub mod config;

pub mod stats;

pub use error::{Error, Result};

/// Everything needed to use the crate.
pub mod prelude {
    pub use crate::algebra::{Matrix, Quaternion, Vector};
    pub use crate::config::SimulationConfig;
    pub use crate::error::Error;
    pub use crate::grid::{Grid, Zone};
    pub use crate::particle::{Damping, Particle};
    pub use crate::simulation::{Impulse, Simulation, StepReport};
    pub use crate::stats::{self, EnergyHistory, SpeedHistogram};
}
