use crate::{
    error::{Error, Result},
    particle::{radius_divisor, Damping},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Construction-time parameters of a [`Simulation`](crate::simulation::Simulation).
///
/// The dimensionality of the simulation is the number of `extents`. The domain spans
/// `[0, extent]` on every axis and is covered by buckets of `cell_size`.
///
/// ```
/// # use carom::prelude::*;
/// let config = SimulationConfig::new(vec![200.0, 100.0], vec![10.0, 10.0])
///     .with_population(50)
///     .with_mass(6.0)
///     .with_damping(0.99)
///     .with_seed(7);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.radius(), 2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Number of bodies spawned by [`Simulation::random`](crate::simulation::Simulation::random).
    pub population: usize,
    /// Mass of every spawned body.
    pub mass: f64,
    /// Size of the domain per axis.
    pub extents: Vec<f64>,
    /// Size of a grid bucket per axis.
    pub cell_size: Vec<f64>,
    /// Velocity factors applied after wall and body collisions.
    pub damping: Damping,
    /// Overrides the `radius = mass / divisor` policy of the dimensionality.
    pub radius_divisor: Option<f64>,
    /// Spawned velocity components are drawn from `[-max_initial_speed, max_initial_speed]`.
    pub max_initial_speed: f64,
    /// Seed of the random population, drawn from entropy when missing.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Creates a new configuration for an empty domain of the given extents and bucket sizes.
    pub fn new(extents: Vec<f64>, cell_size: Vec<f64>) -> Self {
        Self {
            population: 0,
            mass: 20.0,
            extents,
            cell_size,
            damping: Damping::NONE,
            radius_divisor: None,
            max_initial_speed: 10.0,
            seed: None,
        }
    }

    /// 1000 bodies of mass 20 in an 800 by 800 box split in 100 by 100 buckets.
    pub fn planar() -> Self {
        Self::new(vec![800.0, 800.0], vec![8.0, 8.0])
            .with_population(1000)
            .with_damping(0.995)
    }

    /// 500 bodies of mass 20 in a 600 by 400 by 400 box split in buckets of 20.
    pub fn spatial() -> Self {
        Self::new(vec![600.0, 400.0, 400.0], vec![20.0; 3])
            .with_population(500)
            .with_damping(0.98)
    }

    /// Sets the number of bodies.
    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    /// Sets the mass of every body.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Uses the same damping factor for walls and collisions.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = Damping::uniform(damping);
        self
    }

    /// Sets the damping factor applied after bouncing off a wall.
    pub fn with_wall_damping(mut self, damping: f64) -> Self {
        self.damping.wall = damping;
        self
    }

    /// Sets the damping factor applied after a collision between bodies.
    pub fn with_collision_damping(mut self, damping: f64) -> Self {
        self.damping.collision = damping;
        self
    }

    /// Overrides the mass to radius divisor.
    pub fn with_radius_divisor(mut self, divisor: f64) -> Self {
        self.radius_divisor = Some(divisor);
        self
    }

    /// Sets the bound of the spawned velocity components.
    pub fn with_max_initial_speed(mut self, speed: f64) -> Self {
        self.max_initial_speed = speed;
        self
    }

    /// Seeds the random population.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of axes.
    #[inline]
    pub fn dims(&self) -> usize {
        self.extents.len()
    }

    /// Divisor in use, the override or the default of the dimensionality.
    #[inline]
    pub fn divisor(&self) -> Option<f64> {
        self.radius_divisor.or(radius_divisor(self.dims()))
    }

    /// Radius of a body of the configured mass.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.divisor().map_or(f64::NAN, |d| self.mass / d)
    }

    /// Checks that the configuration describes a simulation that can be built.
    pub fn validate(&self) -> Result<()> {
        let dims = self.dims();
        if radius_divisor(dims).is_none() {
            return Err(Error::UnsupportedDimension(dims));
        }
        if self.cell_size.len() != dims {
            return Err(Error::mismatch(dims, self.cell_size.len()));
        }

        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;

        if !self.extents.iter().all(|&e| positive(e)) {
            return Err(Error::config("extents must be positive"));
        }
        if !self.cell_size.iter().all(|&s| positive(s)) {
            return Err(Error::config("cell sizes must be positive"));
        }
        if !positive(self.mass) {
            return Err(Error::config(format!("mass must be positive, got {}", self.mass)));
        }
        if let Some(divisor) = self.radius_divisor.filter(|&d| !positive(d)) {
            return Err(Error::config(format!(
                "radius divisor must be positive, got {divisor}"
            )));
        }
        if !(non_negative(self.damping.wall) && non_negative(self.damping.collision)) {
            return Err(Error::config(format!(
                "damping must be non-negative, got {:?}",
                self.damping
            )));
        }
        if !non_negative(self.max_initial_speed) {
            return Err(Error::config("maximum initial speed must be non-negative"));
        }

        let radius = self.radius();
        if self.population > 0 && self.extents.iter().any(|&e| e <= 2.0 * radius) {
            return Err(Error::config(format!(
                "bodies of radius {radius} do not fit in extents {:?}",
                self.extents
            )));
        }

        Ok(())
    }
}
