use crate::{
    algebra::Vector,
    error::{Error, Result},
    grid::{Grid, Zone},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Divisor giving the radius of a 2D body from its mass.
pub const RADIUS_DIVISOR_2D: f64 = 3.0;

/// Divisor giving the radius of a 3D body from its mass.
pub const RADIUS_DIVISOR_3D: f64 = 2.0;

/// Default `radius = mass / divisor` policy for the given dimensionality.
///
/// Returns `None` for dimensionalities other than 2 and 3.
#[inline]
pub const fn radius_divisor(dims: usize) -> Option<f64> {
    match dims {
        2 => Some(RADIUS_DIVISOR_2D),
        3 => Some(RADIUS_DIVISOR_3D),
        _ => None,
    }
}

/// Velocity factors applied after a collision, modelling restitution and friction losses.
///
/// A value of `1.0` keeps collisions perfectly elastic.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Damping {
    /// Factor applied to the whole velocity after bouncing off a wall.
    pub wall: f64,
    /// Factor applied to both velocities after a collision between two bodies.
    pub collision: f64,
}

impl Damping {
    /// No energy loss.
    pub const NONE: Self = Self::uniform(1.0);

    /// The same factor for walls and collisions.
    #[inline]
    pub const fn uniform(factor: f64) -> Self {
        Self {
            wall: factor,
            collision: factor,
        }
    }
}

impl Default for Damping {
    #[inline]
    fn default() -> Self {
        Self::NONE
    }
}

/// Rigid circular (2D) or spherical (3D) body moving by inertia.
///
/// A [`Particle`] is registered in the bucket of a [`Grid`] matching its position as soon as it
/// is created, and [`update`](Particle::update) keeps that membership in sync every time the
/// position changes bucket. The `id` is the index the grid stores for this particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    id: usize,
    mass: f64,
    radius: f64,
    position: Vector,
    velocity: Vector,
    zone: Zone,
}

impl Particle {
    /// Creates a new [`Particle`] and inserts `id` in the bucket of `grid` containing `position`.
    ///
    /// Fails if the vectors do not match the dimensionality of the grid, if the mass or radius are
    /// not positive, or if the position lies outside of the grid.
    pub fn new(
        id: usize,
        mass: f64,
        radius: f64,
        position: Vector,
        velocity: Vector,
        grid: &mut Grid,
    ) -> Result<Self> {
        if velocity.dim() != position.dim() {
            return Err(Error::mismatch(position.dim(), velocity.dim()));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(Error::config(format!("mass must be positive, got {mass}")));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::config(format!("radius must be positive, got {radius}")));
        }

        let zone = grid.try_zone_for(&position)?;
        grid.insert(id, zone);

        Ok(Self {
            id,
            mass,
            radius,
            position,
            velocity,
            zone,
        })
    }

    /// Index of the particle in the grid.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Mass of the particle.
    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Radius of the particle.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Position of the centre of the particle.
    #[inline]
    pub fn position(&self) -> &Vector {
        &self.position
    }

    /// Velocity of the particle, in distance per tick.
    #[inline]
    pub fn velocity(&self) -> &Vector {
        &self.velocity
    }

    /// Bucket the particle is currently registered in.
    #[inline]
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Replaces the velocity of the particle.
    pub fn set_velocity(&mut self, velocity: Vector) -> Result<()> {
        if velocity.dim() != self.velocity.dim() {
            return Err(Error::mismatch(self.velocity.dim(), velocity.dim()));
        }
        self.velocity = velocity;
        Ok(())
    }

    #[inline]
    pub(crate) fn velocity_mut(&mut self) -> &mut Vector {
        &mut self.velocity
    }

    /// Momentum, `velocity * mass`.
    #[inline]
    pub fn momentum(&self) -> Vector {
        self.velocity.scale(self.mass)
    }

    /// Kinetic energy, `0.5 * mass * |velocity|²`.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    /// Magnitude of the velocity.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Advances the particle by one tick inside a domain spanning `[0, extent]` on every axis.
    ///
    /// Integrates the position with explicit Euler, bounces off the walls, then moves the
    /// particle to its new bucket if it changed.
    pub fn update(&mut self, extents: &[f64], wall_damping: f64, grid: &mut Grid) -> Result<()> {
        self.position.try_add_assign(&self.velocity)?;
        self.bounce(extents, wall_damping)?;
        self.rezone(grid);
        Ok(())
    }

    /// Resolves collisions with the walls of the domain, returning the number of walls hit.
    ///
    /// On each axis, in order, a body crossing the low (high) wall gets that velocity component
    /// negated, is placed exactly against the wall, and has its whole velocity multiplied by
    /// `damping`. The bucket is left untouched, [`update`](Self::update) re-buckets afterwards.
    pub(crate) fn bounce(&mut self, extents: &[f64], damping: f64) -> Result<usize> {
        if extents.len() != self.position.dim() {
            return Err(Error::mismatch(self.position.dim(), extents.len()));
        }

        let mut hits = 0;
        for (axis, &extent) in extents.iter().enumerate() {
            let at = if self.position[axis] - self.radius < 0.0 {
                self.radius
            } else if self.position[axis] + self.radius > extent {
                extent - self.radius
            } else {
                continue;
            };

            self.velocity[axis] = -self.velocity[axis];
            self.position[axis] = at;
            self.velocity.scale_mut(damping);
            hits += 1;
        }
        Ok(hits)
    }

    /// Moves the particle to the bucket matching its position, returning whether it changed.
    #[inline]
    pub(crate) fn rezone(&mut self, grid: &mut Grid) -> bool {
        let zone = grid.zone_for(&self.position);
        self.move_to(zone, grid)
    }

    /// Like [`rezone`](Self::rezone), clipping positions slightly outside of the grid.
    #[inline]
    pub(crate) fn settle(&mut self, grid: &mut Grid) -> bool {
        let zone = grid.nearest_zone(&self.position);
        self.move_to(zone, grid)
    }

    #[inline]
    fn move_to(&mut self, zone: Zone, grid: &mut Grid) -> bool {
        if zone == self.zone {
            return false;
        }
        grid.relocate(self.id, self.zone, zone);
        self.zone = zone;
        true
    }

    /// Resolves an elastic collision between two particles, returning whether they were in
    /// contact.
    ///
    /// Particles whose centres are closer than the sum of their radii are pushed apart along the
    /// line joining them until they just touch, exchange momentum along that line, and have their
    /// velocities multiplied by `damping`. Particles not in contact are left untouched.
    ///
    /// ```
    /// # use carom::prelude::*;
    /// let mut grid = Grid::covering(&[10.0, 10.0], &[2.0, 2.0]).unwrap();
    /// let at = |x: f64| Vector::from([x, 5.0]);
    ///
    /// let mut a = Particle::new(0, 1.0, 1.0, at(4.0), Vector::from([1.0, 0.0]), &mut grid).unwrap();
    /// let mut b = Particle::new(1, 1.0, 1.0, at(5.0), Vector::from([-1.0, 0.0]), &mut grid).unwrap();
    ///
    /// assert!(a.collide(&mut b, 1.0).unwrap());
    /// assert_eq!(a.velocity(), &Vector::from([-1.0, 0.0]));
    /// assert_eq!(b.velocity(), &Vector::from([1.0, 0.0]));
    /// ```
    pub fn collide(&mut self, other: &mut Self, damping: f64) -> Result<bool> {
        let offset = other.position.try_sub(&self.position)?;
        let distance = offset.magnitude();
        let reach = self.radius + other.radius;

        if distance >= reach {
            return Ok(false);
        }

        // Both velocity changes are read from the state before any mutation.
        let relative_velocity = other.velocity.try_sub(&self.velocity)?;
        let exchange = relative_velocity.project_onto(&offset)?;
        let total_mass = self.mass + other.mass;

        self.velocity
            .try_add_assign(&exchange.scale(2.0 * other.mass / total_mass))?;
        other
            .velocity
            .try_sub_assign(&exchange.scale(2.0 * self.mass / total_mass))?;

        let push = offset.normalize().scale(0.5 * (reach - distance));
        self.position.try_sub_assign(&push)?;
        other.position.try_add_assign(&push)?;

        self.velocity.scale_mut(damping);
        other.velocity.scale_mut(damping);

        Ok(true)
    }
}
