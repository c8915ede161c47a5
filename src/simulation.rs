use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    algebra::Vector,
    config::SimulationConfig,
    error::{Error, Result},
    grid::Grid,
    particle::{radius_divisor, Damping, Particle},
    stats,
};

/// External velocity change applied to the particles of a [`Simulation`].
#[derive(Clone, Debug, PartialEq)]
pub enum Impulse {
    /// Adds `strength` towards `center` to every particle closer than `radius`.
    Attract {
        /// Point of application.
        center: Vector,
        /// Range of effect.
        radius: f64,
        /// Magnitude of the velocity change.
        strength: f64,
    },
    /// Adds `strength` away from `center` to every particle closer than `radius`.
    Repel {
        /// Point of application.
        center: Vector,
        /// Range of effect.
        radius: f64,
        /// Magnitude of the velocity change.
        strength: f64,
    },
    /// Adds `strength` along its own direction of motion to every particle closer than `radius`.
    Boost {
        /// Point of application.
        center: Vector,
        /// Range of effect.
        radius: f64,
        /// Magnitude of the velocity change.
        strength: f64,
    },
    /// Adds `min(cap, scale / distance)` towards `center` to every particle.
    Pull {
        /// Point of application.
        center: Vector,
        /// Numerator of the inverse distance falloff.
        scale: f64,
        /// Upper bound of the velocity change.
        cap: f64,
    },
}

impl Impulse {
    /// Point the impulse is applied from.
    #[inline]
    pub fn center(&self) -> &Vector {
        match self {
            Self::Attract { center, .. }
            | Self::Repel { center, .. }
            | Self::Boost { center, .. }
            | Self::Pull { center, .. } => center,
        }
    }

    /// Changes the velocity of `particle`, returning whether it was affected.
    ///
    /// A particle sitting exactly on the center has no direction to be pushed along and is left
    /// untouched by [`Pull`](Impulse::Pull).
    pub fn apply_to(&self, particle: &mut Particle) -> Result<bool> {
        let offset = self.center().try_sub(particle.position())?;
        let distance = offset.magnitude();

        let delta = match *self {
            Self::Attract {
                radius, strength, ..
            } if distance < radius => offset.normalize().scale(strength),
            Self::Repel {
                radius, strength, ..
            } if distance < radius => offset.normalize().scale(-strength),
            Self::Boost {
                radius, strength, ..
            } if distance < radius => particle.velocity().normalize().scale(strength),
            Self::Pull { scale, cap, .. } if distance > 0.0 => {
                offset.normalize().scale(cap.min(scale / distance))
            }
            _ => return Ok(false),
        };

        particle.velocity_mut().try_add_assign(&delta)?;
        Ok(true)
    }
}

/// Outcome of a [`Simulation::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Number of contact tests between neighbouring particles.
    pub checked: usize,
    /// Number of pairs found in contact and resolved. A resolved pair is not tested again
    /// during the same tick.
    pub resolved: usize,
}

/// Population of [`Particle`]s bouncing in an axis-aligned box.
///
/// The simulation owns the particles and the [`Grid`] indexing them. Each particle's index in
/// [`particles`](Simulation::particles) is the id stored in the grid.
///
/// # Example
///
/// ```
/// # use carom::prelude::*;
/// let mut simulation = Simulation::new(&[100.0, 100.0], &[4.0, 4.0], Damping::NONE).unwrap();
///
/// let a = simulation.spawn(Vector::from([40.0, 50.0]), Vector::from([1.0, 0.0]), 3.0).unwrap();
/// let b = simulation.spawn(Vector::from([43.0, 50.0]), Vector::from([-1.0, 0.0]), 3.0).unwrap();
///
/// let resolved: usize = (0..2).map(|_| simulation.step().unwrap().resolved).sum();
///
/// assert_eq!(resolved, 1);
/// assert_eq!(simulation.particles()[a].velocity(), &Vector::from([-1.0, 0.0]));
/// assert_eq!(simulation.particles()[b].velocity(), &Vector::from([1.0, 0.0]));
/// ```
#[derive(Clone, Debug)]
pub struct Simulation {
    particles: Vec<Particle>,
    grid: Grid,
    extents: Vec<f64>,
    damping: Damping,
    radius_divisor: f64,
    pairs: HashSet<(usize, usize)>,
    scratch: Vec<usize>,
    tick: u64,
}

impl Simulation {
    /// Creates an empty [`Simulation`] over a domain spanning `[0, extent]` on every axis, indexed
    /// by buckets of `cell_size`.
    pub fn new(extents: &[f64], cell_size: &[f64], damping: Damping) -> Result<Self> {
        let grid = Grid::covering(extents, cell_size)?;
        let radius_divisor =
            radius_divisor(grid.dims()).ok_or(Error::UnsupportedDimension(grid.dims()))?;

        log::debug!(
            "created {}D simulation over {extents:?} with {:?} buckets",
            grid.dims(),
            grid.counts()
        );

        Ok(Self {
            particles: Vec::new(),
            grid,
            extents: extents.to_vec(),
            damping,
            radius_divisor,
            pairs: HashSet::new(),
            scratch: Vec::new(),
            tick: 0,
        })
    }

    /// Creates an empty [`Simulation`] from a validated configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut simulation = Self::new(&config.extents, &config.cell_size, config.damping)?;
        if let Some(divisor) = config.radius_divisor {
            simulation.radius_divisor = divisor;
        }

        let diameter = 2.0 * config.radius();
        if config.cell_size.iter().any(|&s| s < diameter) {
            log::warn!(
                "cell size {:?} is smaller than the body diameter {diameter}, contacts spanning \
                 more than one bucket will be missed",
                config.cell_size
            );
        }

        Ok(simulation)
    }

    /// Creates a [`Simulation`] populated at random, seeded from the configuration when it
    /// carries a seed.
    pub fn random(config: &SimulationConfig) -> Result<Self> {
        let mut rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::random_with(config, &mut rng)
    }

    /// Creates a [`Simulation`] populated with `config.population` bodies drawn from `rng`.
    ///
    /// Positions are uniform in `[radius, extent - radius]` and velocity components uniform in
    /// `[-max_initial_speed, max_initial_speed]`.
    pub fn random_with<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        let mut simulation = Self::from_config(config)?;
        let radius = config.radius();
        let max = config.max_initial_speed;

        simulation.particles.reserve(config.population);
        for _ in 0..config.population {
            let position = config
                .extents
                .iter()
                .map(|&extent| rng.gen_range(radius..=extent - radius))
                .collect();
            let velocity = (0..config.dims())
                .map(|_| rng.gen_range(-max..=max))
                .collect();
            simulation.spawn_with_radius(position, velocity, config.mass, radius)?;
        }

        log::debug!(
            "spawned {} bodies of mass {} and radius {radius}",
            config.population,
            config.mass
        );

        Ok(simulation)
    }

    /// Adds a body whose radius follows from its mass, returning its index.
    pub fn spawn(&mut self, position: Vector, velocity: Vector, mass: f64) -> Result<usize> {
        let radius = mass / self.radius_divisor;
        self.spawn_with_radius(position, velocity, mass, radius)
    }

    /// Adds a body of the given radius, returning its index.
    pub fn spawn_with_radius(
        &mut self,
        position: Vector,
        velocity: Vector,
        mass: f64,
        radius: f64,
    ) -> Result<usize> {
        if position.dim() != self.dims() {
            return Err(Error::mismatch(self.dims(), position.dim()));
        }
        if self.extents.iter().any(|&extent| extent <= 2.0 * radius) {
            return Err(Error::config(format!(
                "a body of radius {radius} does not fit in extents {:?}",
                self.extents
            )));
        }

        let id = self.particles.len();
        let particle = Particle::new(id, mass, radius, position, velocity, &mut self.grid)?;
        self.particles.push(particle);
        Ok(id)
    }

    /// Advances every particle by one tick with the stored damping.
    #[inline]
    pub fn step(&mut self) -> Result<StepReport> {
        self.step_with(self.damping)
    }

    /// Advances every particle by one tick with the given damping.
    ///
    /// Particles are processed in index order. Each one is integrated, bounced off the walls and
    /// re-bucketed, then collided with every particle of its neighbourhood, skipping the pairs
    /// already resolved during this tick. Collisions mutate both bodies immediately, so later
    /// pairs see the velocities left by earlier ones.
    pub fn step_with(&mut self, damping: Damping) -> Result<StepReport> {
        let mut report = StepReport::default();
        self.pairs.clear();

        for i in 0..self.particles.len() {
            self.particles[i].update(&self.extents, damping.wall, &mut self.grid)?;

            self.scratch.clear();
            self.scratch
                .extend(self.grid.neighbors(self.particles[i].zone()));

            for &j in &self.scratch {
                let key = (i.min(j), i.max(j));
                if j == i || self.pairs.contains(&key) {
                    continue;
                }

                report.checked += 1;
                let (a, b) = pair_mut(&mut self.particles, i, j);
                if a.collide(b, damping.collision)? {
                    self.pairs.insert(key);
                    report.resolved += 1;
                }
            }
        }

        // Overlap pushes may have moved bodies across buckets after their own update.
        let settled = self
            .particles
            .iter_mut()
            .map(|p| p.settle(&mut self.grid))
            .filter(|&moved| moved)
            .count();

        self.tick += 1;
        log::trace!(
            "tick {}: {} pairs checked, {} resolved, {settled} settled",
            self.tick,
            report.checked,
            report.resolved
        );

        Ok(report)
    }

    /// Applies `impulse` to every particle, returning the number of particles affected.
    pub fn apply_impulse(&mut self, impulse: &Impulse) -> Result<usize> {
        if impulse.center().dim() != self.dims() {
            return Err(Error::mismatch(self.dims(), impulse.center().dim()));
        }

        #[cfg(feature = "parallel")]
        let particles = self.particles.par_iter_mut();
        #[cfg(not(feature = "parallel"))]
        let particles = self.particles.iter_mut();

        particles
            .map(|p| impulse.apply_to(p).map(usize::from))
            .sum()
    }

    /// Multiplies every velocity by `factor`.
    pub fn heat(&mut self, factor: f64) {
        #[cfg(feature = "parallel")]
        let particles = self.particles.par_iter_mut();
        #[cfg(not(feature = "parallel"))]
        let particles = self.particles.iter_mut();

        particles.for_each(|p| p.velocity_mut().scale_mut(factor));
    }

    /// Damping used by [`step`](Self::step).
    #[inline]
    pub fn damping(&self) -> Damping {
        self.damping
    }

    /// Replaces the damping used by [`step`](Self::step).
    #[inline]
    pub fn set_damping(&mut self, damping: Damping) {
        self.damping = damping;
    }

    /// Particles, indexed by their id.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Iterates over the particles.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns whether there are no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of axes.
    #[inline]
    pub fn dims(&self) -> usize {
        self.grid.dims()
    }

    /// Size of the domain per axis.
    #[inline]
    pub fn extents(&self) -> &[f64] {
        &self.extents
    }

    /// Grid indexing the particles.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of completed steps.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Sum of the kinetic energy of every particle.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        stats::total_kinetic_energy(&self.particles)
    }

    /// Sum of the momentum of every particle.
    pub fn momentum(&self) -> Result<Vector> {
        if self.is_empty() {
            return Ok(Vector::zeros(self.dims()));
        }
        stats::total_momentum(&self.particles)
    }
}

impl<'a> IntoIterator for &'a Simulation {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable references to the particles at `i` and `j`, in that order.
#[inline]
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert_ne!(i, j);
    if i < j {
        let (low, high) = particles.split_at_mut(j);
        (&mut low[i], &mut high[0])
    } else {
        let (low, high) = particles.split_at_mut(i);
        (&mut high[0], &mut low[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1E-9;

    fn empty_2d() -> Simulation {
        Simulation::new(&[100.0, 100.0], &[4.0, 4.0], Damping::NONE).unwrap()
    }

    fn assert_grid_consistent(simulation: &Simulation) {
        assert_eq!(simulation.grid().len(), simulation.len());
        for (id, p) in simulation.iter().enumerate() {
            assert_eq!(p.id(), id);
            assert!(simulation.grid().contains(id, p.zone()));
            assert_eq!(p.zone(), simulation.grid().nearest_zone(p.position()));
        }
    }

    #[test]
    fn pair_mut_keeps_order() {
        let mut simulation = empty_2d();
        for x in [10.0, 20.0, 30.0] {
            simulation
                .spawn(Vector::from([x, 10.0]), Vector::zeros(2), 3.0)
                .unwrap();
        }

        let (a, b) = pair_mut(&mut simulation.particles, 2, 0);
        assert_eq!((a.id(), b.id()), (2, 0));
        let (a, b) = pair_mut(&mut simulation.particles, 1, 2);
        assert_eq!((a.id(), b.id()), (1, 2));
    }

    #[test]
    fn spawn_uses_divisor() {
        let mut simulation = empty_2d();
        let id = simulation
            .spawn(Vector::from([50.0, 50.0]), Vector::zeros(2), 6.0)
            .unwrap();
        assert_eq!(simulation.particles()[id].radius(), 2.0);

        let mut simulation = Simulation::new(&[10.0; 3], &[2.0; 3], Damping::NONE).unwrap();
        let id = simulation
            .spawn(Vector::from([5.0, 5.0, 5.0]), Vector::zeros(3), 6.0)
            .unwrap();
        assert_eq!(simulation.particles()[id].radius(), 3.0);
    }

    #[test]
    fn spawn_rejects_invalid_bodies() {
        let mut simulation = empty_2d();
        assert_eq!(
            simulation.spawn(Vector::zeros(3), Vector::zeros(3), 1.0),
            Err(Error::mismatch(2, 3))
        );
        assert!(simulation
            .spawn_with_radius(Vector::from([50.0, 50.0]), Vector::zeros(2), 1.0, 60.0)
            .is_err());
        assert!(simulation
            .spawn(Vector::from([150.0, 50.0]), Vector::zeros(2), 1.0)
            .is_err());
        assert!(simulation.is_empty());
        assert!(simulation.grid().is_empty());
    }

    #[test]
    fn unsupported_dimensions() {
        assert_eq!(
            Simulation::new(&[1.0; 4], &[1.0; 4], Damping::NONE).unwrap_err(),
            Error::UnsupportedDimension(4)
        );
    }

    #[test]
    fn head_on_exchange() {
        let mut simulation = empty_2d();
        let a = simulation
            .spawn_with_radius(Vector::from([10.0, 10.0]), Vector::from([1.0, 0.0]), 1.0, 1.0)
            .unwrap();
        let b = simulation
            .spawn_with_radius(Vector::from([13.0, 10.0]), Vector::from([-1.0, 0.0]), 1.0, 1.0)
            .unwrap();

        // Tested once apart after the first body moves, then in contact after the second.
        let first = simulation.step().unwrap();
        assert_eq!(first.checked, 2);
        assert_eq!(first.resolved, 1);

        let [a, b] = [a, b].map(|i| &simulation.particles()[i]);
        assert_eq!(a.velocity(), &Vector::from([-1.0, 0.0]));
        assert_eq!(b.velocity(), &Vector::from([1.0, 0.0]));
        assert!((a.position().distance(b.position()).unwrap() - 2.0).abs() < EPSILON);
        assert_eq!(simulation.tick(), 1);
    }

    #[test]
    fn resolved_pairs_are_not_revisited() {
        let mut simulation = empty_2d();
        for x in [20.0, 21.0, 22.0] {
            simulation
                .spawn_with_radius(Vector::from([x, 20.0]), Vector::zeros(2), 1.0, 1.0)
                .unwrap();
        }

        // 0-1 and 1-2 are resolved, 0-2 is tested from both ends and never in contact.
        let report = simulation.step().unwrap();
        assert_eq!(report.resolved, 2);
        assert_eq!(report.checked, 4);
        assert_eq!(simulation.particles()[0].position().x(), 19.5);
        assert_grid_consistent(&simulation);
    }

    #[test]
    fn distant_bodies_are_not_checked() {
        let mut simulation = empty_2d();
        simulation
            .spawn(Vector::from([10.0, 10.0]), Vector::from([1.0, 1.0]), 3.0)
            .unwrap();
        simulation
            .spawn(Vector::from([90.0, 90.0]), Vector::from([-1.0, 0.0]), 3.0)
            .unwrap();

        assert_eq!(simulation.step().unwrap(), StepReport::default());
    }

    #[test]
    fn random_population_is_seeded_and_in_bounds() {
        let config = SimulationConfig::new(vec![200.0, 100.0], vec![10.0, 10.0])
            .with_population(200)
            .with_mass(6.0)
            .with_seed(42);

        let simulation = Simulation::random(&config).unwrap();
        let again = Simulation::random(&config).unwrap();

        assert_eq!(simulation.len(), 200);
        assert_eq!(simulation.particles(), again.particles());
        assert_grid_consistent(&simulation);

        for p in &simulation {
            assert_eq!(p.radius(), 2.0);
            for (axis, &extent) in config.extents.iter().enumerate() {
                assert!(p.position()[axis] >= 2.0 && p.position()[axis] <= extent - 2.0);
                assert!(p.velocity()[axis].abs() <= 10.0);
            }
        }
    }

    #[test]
    fn grid_stays_consistent() {
        let config = SimulationConfig::new(vec![60.0, 60.0, 60.0], vec![4.0; 3])
            .with_population(150)
            .with_mass(2.0)
            .with_max_initial_speed(2.0)
            .with_damping(0.99)
            .with_seed(3);
        let mut simulation = Simulation::random(&config).unwrap();

        for _ in 0..100 {
            simulation.step().unwrap();
            assert_grid_consistent(&simulation);
        }
        assert_eq!(simulation.tick(), 100);
    }

    #[test]
    fn elastic_walls_conserve_energy() {
        let config = SimulationConfig::new(vec![50.0, 50.0], vec![10.0, 10.0])
            .with_population(1)
            .with_mass(3.0)
            .with_seed(11);
        let mut simulation = Simulation::random(&config).unwrap();
        let energy = simulation.kinetic_energy();

        for _ in 0..200 {
            simulation.step().unwrap();
        }
        assert!((simulation.kinetic_energy() - energy).abs() < EPSILON);
    }

    #[test]
    fn impulses() {
        let mut simulation = empty_2d();
        simulation
            .spawn(Vector::from([10.0, 10.0]), Vector::from([0.0, 2.0]), 3.0)
            .unwrap();
        simulation
            .spawn(Vector::from([50.0, 50.0]), Vector::zeros(2), 3.0)
            .unwrap();
        let center = Vector::from([10.0, 20.0]);
        let velocity = |s: &Simulation, i: usize| s.particles()[i].velocity().clone();

        let attract = Impulse::Attract {
            center: center.clone(),
            radius: 15.0,
            strength: 3.0,
        };
        assert_eq!(simulation.apply_impulse(&attract).unwrap(), 1);
        assert_eq!(velocity(&simulation, 0), Vector::from([0.0, 5.0]));
        assert_eq!(velocity(&simulation, 1), Vector::zeros(2));

        let repel = Impulse::Repel {
            center: center.clone(),
            radius: 15.0,
            strength: 1.0,
        };
        assert_eq!(simulation.apply_impulse(&repel).unwrap(), 1);
        assert_eq!(velocity(&simulation, 0), Vector::from([0.0, 4.0]));

        let boost = Impulse::Boost {
            center: center.clone(),
            radius: 70.0,
            strength: 6.0,
        };
        assert_eq!(simulation.apply_impulse(&boost).unwrap(), 2);
        assert_eq!(velocity(&simulation, 0), Vector::from([0.0, 10.0]));
        assert_eq!(velocity(&simulation, 1), Vector::zeros(2));

        let pull = Impulse::Pull {
            center: Vector::from([50.0, 10.0]),
            scale: 80.0,
            cap: 300.0,
        };
        assert_eq!(simulation.apply_impulse(&pull).unwrap(), 2);
        assert_eq!(velocity(&simulation, 1), Vector::from([0.0, -2.0]));
        assert_eq!(velocity(&simulation, 0), Vector::from([2.0, 10.0]));

        let misplaced = Impulse::Pull {
            center: Vector::zeros(3),
            scale: 1.0,
            cap: 1.0,
        };
        assert_eq!(
            simulation.apply_impulse(&misplaced),
            Err(Error::mismatch(2, 3))
        );
    }

    #[test]
    fn pull_skips_the_center() {
        let mut simulation = empty_2d();
        simulation
            .spawn(Vector::from([50.0, 50.0]), Vector::zeros(2), 3.0)
            .unwrap();
        let pull = Impulse::Pull {
            center: Vector::from([50.0, 50.0]),
            scale: 80.0,
            cap: 300.0,
        };
        assert_eq!(simulation.apply_impulse(&pull).unwrap(), 0);
    }

    #[test]
    fn heat_and_momentum() {
        let mut simulation = empty_2d();
        simulation
            .spawn(Vector::from([10.0, 10.0]), Vector::from([1.0, 2.0]), 3.0)
            .unwrap();
        simulation
            .spawn(Vector::from([50.0, 50.0]), Vector::from([-2.0, 0.0]), 6.0)
            .unwrap();

        simulation.heat(2.0);
        assert_eq!(simulation.momentum().unwrap(), Vector::from([-18.0, 12.0]));
        assert_eq!(simulation.kinetic_energy(), 0.5 * 3.0 * 20.0 + 0.5 * 6.0 * 16.0);

        assert_eq!(empty_2d().momentum().unwrap(), Vector::zeros(2));
    }
}
