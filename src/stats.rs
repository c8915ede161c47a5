//! Aggregate quantities of a population of particles.

use std::collections::VecDeque;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    algebra::Vector,
    error::{Error, Result},
    particle::Particle,
};

/// Sum of the kinetic energy of `particles`.
pub fn total_kinetic_energy(particles: &[Particle]) -> f64 {
    #[cfg(feature = "parallel")]
    let particles = particles.par_iter();
    #[cfg(not(feature = "parallel"))]
    let particles = particles.iter();

    particles.map(Particle::kinetic_energy).sum()
}

/// Sum of the momentum of `particles`, an empty vector if there are none.
pub fn total_momentum(particles: &[Particle]) -> Result<Vector> {
    #[cfg(feature = "parallel")]
    let total = particles
        .par_iter()
        .map(|p| Ok::<_, Error>(p.momentum()))
        .try_reduce_with(|a: Vector, b| a.try_add(&b));

    #[cfg(not(feature = "parallel"))]
    let total = {
        let mut momenta = particles.iter().map(Particle::momentum);
        momenta
            .next()
            .map(|first| momenta.try_fold(first, |a, b| a.try_add(&b)))
    };

    total.unwrap_or_else(|| Ok(Vector::default()))
}

/// Number of energy samples kept for a 2D population.
pub const PLANAR_HISTORY: usize = 141;

/// Number of energy samples kept for a 3D population.
pub const SPATIAL_HISTORY: usize = 282;

/// Fixed-capacity history of total kinetic energy samples, dropping the oldest when full.
///
/// ```
/// # use carom::stats::EnergyHistory;
/// let mut history = EnergyHistory::new(2);
/// history.push(3.0);
/// history.push(5.0);
/// history.push(4.0);
///
/// assert_eq!(history.iter().collect::<Vec<_>>(), vec![5.0, 4.0]);
/// assert_eq!(history.max(), Some(5.0));
/// assert_eq!(history.latest(), Some(4.0));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnergyHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl EnergyHistory {
    /// Creates an empty history keeping at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a sample.
    pub fn push(&mut self, sample: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Samples from oldest to latest.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Largest recorded sample.
    pub fn max(&self) -> Option<f64> {
        self.iter().reduce(f64::max)
    }

    /// Most recent sample.
    #[inline]
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Number of recorded samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns whether nothing was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples kept.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forgets every sample.
    #[inline]
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Distribution of particle speeds over evenly sized bins.
///
/// Speeds at or above `max_speed` are counted in the last bin.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedHistogram {
    counts: Vec<usize>,
    max_speed: f64,
}

impl SpeedHistogram {
    /// Bins the speeds of `particles` into `bins` bins covering `[0, max_speed)`.
    pub fn from_particles(particles: &[Particle], bins: usize, max_speed: f64) -> Result<Self> {
        if bins == 0 {
            return Err(Error::config("a histogram needs at least one bin"));
        }
        if !(max_speed.is_finite() && max_speed > 0.0) {
            return Err(Error::config(format!(
                "maximum speed must be positive, got {max_speed}"
            )));
        }

        let bin = |p: &Particle| ((p.speed() / max_speed * bins as f64) as usize).min(bins - 1);

        #[cfg(feature = "parallel")]
        let counts = particles
            .par_iter()
            .fold(
                || vec![0; bins],
                |mut counts, p| {
                    counts[bin(p)] += 1;
                    counts
                },
            )
            .reduce(
                || vec![0; bins],
                |mut a, b| {
                    a.iter_mut().zip(b).for_each(|(a, b)| *a += b);
                    a
                },
            );

        #[cfg(not(feature = "parallel"))]
        let counts = particles.iter().fold(vec![0; bins], |mut counts, p| {
            counts[bin(p)] += 1;
            counts
        });

        Ok(Self { counts, max_speed })
    }

    /// Number of particles per bin.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of bins.
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Speed range covered by one bin.
    #[inline]
    pub fn bin_width(&self) -> f64 {
        self.max_speed / self.bins() as f64
    }

    /// Number of binned particles.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Share of the particles falling in `bin`, zero for an empty histogram or a missing bin.
    pub fn fraction(&self, bin: usize) -> f64 {
        match (self.counts.get(bin), self.total()) {
            (Some(&count), total) if total > 0 => count as f64 / total as f64,
            _ => 0.0,
        }
    }
}
