use std::{
    fmt,
    ops::{Index, IndexMut, Mul, Neg},
};

use crate::error::{Error, Result};

/// Euclidean vector of arbitrary length with checked-arity arithmetic.
///
/// Binary operations between vectors of differing lengths return
/// [`Error::DimensionMismatch`] instead of panicking. Scaling, negation and the norms are
/// infallible. Equality is exact, component-wise, and vectors of differing lengths are never equal.
///
/// ```
/// # use carom::algebra::Vector;
/// let a = Vector::from([1.0, 2.0]);
/// let b = Vector::from([3.0, -1.0]);
///
/// assert_eq!(a.try_add(&b).unwrap(), Vector::from([4.0, 1.0]));
/// assert_eq!(a.dot(&b).unwrap(), 1.0);
/// assert!(a.try_add(&Vector::zeros(3)).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vector {
    components: Vec<f64>,
}

impl Vector {
    /// Creates a new [`Vector`] from its components.
    #[inline]
    pub fn new(components: Vec<f64>) -> Self {
        Self { components }
    }

    /// Creates a [`Vector`] of the given length with all components set to zero.
    #[inline]
    pub fn zeros(dim: usize) -> Self {
        Self::new(vec![0.0; dim])
    }

    /// Number of components.
    #[inline]
    pub fn dim(&self) -> usize {
        self.components.len()
    }

    /// Returns the components as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.components
    }

    /// Iterates over the components.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.components.iter()
    }

    #[inline]
    fn check(&self, other: &Self) -> Result<()> {
        if self.dim() == other.dim() {
            Ok(())
        } else {
            Err(Error::mismatch(self.dim(), other.dim()))
        }
    }

    #[inline]
    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        self.check(other)?;

        Ok(self
            .components
            .iter()
            .zip(&other.components)
            .map(|(&a, &b)| f(a, b))
            .collect())
    }

    /// Component-wise sum of `self` and `other`.
    #[inline]
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Component-wise difference of `self` and `other`.
    #[inline]
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Adds `other` to `self` without allocating.
    #[inline]
    pub fn try_add_assign(&mut self, other: &Self) -> Result<()> {
        self.check(other)?;
        for (a, b) in self.components.iter_mut().zip(&other.components) {
            *a += b;
        }
        Ok(())
    }

    /// Subtracts `other` from `self` without allocating.
    #[inline]
    pub fn try_sub_assign(&mut self, other: &Self) -> Result<()> {
        self.check(other)?;
        for (a, b) in self.components.iter_mut().zip(&other.components) {
            *a -= b;
        }
        Ok(())
    }

    /// Dot product, the sum of the component-wise products.
    #[inline]
    pub fn dot(&self, other: &Self) -> Result<f64> {
        self.check(other)?;

        Ok(self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Returns a copy of the vector with every component multiplied by `scalar`.
    #[inline]
    pub fn scale(&self, scalar: f64) -> Self {
        self.components.iter().map(|c| c * scalar).collect()
    }

    /// Multiplies every component by `scalar` in place.
    #[inline]
    pub fn scale_mut(&mut self, scalar: f64) {
        self.components.iter_mut().for_each(|c| *c *= scalar);
    }

    /// Norm squared, defined by the dot product on itself.
    #[inline]
    pub fn magnitude_squared(&self) -> f64 {
        self.components.iter().map(|c| c * c).sum()
    }

    /// Euclidean norm.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Unit vector with the same direction, or the zero vector if the magnitude is exactly zero.
    #[inline]
    pub fn normalize(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Self::zeros(self.dim());
        }
        self.components.iter().map(|c| c / magnitude).collect()
    }

    /// Projection of `self` onto `other`, or the zero vector if `other` has a zero magnitude.
    #[inline]
    pub fn project_onto(&self, other: &Self) -> Result<Self> {
        let dot = self.dot(other)?;
        let magnitude_squared = other.magnitude_squared();
        if magnitude_squared == 0.0 {
            return Ok(Self::zeros(self.dim()));
        }
        Ok(other.scale(dot / magnitude_squared))
    }

    /// Euclidean distance between `self` and `other`.
    #[inline]
    pub fn distance(&self, other: &Self) -> Result<f64> {
        self.distance_squared(other).map(f64::sqrt)
    }

    /// Squared Euclidean distance between `self` and `other`.
    #[inline]
    pub fn distance_squared(&self, other: &Self) -> Result<f64> {
        self.check(other)?;

        Ok(self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| (b - a) * (b - a))
            .sum())
    }

    /// Returns the vector without its last component.
    #[inline]
    pub fn truncate(&self) -> Self {
        let end = self.dim().saturating_sub(1);
        Self::new(self.components[..end].to_vec())
    }

    /// Returns the component at `index`, if it exists.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.components.get(index).copied()
    }

    /// Sets the component at `index` and returns whether it exists.
    #[inline]
    pub fn set(&mut self, index: usize, value: f64) -> bool {
        match self.components.get_mut(index) {
            Some(c) => {
                *c = value;
                true
            }
            None => false,
        }
    }
}

macro_rules! impl_components {
    ($(($index: literal, $get: ident, $set: ident)),*) => {
        impl Vector {
        $(
            #[doc = concat!("Component ", stringify!($index), ", or `0.0` if the vector is too short.")]
            #[inline]
            pub fn $get(&self) -> f64 {
                self.get($index).unwrap_or_default()
            }

            #[doc = concat!("Sets component ", stringify!($index), ", does nothing if the vector is too short.")]
            #[inline]
            pub fn $set(&mut self, value: f64) {
                self.set($index, value);
            }
        )*
        }
    };
}

impl_components!((0, x, set_x), (1, y, set_y), (2, z, set_z));

impl FromIterator<f64> for Vector {
    #[inline]
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<const D: usize> From<[f64; D]> for Vector {
    #[inline]
    fn from(components: [f64; D]) -> Self {
        Self::new(components.to_vec())
    }
}

impl From<Vec<f64>> for Vector {
    #[inline]
    fn from(components: Vec<f64>) -> Self {
        Self::new(components)
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.components[index]
    }
}

impl IndexMut<usize> for Vector {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.components[index]
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    #[inline]
    fn mul(self, rhs: f64) -> Vector {
        self.scale(rhs)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    #[inline]
    fn mul(mut self, rhs: f64) -> Vector {
        self.scale_mut(rhs);
        self
    }
}

impl Neg for Vector {
    type Output = Vector;

    #[inline]
    fn neg(self) -> Vector {
        self * -1.0
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

macro_rules! impl_glam {
    ($t: ty, $dim: literal) => {
        impl From<$t> for Vector {
            #[inline]
            fn from(vector: $t) -> Self {
                Self::from(vector.to_array())
            }
        }

        impl TryFrom<&Vector> for $t {
            type Error = Error;

            #[inline]
            fn try_from(vector: &Vector) -> Result<Self> {
                let array: [f64; $dim] = vector
                    .as_slice()
                    .try_into()
                    .map_err(|_| Error::mismatch($dim, vector.dim()))?;
                Ok(<$t>::from_array(array))
            }
        }
    };
}

impl_glam!(glam::DVec2, 2);
impl_glam!(glam::DVec3, 3);
