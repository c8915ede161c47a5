use std::{fmt, ops::Mul};

use super::Vector;
use crate::error::{Error, Result};

/// Quaternion `w + xi + yj + zk`, used as a 3D rotation when of unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    /// Scalar part.
    pub w: f64,
    /// First component of the vector part.
    pub x: f64,
    /// Second component of the vector part.
    pub y: f64,
    /// Third component of the vector part.
    pub z: f64,
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 0.0);

    /// Creates a new [`Quaternion`] from its components.
    #[inline]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle` radians about `axis`, using the half-angle construction.
    ///
    /// The axis is expected to be a unit 3-vector; it is not normalized here.
    pub fn from_axis_angle(axis: &Vector, angle: f64) -> Result<Self> {
        if axis.dim() != 3 {
            return Err(Error::mismatch(3, axis.dim()));
        }
        let (sin, cos) = (angle / 2.0).sin_cos();
        Ok(Self::new(cos, sin * axis.x(), sin * axis.y(), sin * axis.z()))
    }

    /// Negates the vector part.
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Norm of the quaternion as a 4-vector.
    #[inline]
    pub fn magnitude(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Divides all components by the magnitude. A zero quaternion is returned unchanged.
    #[inline]
    pub fn normalized(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return self;
        }
        Self::new(
            self.w / magnitude,
            self.x / magnitude,
            self.y / magnitude,
            self.z / magnitude,
        )
    }

    /// Rotates a 3-vector with the sandwich product `q (0, v) q*`.
    ///
    /// The quaternion is assumed to be of unit length, its conjugate standing in for its inverse.
    pub fn rotate(self, vector: &Vector) -> Result<Vector> {
        if vector.dim() != 3 {
            return Err(Error::mismatch(3, vector.dim()));
        }
        let pure = Self::new(0.0, vector.x(), vector.y(), vector.z());
        let r = self * pure * self.conjugate();
        Ok(Vector::from([r.x, r.y, r.z]))
    }
}

impl Default for Quaternion {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let Self { w, x, y, z } = self;
        Self::new(
            w * rhs.w - x * rhs.x - y * rhs.y - z * rhs.z,
            w * rhs.x + x * rhs.w + y * rhs.z - z * rhs.y,
            w * rhs.y - x * rhs.z + y * rhs.w + z * rhs.x,
            w * rhs.z + x * rhs.y - y * rhs.x + z * rhs.w,
        )
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}i + {}j + {}k", self.w, self.x, self.y, self.z)
    }
}

impl From<glam::DQuat> for Quaternion {
    #[inline]
    fn from(q: glam::DQuat) -> Self {
        Self::new(q.w, q.x, q.y, q.z)
    }
}

impl From<Quaternion> for glam::DQuat {
    #[inline]
    fn from(q: Quaternion) -> Self {
        glam::DQuat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}
