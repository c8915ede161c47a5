//! Linear algebra used by the simulation and by renderers reading it.

mod matrix;
mod quaternion;
mod vector;

pub use matrix::Matrix;
pub use quaternion::Quaternion;
pub use vector::Vector;
