use std::fmt;

use super::Vector;
use crate::error::{Error, Result};

/// Matrix stored as a list of column vectors of equal length.
///
/// Rows are derived from the columns on demand, so they can never disagree with them. A matrix
/// built from `n` columns of length `m` has `m` rows and `n` columns, and multiplies vectors of
/// length `n`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matrix {
    columns: Vec<Vector>,
}

impl Matrix {
    /// Creates a new [`Matrix`] from its columns.
    ///
    /// Fails if the columns are not all of the same length.
    pub fn from_columns(columns: Vec<Vector>) -> Result<Self> {
        if let Some(first) = columns.first() {
            if let Some(column) = columns.iter().find(|c| c.dim() != first.dim()) {
                return Err(Error::mismatch(first.dim(), column.dim()));
            }
        }
        Ok(Self { columns })
    }

    /// Creates a new [`Matrix`] from its rows.
    pub fn from_rows(rows: Vec<Vector>) -> Result<Self> {
        Self::from_columns(rows).map(|m| m.transpose())
    }

    /// The `n` by `n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let columns = (0..n)
            .map(|j| (0..n).map(|i| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self { columns }
    }

    /// Number of rows, the length of every column.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vector::dim)
    }

    /// Number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Vector] {
        &self.columns
    }

    /// Computes the rows from the columns.
    pub fn rows(&self) -> Vec<Vector> {
        (0..self.row_count())
            .map(|i| self.columns.iter().map(|c| c[i]).collect())
            .collect()
    }

    /// Returns the element at row `i` and column `j`, if it exists.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.columns.get(j).and_then(|c| c.get(i))
    }

    fn check_shape(&self, other: &Self) -> Result<()> {
        if self.column_count() != other.column_count() {
            return Err(Error::mismatch(self.column_count(), other.column_count()));
        }
        if self.row_count() != other.row_count() {
            return Err(Error::mismatch(self.row_count(), other.row_count()));
        }
        Ok(())
    }

    /// Element-wise sum.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.check_shape(other)?;
        let columns = self
            .columns
            .iter()
            .zip(&other.columns)
            .map(|(a, b)| a.try_add(b))
            .collect::<Result<_>>()?;
        Ok(Self { columns })
    }

    /// Element-wise difference.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.check_shape(other)?;
        let columns = self
            .columns
            .iter()
            .zip(&other.columns)
            .map(|(a, b)| a.try_sub(b))
            .collect::<Result<_>>()?;
        Ok(Self { columns })
    }

    /// Matrix-vector product, the dot product of every row with `vector`.
    ///
    /// Fails if the length of `vector` differs from the column count.
    pub fn mul_vector(&self, vector: &Vector) -> Result<Vector> {
        if vector.dim() != self.column_count() {
            return Err(Error::mismatch(self.column_count(), vector.dim()));
        }

        let mut result = Vector::zeros(self.row_count());
        for (column, &v) in self.columns.iter().zip(vector.iter()) {
            result.try_add_assign(&column.scale(v))?;
        }
        Ok(result)
    }

    /// Matrix-matrix product `self * other`.
    ///
    /// Applied to a column vector, the result applies `other` first, then `self`.
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        if self.column_count() != other.row_count() {
            return Err(Error::mismatch(self.column_count(), other.row_count()));
        }
        let columns = other
            .columns
            .iter()
            .map(|c| self.mul_vector(c))
            .collect::<Result<_>>()?;
        Ok(Self { columns })
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Self {
        Self {
            columns: self.rows(),
        }
    }

    /// Multiplies every element by `scalar`.
    pub fn scale(&self, scalar: f64) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.scale(scalar)).collect(),
        }
    }
}

macro_rules! rotation {
    ($(#[$doc: meta])* $name: ident, |$c: ident, $s: ident| [$($col: expr),*]) => {
        $(#[$doc])*
        pub fn $name(angle: f64) -> Self {
            let ($s, $c) = angle.sin_cos();
            Self {
                columns: vec![$(Vector::from($col)),*],
            }
        }
    };
}

impl Matrix {
    rotation!(
        /// Rotation of `angle` radians about the x axis.
        rotation_x,
        |c, s| [[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]]
    );

    rotation!(
        /// Rotation of `angle` radians about the y axis.
        rotation_y,
        |c, s| [[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]]
    );

    rotation!(
        /// Rotation of `angle` radians about the z axis.
        rotation_z,
        |c, s| [[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]]
    );
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl From<glam::DMat3> for Matrix {
    #[inline]
    fn from(matrix: glam::DMat3) -> Self {
        Self {
            columns: matrix
                .to_cols_array_2d()
                .into_iter()
                .map(Vector::from)
                .collect(),
        }
    }
}

impl TryFrom<&Matrix> for glam::DMat3 {
    type Error = Error;

    fn try_from(matrix: &Matrix) -> Result<Self> {
        if matrix.column_count() != 3 {
            return Err(Error::mismatch(3, matrix.column_count()));
        }
        let [x, y, z] = [0, 1, 2].map(|j| glam::DVec3::try_from(&matrix.columns[j]));
        Ok(glam::DMat3::from_cols(x?, y?, z?))
    }
}
