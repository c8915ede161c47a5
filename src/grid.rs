use crate::{
    algebra::Vector,
    error::{Error, Result},
};

/// Maximum number of axes a [`Grid`] supports.
pub const MAX_AXES: usize = 3;

/// Bucket coordinate in a [`Grid`].
///
/// Axes beyond the dimensionality of the grid are always zero, so a 2D zone is `[x, y, 0]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Zone(pub [usize; MAX_AXES]);

impl Zone {
    /// Creates a zone from up to three bucket indices, missing axes being zero.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_AXES`] indices are given.
    #[inline]
    pub fn new(coordinates: &[usize]) -> Self {
        assert!(
            coordinates.len() <= MAX_AXES,
            "a zone has at most {MAX_AXES} coordinates, got {}",
            coordinates.len()
        );
        let mut zone = [0; MAX_AXES];
        zone[..coordinates.len()].copy_from_slice(coordinates);
        Self(zone)
    }
}

/// Uniform bucket grid over an axis-aligned domain.
///
/// Each bucket holds the indices of the particles currently inside its spatial extent. Indices
/// refer to the particle storage of the owner of the grid; the grid never dereferences them.
///
/// ```
/// # use carom::grid::{Grid, Zone};
/// # use carom::algebra::Vector;
/// let mut grid = Grid::covering(&[100.0, 50.0], &[10.0, 10.0]).unwrap();
/// assert_eq!(grid.counts(), &[10, 5]);
///
/// let zone = grid.zone_for(&Vector::from([25.0, 49.0]));
/// assert_eq!(zone, Zone::new(&[2, 4]));
///
/// grid.insert(7, zone);
/// assert!(grid.neighbors(Zone::new(&[3, 3])).any(|id| id == 7));
/// ```
#[derive(Clone, Debug)]
pub struct Grid {
    dims: usize,
    cell_size: [f64; MAX_AXES],
    counts: [usize; MAX_AXES],
    buckets: Vec<Vec<usize>>,
}

impl Grid {
    /// Creates a new empty [`Grid`] with the given cell size and bucket count per axis.
    pub fn new(cell_size: &[f64], counts: &[usize]) -> Result<Self> {
        let dims = cell_size.len();
        if !(2..=MAX_AXES).contains(&dims) {
            return Err(Error::UnsupportedDimension(dims));
        }
        if counts.len() != dims {
            return Err(Error::mismatch(dims, counts.len()));
        }
        if cell_size.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
            return Err(Error::config("cell sizes must be positive and finite"));
        }
        if counts.contains(&0) {
            return Err(Error::config("every axis needs at least one bucket"));
        }

        let mut grid_cell_size = [1.0; MAX_AXES];
        let mut grid_counts = [1; MAX_AXES];
        grid_cell_size[..dims].copy_from_slice(cell_size);
        grid_counts[..dims].copy_from_slice(counts);

        let len = grid_counts
            .iter()
            .try_fold(1_usize, |len, &count| len.checked_mul(count))
            .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<Vec<usize>>())
            .ok_or_else(|| Error::config(format!("too many buckets for counts {counts:?}")))?;

        Ok(Self {
            dims,
            cell_size: grid_cell_size,
            counts: grid_counts,
            buckets: vec![Vec::new(); len],
        })
    }

    /// Creates a new empty [`Grid`] with enough buckets of the given size to cover a domain
    /// spanning `[0, extent)` on every axis.
    pub fn covering(extents: &[f64], cell_size: &[f64]) -> Result<Self> {
        if extents.len() != cell_size.len() {
            return Err(Error::mismatch(cell_size.len(), extents.len()));
        }
        if extents.iter().any(|&e| !(e.is_finite() && e > 0.0)) {
            return Err(Error::config("extents must be positive and finite"));
        }

        let counts = extents
            .iter()
            .zip(cell_size)
            .map(|(e, s)| ((e / s).ceil() as usize).max(1))
            .collect::<Vec<_>>();

        Self::new(cell_size, &counts)
    }

    /// Number of axes of the grid.
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Bucket count per axis.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts[..self.dims]
    }

    /// Bucket size per axis.
    #[inline]
    pub fn cell_size(&self) -> &[f64] {
        &self.cell_size[..self.dims]
    }

    #[inline]
    fn raw_zone(&self, position: &Vector) -> [i64; MAX_AXES] {
        let mut raw = [0; MAX_AXES];
        for (axis, r) in raw.iter_mut().enumerate().take(self.dims) {
            *r = (position.get(axis).unwrap_or_default() / self.cell_size[axis]).floor() as i64;
        }
        raw
    }

    #[inline]
    fn in_range(&self, raw: &[i64; MAX_AXES]) -> bool {
        raw.iter()
            .zip(&self.counts)
            .all(|(&r, &count)| r >= 0 && (r as usize) < count)
    }

    #[inline]
    fn clip(&self, raw: [i64; MAX_AXES]) -> Zone {
        let mut zone = [0; MAX_AXES];
        for axis in 0..MAX_AXES {
            zone[axis] = raw[axis].clamp(0, self.counts[axis] as i64 - 1) as usize;
        }
        Zone(zone)
    }

    /// Bucket containing `position`, `floor(position / cell_size)` on every axis.
    ///
    /// A position outside of the grid is a broken caller contract: it panics in debug builds and
    /// is clipped to the nearest bucket in release builds.
    #[inline]
    pub fn zone_for(&self, position: &Vector) -> Zone {
        debug_assert_eq!(position.dim(), self.dims);

        let raw = self.raw_zone(position);
        let in_range = self.in_range(&raw);
        debug_assert!(
            in_range,
            "position {position} maps to zone {raw:?} outside of {:?}",
            self.counts()
        );
        if !in_range {
            log::warn!("clipping out of range zone {raw:?} for position {position}");
        }
        self.clip(raw)
    }

    /// Bucket containing `position`, or an error if it falls outside of the grid.
    pub fn try_zone_for(&self, position: &Vector) -> Result<Zone> {
        if position.dim() != self.dims {
            return Err(Error::mismatch(self.dims, position.dim()));
        }

        let raw = self.raw_zone(position);
        if self.in_range(&raw) {
            Ok(self.clip(raw))
        } else {
            Err(Error::ZoneOutOfRange {
                zone: raw[..self.dims].to_vec(),
                counts: self.counts().to_vec(),
            })
        }
    }

    /// Bucket nearest to `position`, clipping it into the grid silently.
    #[inline]
    pub fn nearest_zone(&self, position: &Vector) -> Zone {
        self.clip(self.raw_zone(position))
    }

    /// Flat bucket index of `zone`.
    ///
    /// A zone outside of the grid is a broken caller contract: it panics in debug builds and is
    /// clipped to the nearest bucket in release builds.
    #[inline]
    fn index(&self, zone: Zone) -> usize {
        let in_range = zone.0.iter().zip(&self.counts).all(|(&z, &c)| z < c);
        debug_assert!(
            in_range,
            "zone {:?} outside of {:?}",
            zone.0,
            self.counts()
        );

        let [x, y, z] = if in_range {
            zone.0
        } else {
            log::warn!("clipping out of range zone {:?}", zone.0);
            std::array::from_fn(|axis| zone.0[axis].min(self.counts[axis] - 1))
        };
        x + self.counts[0] * (y + self.counts[1] * z)
    }

    /// Indices stored in the bucket at `zone`.
    #[inline]
    pub fn bucket(&self, zone: Zone) -> &[usize] {
        &self.buckets[self.index(zone)]
    }

    /// Adds `id` to the bucket at `zone`.
    #[inline]
    pub fn insert(&mut self, id: usize, zone: Zone) {
        let index = self.index(zone);
        self.buckets[index].push(id);
    }

    /// Removes `id` from the bucket at `zone`, returning whether it was there.
    ///
    /// Removing an absent index does nothing.
    #[inline]
    pub fn remove(&mut self, id: usize, zone: Zone) -> bool {
        let index = self.index(zone);
        let bucket = &mut self.buckets[index];
        match bucket.iter().position(|&i| i == id) {
            Some(i) => {
                bucket.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Moves `id` from the bucket at `from` to the bucket at `to`.
    #[inline]
    pub fn relocate(&mut self, id: usize, from: Zone, to: Zone) {
        if from != to {
            self.remove(id, from);
            self.insert(id, to);
        }
    }

    /// Returns whether the bucket at `zone` holds `id`.
    #[inline]
    pub fn contains(&self, id: usize, zone: Zone) -> bool {
        self.bucket(zone).contains(&id)
    }

    /// Zones of the 3x3 (2D) or 3x3x3 (3D) block centered on `zone`, skipping the ones outside
    /// of the grid.
    pub fn neighbor_zones(&self, zone: Zone) -> impl Iterator<Item = Zone> {
        let [rx, ry, rz] = std::array::from_fn::<_, MAX_AXES, _>(|axis| {
            zone.0[axis].saturating_sub(1)..=(zone.0[axis] + 1).min(self.counts[axis] - 1)
        });

        rx.flat_map(move |x| {
            let rz = rz.clone();
            ry.clone()
                .flat_map(move |y| rz.clone().map(move |z| Zone([x, y, z])))
        })
    }

    /// Indices stored in the block of buckets centered on `zone`.
    #[inline]
    pub fn neighbors(&self, zone: Zone) -> impl Iterator<Item = usize> + '_ {
        self.neighbor_zones(zone)
            .flat_map(move |z| self.bucket(z).iter().copied())
    }

    /// Total number of stored indices.
    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Returns whether no bucket holds any index.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Empties every bucket.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
    }
}
