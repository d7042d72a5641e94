use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::ray::{intersect_with_policy, Aabb, Ray, SlabPolicy};

/// The number of voxels along each axis of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    /// Number of voxels along x.
    pub width: usize,
    /// Number of voxels along y.
    pub height: usize,
    /// Number of voxels along z.
    pub depth: usize,
}

impl GridDims {
    /// Create new grid dimensions.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// The total number of voxels, or `None` if it overflows `usize`.
    pub fn volume(&self) -> Option<usize> {
        self.width.checked_mul(self.height)?.checked_mul(self.depth)
    }

    /// The number of voxels of a grid that can be allocated with these dimensions.
    ///
    /// # Errors
    ///
    /// * [`GridError::ZeroDimension`] if any axis has zero voxels.
    /// * [`GridError::GridTooLarge`] if the voxel count exceeds `isize::MAX`.
    pub fn checked_volume(&self) -> Result<usize, GridError> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(GridError::ZeroDimension(*self));
        }
        self.volume()
            .filter(|&v| v <= isize::MAX as usize)
            .ok_or(GridError::GridTooLarge(*self))
    }

    /// Check if the voxel coordinate lies inside the grid.
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.width && y < self.height && z < self.depth
    }

    fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        x * (self.height * self.depth) + y * self.depth + z
    }

    fn coords(&self, index: usize) -> [usize; 3] {
        let plane = self.height * self.depth;
        [index / plane, (index % plane) / self.depth, index % self.depth]
    }
}

/// Maps world coordinates onto the voxels of a grid.
///
/// Voxel `(x, y, z)` covers the cube `origin + [x, y, z] * voxel_size` to
/// `origin + [x + 1, y + 1, z + 1] * voxel_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelMapping {
    /// World position of the minimum corner of voxel (0, 0, 0).
    pub origin: DVec3,
    /// Edge length of a voxel in world units.
    pub voxel_size: f64,
}

impl VoxelMapping {
    /// Create a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidVoxelSize`] if the voxel size is not finite and positive.
    pub fn new(origin: DVec3, voxel_size: f64) -> Result<Self, GridError> {
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(GridError::InvalidVoxelSize(voxel_size));
        }
        Ok(Self { origin, voxel_size })
    }

    /// The voxel containing a world point, if it falls inside a grid of `dims`.
    pub fn voxel_index(&self, world: DVec3, dims: GridDims) -> Option<[usize; 3]> {
        let v = ((world - self.origin) / self.voxel_size).floor();
        if !v.is_finite() || v.cmplt(DVec3::ZERO).any() {
            return None;
        }
        let (x, y, z) = (v.x as usize, v.y as usize, v.z as usize);
        dims.contains(x, y, z).then_some([x, y, z])
    }

    /// The world space box covered by a voxel.
    pub fn voxel_bounds(&self, x: usize, y: usize, z: usize) -> Aabb {
        let min = self.origin + DVec3::new(x as f64, y as f64, z as f64) * self.voxel_size;
        Aabb {
            min,
            max: min + DVec3::splat(self.voxel_size),
        }
    }

    /// The world space box covered by a whole grid.
    pub fn grid_bounds(&self, dims: GridDims) -> Aabb {
        let extent = DVec3::new(dims.width as f64, dims.height as f64, dims.depth as f64);
        Aabb {
            min: self.origin,
            max: self.origin + extent * self.voxel_size,
        }
    }
}

/// A dense 3D grid of occupied or empty voxels.
///
/// The dimensions are fixed at construction. Voxels can only go from empty to occupied,
/// so evidence accumulated within one carving pass is never lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    dims: GridDims,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Create a grid with every voxel empty.
    ///
    /// # Errors
    ///
    /// * [`GridError::ZeroDimension`] if any axis has zero voxels.
    /// * [`GridError::GridTooLarge`] if the voxel count overflows.
    pub fn new(dims: GridDims) -> Result<Self, GridError> {
        let volume = dims.checked_volume()?;
        Ok(Self {
            dims,
            cells: vec![false; volume],
        })
    }

    /// Create a grid from flat cells in `x * (height * depth) + y * depth + z` order.
    ///
    /// # Errors
    ///
    /// * [`GridError::ZeroDimension`] if any axis has zero voxels.
    /// * [`GridError::GridTooLarge`] if the voxel count overflows.
    /// * [`GridError::InvalidCellCount`] if the cell count does not match the dimensions.
    pub fn from_cells(dims: GridDims, cells: &[bool]) -> Result<Self, GridError> {
        let volume = dims.checked_volume()?;
        if cells.len() != volume {
            return Err(GridError::InvalidCellCount(cells.len(), volume));
        }
        Ok(Self {
            dims,
            cells: cells.to_vec(),
        })
    }

    /// Create a grid from a nested volume indexed as `volume[x][y][z]`.
    ///
    /// The grid has the dimensions of the volume and a voxel is occupied when its cell is
    /// marked present.
    ///
    /// # Errors
    ///
    /// * [`GridError::ZeroDimension`] if the volume is empty along any axis.
    /// * [`GridError::RaggedVolume`] if the planes or rows have different lengths.
    ///
    /// # Example
    ///
    /// ```
    /// use carve_3d::occupancy::OccupancyGrid;
    ///
    /// let volume = vec![
    ///     vec![vec![true, false], vec![false, false]],
    ///     vec![vec![false, false], vec![false, true]],
    /// ];
    /// let grid = OccupancyGrid::from_point_cloud(&volume).unwrap();
    /// assert_eq!(grid.count_occupied(), 2);
    /// assert!(grid.is_occupied(1, 1, 1).unwrap());
    /// ```
    pub fn from_point_cloud(volume: &[Vec<Vec<bool>>]) -> Result<Self, GridError> {
        let width = volume.len();
        let height = volume.first().map_or(0, |plane| plane.len());
        let depth = volume
            .first()
            .and_then(|plane| plane.first())
            .map_or(0, |row| row.len());
        let dims = GridDims::new(width, height, depth);

        let mut cells = Vec::with_capacity(dims.checked_volume()?);
        for plane in volume {
            if plane.len() != height {
                return Err(GridError::RaggedVolume);
            }
            for row in plane {
                if row.len() != depth {
                    return Err(GridError::RaggedVolume);
                }
                cells.extend_from_slice(row);
            }
        }

        Ok(Self { dims, cells })
    }

    /// The dimensions of the grid.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// The voxels in linear index order.
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    fn check_voxel(&self, x: usize, y: usize, z: usize) -> Result<usize, GridError> {
        if !self.dims.contains(x, y, z) {
            return Err(GridError::VoxelOutOfBounds {
                x,
                y,
                z,
                dims: self.dims,
            });
        }
        Ok(self.dims.linear_index(x, y, z))
    }

    /// Mark a voxel as occupied.
    ///
    /// Returns `true` if the voxel was empty before.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::VoxelOutOfBounds`] if the coordinate lies outside the grid.
    pub fn mark_occupied(&mut self, x: usize, y: usize, z: usize) -> Result<bool, GridError> {
        let idx = self.check_voxel(x, y, z)?;
        let newly = !self.cells[idx];
        self.cells[idx] = true;
        Ok(newly)
    }

    /// Check if a voxel is occupied.
    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> Result<bool, GridError> {
        let idx = self.check_voxel(x, y, z)?;
        Ok(self.cells[idx])
    }

    /// The number of occupied voxels.
    pub fn count_occupied(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Iterate over the coordinates of the occupied voxels in linear index order.
    pub fn occupied_voxels(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c)
            .map(|(i, _)| self.dims.coords(i))
    }

    /// Mark the voxel containing a world point.
    ///
    /// Returns `true` if the voxel was empty before.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::PointOutsideGrid`] if the point does not fall in any voxel.
    pub fn mark_point(&mut self, world: DVec3, mapping: &VoxelMapping) -> Result<bool, GridError> {
        let [x, y, z] = mapping
            .voxel_index(world, self.dims)
            .ok_or(GridError::PointOutsideGrid(world.to_array()))?;
        self.mark_occupied(x, y, z)
    }

    /// Mark every voxel crossed by a ray.
    ///
    /// A voxel is crossed when the slab test under `policy` reports a hit whose exit
    /// parameter is not negative.
    ///
    /// Returns the number of voxels that were empty before.
    pub fn mark_ray(&mut self, ray: &Ray, mapping: &VoxelMapping, policy: SlabPolicy) -> usize {
        let crosses = |bbox: &Aabb| {
            intersect_with_policy(ray, bbox, policy).is_some_and(|hit| hit.t_exit >= 0.0)
        };

        if policy == SlabPolicy::Symmetric && !crosses(&mapping.grid_bounds(self.dims)) {
            return 0;
        }

        let dims = self.dims;
        let mut marked = 0;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            let [x, y, z] = dims.coords(i);
            if crosses(&mapping.voxel_bounds(x, y, z)) && !*cell {
                *cell = true;
                marked += 1;
            }
        }

        log::debug!("ray {:?} marked {} new voxels", ray, marked);

        marked
    }

    /// The voxels occupied in both grids.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the grids have different dimensions.
    pub fn intersection(&self, other: &OccupancyGrid) -> Result<OccupancyGrid, GridError> {
        if self.dims != other.dims {
            return Err(GridError::DimensionMismatch(self.dims, other.dims));
        }
        Ok(Self {
            dims: self.dims,
            cells: self
                .cells
                .iter()
                .zip(&other.cells)
                .map(|(&a, &b)| a && b)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal_volume() -> Vec<Vec<Vec<bool>>> {
        (0..3)
            .map(|x| {
                (0..3)
                    .map(|y| (0..3).map(|z| x == y && y == z).collect())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_new_grid_is_empty() -> Result<(), GridError> {
        let grid = OccupancyGrid::new(GridDims::new(2, 3, 4))?;
        assert_eq!(grid.as_slice().len(), 24);
        assert_eq!(grid.count_occupied(), 0);
        assert_eq!(
            OccupancyGrid::new(GridDims::new(2, 0, 4)),
            Err(GridError::ZeroDimension(GridDims::new(2, 0, 4)))
        );
        Ok(())
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let dims = GridDims::new(usize::MAX, 2, 1);
        assert_eq!(dims.volume(), None);
        assert_eq!(
            OccupancyGrid::new(dims),
            Err(GridError::GridTooLarge(dims))
        );
        assert_eq!(
            OccupancyGrid::from_cells(dims, &[]),
            Err(GridError::GridTooLarge(dims))
        );

        // fits in usize but not in one allocation
        let dims = GridDims::new(usize::MAX, 1, 1);
        assert_eq!(dims.volume(), Some(usize::MAX));
        assert_eq!(dims.checked_volume(), Err(GridError::GridTooLarge(dims)));

        // a zero axis wins over an overflowing product
        let dims = GridDims::new(usize::MAX, usize::MAX, 0);
        assert_eq!(dims.checked_volume(), Err(GridError::ZeroDimension(dims)));
    }

    #[test]
    fn test_mark_occupied_is_monotone() -> Result<(), GridError> {
        let mut grid = OccupancyGrid::new(GridDims::new(2, 3, 4))?;
        assert!(grid.mark_occupied(1, 2, 3)?);
        assert!(!grid.mark_occupied(1, 2, 3)?);
        assert!(grid.is_occupied(1, 2, 3)?);
        assert!(grid.as_slice()[12 + 2 * 4 + 3]);
        assert_eq!(grid.count_occupied(), 1);

        assert_eq!(
            grid.mark_occupied(2, 0, 0),
            Err(GridError::VoxelOutOfBounds {
                x: 2,
                y: 0,
                z: 0,
                dims: GridDims::new(2, 3, 4)
            })
        );
        Ok(())
    }

    #[test]
    fn test_from_point_cloud_is_idempotent() -> Result<(), GridError> {
        let volume = diagonal_volume();
        let a = OccupancyGrid::from_point_cloud(&volume)?;
        let b = OccupancyGrid::from_point_cloud(&volume)?;
        assert_eq!(a, b);
        assert_eq!(a.dims(), GridDims::new(3, 3, 3));
        assert_eq!(
            a.occupied_voxels().collect::<Vec<_>>(),
            vec![[0, 0, 0], [1, 1, 1], [2, 2, 2]]
        );

        let flat = volume.concat().concat();
        assert_eq!(OccupancyGrid::from_cells(a.dims(), &flat)?, a);
        Ok(())
    }

    #[test]
    fn test_from_point_cloud_rejects_bad_volumes() {
        assert!(matches!(
            OccupancyGrid::from_point_cloud(&[]),
            Err(GridError::ZeroDimension(_))
        ));

        let mut ragged = diagonal_volume();
        ragged[2][1].pop();
        assert_eq!(
            OccupancyGrid::from_point_cloud(&ragged),
            Err(GridError::RaggedVolume)
        );

        assert_eq!(
            OccupancyGrid::from_cells(GridDims::new(2, 2, 2), &[true; 7]),
            Err(GridError::InvalidCellCount(7, 8))
        );
    }

    #[test]
    fn test_voxel_mapping() -> Result<(), GridError> {
        let mapping = VoxelMapping::new(DVec3::new(-1.0, -1.0, 0.0), 0.5)?;
        let dims = GridDims::new(4, 4, 4);
        assert_eq!(mapping.voxel_index(DVec3::new(-1.0, -1.0, 0.0), dims), Some([0, 0, 0]));
        assert_eq!(mapping.voxel_index(DVec3::new(0.9, 0.2, 1.25), dims), Some([3, 2, 2]));
        assert_eq!(mapping.voxel_index(DVec3::new(1.0, 0.0, 0.0), dims), None);
        assert_eq!(mapping.voxel_index(DVec3::new(0.0, 0.0, -0.1), dims), None);

        let bounds = mapping.voxel_bounds(1, 2, 3);
        assert_eq!(bounds.min, DVec3::new(-0.5, 0.0, 1.5));
        assert_eq!(bounds.max, DVec3::new(0.0, 0.5, 2.0));

        assert_eq!(
            VoxelMapping::new(DVec3::ZERO, 0.0),
            Err(GridError::InvalidVoxelSize(0.0))
        );
        Ok(())
    }

    #[test]
    fn test_mark_point() -> Result<(), GridError> {
        let mapping = VoxelMapping::new(DVec3::ZERO, 1.0)?;
        let mut grid = OccupancyGrid::new(GridDims::new(2, 2, 2))?;
        assert!(grid.mark_point(DVec3::new(1.5, 0.5, 1.0), &mapping)?);
        assert!(grid.is_occupied(1, 0, 1)?);
        assert_eq!(
            grid.mark_point(DVec3::new(2.5, 0.5, 0.5), &mapping),
            Err(GridError::PointOutsideGrid([2.5, 0.5, 0.5]))
        );
        Ok(())
    }

    #[test]
    fn test_mark_ray_along_row() -> Result<(), GridError> {
        let mapping = VoxelMapping::new(DVec3::ZERO, 1.0)?;
        let mut grid = OccupancyGrid::new(GridDims::new(4, 3, 3))?;

        let ray = Ray::new(DVec3::new(-2.0, 1.5, 1.5), DVec3::X).unwrap();
        assert_eq!(grid.mark_ray(&ray, &mapping, SlabPolicy::Symmetric), 4);
        assert_eq!(
            grid.occupied_voxels().collect::<Vec<_>>(),
            vec![[0, 1, 1], [1, 1, 1], [2, 1, 1], [3, 1, 1]]
        );

        // marking the same ray again adds nothing
        assert_eq!(grid.mark_ray(&ray, &mapping, SlabPolicy::Symmetric), 0);
        assert_eq!(grid.count_occupied(), 4);
        Ok(())
    }

    #[test]
    fn test_mark_ray_starting_inside() -> Result<(), GridError> {
        let mapping = VoxelMapping::new(DVec3::ZERO, 1.0)?;
        let mut grid = OccupancyGrid::new(GridDims::new(4, 3, 3))?;

        // voxels behind the origin are not crossed
        let ray = Ray::new(DVec3::new(2.5, 1.5, 1.5), DVec3::X).unwrap();
        assert_eq!(grid.mark_ray(&ray, &mapping, SlabPolicy::Symmetric), 2);
        assert!(!grid.is_occupied(1, 1, 1)?);

        // a ray pointing away from the grid marks nothing
        let away = Ray::new(DVec3::new(10.0, 10.0, 10.0), DVec3::ONE).unwrap();
        assert_eq!(grid.mark_ray(&away, &mapping, SlabPolicy::Symmetric), 0);
        Ok(())
    }

    #[test]
    fn test_mark_ray_skip_negative_marks_columns() -> Result<(), GridError> {
        let mapping = VoxelMapping::new(DVec3::ZERO, 1.0)?;
        let mut grid = OccupancyGrid::new(GridDims::new(3, 3, 3))?;

        // passes above the grid: y only reaches [0, 3] for t in [70, 100], x is done by t = 4
        let ray = Ray::new(DVec3::new(-1.0, 10.0, 1.5), DVec3::new(1.0, -0.1, 0.0)).unwrap();
        assert_eq!(grid.mark_ray(&ray, &mapping, SlabPolicy::Symmetric), 0);

        // the negative y component is not tested, so every voxel of the z = 1 slab is hit
        assert_eq!(grid.mark_ray(&ray, &mapping, SlabPolicy::SkipNegative), 9);
        let occupied = grid.occupied_voxels().collect::<Vec<_>>();
        assert_eq!(occupied.len(), 9);
        assert!(occupied.iter().all(|&[_, _, z]| z == 1));
        for y in 0..3 {
            assert!(grid.is_occupied(1, y, 1)?);
        }
        Ok(())
    }

    #[test]
    fn test_intersection() -> Result<(), GridError> {
        let dims = GridDims::new(2, 1, 1);
        let a = OccupancyGrid::from_cells(dims, &[true, true])?;
        let b = OccupancyGrid::from_cells(dims, &[false, true])?;
        let both = a.intersection(&b)?;
        assert_eq!(both.as_slice(), &[false, true]);

        let other = OccupancyGrid::new(GridDims::new(1, 2, 1))?;
        assert_eq!(
            a.intersection(&other),
            Err(GridError::DimensionMismatch(dims, GridDims::new(1, 2, 1)))
        );
        Ok(())
    }
}
