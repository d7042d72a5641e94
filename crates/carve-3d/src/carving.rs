use glam::DVec3;

use crate::error::GridError;
use crate::occupancy::{GridDims, OccupancyGrid, VoxelMapping};
use crate::ray::{Ray, SlabPolicy};

/// Accumulates occupancy evidence from many views into one consensus grid.
///
/// Each view marks its own grid while it is open; closing it intersects that grid with the
/// consensus, so a voxel survives only if every view saw it occupied. The session is the
/// only writer of its grids, so evidence extracted in parallel must be fed to it in turn.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use carve_3d::carving::CarvingSession;
/// use carve_3d::occupancy::{GridDims, VoxelMapping};
/// use carve_3d::ray::SlabPolicy;
///
/// let mapping = VoxelMapping::new(DVec3::ZERO, 1.0).unwrap();
/// let mut session =
///     CarvingSession::new(GridDims::new(2, 2, 2), mapping, SlabPolicy::Symmetric).unwrap();
///
/// session.begin_view().unwrap();
/// session.add_point(DVec3::new(0.5, 0.5, 0.5)).unwrap();
/// session.add_point(DVec3::new(1.5, 0.5, 0.5)).unwrap();
/// session.end_view().unwrap();
///
/// session.begin_view().unwrap();
/// session.add_point(DVec3::new(1.5, 0.5, 0.5)).unwrap();
/// assert_eq!(session.end_view().unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CarvingSession {
    dims: GridDims,
    mapping: VoxelMapping,
    policy: SlabPolicy,
    consensus: Option<OccupancyGrid>,
    current: Option<OccupancyGrid>,
    views: usize,
}

impl CarvingSession {
    /// Start a new carving pass.
    ///
    /// # Errors
    ///
    /// Fails with the errors of [`GridDims::checked_volume`].
    pub fn new(dims: GridDims, mapping: VoxelMapping, policy: SlabPolicy) -> Result<Self, GridError> {
        dims.checked_volume()?;
        Ok(Self {
            dims,
            mapping,
            policy,
            consensus: None,
            current: None,
            views: 0,
        })
    }

    /// The mapping between world coordinates and voxels.
    pub fn mapping(&self) -> &VoxelMapping {
        &self.mapping
    }

    /// Number of views closed so far.
    pub fn views_completed(&self) -> usize {
        self.views
    }

    /// Open a new view.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ViewInProgress`] if the previous view was not closed.
    pub fn begin_view(&mut self) -> Result<(), GridError> {
        if self.current.is_some() {
            return Err(GridError::ViewInProgress);
        }
        self.current = Some(OccupancyGrid::new(self.dims)?);
        Ok(())
    }

    fn current_mut(&mut self) -> Result<&mut OccupancyGrid, GridError> {
        self.current.as_mut().ok_or(GridError::NoViewInProgress)
    }

    /// Mark the voxel containing a world point in the open view.
    ///
    /// Returns `true` if the voxel was empty in this view.
    pub fn add_point(&mut self, world: DVec3) -> Result<bool, GridError> {
        let mapping = self.mapping;
        self.current_mut()?.mark_point(world, &mapping)
    }

    /// Mark every voxel crossed by a ray in the open view.
    ///
    /// Returns the number of voxels newly marked in this view.
    pub fn add_ray(&mut self, ray: &Ray) -> Result<usize, GridError> {
        let (mapping, policy) = (self.mapping, self.policy);
        Ok(self.current_mut()?.mark_ray(ray, &mapping, policy))
    }

    /// Close the open view and fold it into the consensus grid.
    ///
    /// The first view becomes the consensus, later views are intersected with it.
    ///
    /// Returns the number of occupied voxels left in the consensus.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NoViewInProgress`] if no view is open.
    pub fn end_view(&mut self) -> Result<usize, GridError> {
        let view = self.current.take().ok_or(GridError::NoViewInProgress)?;
        let consensus = match self.consensus.take() {
            Some(grid) => grid.intersection(&view)?,
            None => view,
        };
        let occupied = consensus.count_occupied();
        self.consensus = Some(consensus);
        self.views += 1;

        log::debug!(
            "view {} closed, {} voxels remain occupied",
            self.views,
            occupied
        );

        Ok(occupied)
    }

    /// The consensus grid, once at least one view was closed.
    pub fn consensus(&self) -> Option<&OccupancyGrid> {
        self.consensus.as_ref()
    }

    /// Finish the pass and return the consensus grid.
    ///
    /// A view still open is discarded. Without any closed view the grid is empty.
    pub fn into_grid(self) -> Result<OccupancyGrid, GridError> {
        match self.consensus {
            Some(grid) => Ok(grid),
            None => OccupancyGrid::new(self.dims),
        }
    }
}
