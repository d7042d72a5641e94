use carve_image::{ImageError, ImageSize};

use crate::occupancy::GridDims;

/// Errors raised while lifting pixels to 3D points.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The pixel lies outside the buffer it is meant to index.
    #[error("Pixel ({x}, {y}) is out of bounds for a {width}x{height} buffer")]
    PixelOutOfBounds {
        /// Column of the pixel.
        x: usize,
        /// Row of the pixel.
        y: usize,
        /// Width of the buffer.
        width: usize,
        /// Height of the buffer.
        height: usize,
    },

    /// The depth is not a finite positive distance.
    #[error("Invalid depth {0}, must be finite and positive")]
    InvalidDepth(f32),

    /// A resolution used to rescale intrinsics has a zero dimension.
    #[error("Resolution {0} has a zero dimension")]
    EmptyResolution(ImageSize),

    /// The underlying image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Errors raised by occupancy grids and carving sessions.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A grid needs at least one voxel along every axis.
    #[error("Grid dimensions {0:?} contain a zero axis")]
    ZeroDimension(GridDims),

    /// The voxel count does not fit in memory addressable by a single buffer.
    #[error("Grid dimensions {0:?} hold too many voxels")]
    GridTooLarge(GridDims),

    /// The voxel coordinate lies outside the grid.
    #[error("Voxel ({x}, {y}, {z}) is out of range for grid {dims:?}")]
    VoxelOutOfBounds {
        /// Voxel index along the width axis.
        x: usize,
        /// Voxel index along the height axis.
        y: usize,
        /// Voxel index along the depth axis.
        z: usize,
        /// Dimensions of the grid.
        dims: GridDims,
    },

    /// The number of cells does not match the grid dimensions.
    #[error("Got {0} cells for a grid of {1} voxels")]
    InvalidCellCount(usize, usize),

    /// A nested volume has rows or columns of different lengths.
    #[error("Volume is ragged, every plane and row must have the same length")]
    RaggedVolume,

    /// Two grids were combined with different dimensions.
    #[error("Grid dimensions differ: {0:?} != {1:?}")]
    DimensionMismatch(GridDims, GridDims),

    /// The voxel edge length is not a finite positive number.
    #[error("Invalid voxel size {0}, must be finite and positive")]
    InvalidVoxelSize(f64),

    /// A world point does not fall inside any voxel of the grid.
    #[error("Point {0:?} lies outside the grid volume")]
    PointOutsideGrid([f64; 3]),

    /// A view was started before the previous one ended.
    #[error("A view is already in progress")]
    ViewInProgress,

    /// Evidence was added without an open view.
    #[error("No view is in progress")]
    NoViewInProgress,
}
