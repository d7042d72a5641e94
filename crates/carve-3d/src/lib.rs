#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera intrinsics.
pub mod camera;

/// Multi-view space carving.
pub mod carving;

/// Depth maps and depth units.
pub mod depth;

/// Error types for the 3d module.
pub mod error;

/// Voxel occupancy grids.
pub mod occupancy;

/// Inverse and forward pinhole projection.
pub mod projection;

/// Rays, axis aligned boxes and the slab intersection test.
pub mod ray;

pub use crate::error::{GridError, ProjectionError};
