#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// pixel coordinates and regions of interest.
pub mod geometry;

pub use crate::error::ImageError;
pub use crate::geometry::{Point2, Rect};
pub use crate::image::{Image, ImageSize};
