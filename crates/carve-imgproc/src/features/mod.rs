//! Locating 2D features in intensity and color images.

mod brightest;
pub use brightest::*;

mod shadow;
pub use shadow::*;

use carve_image::{ImageError, ImageSize};

/// Errors raised while extracting image features.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// The underlying image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// No pixel is brighter than zero, so there is no region to locate.
    #[error("Image of size {0} has no pixel above zero intensity")]
    NoSignal(ImageSize),

    /// A coordinate in a blurred image does not map back into the source image.
    #[error("Point ({x}, {y}) lies outside the {margin}px blur margin of source {size}")]
    OutsideSource {
        /// Column in the blurred image.
        x: usize,
        /// Row in the blurred image.
        y: usize,
        /// Margin added on each side by the blur.
        margin: usize,
        /// Size of the unblurred source image.
        size: ImageSize,
    },
}
