/// An error type for the image module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images are expected to share a size.
    #[error("Image size mismatch: ({0}, {1}) != ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the image has zero width or height.
    #[error("Image is empty: {0}")]
    EmptyImage(crate::ImageSize),

    /// Error when a pixel coordinate falls outside the image.
    #[error("Pixel ({x}, {y}) is out of bounds for image of size {width}x{height}")]
    PixelOutOfBounds {
        /// Column of the requested pixel.
        x: usize,
        /// Row of the requested pixel.
        y: usize,
        /// Width of the image.
        width: usize,
        /// Height of the image.
        height: usize,
    },

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds for an image with {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a region of interest is empty or exceeds the image.
    #[error("Invalid region of interest {0:?} for image of size {1}")]
    InvalidRoi(crate::Rect, crate::ImageSize),

    /// Error when a filter kernel cannot be built from the given sigma.
    #[error("Invalid kernel sigma {0}, must be finite and positive")]
    InvalidKernelSigma(f32),

    /// Error when casting the pixel data fails.
    #[error("Failed to cast image data")]
    CastError,
}
