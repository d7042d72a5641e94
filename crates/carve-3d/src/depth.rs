use carve_image::{Image, ImageError, ImageSize, Point2};
use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// Factor converting a depth in meters to millimeters.
pub const METERS_TO_MILLIMETERS: f32 = 1000.0;

/// The unit of the `z` coordinate produced by the inverse projection.
///
/// Depth maps always store meters; the unit is applied when a sample is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthUnit {
    /// Keep the sensor unit.
    Meters,
    /// Scale by [`METERS_TO_MILLIMETERS`].
    #[default]
    Millimeters,
}

impl DepthUnit {
    /// The factor applied to a depth in meters.
    pub fn scale(self) -> f32 {
        match self {
            DepthUnit::Meters => 1.0,
            DepthUnit::Millimeters => METERS_TO_MILLIMETERS,
        }
    }
}

/// A depth map holding one distance in meters per pixel.
///
/// The depth map carries its own resolution, which usually differs from the color image
/// captured in the same frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap(pub Image<f32, 1>);

impl DepthMap {
    /// Create a depth map from samples in meters, stored row-major.
    pub fn new(size: ImageSize, data: Vec<f32>) -> Result<Self, ProjectionError> {
        Ok(Self(Image::new(size, data)?))
    }

    /// Create a depth map from raw IEEE half precision samples in meters.
    ///
    /// # Example
    ///
    /// ```
    /// use carve_image::ImageSize;
    /// use carve_3d::depth::DepthMap;
    ///
    /// // 0x3C00 is 1.0 and 0x4000 is 2.0 in half precision
    /// let depth = DepthMap::from_f16_bits(ImageSize { width: 2, height: 1 }, &[0x3C00, 0x4000]).unwrap();
    /// assert_eq!(depth.as_slice(), &[1.0, 2.0]);
    /// ```
    pub fn from_f16_bits(size: ImageSize, bits: &[u16]) -> Result<Self, ProjectionError> {
        let data = bits
            .iter()
            .map(|&b| f16::from_bits(b).to_f32())
            .collect::<Vec<_>>();
        Self::new(size, data)
    }

    /// The resolution of the depth map.
    pub fn size(&self) -> ImageSize {
        self.0.size()
    }

    /// The depth samples in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice()
    }

    /// Read the depth in meters at a pixel of the depth map.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::PixelOutOfBounds`] if the pixel lies outside the map.
    pub fn depth_at(&self, p: Point2) -> Result<f32, ProjectionError> {
        self.0.get(p.x, p.y, 0).copied().map_err(|e| match e {
            ImageError::PixelOutOfBounds {
                x,
                y,
                width,
                height,
            } => ProjectionError::PixelOutOfBounds {
                x,
                y,
                width,
                height,
            },
            other => ProjectionError::Image(other),
        })
    }
}
