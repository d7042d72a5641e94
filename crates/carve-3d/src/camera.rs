use carve_image::ImageSize;
use glam::{Mat3, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// The intrinsic parameters of a pinhole camera.
///
/// The values are expressed in pixels of `reference_size`, the resolution the camera was
/// calibrated against. Before they are used against a buffer of another resolution (typically
/// the depth map) they must be rescaled with [`CameraIntrinsics::rescaled`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// The focal length in pixels (fx, fy)
    pub focal_length: (f32, f32),
    /// The principal point in pixels (cx, cy)
    pub principal_point: (f32, f32),
    /// The skew coefficient, close to zero for most sensors.
    pub skew: f32,
    /// The resolution the intrinsics were calibrated against.
    pub reference_size: ImageSize,
}

impl CameraIntrinsics {
    /// Creates new intrinsics with zero skew.
    pub fn new(
        focal_length: (f32, f32),
        principal_point: (f32, f32),
        reference_size: ImageSize,
    ) -> Self {
        Self {
            focal_length,
            principal_point,
            skew: 0.0,
            reference_size,
        }
    }

    /// Creates intrinsics from a column-major 3x3 camera matrix.
    ///
    /// The matrix layout is `[[fx, 0, 0], [s, fy, 0], [cx, cy, 1]]` when read column by column,
    /// which is how capture frameworks usually hand it over.
    pub fn from_matrix(k: Mat3, reference_size: ImageSize) -> Self {
        Self {
            focal_length: (k.x_axis.x, k.y_axis.y),
            principal_point: (k.z_axis.x, k.z_axis.y),
            skew: k.y_axis.x,
            reference_size,
        }
    }

    /// Returns the camera matrix.
    pub fn camera_matrix(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.focal_length.0, 0.0, 0.0),
            Vec3::new(self.skew, self.focal_length.1, 0.0),
            Vec3::new(self.principal_point.0, self.principal_point.1, 1.0),
        )
    }

    /// The ratio between the reference resolution and `target`, per axis.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::EmptyResolution`] if `target` has a zero dimension.
    pub fn scale_factors(&self, target: ImageSize) -> Result<Vec2, ProjectionError> {
        if target.is_empty() {
            return Err(ProjectionError::EmptyResolution(target));
        }
        Ok(Vec2::new(
            self.reference_size.width as f32 / target.width as f32,
            self.reference_size.height as f32 / target.height as f32,
        ))
    }

    /// Express the intrinsics in pixels of another resolution.
    ///
    /// Every parameter is divided by the scale factor of its axis, so that
    /// `rescaled(reference_size)` is the identity.
    ///
    /// # Example
    ///
    /// ```
    /// use carve_image::ImageSize;
    /// use carve_3d::camera::CameraIntrinsics;
    ///
    /// let k = CameraIntrinsics::new(
    ///     (1600.0, 1600.0),
    ///     (960.0, 720.0),
    ///     ImageSize { width: 1920, height: 1440 },
    /// );
    /// let depth_k = k.rescaled(ImageSize { width: 256, height: 192 }).unwrap();
    /// assert_eq!(depth_k.principal_point, (128.0, 96.0));
    /// assert_eq!(depth_k.reference_size.width, 256);
    /// ```
    pub fn rescaled(&self, target: ImageSize) -> Result<Self, ProjectionError> {
        let scale = self.scale_factors(target)?;
        Ok(Self {
            focal_length: (self.focal_length.0 / scale.x, self.focal_length.1 / scale.y),
            principal_point: (
                self.principal_point.0 / scale.x,
                self.principal_point.1 / scale.y,
            ),
            skew: self.skew / scale.x,
            reference_size: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const REFERENCE: ImageSize = ImageSize {
        width: 640,
        height: 480,
    };

    #[test]
    fn test_matrix_round_trip() {
        let k = CameraIntrinsics::new((500.0, 510.0), (320.0, 240.0), REFERENCE);
        let m = k.camera_matrix();
        assert_eq!(m.z_axis, Vec3::new(320.0, 240.0, 1.0));
        assert_eq!(CameraIntrinsics::from_matrix(m, REFERENCE), k);
    }

    #[test]
    fn test_rescale() -> Result<(), ProjectionError> {
        let k = CameraIntrinsics::new((500.0, 500.0), (320.0, 240.0), REFERENCE);
        assert_eq!(k.rescaled(REFERENCE)?, k);

        let half = k.rescaled(ImageSize {
            width: 320,
            height: 120,
        })?;
        assert_relative_eq!(half.focal_length.0, 250.0);
        assert_relative_eq!(half.focal_length.1, 125.0);
        assert_relative_eq!(half.principal_point.0, 160.0);
        assert_relative_eq!(half.principal_point.1, 60.0);
        Ok(())
    }

    #[test]
    fn test_rescale_empty_target() {
        let k = CameraIntrinsics::new((500.0, 500.0), (320.0, 240.0), REFERENCE);
        let empty = ImageSize {
            width: 0,
            height: 10,
        };
        assert_eq!(
            k.rescaled(empty),
            Err(ProjectionError::EmptyResolution(empty))
        );
    }
}
