use carve_image::{ImageSize, Point2};
use glam::{Vec2, Vec3, Vec4};

use crate::camera::CameraIntrinsics;
use crate::depth::{DepthMap, DepthUnit};
use crate::error::ProjectionError;

/// A point in camera space.
pub type Point3 = Vec3;

/// Lift a 3D point to homogeneous coordinates with `w = 1`.
pub fn to_homogeneous(p: Point3) -> Vec4 {
    p.extend(1.0)
}

fn check_pixel(pixel: Point2, size: ImageSize) -> Result<(), ProjectionError> {
    if !pixel.is_inside(size) {
        return Err(ProjectionError::PixelOutOfBounds {
            x: pixel.x,
            y: pixel.y,
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

/// Map a pixel of the color image into the coordinates of the depth map.
///
/// Each axis is scaled by `depth_size / image_size` and truncated.
///
/// # Errors
///
/// Returns [`ProjectionError::PixelOutOfBounds`] if the pixel lies outside the color image,
/// and [`ProjectionError::EmptyResolution`] if the depth map has a zero dimension.
///
/// # Example
///
/// ```
/// use carve_image::{ImageSize, Point2};
/// use carve_3d::projection::scale_pixel_to_depth;
///
/// let p = scale_pixel_to_depth(
///     Point2::new(1919, 720),
///     ImageSize { width: 1920, height: 1440 },
///     ImageSize { width: 256, height: 192 },
/// )
/// .unwrap();
/// assert_eq!(p, Point2::new(255, 96));
/// ```
pub fn scale_pixel_to_depth(
    pixel: Point2,
    image_size: ImageSize,
    depth_size: ImageSize,
) -> Result<Point2, ProjectionError> {
    check_pixel(pixel, image_size)?;
    if depth_size.is_empty() {
        return Err(ProjectionError::EmptyResolution(depth_size));
    }
    Ok(Point2::new(
        pixel.x * depth_size.width / image_size.width,
        pixel.y * depth_size.height / image_size.height,
    ))
}

/// Lift a depth map pixel to a 3D point in camera space.
///
/// The intrinsics are first rescaled from their reference resolution to `depth_size`, then
///
/// ```text
/// x = (u - cx) * z / fx
/// y = (v - cy) * z / fy
/// z = depth
/// ```
///
/// # Arguments
///
/// * `pixel` - The pixel in depth map coordinates.
/// * `depth` - The depth at that pixel, in the unit the caller wants for the result.
/// * `intrinsics` - The camera intrinsics at their reference resolution.
/// * `depth_size` - The resolution of the depth map.
///
/// # Errors
///
/// * [`ProjectionError::PixelOutOfBounds`] if the pixel lies outside `depth_size`.
/// * [`ProjectionError::InvalidDepth`] if the depth is not finite and positive.
///
/// # Example
///
/// ```
/// use carve_image::{ImageSize, Point2};
/// use carve_3d::camera::CameraIntrinsics;
/// use carve_3d::projection::unproject;
///
/// let size = ImageSize { width: 640, height: 480 };
/// let k = CameraIntrinsics::new((500.0, 500.0), (320.0, 240.0), size);
///
/// let p = unproject(Point2::new(320, 240), 2.0, &k, size).unwrap();
/// assert_eq!(p.to_array(), [0.0, 0.0, 2.0]);
/// ```
pub fn unproject(
    pixel: Point2,
    depth: f32,
    intrinsics: &CameraIntrinsics,
    depth_size: ImageSize,
) -> Result<Point3, ProjectionError> {
    check_pixel(pixel, depth_size)?;
    if !depth.is_finite() || depth <= 0.0 {
        return Err(ProjectionError::InvalidDepth(depth));
    }

    let k = intrinsics.rescaled(depth_size)?;
    let (fx, fy) = k.focal_length;
    let (cx, cy) = k.principal_point;

    Ok(Vec3::new(
        (pixel.x as f32 - cx) * depth / fx,
        (pixel.y as f32 - cy) * depth / fy,
        depth,
    ))
}

/// Lift a depth map pixel to 3D, reading the depth from the map.
///
/// The sample is read at `pixel` using the depth map's own stride and multiplied by
/// `unit.scale()` before the projection.
///
/// # Errors
///
/// Same conditions as [`unproject`]; a zero depth (no return) is an invalid depth.
pub fn unproject_from_depth_map(
    pixel: Point2,
    depth_map: &DepthMap,
    intrinsics: &CameraIntrinsics,
    unit: DepthUnit,
) -> Result<Point3, ProjectionError> {
    let depth = depth_map.depth_at(pixel)? * unit.scale();
    unproject(pixel, depth, intrinsics, depth_map.size())
}

/// Project a 3D point in camera space onto the depth map plane.
///
/// This is the inverse of [`unproject`] for the same intrinsics and resolution.
///
/// # Errors
///
/// Returns [`ProjectionError::InvalidDepth`] if the point is not in front of the camera.
pub fn project(
    point: Point3,
    intrinsics: &CameraIntrinsics,
    depth_size: ImageSize,
) -> Result<Vec2, ProjectionError> {
    if !point.z.is_finite() || point.z <= 0.0 {
        return Err(ProjectionError::InvalidDepth(point.z));
    }

    let k = intrinsics.rescaled(depth_size)?;
    let (fx, fy) = k.focal_length;
    let (cx, cy) = k.principal_point;

    Ok(Vec2::new(
        fx * point.x / point.z + cx,
        fy * point.y / point.z + cy,
    ))
}
