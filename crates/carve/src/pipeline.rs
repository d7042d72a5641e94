use carve_3d::camera::CameraIntrinsics;
use carve_3d::carving::CarvingSession;
use carve_3d::depth::DepthMap;
use carve_3d::occupancy::{GridDims, OccupancyGrid, VoxelMapping};
use carve_3d::projection::{scale_pixel_to_depth, unproject_from_depth_map, Point3};
use carve_3d::ray::Ray;
use carve_image::{Image, Point2};
use carve_imgproc::color::gray_from_rgb_u8;
use carve_imgproc::features::find_brightest_region_centroid;
use carve_imgproc::filter::{gaussian_blur_extended, remove_blur_margin};
use carve_imgproc::illumination::frame_illumination;
use glam::DAffine3;
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// The brightest point of a frame, in 2D and lifted to 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeaturePoint {
    /// The point in color image coordinates.
    pub pixel: Point2,
    /// The point in depth map coordinates.
    pub depth_pixel: Point2,
    /// The point in camera space.
    pub point: Point3,
}

/// One capture: a color image, its depth map and the camera that took them.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The RGBA color image.
    pub rgba: Image<u8, 4>,
    /// The depth map, usually at a lower resolution than the color image.
    pub depth: DepthMap,
    /// The camera intrinsics, calibrated against the color image.
    pub intrinsics: CameraIntrinsics,
    /// The camera pose, mapping camera space to world space.
    pub camera_to_world: DAffine3,
}

impl Frame {
    /// Create a frame with the camera at the world origin.
    pub fn new(rgba: Image<u8, 4>, depth: DepthMap, intrinsics: CameraIntrinsics) -> Self {
        Self {
            rgba,
            depth,
            intrinsics,
            camera_to_world: DAffine3::IDENTITY,
        }
    }

    /// Set the camera pose.
    pub fn with_pose(mut self, camera_to_world: DAffine3) -> Self {
        self.camera_to_world = camera_to_world;
        self
    }

    /// The world space ray from the camera centre through a camera space point.
    pub fn view_ray(&self, point: Point3) -> Option<Ray> {
        Ray::new(
            self.camera_to_world.translation,
            self.camera_to_world.transform_vector3(point.as_dvec3()),
        )
    }
}

/// Locate the brightest point of a color frame and lift it to 3D.
///
/// The image is converted to gray, blurred with an extended Gaussian, and the centroid of
/// its brightest region is mapped back to source pixels. That pixel is scaled into the
/// depth map, the depth read there and converted to `config.depth_unit`, and the point is
/// unprojected with the intrinsics rescaled to the depth resolution.
///
/// # Arguments
///
/// * `rgba` - The color image.
/// * `depth` - The depth map of the same capture, in meters.
/// * `intrinsics` - The camera intrinsics, calibrated against the color image.
/// * `config` - The pipeline parameters.
///
/// # Errors
///
/// Fails when the frame is empty or black, when the centroid falls in the blur margin, or
/// when the depth at the feature is missing.
pub fn locate_feature_point(
    rgba: &Image<u8, 4>,
    depth: &DepthMap,
    intrinsics: &CameraIntrinsics,
    config: &PipelineConfig,
) -> Result<FeaturePoint, PipelineError> {
    let gray = gray_from_rgb_u8(rgba)?;
    let blurred = gaussian_blur_extended(&gray, config.blur_sigma, config.blur_margin_px)?;
    let peak = find_brightest_region_centroid(&blurred)?;

    let pixel = remove_blur_margin(peak, config.blur_margin_px, rgba.size())?;
    let depth_pixel = scale_pixel_to_depth(pixel, rgba.size(), depth.size())?;
    let point = unproject_from_depth_map(depth_pixel, depth, intrinsics, config.depth_unit)?;

    log::debug!(
        "feature at {:?} (depth {:?}) lifted to {:?}",
        pixel,
        depth_pixel,
        point
    );

    Ok(FeaturePoint {
        pixel,
        depth_pixel,
        point,
    })
}

/// Locate the feature point of every frame in parallel.
///
/// Results are returned in input order; a failing frame does not affect the others.
pub fn locate_feature_points(
    frames: &[Frame],
    config: &PipelineConfig,
) -> Vec<Result<FeaturePoint, PipelineError>> {
    frames
        .par_iter()
        .map(|f| locate_feature_point(&f.rgba, &f.depth, &f.intrinsics, config))
        .collect()
}

/// A frame left out of a carving pass.
#[derive(Debug)]
pub struct SkippedFrame {
    /// Index of the frame in the input.
    pub index: usize,
    /// Why the frame was left out.
    pub reason: PipelineError,
}

/// The result of carving a set of frames.
#[derive(Debug)]
pub struct CarvingOutcome {
    /// The consensus grid over all carved views.
    pub grid: OccupancyGrid,
    /// Indices of the frames carved as views, in input order.
    pub views: Vec<usize>,
    /// Frames left out, in input order.
    pub skipped: Vec<SkippedFrame>,
}

fn process_frame(frame: &Frame, config: &PipelineConfig) -> Result<FeaturePoint, PipelineError> {
    let stats = frame_illumination(&frame.rgba)?;
    if stats.max_intensity < config.min_frame_intensity {
        return Err(PipelineError::DarkFrame {
            max_intensity: stats.max_intensity,
            min_intensity: config.min_frame_intensity,
        });
    }
    locate_feature_point(&frame.rgba, &frame.depth, &frame.intrinsics, config)
}

/// Carve the feature rays of many frames into one occupancy grid.
///
/// Frames are lit-checked and their features extracted in parallel. Each usable frame then
/// becomes one view of a [`CarvingSession`], holding the ray from its camera centre through
/// its feature point, so the grid keeps the voxels every ray crosses.
///
/// Frames that are too dark or whose feature cannot be located are skipped and never
/// contribute a view.
///
/// # Arguments
///
/// * `frames` - The captures, with their poses.
/// * `dims` - The dimensions of the grid.
/// * `mapping` - World to voxel mapping, in the unit of `config.depth_unit`.
/// * `config` - The pipeline parameters.
///
/// # Errors
///
/// Fails if the configuration or the grid definition is invalid.
pub fn carve_frames(
    frames: &[Frame],
    dims: GridDims,
    mapping: VoxelMapping,
    config: &PipelineConfig,
) -> Result<CarvingOutcome, PipelineError> {
    config.validate()?;
    let mut session = CarvingSession::new(dims, mapping, config.slab_policy)?;

    let processed = frames
        .par_iter()
        .map(|f| process_frame(f, config))
        .collect::<Vec<_>>();

    let mut views = Vec::new();
    let mut skipped = Vec::new();

    for (index, (frame, result)) in frames.iter().zip(processed).enumerate() {
        let ray = result.and_then(|feature| {
            frame
                .view_ray(feature.point)
                .ok_or(PipelineError::DegeneratePose(index))
        });

        match ray {
            Ok(ray) => {
                session.begin_view()?;
                session.add_ray(&ray)?;
                session.end_view()?;
                views.push(index);
            }
            Err(reason) => {
                log::warn!("skipping frame {}: {}", index, reason);
                skipped.push(SkippedFrame { index, reason });
            }
        }
    }

    log::debug!(
        "carved {} views, skipped {} frames",
        views.len(),
        skipped.len()
    );

    Ok(CarvingOutcome {
        grid: session.into_grid()?,
        views,
        skipped,
    })
}
