use approx::assert_relative_eq;
use glam::{DAffine3, DQuat, DVec3};
use half::f16;

use carve::c3d::camera::CameraIntrinsics;
use carve::c3d::depth::{DepthMap, DepthUnit};
use carve::c3d::occupancy::{GridDims, VoxelMapping};
use carve::c3d::projection::project;
use carve::image::{Image, ImageSize, Point2};
use carve::imgproc::features::FeatureError;
use carve::pipeline::{carve_frames, locate_feature_point, Frame};
use carve::{PipelineConfig, PipelineError};

const COLOR: ImageSize = ImageSize {
    width: 64,
    height: 48,
};

const DEPTH: ImageSize = ImageSize {
    width: 16,
    height: 12,
};

fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::new((64.0, 64.0), (32.0, 24.0), COLOR)
}

fn frame_with_spot(center: Point2, meters: f32) -> Result<Frame, Box<dyn std::error::Error>> {
    let mut rgba = Image::<u8, 4>::from_size_val(COLOR, 0)?;
    for y in center.y - 1..=center.y + 1 {
        for x in center.x - 1..=center.x + 1 {
            for ch in 0..3 {
                rgba.set(x, y, ch, 255)?;
            }
            rgba.set(x, y, 3, 255)?;
        }
    }
    let bits = vec![f16::from_f32(meters).to_bits(); DEPTH.area()];
    let depth = DepthMap::from_f16_bits(DEPTH, &bits)?;
    Ok(Frame::new(rgba, depth, intrinsics()))
}

fn config() -> PipelineConfig {
    PipelineConfig {
        blur_sigma: 1.0,
        blur_margin_px: 4,
        depth_unit: DepthUnit::Meters,
        ..Default::default()
    }
}

#[test]
fn feature_point_projects_back() -> Result<(), Box<dyn std::error::Error>> {
    let frame = frame_with_spot(Point2::new(48, 8), 4.0)?;
    let feature = locate_feature_point(&frame.rgba, &frame.depth, &frame.intrinsics, &config())?;

    assert_eq!(feature.pixel, Point2::new(48, 8));
    assert_eq!(feature.depth_pixel, Point2::new(12, 2));
    assert_relative_eq!(feature.point.z, 4.0);

    let uv = project(feature.point, &frame.intrinsics, DEPTH)?;
    assert_relative_eq!(uv.x, 12.0, epsilon = 1e-4);
    assert_relative_eq!(uv.y, 2.0, epsilon = 1e-4);
    Ok(())
}

#[test]
fn corner_feature_maps_to_source_origin() -> Result<(), Box<dyn std::error::Error>> {
    let frame = frame_with_spot(Point2::new(32, 24), 1.0)?;
    let mut rgba = Image::<u8, 4>::from_size_val(COLOR, 0)?;
    rgba.set(0, 0, 0, 255)?;

    // the blur spreads the corner pixel into the margin but the peak stays on it
    let feature = locate_feature_point(&rgba, &frame.depth, &frame.intrinsics, &config())?;
    assert_eq!(feature.pixel, Point2::new(0, 0));

    let black = Image::<u8, 4>::from_size_val(COLOR, 0)?;
    assert!(matches!(
        locate_feature_point(&black, &frame.depth, &frame.intrinsics, &config()),
        Err(PipelineError::Feature(FeatureError::NoSignal(_)))
    ));
    Ok(())
}

#[test]
fn two_views_carve_their_crossing() -> Result<(), Box<dyn std::error::Error>> {
    // both cameras see the same world point (0, 0, 2) on their optical axis
    let front = frame_with_spot(Point2::new(32, 24), 2.0)?;
    let side = frame_with_spot(Point2::new(32, 24), 2.0)?.with_pose(
        DAffine3::from_rotation_translation(
            DQuat::from_rotation_y(-std::f64::consts::FRAC_PI_2),
            DVec3::new(2.0, 0.0, 2.0),
        ),
    );
    let dark = Frame::new(
        Image::<u8, 4>::from_size_val(COLOR, 0)?,
        front.depth.clone(),
        intrinsics(),
    );

    let mapping = VoxelMapping::new(DVec3::new(-1.25, -0.25, 0.25), 0.5)?;
    let outcome = carve_frames(
        &[front, dark, side],
        GridDims::new(6, 1, 6),
        mapping,
        &config(),
    )?;

    assert_eq!(outcome.views, vec![0, 2]);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].index, 1);

    let occupied = outcome.grid.occupied_voxels().collect::<Vec<_>>();
    assert_eq!(occupied, vec![[2, 0, 3]]);

    let bounds = mapping.voxel_bounds(2, 0, 3);
    assert!(bounds.contains(DVec3::new(0.0, 0.0, 2.0)));
    Ok(())
}

#[test]
fn invalid_config_is_rejected_before_carving() {
    let config = PipelineConfig {
        blur_sigma: -1.0,
        ..config()
    };
    let mapping = VoxelMapping::new(DVec3::ZERO, 1.0).unwrap();
    assert!(matches!(
        carve_frames(&[], GridDims::new(1, 1, 1), mapping, &config),
        Err(PipelineError::InvalidConfig(_))
    ));
}
