use argh::FromArgs;
use half::f16;
use std::path::PathBuf;

use carve::c3d::camera::CameraIntrinsics;
use carve::c3d::depth::DepthMap;
use carve::image::{Image, ImageSize};
use carve::imgproc::illumination::compute_frame_index;
use carve::pipeline::locate_feature_point;
use carve::PipelineConfig;

#[derive(FromArgs)]
/// Locate the brightest point of a synthetic frame and lift it to 3D
struct Args {
    /// path to a JSON pipeline config
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// column of the light spot in the color image
    #[argh(option, default = "1200")]
    spot_x: usize,

    /// row of the light spot in the color image
    #[argh(option, default = "500")]
    spot_y: usize,

    /// depth of the scene in meters
    #[argh(option, default = "1.5")]
    depth: f32,
}

// resolutions delivered by the capture device
const COLOR_SIZE: ImageSize = ImageSize {
    width: 1920,
    height: 1440,
};

const DEPTH_SIZE: ImageSize = ImageSize {
    width: 256,
    height: 192,
};

fn synthetic_frame(spot_x: usize, spot_y: usize) -> Result<Image<u8, 4>, Box<dyn std::error::Error>> {
    let mut data = Vec::with_capacity(COLOR_SIZE.area() * 4);
    for y in 0..COLOR_SIZE.height {
        for x in 0..COLOR_SIZE.width {
            let dx = x as f32 - spot_x as f32;
            let dy = y as f32 - spot_y as f32;
            let v = 20.0 + 235.0 * (-(dx * dx + dy * dy) / (2.0 * 15.0 * 15.0)).exp();
            let v = v as u8;
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Ok(Image::new(COLOR_SIZE, data)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = match args.config {
        Some(path) => PipelineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };
    log::info!("running with {:?}", config);

    let rgba = synthetic_frame(args.spot_x, args.spot_y)?;

    let bits = vec![f16::from_f32(args.depth).to_bits(); DEPTH_SIZE.area()];
    let depth = DepthMap::from_f16_bits(DEPTH_SIZE, &bits)?;

    let intrinsics = CameraIntrinsics::new((1590.0, 1590.0), (955.0, 718.0), COLOR_SIZE);

    let index = compute_frame_index(std::slice::from_ref(&rgba))?;
    println!(
        "Frame illumination: max {:.1}, sum {:.1}",
        index[0].max_intensity, index[0].weighted_sum
    );

    let feature = locate_feature_point(&rgba, &depth, &intrinsics, &config)?;
    println!(
        "Brightest point: pixel ({}, {}), depth pixel ({}, {})",
        feature.pixel.x, feature.pixel.y, feature.depth_pixel.x, feature.depth_pixel.y
    );
    println!(
        "Camera space point: ({:.2}, {:.2}, {:.2})",
        feature.point.x, feature.point.y, feature.point.z
    );

    Ok(())
}
