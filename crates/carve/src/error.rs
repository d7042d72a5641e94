use carve_3d::{GridError, ProjectionError};
use carve_image::ImageError;
use carve_imgproc::features::FeatureError;

/// Errors raised by the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// An image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The feature could not be located in the frame.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// The feature could not be lifted to 3D.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The occupancy grid rejected the evidence.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// The configuration could not be parsed.
    #[error("Failed to parse the configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The frame is too dark to carry a reliable feature.
    #[error("Frame max intensity {max_intensity} is below {min_intensity}")]
    DarkFrame {
        /// Largest BT.709 luma of the frame.
        max_intensity: f64,
        /// Configured minimum.
        min_intensity: f64,
    },

    /// The camera pose maps the feature direction to a zero or non-finite vector.
    #[error("Camera pose of frame {0} is degenerate")]
    DegeneratePose(usize),
}
