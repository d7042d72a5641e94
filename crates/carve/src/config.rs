use carve_3d::depth::DepthUnit;
use carve_3d::ray::SlabPolicy;
use carve_imgproc::filter::{BLUR_MARGIN_PX, DEFAULT_BLUR_SIGMA};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Parameters of the feature and carving pipeline.
///
/// Every field has a default, so a JSON config only needs the values it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Standard deviation of the Gaussian blur applied before locating the brightest region.
    pub blur_sigma: f32,
    /// Margin in pixels the blur adds on every side of the image.
    pub blur_margin_px: usize,
    /// Unit of the `z` coordinate of the lifted points.
    pub depth_unit: DepthUnit,
    /// Slab test used when carving rays.
    pub slab_policy: SlabPolicy,
    /// Frames whose brightest pixel has a lower BT.709 luma are not carved.
    pub min_frame_intensity: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_sigma: DEFAULT_BLUR_SIGMA,
            blur_margin_px: BLUR_MARGIN_PX,
            depth_unit: DepthUnit::default(),
            slab_policy: SlabPolicy::default(),
            min_frame_intensity: 0.0,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// # Example
    ///
    /// ```
    /// use carve::config::PipelineConfig;
    /// use carve::c3d::depth::DepthUnit;
    ///
    /// let config = PipelineConfig::from_json_str(r#"{ "depth_unit": "meters" }"#).unwrap();
    /// assert_eq!(config.depth_unit, DepthUnit::Meters);
    /// assert_eq!(config.blur_margin_px, 30);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_sigma must be finite and positive, got {}",
                self.blur_sigma
            )));
        }
        if !self.min_frame_intensity.is_finite() || self.min_frame_intensity < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "min_frame_intensity must be finite and non-negative, got {}",
                self.min_frame_intensity
            )));
        }
        Ok(())
    }
}
