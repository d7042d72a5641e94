#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use carve_image as image;

#[doc(inline)]
pub use carve_imgproc as imgproc;

#[doc(inline)]
pub use carve_3d as c3d;

/// Pipeline configuration.
pub mod config;

/// Error types for the pipeline.
pub mod error;

/// Frame to 3D feature point and multi-frame carving.
pub mod pipeline;

pub use crate::config::PipelineConfig;
pub use crate::error::PipelineError;
