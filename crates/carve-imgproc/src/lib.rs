#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// feature detection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// per-frame illumination statistics.
pub mod illumination;

/// module containing parallization utilities.
pub mod parallel;

/// histogram thresholding module.
pub mod threshold;
