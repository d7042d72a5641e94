use carve_image::{Image, ImageError};
use rayon::prelude::*;

use crate::color::luma_bt709;
use crate::parallel;

/// Luminance statistics of a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameIllumination {
    /// Sum of the BT.709 luma over every pixel of the frame.
    pub weighted_sum: f64,
    /// Largest BT.709 luma of any pixel in the frame.
    pub max_intensity: f64,
}

/// Compute the luminance statistics of one RGB or RGBA frame.
///
/// Channels after the third are ignored.
///
/// # Errors
///
/// * [`ImageError::EmptyImage`] if the frame has no pixels.
/// * [`ImageError::ChannelIndexOutOfBounds`] if the frame has fewer than 3 channels.
pub fn frame_illumination<const C: usize>(
    frame: &Image<u8, C>,
) -> Result<FrameIllumination, ImageError> {
    if C < 3 {
        return Err(ImageError::ChannelIndexOutOfBounds(2, C));
    }
    if frame.is_empty() {
        return Err(ImageError::EmptyImage(frame.size()));
    }

    let per_row = parallel::par_map_rows(frame, |_, row| {
        row.chunks_exact(C).fold((0.0f64, 0.0f64), |(sum, max), px| {
            let luma = luma_bt709(px[0], px[1], px[2]);
            (sum + luma, max.max(luma))
        })
    });

    let (weighted_sum, max_intensity) = per_row
        .into_iter()
        .fold((0.0f64, 0.0f64), |(sum, max), (row_sum, row_max)| {
            (sum + row_sum, max.max(row_max))
        });

    Ok(FrameIllumination {
        weighted_sum,
        max_intensity,
    })
}

/// Compute the illumination index of a stack of frames.
///
/// Returns one [`FrameIllumination`] per frame, in input order, so callers can rank
/// or select frames by lighting quality. Frames are processed in parallel.
///
/// # Errors
///
/// Fails on the first frame rejected by [`frame_illumination`].
///
/// # Example
///
/// ```
/// use carve_image::{Image, ImageSize};
/// use carve_imgproc::illumination::compute_frame_index;
///
/// let size = ImageSize { width: 2, height: 2 };
/// let dark = Image::<u8, 4>::from_size_val(size, 0).unwrap();
/// let white = Image::<u8, 4>::from_size_val(size, 255).unwrap();
///
/// let index = compute_frame_index(&[dark, white]).unwrap();
/// assert_eq!(index[0].max_intensity, 0.0);
/// assert!((index[1].max_intensity - 255.0).abs() < 1e-9);
/// ```
pub fn compute_frame_index<const C: usize>(
    frames: &[Image<u8, C>],
) -> Result<Vec<FrameIllumination>, ImageError> {
    frames.par_iter().map(frame_illumination::<C>).collect()
}

/// Order frame indices from best to worst lighting.
///
/// Frames are sorted by descending maximum intensity, then by descending weighted sum,
/// then by ascending index so the order is deterministic.
pub fn rank_frames(index: &[FrameIllumination]) -> Vec<usize> {
    let mut order = (0..index.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        index[b]
            .max_intensity
            .total_cmp(&index[a].max_intensity)
            .then(index[b].weighted_sum.total_cmp(&index[a].weighted_sum))
            .then(a.cmp(&b))
    });
    order
}
