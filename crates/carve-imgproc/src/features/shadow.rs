use carve_image::{Image, ImageError, Point2, Rect};

use super::FeatureError;
use crate::threshold::otsu_threshold;

fn check_region<const C: usize>(
    src: &Image<u8, C>,
    roi: Rect,
    channel: usize,
) -> Result<(), ImageError> {
    if channel >= C {
        return Err(ImageError::ChannelIndexOutOfBounds(channel, C));
    }
    if roi.is_empty() || !roi.fits_in(src.size()) {
        return Err(ImageError::InvalidRoi(roi, src.size()));
    }
    Ok(())
}

/// Visit every pixel of `roi` whose `channel` sample is below `threshold`.
fn for_each_shadow_pixel<const C: usize>(
    src: &Image<u8, C>,
    roi: Rect,
    channel: usize,
    threshold: u8,
    mut f: impl FnMut(Point2),
) {
    let stride = src.row_stride();
    let data = src.as_slice();
    for y in roi.y..roi.y + roi.height {
        let row = &data[y * stride..(y + 1) * stride];
        for x in roi.x..roi.x + roi.width {
            if row[x * C + channel] < threshold {
                f(Point2::new(x, y));
            }
        }
    }
}

/// Collect the shadow candidate pixels inside a region of interest.
///
/// A pixel is a candidate when the sample of the selected channel is strictly below
/// `threshold`. The region is supplied by the caller and must lie inside the image.
///
/// # Arguments
///
/// * `src` - The color image, e.g. RGBA.
/// * `roi` - The region to scan.
/// * `channel` - Index of the channel compared against the threshold.
/// * `threshold` - Exclusive upper bound of a shadow sample.
///
/// # Returns
///
/// The candidate coordinates in row-major order, each listed once.
///
/// # Errors
///
/// * [`ImageError::ChannelIndexOutOfBounds`] if `channel >= C`.
/// * [`ImageError::InvalidRoi`] if the region is empty or exceeds the image.
///
/// # Example
///
/// ```
/// use carve_image::{Image, ImageSize, Point2, Rect};
/// use carve_imgproc::features::extract_region_pixels;
///
/// // 2x2 RGBA image, only the bottom right pixel has a dark green channel
/// let image = Image::<u8, 4>::new(
///     ImageSize { width: 2, height: 2 },
///     vec![
///         200, 200, 200, 255, 200, 200, 200, 255,
///         200, 200, 200, 255, 200, 5, 200, 255,
///     ],
/// )
/// .unwrap();
///
/// let pixels = extract_region_pixels(&image, Rect::new(0, 0, 2, 2), 1, 10).unwrap();
/// assert_eq!(pixels, vec![Point2::new(1, 1)]);
/// ```
pub fn extract_region_pixels<const C: usize>(
    src: &Image<u8, C>,
    roi: Rect,
    channel: usize,
    threshold: u8,
) -> Result<Vec<Point2>, FeatureError> {
    check_region(src, roi, channel)?;

    let mut pixels = Vec::new();
    for_each_shadow_pixel(src, roi, channel, threshold, |p| pixels.push(p));

    log::debug!(
        "{} shadow pixels below {} in {:?}",
        pixels.len(),
        threshold,
        roi
    );

    Ok(pixels)
}

/// Build a binary mask of the shadow candidate pixels inside a region of interest.
///
/// Candidates are set to 255, everything else (including pixels outside `roi`) to 0.
/// The mask has the size of `src`, so it can be used as a per-view silhouette.
///
/// # Errors
///
/// Same conditions as [`extract_region_pixels`].
pub fn shadow_mask<const C: usize>(
    src: &Image<u8, C>,
    roi: Rect,
    channel: usize,
    threshold: u8,
) -> Result<Image<u8, 1>, FeatureError> {
    check_region(src, roi, channel)?;

    let mut mask = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    let cols = mask.cols();
    let mask_data = mask.as_slice_mut();
    for_each_shadow_pixel(src, roi, channel, threshold, |p| {
        mask_data[p.y * cols + p.x] = 255;
    });

    Ok(mask)
}

/// The Otsu threshold of `channel` over the whole image, as an exclusive bound.
fn otsu_bound<const C: usize>(
    src: &Image<u8, C>,
    roi: Rect,
    channel: usize,
) -> Result<(u8, u8), FeatureError> {
    check_region(src, roi, channel)?;
    let threshold = otsu_threshold(src, channel)?;
    // the dark class is inclusive, and never reaches 255
    Ok((threshold, threshold.saturating_add(1)))
}

/// Collect the shadow pixels inside a region of interest with an automatic threshold.
///
/// The selected channel of the whole image is split into a dark and a bright class with
/// [`otsu_threshold`]; the pixels of `roi` in the dark class are returned.
///
/// # Returns
///
/// The Otsu threshold and the dark pixels in row-major order. A pixel is dark when its
/// sample is at most the threshold.
///
/// # Errors
///
/// Same conditions as [`extract_region_pixels`].
pub fn extract_shadow_pixels_otsu<const C: usize>(
    src: &Image<u8, C>,
    roi: Rect,
    channel: usize,
) -> Result<(u8, Vec<Point2>), FeatureError> {
    let (threshold, bound) = otsu_bound(src, roi, channel)?;
    log::debug!("otsu threshold of channel {} is {}", channel, threshold);
    Ok((threshold, extract_region_pixels(src, roi, channel, bound)?))
}

/// Build the shadow mask of a region of interest with an automatic threshold.
///
/// See [`extract_shadow_pixels_otsu`] for how the threshold is chosen and [`shadow_mask`]
/// for the layout of the mask.
pub fn shadow_mask_otsu<const C: usize>(
    src: &Image<u8, C>,
    roi: Rect,
    channel: usize,
) -> Result<(u8, Image<u8, 1>), FeatureError> {
    let (threshold, bound) = otsu_bound(src, roi, channel)?;
    Ok((threshold, shadow_mask(src, roi, channel, bound)?))
}
