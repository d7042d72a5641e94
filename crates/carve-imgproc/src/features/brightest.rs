use carve_image::{Image, ImageError, Point2};
use num_traits::Zero;

use super::FeatureError;

/// The plateau of pixels sharing the maximum intensity of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightestRegion<T> {
    /// Integer centroid of the plateau, truncated towards zero.
    pub centroid: Point2,
    /// The maximum intensity.
    pub max_value: T,
    /// Number of pixels holding the maximum intensity.
    pub count: usize,
}

/// Locate the plateau of maximum intensity in a single channel image.
///
/// The image is scanned once in row-major order while tracking the current maximum and the
/// coordinate sums of every pixel equal to it. A strictly brighter pixel resets the
/// accumulator; an equal pixel joins it. The centroid is the truncated mean of the plateau.
///
/// The input is expected to be blurred upstream so neighbouring near-maximal pixels cohere
/// into a single plateau instead of competing as isolated spikes.
///
/// # Arguments
///
/// * `src` - The single channel intensity image.
///
/// # Errors
///
/// * [`ImageError::EmptyImage`] if the image has no pixels.
/// * [`FeatureError::NoSignal`] if no pixel is above zero.
///
/// # Example
///
/// ```
/// use carve_image::{Image, ImageSize, Point2};
/// use carve_imgproc::features::brightest_region;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 2 },
///     vec![0, 9, 9,
///          0, 1, 9],
/// )
/// .unwrap();
///
/// let region = brightest_region(&image).unwrap();
/// assert_eq!(region.max_value, 9);
/// assert_eq!(region.count, 3);
/// assert_eq!(region.centroid, Point2::new(1, 0));
/// ```
pub fn brightest_region<T>(src: &Image<T, 1>) -> Result<BrightestRegion<T>, FeatureError>
where
    T: Copy + PartialOrd + Zero,
{
    if src.is_empty() {
        return Err(ImageError::EmptyImage(src.size()).into());
    }

    let mut max_value = T::zero();
    let (mut sum_x, mut sum_y, mut count) = (0usize, 0usize, 0usize);

    for (y, row) in src.as_slice().chunks_exact(src.cols()).enumerate() {
        for (x, &v) in row.iter().enumerate() {
            if v > max_value {
                max_value = v;
                sum_x = x;
                sum_y = y;
                count = 1;
            } else if count > 0 && v == max_value {
                sum_x += x;
                sum_y += y;
                count += 1;
            }
        }
    }

    if count == 0 {
        return Err(FeatureError::NoSignal(src.size()));
    }

    let centroid = Point2::new(sum_x / count, sum_y / count);
    log::debug!(
        "brightest plateau of {} pixels centered at ({}, {})",
        count,
        centroid.x,
        centroid.y
    );

    Ok(BrightestRegion {
        centroid,
        max_value,
        count,
    })
}

/// Find the integer centroid of the maximum intensity region of an image.
///
/// See [`brightest_region`] for the algorithm and the error conditions.
pub fn find_brightest_region_centroid<T>(src: &Image<T, 1>) -> Result<Point2, FeatureError>
where
    T: Copy + PartialOrd + Zero,
{
    brightest_region(src).map(|region| region.centroid)
}
