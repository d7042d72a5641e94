use carve_image::{Image, ImageError};

const BINS: usize = 256;

/// Count the samples of one channel into a 256 bin histogram.
///
/// # Errors
///
/// Returns [`ImageError::ChannelIndexOutOfBounds`] if `channel >= C`.
pub fn channel_histogram<const C: usize>(
    src: &Image<u8, C>,
    channel: usize,
) -> Result<[u32; BINS], ImageError> {
    if channel >= C {
        return Err(ImageError::ChannelIndexOutOfBounds(channel, C));
    }

    let mut histogram = [0u32; BINS];
    for &v in src.as_slice().iter().skip(channel).step_by(C) {
        histogram[v as usize] += 1;
    }

    Ok(histogram)
}

/// Find the threshold that best separates a histogram into two classes.
///
/// The threshold maximises the between-class variance, where the dark class holds the
/// values up to and including the threshold. A histogram with fewer than two distinct
/// values has no split and yields 0.
pub fn otsu_from_histogram(histogram: &[u32; BINS]) -> u8 {
    let total = histogram.iter().map(|&c| c as f64).sum::<f64>();
    let sum_total = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum::<f64>();

    let mut best_variance = 0.0;
    let mut best_threshold = 0u8;

    let mut weight_back = 0.0;
    let mut sum_back = 0.0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_back += count as f64;
        sum_back += t as f64 * count as f64;

        // one of the classes is empty
        if weight_back == 0.0 || weight_back == total {
            continue;
        }

        let weight_fore = total - weight_back;
        let mean_back = sum_back / weight_back;
        let mean_fore = (sum_total - sum_back) / weight_fore;

        let variance = weight_back * weight_fore * (mean_back - mean_fore).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

/// Compute the Otsu threshold of one channel of an image.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `channel` - Index of the channel to threshold.
///
/// # Returns
///
/// The largest value of the dark class: samples `<=` the threshold are dark.
///
/// # Errors
///
/// * [`ImageError::ChannelIndexOutOfBounds`] if `channel >= C`.
/// * [`ImageError::EmptyImage`] if the image has no pixel.
///
/// # Example
///
/// ```
/// use carve_image::{Image, ImageSize};
/// use carve_imgproc::threshold::otsu_threshold;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 2, height: 3 },
///     vec![100, 200, 50, 150, 200, 250],
/// )
/// .unwrap();
///
/// assert_eq!(otsu_threshold(&image, 0).unwrap(), 100);
/// ```
pub fn otsu_threshold<const C: usize>(src: &Image<u8, C>, channel: usize) -> Result<u8, ImageError> {
    if src.size().is_empty() {
        return Err(ImageError::EmptyImage(src.size()));
    }
    let histogram = channel_histogram(src, channel)?;
    Ok(otsu_from_histogram(&histogram))
}
