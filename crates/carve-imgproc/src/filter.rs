use carve_image::{Image, ImageError, ImageSize, Point2};
use rayon::prelude::*;

use crate::features::FeatureError;

/// Number of pixels the extended gaussian blur adds on every side of the source.
///
/// Coordinates found in a blurred image must have this margin removed with
/// [`remove_blur_margin`] before they index the unblurred source.
pub const BLUR_MARGIN_PX: usize = 30;

/// Default sigma of the gaussian blur applied before the brightest point search.
///
/// With [`BLUR_MARGIN_PX`] this keeps the kernel support at three sigmas.
pub const DEFAULT_BLUR_SIGMA: f32 = 10.0;

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = kernel_size.saturating_sub(1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Convolve every row of `src` with `kernel`, treating samples outside the row as zero.
fn convolve_rows(src: &[f32], dst: &mut [f32], cols: usize, kernel: &[f32]) {
    let half = (kernel.len() / 2) as isize;
    src.par_chunks_exact(cols)
        .zip(dst.par_chunks_exact_mut(cols))
        .for_each(|(src_row, dst_row)| {
            for (c, out) in dst_row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for (i, &k) in kernel.iter().enumerate() {
                    let x = c as isize + i as isize - half;
                    if x >= 0 && (x as usize) < cols {
                        acc += src_row[x as usize] * k;
                    }
                }
                *out = acc;
            }
        });
}

/// Transpose a row-major `rows x cols` buffer.
fn transpose(src: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut dst = vec![0.0f32; src.len()];
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
    dst
}

/// Blur a grayscale image with a gaussian kernel, growing the canvas by `margin` on every side.
///
/// The source is placed on a zero canvas of size `(width + 2 * margin, height + 2 * margin)`
/// and filtered with a separable kernel of size `2 * margin + 1`, so light from pixels near the
/// border bleeds into the margin instead of being cut off. Results are rounded back to `u8`,
/// which lets near-maximal pixels merge into a single plateau.
///
/// # Arguments
///
/// * `src` - The source grayscale image.
/// * `sigma` - The sigma of the gaussian kernel.
/// * `margin` - The number of pixels added on every side.
///
/// # Errors
///
/// Returns an error if the source is empty or `sigma` is not finite and positive.
///
/// # Example
///
/// ```
/// use carve_image::{Image, ImageSize};
/// use carve_imgproc::filter::gaussian_blur_extended;
///
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 3 }, 100).unwrap();
/// let blurred = gaussian_blur_extended(&image, 1.0, 2).unwrap();
/// assert_eq!(blurred.width(), 8);
/// assert_eq!(blurred.height(), 7);
/// ```
pub fn gaussian_blur_extended(
    src: &Image<u8, 1>,
    sigma: f32,
    margin: usize,
) -> Result<Image<u8, 1>, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage(src.size()));
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ImageError::InvalidKernelSigma(sigma));
    }

    let out_size = ImageSize {
        width: src.width() + 2 * margin,
        height: src.height() + 2 * margin,
    };
    let (cols, rows) = (out_size.width, out_size.height);

    // place the source in the middle of a zero canvas
    let mut canvas = vec![0.0f32; cols * rows];
    for (y, src_row) in src.as_slice().chunks_exact(src.width()).enumerate() {
        let offset = (y + margin) * cols + margin;
        canvas[offset..offset + src.width()]
            .iter_mut()
            .zip(src_row.iter())
            .for_each(|(dst, &v)| *dst = v as f32);
    }

    let kernel = gaussian_kernel_1d(2 * margin + 1, sigma);

    // horizontal pass
    let mut horizontal = vec![0.0f32; canvas.len()];
    convolve_rows(&canvas, &mut horizontal, cols, &kernel);

    // vertical pass on the transposed buffer
    let transposed = transpose(&horizontal, rows, cols);
    let mut vertical = vec![0.0f32; transposed.len()];
    convolve_rows(&transposed, &mut vertical, rows, &kernel);

    let data = transpose(&vertical, cols, rows)
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();

    Image::new(out_size, data)
}

/// Map a coordinate found in an extended blurred image back to the source image.
///
/// # Arguments
///
/// * `point` - The coordinate in the blurred image.
/// * `margin` - The margin used by [`gaussian_blur_extended`].
/// * `source_size` - The size of the unblurred source image.
///
/// # Errors
///
/// Returns [`FeatureError::OutsideSource`] if the point falls in the margin band or beyond
/// the source extent. The coordinate is never clamped.
///
/// # Example
///
/// ```
/// use carve_image::{ImageSize, Point2};
/// use carve_imgproc::filter::{remove_blur_margin, BLUR_MARGIN_PX};
///
/// let size = ImageSize { width: 100, height: 80 };
/// let p = remove_blur_margin(Point2::new(45, 31), BLUR_MARGIN_PX, size).unwrap();
/// assert_eq!(p, Point2::new(15, 1));
/// assert!(remove_blur_margin(Point2::new(10, 40), BLUR_MARGIN_PX, size).is_err());
/// ```
pub fn remove_blur_margin(
    point: Point2,
    margin: usize,
    source_size: ImageSize,
) -> Result<Point2, FeatureError> {
    let outside = FeatureError::OutsideSource {
        x: point.x,
        y: point.y,
        margin,
        size: source_size,
    };

    let x = point.x.checked_sub(margin).ok_or(outside.clone())?;
    let y = point.y.checked_sub(margin).ok_or(outside.clone())?;
    let p = Point2::new(x, y);

    if !p.is_inside(source_size) {
        return Err(outside);
    }

    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 1.0);
        assert_eq!(kernel.len(), 5);
        assert_relative_eq!(kernel.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(kernel[0], kernel[4], epsilon = 1e-7);
        assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);

        assert_eq!(gaussian_kernel_1d(1, 3.0), vec![1.0]);
    }

    #[test]
    fn test_blur_zero_margin_constant_image() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 4,
        };
        let image = Image::<u8, 1>::from_size_val(size, 42)?;
        let blurred = gaussian_blur_extended(&image, 2.0, 0)?;
        assert_eq!(blurred.size(), size);
        assert!(blurred.as_slice().iter().all(|&v| v == 42));
        Ok(())
    }

    #[test]
    fn test_blur_keeps_peak_position() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 9,
            height: 7,
        };
        let mut image = Image::<u8, 1>::from_size_val(size, 0)?;
        image.set(6, 2, 0, 255)?;

        let margin = 3;
        let blurred = gaussian_blur_extended(&image, 1.0, margin)?;
        assert_eq!(blurred.width(), 15);
        assert_eq!(blurred.height(), 13);

        // the blurred peak sits at the shifted source location
        let (argmax, _) = blurred
            .as_slice()
            .iter()
            .enumerate()
            .max_by_key(|(i, &v)| (v, std::cmp::Reverse(*i)))
            .ok_or(ImageError::EmptyImage(blurred.size()))?;
        assert_eq!(argmax % blurred.width(), 6 + margin);
        assert_eq!(argmax / blurred.width(), 2 + margin);
        Ok(())
    }

    #[test]
    fn test_blur_bleeds_into_margin() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 7,
        };
        let mut image = Image::<u8, 1>::from_size_val(size, 0)?;
        for y in 0..size.height {
            image.set(0, y, 0, 255)?;
        }

        let margin = 3;
        let blurred = gaussian_blur_extended(&image, 1.0, margin)?;

        // one pixel left of the source border, vertically centered
        let v = *blurred.get(margin - 1, margin + 3, 0)?;
        assert!(v > 50 && v < 70, "unexpected margin value {v}");
        assert_eq!(*blurred.get(0, 0, 0)?, 0);
        Ok(())
    }

    #[test]
    fn test_blur_invalid_inputs() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )?;
        assert_eq!(
            gaussian_blur_extended(&image, 0.0, 1),
            Err(ImageError::InvalidKernelSigma(0.0))
        );

        let empty = Image::<u8, 1>::new(
            ImageSize {
                width: 0,
                height: 3,
            },
            vec![],
        )?;
        assert!(matches!(
            gaussian_blur_extended(&empty, 1.0, 1),
            Err(ImageError::EmptyImage(_))
        ));
        Ok(())
    }

    #[test]
    fn test_remove_blur_margin() {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        assert_eq!(
            remove_blur_margin(Point2::new(30, 30), 30, size),
            Ok(Point2::new(0, 0))
        );
        assert_eq!(
            remove_blur_margin(Point2::new(39, 39), 30, size),
            Ok(Point2::new(9, 9))
        );
        assert!(remove_blur_margin(Point2::new(29, 35), 30, size).is_err());
        assert!(remove_blur_margin(Point2::new(40, 35), 30, size).is_err());
    }
}
