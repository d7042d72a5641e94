use carve_image::{Image, ImageError};

use crate::parallel;

/// ITU-R BT.709 luma weights for the red, green and blue channels.
pub const BT709_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Compute the BT.709 luma of an RGB sample.
///
/// Y = 0.2126 * R + 0.7152 * G + 0.0722 * B
///
/// # Example
///
/// ```
/// use carve_imgproc::color::luma_bt709;
///
/// assert_eq!(luma_bt709(0, 0, 0), 0.0);
/// assert!((luma_bt709(255, 255, 255) - 255.0).abs() < 1e-9);
/// ```
#[inline]
pub fn luma_bt709(r: u8, g: u8, b: u8) -> f64 {
    BT709_WEIGHTS[0] * r as f64 + BT709_WEIGHTS[1] * g as f64 + BT709_WEIGHTS[2] * b as f64
}

/// Convert an RGB8 or RGBA8 image to grayscale using the formula:
///
/// Y = 77 * R + 150 * G + 29 * B
///
/// Channels after the third (alpha) are ignored.
///
/// # Arguments
///
/// * `src` - The input image with at least 3 channels, red first.
///
/// # Errors
///
/// Returns [`ImageError::ChannelIndexOutOfBounds`] if the image has fewer than 3 channels.
///
/// # Example
///
/// ```
/// use carve_image::{Image, ImageSize};
/// use carve_imgproc::color::gray_from_rgb_u8;
///
/// let image = Image::<u8, 4>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![255, 255, 255, 255, 0, 0, 0, 255],
/// )
/// .unwrap();
///
/// let gray = gray_from_rgb_u8(&image).unwrap();
/// assert_eq!(gray.as_slice(), &[255, 0]);
/// ```
pub fn gray_from_rgb_u8<const C: usize>(src: &Image<u8, C>) -> Result<Image<u8, 1>, ImageError> {
    if C < 3 {
        return Err(ImageError::ChannelIndexOutOfBounds(2, C));
    }

    let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

    parallel::par_iter_rows(src, &mut dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] as u16;
        let g = src_pixel[1] as u16;
        let b = src_pixel[2] as u16;
        dst_pixel[0] = ((r * 77 + g * 150 + b * 29) >> 8) as u8;
    });

    Ok(dst)
}
