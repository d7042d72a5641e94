use rayon::prelude::*;

use carve_image::Image;

/// Apply a function to each pixel in the image in parallel.
///
/// Rows are distributed over the rayon thread pool; within a row the pixels
/// are visited in order. `src` and `dst` must have the same size.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }
    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Reduce every row of an image in parallel and return one value per row.
///
/// The closure receives the row index and the row samples (`width * C` values).
pub fn par_map_rows<T, const C: usize, R>(
    src: &Image<T, C>,
    f: impl Fn(usize, &[T]) -> R + Send + Sync,
) -> Vec<R>
where
    T: Send + Sync,
    R: Send,
{
    let stride = src.row_stride();
    if stride == 0 {
        return Vec::new();
    }
    src.as_slice()
        .par_chunks_exact(stride)
        .enumerate()
        .map(|(y, row)| f(y, row))
        .collect()
}
