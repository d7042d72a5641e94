use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use carve_image::{Image, ImageSize, Rect};
use carve_imgproc::features::{extract_region_pixels, find_brightest_region_centroid};
use carve_imgproc::filter::{gaussian_blur_extended, BLUR_MARGIN_PX, DEFAULT_BLUR_SIGMA};
use carve_imgproc::illumination::compute_frame_index;

fn synthetic_rgba(size: ImageSize) -> Image<u8, 4> {
    let data = (0..size.width * size.height)
        .flat_map(|i| {
            let v = (i % 251) as u8;
            [v, v.wrapping_mul(3), v / 2, 255]
        })
        .collect();
    Image::new(size, data).unwrap()
}

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("Features");

    for (width, height) in [(256, 192), (640, 480)].iter() {
        let size = ImageSize {
            width: *width,
            height: *height,
        };
        let parameter_string = format!("{width}x{height}");

        let rgba = synthetic_rgba(size);
        let gray = rgba.channel(0).unwrap();

        group.bench_with_input(
            BenchmarkId::new("brightest_centroid", &parameter_string),
            &gray,
            |b, i| b.iter(|| black_box(find_brightest_region_centroid(i)).unwrap()),
        );

        group.bench_with_input(
            BenchmarkId::new("blur_extended", &parameter_string),
            &gray,
            |b, i| {
                b.iter(|| {
                    black_box(gaussian_blur_extended(i, DEFAULT_BLUR_SIGMA, BLUR_MARGIN_PX))
                        .unwrap()
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("shadow_pixels", &parameter_string),
            &rgba,
            |b, i| {
                b.iter(|| black_box(extract_region_pixels(i, Rect::full(size), 1, 10)).unwrap())
            },
        );

        let frames = vec![rgba.clone(); 8];
        group.bench_with_input(
            BenchmarkId::new("frame_index_x8", &parameter_string),
            &frames,
            |b, i| b.iter(|| black_box(compute_frame_index(i)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_features);
criterion_main!(benches);
