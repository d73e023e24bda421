use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rollingball_image::Image;
use rollingball_imgproc::{
    background::{rolling_ball_background, RollingBallConfig},
    filter::mean_filter,
    morphology::{roll_ball, RollingBall},
};

fn bench_rolling_ball(c: &mut Criterion) {
    let mut group = c.benchmark_group("RollingBall");

    for (width, height) in [(128, 96), (256, 224), (512, 448)].iter() {
        for radius in [5.0f32, 15.0, 50.0].iter() {
            group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

            let parameter_string = format!("{}x{}x{}", width, height, radius);

            // a diagonal ramp with some texture on top
            let image_size = [*width, *height].into();
            let data = (0..width * height)
                .map(|i| (((i % width) + (i / width)) / 4 + (i * 7919) % 13) as u8)
                .collect();
            let image_u8 = Image::<u8, 1>::new(image_size, data).unwrap();
            let image_f32 = image_u8.cast::<f32>().unwrap();

            let ball = RollingBall::new(*radius).unwrap();

            group.bench_with_input(
                BenchmarkId::new("roll_ball", &parameter_string),
                &image_f32,
                |b, src| {
                    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
                    b.iter(|| black_box(roll_ball(src, &ball, &mut dst)))
                },
            );

            group.bench_with_input(
                BenchmarkId::new("rolling_ball_background", &parameter_string),
                &image_u8,
                |b, src| {
                    let config = RollingBallConfig::new(*radius);
                    let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
                    b.iter(|| black_box(rolling_ball_background(src, &config, &mut dst)))
                },
            );
        }

        let image_f32 = Image::<f32, 1>::from_size_val([*width, *height].into(), 1.0).unwrap();
        group.bench_with_input(
            BenchmarkId::new("mean_filter_3x3", format!("{}x{}", width, height)),
            &image_f32,
            |b, src| {
                let mut dst = src.clone();
                b.iter(|| black_box(mean_filter(src, &mut dst, 3)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rolling_ball);
criterion_main!(benches);
