use gridmatch::{
    match_all, match_tile, partition, CompareMode, CompiledTemplate, Frame, GridSpec, MatchConfig,
    Template, TemplateBank, TemplateId, WorkerPool,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

fn extract_patch(
    image: &[u8],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        out.extend_from_slice(&image[row + x0..row + x0 + width]);
    }
    out
}

fn bench_pipeline(c: &mut Criterion) {
    let img_width = 640;
    let img_height = 480;
    let image = make_image(img_width, img_height);
    let frame = Frame::gray(image.clone(), img_width, img_height)
        .unwrap()
        .to_luma();

    let patch_a = extract_patch(&image, img_width, 120, 100, 32, 32);
    let patch_b = extract_patch(&image, img_width, 400, 300, 24, 16);
    let templates = vec![
        Template::new(TemplateId(0), patch_a.clone(), 32, 32)
            .unwrap()
            .with_threshold(0.9),
        Template::new(TemplateId(1), patch_b, 24, 16)
            .unwrap()
            .with_mode(CompareMode::LowerIsBetter)
            .with_threshold(0.05),
    ];
    let bank = TemplateBank::new(templates).unwrap();
    let cfg = MatchConfig::default();

    let single = CompiledTemplate::compile(
        Template::new(TemplateId(2), patch_a, 32, 32)
            .unwrap()
            .with_threshold(0.9),
    );
    c.bench_function("match_tile_whole_frame", |b| {
        b.iter(|| black_box(match_tile(frame.view(), &single, &cfg)));
    });

    for workers in [1, 4] {
        let pool = WorkerPool::new(workers).unwrap();
        let grid = partition(
            img_width,
            img_height,
            GridSpec {
                cols: 4,
                rows: 3,
                overlap: 32,
            },
        )
        .unwrap();
        c.bench_function(&format!("match_all_4x3_workers_{workers}"), |b| {
            b.iter(|| black_box(match_all(&frame, &grid, &bank, &pool, &cfg)));
        });
    }

    if cfg!(feature = "rayon") {
        let whole = TemplateBank::new(vec![Template::new(
            TemplateId(3),
            extract_patch(&image, img_width, 200, 200, 32, 32),
            32,
            32,
        )
        .unwrap()
        .with_threshold(0.9)
        .with_divided(false)])
        .unwrap();
        let pool = WorkerPool::new(1).unwrap();
        let grid = partition(img_width, img_height, GridSpec::default()).unwrap();
        let parallel_cfg = MatchConfig {
            parallel: true,
            ..MatchConfig::default()
        };
        c.bench_function("match_all_whole_frame_parallel", |b| {
            b.iter(|| black_box(match_all(&frame, &grid, &whole, &pool, &parallel_cfg)));
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
