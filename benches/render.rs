use criterion::{black_box, criterion_group, criterion_main, Criterion};
use edge_finder::capture::{Camera, CaptureConfig, MockCamera};
use edge_finder::detector::{Bitmap, EdgeDetector, EdgeMask};
use edge_finder::mailbox::FrameBuffer;

fn preview_frame(width: u32, height: u32) -> Vec<u8> {
    let mut camera = MockCamera::new();
    camera
        .open(&CaptureConfig::with_dimensions(width, height))
        .unwrap();
    camera.capture().unwrap().pixels().to_vec()
}

fn bench_render(c: &mut Criterion) {
    let (width, height) = (640, 480);
    let samples = preview_frame(width, height);
    let detector = EdgeDetector::default();

    let mut display = Bitmap::new(width, height);
    c.bench_function("render_vga_bitmap", |b| {
        b.iter(|| detector.render(black_box(&samples), width, height, &mut display))
    });

    let mut mask = EdgeMask::new(width, height);
    c.bench_function("render_vga_mask", |b| {
        b.iter(|| detector.render(black_box(&samples), width, height, &mut mask))
    });
}

fn bench_mailbox(c: &mut Criterion) {
    let samples = preview_frame(640, 480);
    let buffer = FrameBuffer::new();

    c.bench_function("publish_consume_vga", |b| {
        b.iter(|| {
            buffer.publish(black_box(&samples), 640, 480).unwrap();
            buffer.try_consume(|frame| frame.sequence())
        })
    });
}

criterion_group!(benches, bench_render, bench_mailbox);
criterion_main!(benches);
