use criterion::{Criterion, criterion_group, criterion_main};
use plot_prep::api::{PlotOptions, prepare_plot};
use plot_prep::core::{
    Field, FieldConfig, FieldCustomConfig, Frame, LinearScale, Orientation, SpanNulls, TimeRange,
    Value, Viewport, align_frames, apply_null_threshold, first_time_field, visible_number_fields,
};
use plot_prep::interaction::{CursorBus, CursorOptions, CursorSyncCoordinator, SyncMode};
use std::hint::black_box;

fn gappy_frame(offset: f64, rows: usize) -> Frame {
    let times = (0..rows).map(|i| offset + i as f64 * 1_000.0);
    let values = (0..rows).map(|i| (i % 7 != 3).then(|| (i as f64 * 0.01).sin()));
    Frame::new(vec![
        Field::time("time", times),
        Field::number("value", values).with_config(FieldConfig {
            custom: FieldCustomConfig {
                span_nulls: Some(SpanNulls::Threshold(2_500.0)),
                ..FieldCustomConfig::default()
            },
            ..FieldConfig::default()
        }),
    ])
}

fn bench_linear_scale_round_trip(c: &mut Criterion) {
    let viewport = Viewport::new(1920, 1080);
    let scale = LinearScale::new(0.0, 10_000.0, Orientation::Horizontal).expect("valid scale");

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale
                .value_to_pixel(black_box(4_321.123), viewport)
                .expect("to pixel");
            let _ = scale.pixel_to_value(px, viewport).expect("from pixel");
        })
    });
}

fn bench_null_threshold_10k(c: &mut Criterion) {
    let frame = gappy_frame(0.0, 10_000);
    let refs = frame.fields[0].values.clone();
    let values: Vec<Value> = frame.fields[1].values.clone();

    c.bench_function("null_threshold_10k", |b| {
        b.iter(|| {
            let mut working = values.clone();
            black_box(apply_null_threshold(&refs, &mut working, 2_500.0));
        })
    });
}

fn bench_align_four_frames_10k(c: &mut Criterion) {
    let frames: Vec<Frame> = (0..4)
        .map(|i| gappy_frame(f64::from(i) * 250.0, 10_000))
        .collect();
    let x_match = first_time_field();
    let y_match = visible_number_fields();

    c.bench_function("align_four_frames_10k", |b| {
        b.iter(|| {
            let aligned =
                align_frames(black_box(&frames), x_match.as_ref(), y_match.as_ref())
                    .expect("align");
            black_box(aligned.row_count());
        })
    });
}

fn bench_prepare_plot_4x2k(c: &mut Criterion) {
    let frames: Vec<Frame> = (0..4)
        .map(|i| gappy_frame(f64::from(i) * 250.0, 2_000))
        .collect();
    let options = PlotOptions::new(|| TimeRange {
        from: 0.0,
        to: 2_000_000.0,
    });

    c.bench_function("prepare_plot_4x2k", |b| {
        b.iter(|| {
            let plot = prepare_plot(frames.clone(), &options).expect("prepare");
            black_box(plot.config.series().len());
        })
    });
}

fn bench_cursor_sync_round_trip(c: &mut Criterion) {
    let frames = vec![gappy_frame(0.0, 5_000)];
    let options = PlotOptions::new(|| TimeRange {
        from: 0.0,
        to: 5_000_000.0,
    })
    .with_sync(SyncMode::Tooltip);
    let plot = prepare_plot(frames, &options).expect("prepare");
    let viewport = Viewport::new(1920, 1080);
    let bus = CursorBus::default();
    let cursor = CursorOptions {
        sync_throttle_ms: 0,
        ..plot.config.cursor()
    };
    let mut publisher = CursorSyncCoordinator::new(&bus, cursor);
    let mut consumer = CursorSyncCoordinator::new(&bus, cursor);
    publisher.attach(plot.hover_target(viewport).expect("target"));
    consumer.attach(plot.hover_target(viewport).expect("target"));

    let mut x = 0.0;
    c.bench_function("cursor_sync_round_trip", |b| {
        b.iter(|| {
            x = (x + 7.0) % 1_900.0;
            publisher.on_pointer_move(x, 10.0);
            black_box(consumer.poll());
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_round_trip,
    bench_null_threshold_10k,
    bench_align_four_frames_10k,
    bench_prepare_plot_4x2k,
    bench_cursor_sync_round_trip
);
criterion_main!(benches);
