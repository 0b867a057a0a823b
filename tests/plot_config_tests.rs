use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use plot_prep::api::{
    Band, CustomRenderer, PlotConfigBuilder, PlotOptions, X_SCALE_KEY, prepare_plot,
};
use plot_prep::core::{
    Field, FieldConfig, FieldCustomConfig, Frame, SpanNulls, StackingConfig, StackingMode,
    TimeRange, Value, Viewport,
};
use plot_prep::extensions::{HookEvent, HookPayload, Rect};
use plot_prep::interaction::{CursorBus, CursorOptions, CursorSyncCoordinator, SyncMode};
use plot_prep::render::{NullRenderer, Renderer};
use plot_prep::{PlotError, PreparedPlot};

fn options() -> PlotOptions {
    PlotOptions::new(|| TimeRange::new(0.0, 4.0).expect("valid range"))
}

fn stacked(name: &str, values: [Option<f64>; 5]) -> Field {
    Field::number(name, values).with_config(FieldConfig {
        custom: FieldCustomConfig {
            stacking: Some(StackingConfig::new(StackingMode::Normal, "A")),
            ..FieldCustomConfig::default()
        },
        ..FieldConfig::default()
    })
}

fn two_queries() -> Vec<Frame> {
    vec![
        Frame::new(vec![
            Field::time("time", [0.0, 1.0, 2.0, 3.0, 4.0]),
            stacked("a", [Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0)]),
            stacked("b", [Some(2.0), Some(2.0), Some(2.0), Some(2.0), Some(2.0)]),
        ])
        .with_ref_id("A"),
        Frame::new(vec![
            Field::time("time", [0.0, 1.0, 2.0, 3.0, 4.0]),
            stacked("c", [Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0)]),
        ])
        .with_ref_id("B"),
    ]
}

#[test]
fn prepare_plot_assembles_full_configuration() {
    let plot = prepare_plot(two_queries(), &options()).expect("prepare");

    assert_eq!(plot.frame.row_count(), 5);
    let config = &plot.config;
    assert_eq!(config.series().len(), 3);
    assert!(config.scale(X_SCALE_KEY).is_some());
    assert_eq!(config.scales().len(), 2);
    assert_eq!(
        config.bands(),
        &[Band::new(3, 2), Band::new(2, 1)]
    );
    assert_eq!(plot.stacked_values(3), Some(&[Some(6.0); 5][..]));
    assert_eq!(plot.stack_groups.len(), 1);
}

#[test]
fn span_nulls_threshold_runs_before_alignment() {
    let frames = vec![Frame::new(vec![
        Field::time("time", [0.0, 1.0, 2.0, 3.0]),
        Field::number("a", [Some(5.0), None, None, Some(5.0)]).with_config(FieldConfig {
            custom: FieldCustomConfig {
                span_nulls: Some(SpanNulls::Threshold(4.0)),
                ..FieldCustomConfig::default()
            },
            ..FieldConfig::default()
        }),
    ])];

    let plot = prepare_plot(frames, &options()).expect("prepare");

    let values = &plot.frame.field(1).expect("a").values;
    assert_eq!(values[1], Value::Undefined);
    assert_eq!(values[2], Value::Undefined);
}

#[test]
fn missing_join_field_yields_empty_but_mountable_config() {
    let frames = vec![Frame::new(vec![Field::number("a", [Some(1.0)])])];
    let plot = prepare_plot(frames, &options()).expect("prepare");

    assert!(plot.is_empty());
    assert!(plot.config.is_empty());
    assert!(plot.config.scales().is_empty());

    let mut renderer = NullRenderer::default();
    renderer.mount(&plot).expect("mount empty");
    assert_eq!(renderer.last_series_count, 0);
}

#[test]
fn no_frames_is_not_an_error() {
    let plot = prepare_plot(Vec::new(), &options()).expect("prepare");
    assert!(plot.is_empty());
}

#[test]
fn structural_mismatch_is_reported() {
    let frames = vec![Frame::new(vec![
        Field::time("time", [0.0, 1.0]),
        Field::number("a", [Some(1.0), Some(2.0), Some(3.0)]),
    ])];

    let err = prepare_plot(frames, &options()).expect_err("mismatch");
    assert!(matches!(err, PlotError::FieldLengthMismatch { .. }));
}

#[test]
fn unresolved_custom_renderer_does_not_abort_other_fields() {
    let options = options().with_custom_renderer(CustomRenderer::new("nope", "cells"));
    let plot = prepare_plot(two_queries(), &options).expect("prepare");

    assert_eq!(plot.config.series().len(), 3);
}

#[test]
fn every_build_starts_from_declared_inputs() {
    let options = options();
    let first = prepare_plot(two_queries(), &options).expect("first");
    let second = prepare_plot(two_queries(), &options).expect("second");

    assert_eq!(first.config.series(), second.config.series());
    assert_eq!(first.config.bands(), second.config.bands());
    assert_eq!(first.config.scales().len(), second.config.scales().len());
}

#[test]
fn hooks_run_in_registration_order_for_their_event() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&calls);
    let second = Arc::clone(&calls);
    let legend = Arc::clone(&calls);
    let options = options()
        .with_hook(HookEvent::Init, move |payload| {
            if let HookPayload::Init { series_count } = payload {
                first
                    .lock()
                    .expect("lock")
                    .push(format!("first:{series_count}"));
            }
        })
        .with_hook(HookEvent::Init, move |_| {
            second.lock().expect("lock").push("second".to_owned());
        })
        .with_hook(HookEvent::SetLegend, move |_| {
            legend.lock().expect("lock").push("legend".to_owned());
        });

    let plot = prepare_plot(two_queries(), &options).expect("prepare");
    let mut renderer = NullRenderer::default();
    renderer.mount(&plot).expect("mount");

    assert_eq!(renderer.last_series_count, 3);
    assert_eq!(renderer.last_band_count, 2);
    assert_eq!(renderer.last_row_count, 5);
    assert_eq!(
        *calls.lock().expect("lock"),
        vec!["first:3".to_owned(), "second".to_owned()]
    );

    let ran = plot.config.dispatch(&HookPayload::SetLegend {
        data_index: Some(2),
    });
    assert_eq!(ran, 1);
    assert_eq!(plot.config.hooks().count(HookEvent::SyncRect), 0);
}

#[test]
fn builder_dedupes_scales_and_snapshots_config() {
    let source = prepare_plot(two_queries(), &options()).expect("prepare");
    let x = source.config.scale(X_SCALE_KEY).expect("x").clone();

    let mut builder = PlotConfigBuilder::new();
    assert!(builder.add_scale(x.clone()));
    assert!(!builder.add_scale(x));
    builder.set_cursor(CursorOptions::default());
    builder.set_sync(SyncMode::Crosshair);
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);
    builder.add_hook(HookEvent::SyncRect, move |payload| {
        if let HookPayload::SyncRect { rect } = payload {
            assert!(rect.width > 0.0);
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });

    let snapshot = builder.get_config();
    builder.add_band(Band::new(1, 2));

    assert_eq!(snapshot.scales().len(), 1);
    assert_eq!(snapshot.sync(), SyncMode::Crosshair);
    assert!(snapshot.bands().is_empty());
    assert_eq!(builder.get_config().bands().len(), 1);
    snapshot.dispatch(&HookPayload::SyncRect {
        rect: Rect {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 50.0,
        },
    });
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn mount_rejects_band_without_series() {
    let mut plot: PreparedPlot = prepare_plot(two_queries(), &options()).expect("prepare");
    let mut builder = PlotConfigBuilder::new();
    for scale in plot.config.scales().values() {
        builder.add_scale(scale.clone());
    }
    for series in plot.config.series() {
        builder.add_series(series.clone());
    }
    builder.add_band(Band::new(1, 42));
    plot.config = builder.get_config();

    let err = NullRenderer::default().mount(&plot).expect_err("dangling band");
    assert!(matches!(err, PlotError::InvalidData(_)));
}

#[test]
fn prepared_plot_drives_cursor_sync() {
    let options = options().with_sync(SyncMode::Tooltip);
    let plot = prepare_plot(two_queries(), &options).expect("prepare");
    assert_eq!(plot.config.sync(), SyncMode::Tooltip);

    let bus = CursorBus::default();
    let viewport = Viewport::new(400, 200);
    let mut panel_a = CursorSyncCoordinator::new(&bus, plot.config.cursor());
    let mut panel_b = CursorSyncCoordinator::new(&bus, plot.config.cursor());
    panel_a.attach(plot.hover_target(viewport).expect("target"));
    panel_b.attach(plot.hover_target(viewport).expect("target"));

    assert!(panel_a.on_pointer_move(300.0, 20.0));
    assert!(panel_b.poll());
    assert_eq!(panel_b.cursor().data_index, Some(3));
    assert_eq!(panel_b.cursor().series_indices, vec![3, 3, 3]);
}

#[test]
fn hover_target_follows_moving_time_window() {
    let window = Arc::new(Mutex::new(TimeRange::new(0.0, 9.0).expect("valid range")));
    let source = Arc::clone(&window);
    let options = PlotOptions::new(move || *source.lock().expect("window lock"))
        .with_sync(SyncMode::Crosshair);
    let frames = vec![Frame::new(vec![
        Field::time("time", (0..20).map(f64::from)),
        Field::number("a", (0..20).map(|i| Some(f64::from(i)))),
    ])];
    let plot = prepare_plot(frames, &options).expect("prepare");

    let bus = CursorBus::default();
    let viewport = Viewport::new(90, 50);
    let mut panel_a = CursorSyncCoordinator::new(
        &bus,
        CursorOptions {
            sync_throttle_ms: 0,
            ..plot.config.cursor()
        },
    );
    let mut panel_b = CursorSyncCoordinator::new(&bus, plot.config.cursor());
    panel_a.attach(plot.hover_target(viewport).expect("target"));
    panel_b.attach(plot.hover_target(viewport).expect("target"));

    panel_a.on_pointer_move(20.0, 10.0);
    assert_eq!(panel_a.cursor().data_index, Some(2));

    *window.lock().expect("window lock") = TimeRange::new(10.0, 19.0).expect("valid range");
    assert_eq!(
        plot.x_scale().expect("x scale").domain(),
        (10.0, 19.0)
    );

    assert!(panel_a.on_pointer_move(20.0, 10.0));
    assert_eq!(panel_a.cursor().data_index, Some(12));
    assert!(panel_b.poll());
    assert_eq!(panel_b.cursor().data_index, Some(12));
    let left = panel_b.cursor().left.expect("mirrored position");
    assert!((left - 20.0).abs() < 1e-9);
}
