use std::sync::Arc;

use plot_prep::api::{Band, Reducer, StackOrder, stack_groups, stack_values, stacking_bands};
use plot_prep::core::{
    AlignedFrame, Field, Frame, StackingConfig, StackingMode, Value, align_frames,
    first_time_field, visible_number_fields,
};

fn aligned(fields: Vec<Field>) -> AlignedFrame {
    let rows = fields[0].len();
    let mut all = vec![Field::time("time", (0..rows).map(|x| x as f64))];
    all.extend(fields);
    align_frames(
        &[Frame::new(all)],
        first_time_field().as_ref(),
        visible_number_fields().as_ref(),
    )
    .expect("align")
}

#[test]
fn group_of_n_emits_n_minus_one_bands_top_down() {
    let frame = aligned(vec![
        Field::number("a", [Some(1.0)]),
        Field::number("b", [Some(1.0)]),
        Field::number("c", [Some(1.0)]),
    ]);
    let normal = StackingConfig::new(StackingMode::Normal, "A");
    let groups = stack_groups(
        [(1, &normal), (2, &normal), (3, &normal)],
        &frame,
        &StackOrder::FieldOrder,
    );

    let bands = stacking_bands(&groups);

    assert_eq!(bands, vec![Band::new(3, 2), Band::new(2, 1)]);
}

#[test]
fn unstacked_fields_and_single_member_groups_emit_nothing() {
    let frame = aligned(vec![
        Field::number("a", [Some(1.0)]),
        Field::number("b", [Some(1.0)]),
    ]);
    let unstacked = StackingConfig::default();
    let alone = StackingConfig::new(StackingMode::Normal, "solo");
    let groups = stack_groups([(1, &unstacked), (2, &alone)], &frame, &StackOrder::FieldOrder);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members, vec![2]);
    assert!(stacking_bands(&groups).is_empty());
}

#[test]
fn groups_are_independent() {
    let frame = aligned(vec![
        Field::number("a", [Some(1.0)]),
        Field::number("b", [Some(1.0)]),
        Field::number("c", [Some(1.0)]),
        Field::number("d", [Some(1.0)]),
    ]);
    let first = StackingConfig::new(StackingMode::Normal, "A");
    let second = StackingConfig::new(StackingMode::Normal, "B");
    let groups = stack_groups(
        [(1, &first), (2, &second), (3, &first), (4, &second)],
        &frame,
        &StackOrder::FieldOrder,
    );

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].members, vec![1, 3]);
    assert_eq!(groups[1].members, vec![2, 4]);
    assert_eq!(
        stacking_bands(&groups),
        vec![Band::new(3, 1), Band::new(4, 2)]
    );
}

#[test]
fn reducer_orders_members_with_stable_ties() {
    let frame = aligned(vec![
        Field::number("big", [Some(1.0), Some(9.0)]),
        Field::number("small", [Some(5.0), Some(1.0)]),
        Field::number("tie", [Some(0.0), Some(1.0)]),
    ]);
    let normal = StackingConfig::new(StackingMode::Normal, "A");
    let groups = stack_groups(
        [(1, &normal), (2, &normal), (3, &normal)],
        &frame,
        &StackOrder::Reduce(Reducer::Last),
    );

    assert_eq!(groups[0].members, vec![2, 3, 1]);
    assert_eq!(
        stacking_bands(&groups),
        vec![Band::new(1, 3), Band::new(3, 2)]
    );
}

#[test]
fn custom_order_function_is_honored() {
    let frame = aligned(vec![
        Field::number("a", [Some(1.0)]),
        Field::number("b", [Some(1.0)]),
    ]);
    let normal = StackingConfig::new(StackingMode::Normal, "A");
    let by_name_desc = StackOrder::Custom(Arc::new(|field: &Field| {
        Some(-f64::from(u32::from(field.name.as_bytes()[0])))
    }));
    let groups = stack_groups([(1, &normal), (2, &normal)], &frame, &by_name_desc);

    assert_eq!(groups[0].members, vec![2, 1]);
}

#[test]
fn reducers_skip_missing_cells() {
    let values = vec![
        Value::Number(3.0),
        Value::Null,
        Value::Number(1.0),
        Value::Undefined,
    ];
    assert_eq!(Reducer::Last.reduce(&values), Some(1.0));
    assert_eq!(Reducer::Min.reduce(&values), Some(1.0));
    assert_eq!(Reducer::Max.reduce(&values), Some(3.0));
    assert_eq!(Reducer::Mean.reduce(&values), Some(2.0));
    assert_eq!(Reducer::Max.reduce(&[Value::Null]), None);
}

#[test]
fn normal_stack_accumulates_running_sums() {
    let frame = aligned(vec![
        Field::number("a", [Some(1.0), Some(2.0), None]),
        Field::number("b", [Some(10.0), None, Some(5.0)]),
    ]);
    let normal = StackingConfig::new(StackingMode::Normal, "A");
    let groups = stack_groups([(1, &normal), (2, &normal)], &frame, &StackOrder::FieldOrder);

    let stacked = stack_values(&frame, &groups);

    assert_eq!(stacked.len(), 2);
    assert_eq!(stacked[0].values, vec![Some(1.0), Some(2.0), None]);
    assert_eq!(stacked[1].values, vec![Some(11.0), None, Some(5.0)]);
}

#[test]
fn percent_stack_divides_by_row_total() {
    let frame = aligned(vec![
        Field::number("a", [Some(1.0), Some(0.0)]),
        Field::number("b", [Some(3.0), Some(0.0)]),
    ]);
    let percent = StackingConfig::new(StackingMode::Percent, "A");
    let groups = stack_groups([(1, &percent), (2, &percent)], &frame, &StackOrder::FieldOrder);

    let stacked = stack_values(&frame, &groups);

    assert_eq!(stacked[0].values, vec![Some(0.25), Some(0.0)]);
    assert_eq!(stacked[1].values, vec![Some(1.0), Some(0.0)]);
}
