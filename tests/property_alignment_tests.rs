use plot_prep::core::{
    Field, Frame, Value, align_frames, apply_null_threshold, first_time_field,
    visible_number_fields,
};
use proptest::prelude::*;

fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop::collection::vec((-50i32..50, prop::option::of(-1_000.0f64..1_000.0)), 0..24).prop_map(
        |rows| {
            let keys: Vec<f64> = rows.iter().map(|(key, _)| f64::from(*key)).collect();
            let values: Vec<Option<f64>> = rows.iter().map(|(_, value)| *value).collect();
            Frame::new(vec![Field::time("time", keys), Field::number("v", values)])
        },
    )
}

fn series_strategy() -> impl Strategy<Value = (Vec<Value>, Vec<Value>)> {
    prop::collection::vec((0.0f64..10.0, prop::option::of(-5.0f64..5.0)), 1..32).prop_map(
        |rows| {
            let mut x = 0.0;
            let mut refs = Vec::with_capacity(rows.len());
            let mut values = Vec::with_capacity(rows.len());
            for (step, value) in rows {
                x += step + 0.001;
                refs.push(Value::Number(x));
                values.push(Value::from(value));
            }
            (refs, values)
        },
    )
}

proptest! {
    #[test]
    fn join_column_is_strictly_ascending_property(
        frames in prop::collection::vec(frame_strategy(), 0..5)
    ) {
        let aligned = align_frames(
            &frames,
            first_time_field().as_ref(),
            visible_number_fields().as_ref(),
        )
        .expect("align");

        let keys = aligned.x_values();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        for (_, field) in aligned.value_fields() {
            prop_assert_eq!(field.len(), keys.len());
        }
    }

    #[test]
    fn null_threshold_is_idempotent_property(
        (refs, values) in series_strategy(),
        threshold in 0.001f64..30.0
    ) {
        let mut once = values.clone();
        apply_null_threshold(&refs, &mut once, threshold);
        let mut twice = once.clone();
        let rewritten = apply_null_threshold(&refs, &mut twice, threshold);

        prop_assert_eq!(rewritten, 0);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn interior_run_spans_iff_bounds_closer_than_threshold_property(
        left in -100.0f64..100.0,
        run in 1usize..6,
        distance in 0.01f64..50.0,
        threshold in 0.01f64..50.0
    ) {
        let len = run + 2;
        let step = distance / (len - 1) as f64;
        let refs: Vec<Value> = (0..len)
            .map(|index| Value::Number(left + step * index as f64))
            .collect();
        let mut values = vec![Value::Null; len];
        values[0] = Value::Number(1.0);
        values[len - 1] = Value::Number(1.0);
        let bound = match (&refs[0], &refs[len - 1]) {
            (Value::Number(first), Value::Number(last)) => last - first,
            _ => unreachable!(),
        };

        apply_null_threshold(&refs, &mut values, threshold);

        let expected = if bound < threshold { Value::Undefined } else { Value::Null };
        prop_assert!(values[1..len - 1].iter().all(|value| *value == expected));
    }
}
