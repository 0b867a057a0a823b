use plot_prep::api::ValueFormat;
use plot_prep::core::Value;

fn fmt(unit: Option<&str>, decimals: Option<u8>, value: f64) -> String {
    ValueFormat::new(unit.map(str::to_owned), decimals)
        .format_number(value)
        .to_string()
}

#[test]
fn plain_numbers_trim_trailing_zeros() {
    assert_eq!(fmt(None, None, 1.5), "1.5");
    assert_eq!(fmt(None, None, 2.0), "2");
    assert_eq!(fmt(None, None, 1.23456), "1.23");
    assert_eq!(fmt(None, None, -0.001), "0");
    assert_eq!(fmt(Some("none"), Some(3), 1.5), "1.500");
}

#[test]
fn short_and_bytes_scale_by_steps() {
    assert_eq!(fmt(Some("short"), None, 1_500.0), "1.5 K");
    assert_eq!(fmt(Some("short"), None, 2_000_000.0), "2 Mil");
    assert_eq!(fmt(Some("short"), None, 12.0), "12");
    assert_eq!(fmt(Some("bytes"), None, 512.0), "512 B");
    assert_eq!(fmt(Some("bytes"), Some(1), 1_048_576.0), "1.0 MiB");
}

#[test]
fn percent_units() {
    assert_eq!(fmt(Some("percent"), None, 42.0), "42%");
    assert_eq!(fmt(Some("percentunit"), None, 0.125), "12.5%");
    assert_eq!(ValueFormat::percent_unit(Some(0)).format_number(0.5).to_string(), "50%");
}

#[test]
fn durations_pick_a_readable_unit() {
    assert_eq!(fmt(Some("ms"), None, 250.0), "250 ms");
    assert_eq!(fmt(Some("ms"), None, 1_500.0), "1.5 s");
    assert_eq!(fmt(Some("s"), None, 90.0), "1.5 min");
    assert_eq!(fmt(Some("s"), None, 7_200.0), "2 hour");
    assert_eq!(fmt(Some("s"), None, 172_800.0), "2 day");
}

#[test]
fn date_time_as_iso() {
    assert_eq!(
        fmt(Some("dateTimeAsIso"), None, 1_700_000_000_000.0),
        "2023-11-14 22:13:20"
    );
}

#[test]
fn unknown_unit_becomes_suffix() {
    let formatted = ValueFormat::new(Some("req/s".to_owned()), None).format_number(3.0);
    assert_eq!(formatted.text, "3");
    assert_eq!(formatted.suffix, " req/s");
}

#[test]
fn non_finite_and_missing_values() {
    assert_eq!(fmt(Some("short"), None, f64::NAN), "NaN");
    assert_eq!(fmt(None, None, f64::INFINITY), "Inf");
    assert_eq!(fmt(None, None, f64::NEG_INFINITY), "-Inf");

    let format = ValueFormat::default();
    assert_eq!(format.format(&Value::Null).to_string(), "");
    assert_eq!(format.format(&Value::Undefined).to_string(), "");
    assert_eq!(format.format(&Value::from("up")).to_string(), "up");
    assert_eq!(format.format(&Value::Bool(true)).to_string(), "true");
}
