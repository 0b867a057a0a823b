use plot_prep::core::{ColorConfig, ColorMode, ThresholdStep, ThresholdsConfig};
use plot_prep::render::{Color, Theme};

#[test]
fn hex_colors_parse_with_optional_alpha() {
    let opaque = Color::from_hex("#ff8000").expect("rgb");
    assert_eq!(opaque.to_hex(), "#ff8000");
    assert!((opaque.alpha - 1.0).abs() <= 1e-12);

    let translucent = Color::from_hex("#ff800080").expect("rgba");
    assert_eq!(translucent.to_hex(), "#ff800080");

    assert!(Color::from_hex("#ff80").is_err());
    assert!(Color::from_hex("#gg0000").is_err());
}

#[test]
fn with_alpha_is_clamped() {
    let color = Color::rgb(1.0, 0.0, 0.0);
    assert_eq!(color.with_alpha(2.0).alpha, 1.0);
    assert_eq!(color.with_alpha(-1.0).alpha, 0.0);
}

#[test]
fn named_colors_depend_on_theme() {
    let dark = Theme::dark().color("green").expect("dark green");
    let light = Theme::light().color("Green").expect("light green");

    assert_eq!(dark.to_hex(), "#73bf69");
    assert_eq!(light.to_hex(), "#56a64b");
    assert_ne!(dark, light);
    assert!(Theme::dark().color("no-such-color").is_none());
}

#[test]
fn palette_wraps_around() {
    let theme = Theme::dark();
    assert_eq!(theme.palette_color(0), theme.palette_color(10));
    assert_ne!(theme.palette_color(0), theme.palette_color(1));
}

#[test]
fn series_color_modes() {
    let theme = Theme::light();
    let fixed = ColorConfig {
        mode: ColorMode::Fixed,
        fixed_color: Some("#123456".to_owned()),
    };
    let thresholds = ThresholdsConfig {
        steps: vec![ThresholdStep {
            value: None,
            color: "red".to_owned(),
        }],
    };
    let by_thresholds = ColorConfig {
        mode: ColorMode::Thresholds,
        fixed_color: None,
    };

    assert_eq!(theme.series_color(Some(&fixed), None, 4).to_hex(), "#123456");
    assert_eq!(
        theme.series_color(Some(&by_thresholds), Some(&thresholds), 4),
        theme.color("red").expect("red")
    );
    assert_eq!(theme.series_color(None, None, 4), theme.palette_color(4));
}

#[test]
fn unknown_fixed_color_falls_back_to_palette() {
    let theme = Theme::dark();
    let broken = ColorConfig {
        mode: ColorMode::Fixed,
        fixed_color: Some("chartreuse-ish".to_owned()),
    };

    assert_eq!(
        theme.series_color(Some(&broken), None, 1),
        theme.palette_color(1)
    );
}
