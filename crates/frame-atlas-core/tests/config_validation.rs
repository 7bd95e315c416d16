use frame_atlas_core::prelude::*;

#[test]
fn zero_dimensions_are_rejected() {
    let cfg = PackConfig {
        max_width: 0,
        max_height: 512,
        ..Default::default()
    };
    match cfg.validate() {
        Err(AtlasError::InvalidDimensions { width, height }) => {
            assert_eq!((width, height), (0, 512));
        }
        other => panic!("expected InvalidDimensions, got {:?}", other),
    }
}

#[test]
fn padding_that_fills_the_sheet_is_rejected() {
    let cfg = PackConfig::builder()
        .with_max_dimensions(16, 16)
        .padding(16)
        .build();
    match cfg.validate() {
        Err(AtlasError::InvalidConfig(msg)) => assert!(msg.contains("padding")),
        other => panic!("expected InvalidConfig, got {:?}", other),
    }
}

#[test]
fn power_of_two_needs_power_of_two_maxima() {
    let cfg = PackConfig::builder()
        .with_max_dimensions(1000, 1024)
        .pow2(true)
        .build();
    assert!(matches!(cfg.validate(), Err(AtlasError::InvalidConfig(_))));
    let ok = PackConfig::builder()
        .with_max_dimensions(1024, 512)
        .pow2(true)
        .build();
    assert!(ok.validate().is_ok());
}

#[test]
fn build_rejects_invalid_config_before_packing() {
    let store = FrameStore::new(PixelFormat::Straight);
    let cfg = PackConfig {
        max_height: 0,
        ..Default::default()
    };
    assert!(matches!(
        build_atlas(&store, &cfg),
        Err(AtlasError::InvalidDimensions { .. })
    ));
}

#[test]
fn defaults_and_serde_defaults_agree() {
    let cfg = PackConfig::default();
    assert_eq!((cfg.max_width, cfg.max_height), (1024, 1024));
    assert_eq!(cfg.padding, 0);
    assert!(cfg.allow_multiple_sheets);
    assert!(!cfg.allow_rotation);
    assert!(cfg.detect_duplicates);

    let parsed: PackConfig = serde_json::from_str("{}").expect("all fields default");
    assert_eq!(parsed, cfg);

    let parsed: PackConfig =
        serde_json::from_str(r#"{"padding": 2, "split": "longer_axis"}"#).unwrap();
    assert_eq!(parsed.padding, 2);
    assert_eq!(parsed.split, SplitRule::LongerAxis);
}

#[test]
fn split_rule_parses_short_names() {
    assert_eq!("slas".parse::<SplitRule>(), Ok(SplitRule::ShorterLeftoverAxis));
    assert_eq!("MinAs".parse::<SplitRule>(), Ok(SplitRule::MinimizeArea));
    assert_eq!("longer_axis".parse::<SplitRule>(), Ok(SplitRule::LongerAxis));
    assert!("diagonal".parse::<SplitRule>().is_err());
}
