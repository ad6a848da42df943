use super::*;

#[test]
fn empty_object_is_all_defaults() {
    let cfg = SweepConfig::from_json("{}").unwrap();
    assert_eq!(cfg, SweepConfig::default());
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg = SweepConfig::from_json(
        r#"{
            "grid": { "cell_size": 200, "fps": { "num": 30, "den": 1 } },
            "extractor": { "stop_words": ["foo"] },
            "axes": { "x_contains": "steps" }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.grid.cell_size, 200);
    assert_eq!(cfg.grid.padding, 5);
    assert_eq!(cfg.grid.fps.num, 30);
    assert!(cfg.extractor.stop_words.contains("foo"));
    assert_eq!(cfg.extractor.timestamp_digits, 14);
    assert_eq!(cfg.axes.x_contains, "steps");
    assert_eq!(cfg.axes.y_contains, "cfg_scale_schedule");
    assert_eq!(cfg.backend, BackendOpts::default());
}

#[test]
fn unknown_sections_are_rejected() {
    let err = SweepConfig::from_json(r#"{ "gird": {} }"#).unwrap_err();
    assert!(matches!(err, SweepError::Serde(_)));
}

#[test]
fn invalid_values_fail_validation() {
    let cfg = SweepConfig::from_json(r#"{ "grid": { "cell_size": 0 } }"#).unwrap();
    assert!(matches!(cfg.validate(), Err(SweepError::Validation(_))));
}

#[test]
fn from_path_reads_file_and_names_it_in_errors() {
    let dir = std::path::PathBuf::from("target").join("unit_config");
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("good.json");
    std::fs::write(&good, r#"{ "backend": { "parallel": false } }"#).unwrap();
    assert!(!SweepConfig::from_path(&good).unwrap().backend.parallel);

    let bad = dir.join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    let err = SweepConfig::from_path(&bad).unwrap_err();
    assert!(err.to_string().contains("bad.json"));

    assert!(matches!(
        SweepConfig::from_path(&dir.join("missing.json")),
        Err(SweepError::Other(_))
    ));
}
