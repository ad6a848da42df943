use super::*;

fn extractor() -> Extractor {
    Extractor::new(&ExtractorConfig::default()).unwrap()
}

#[test]
fn schedule_pair_short_circuits_with_canonical_names() {
    let params = extractor().extract("20250610233650_A_strength_schedule_0.4_cfg_scale_schedule_7");
    assert_eq!(params.len(), 2);
    assert_eq!(
        params.get("strength_schedule"),
        Some(&ParameterValue::Float(0.4))
    );
    assert_eq!(
        params.get("cfg_scale_schedule"),
        Some(&ParameterValue::Int(7))
    );
}

#[test]
fn timestamp_never_survives_as_name_or_value() {
    let ex = extractor();
    for folder in [
        "20250610233650_seed_42",
        "run_20250610233650_steps_30",
        "20250610233650",
        "20250610233650_20250610233651_cfg_7",
    ] {
        let params = ex.extract(folder);
        for (name, value) in params.iter() {
            assert!(!name.contains("20250610233650"), "{folder}: name {name}");
            assert!(!name.contains("20250610233651"), "{folder}: name {name}");
            assert_ne!(value.label(), "20250610233650", "{folder}");
        }
    }
}

#[test]
fn strip_timestamps_removes_trailing_separator() {
    let ex = extractor();
    assert_eq!(ex.strip_timestamps("20250610233650_A"), "A");
    assert_eq!(ex.strip_timestamps("A_20250610233650"), "A_");
    assert_eq!(ex.strip_timestamps("A_123"), "A_123");
}

#[test]
fn stop_words_are_skipped_unless_value_is_numeric() {
    let ex = extractor();
    assert!(ex.extract("fixed_prompt").is_empty());
    assert!(ex.extract("BEST_run").is_empty());
    let params = ex.extract("seed_42");
    assert_eq!(params.get("seed"), Some(&ParameterValue::Int(42)));
}

#[test]
fn numeric_names_are_skipped() {
    assert!(extractor().extract("123_abc").is_empty());
}

#[test]
fn stop_list_is_configurable() {
    let default = extractor();
    assert_eq!(
        default.extract("quality_high").get("quality"),
        Some(&ParameterValue::from("high"))
    );

    let custom = Extractor::new(&ExtractorConfig {
        stop_words: ["Quality".to_string()].into(),
        ..ExtractorConfig::default()
    })
    .unwrap();
    assert!(custom.extract("quality_high").is_empty());
    // Words dropped from the list are ordinary names again.
    assert!(!custom.extract("fixed_prompt").is_empty());
}

#[test]
fn two_axis_quadruple_overwrites_token_pairs() {
    let params = extractor().extract("A_steps_10_cfg_7");
    assert_eq!(params.get("steps"), Some(&ParameterValue::Int(10)));
    assert_eq!(params.get("cfg"), Some(&ParameterValue::Int(7)));
}

#[test]
fn dash_separated_pairs_are_recognized() {
    let params = extractor().extract("sampler-euler_steps-30");
    assert_eq!(params.get("sampler"), Some(&ParameterValue::from("euler")));
    assert_eq!(params.get("steps"), Some(&ParameterValue::Int(30)));
    assert!(params.iter().all(|(name, _)| !name.starts_with('_')));
}

#[test]
fn dash_pairs_after_a_separator_keep_a_clean_name() {
    // Only the token-pair strategy reaches the third pair.
    let params = extractor().extract("a-1_b-2_c-3");
    assert_eq!(params.get("c"), Some(&ParameterValue::Int(3)));
    assert_eq!(params.get("_c"), None);
}

#[test]
fn unparsable_names_yield_empty_maps() {
    let ex = extractor();
    assert!(ex.extract("").is_empty());
    assert!(ex.extract("justaname").is_empty());
    assert!(ex.extract("20250610233650").is_empty());
}

#[test]
fn strategies_run_in_documented_order() {
    let names: Vec<&str> = extractor().strategies().iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["schedule_pair", "token_pairs", "two_axis"]);
    assert_eq!(extractor().strategies()[0].merge, MergePolicy::Exclusive);
}

#[test]
fn zero_timestamp_digits_is_rejected() {
    let err = Extractor::new(&ExtractorConfig {
        timestamp_digits: 0,
        ..ExtractorConfig::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains("timestamp_digits"));
}
