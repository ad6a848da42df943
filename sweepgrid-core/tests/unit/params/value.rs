use super::*;

#[test]
fn parse_infers_int_float_text() {
    assert!(matches!(ParameterValue::parse("7"), ParameterValue::Int(7)));
    assert!(matches!(ParameterValue::parse("-3"), ParameterValue::Int(-3)));
    assert!(matches!(ParameterValue::parse("0.4"), ParameterValue::Float(v) if v == 0.4));
    assert!(matches!(ParameterValue::parse("1e3"), ParameterValue::Float(v) if v == 1000.0));
    assert!(matches!(ParameterValue::parse("7.0"), ParameterValue::Float(v) if v == 7.0));
    assert!(matches!(ParameterValue::parse("euler"), ParameterValue::Text(ref s) if s == "euler"));
    assert!(matches!(ParameterValue::parse("0:(0.65)"), ParameterValue::Text(_)));
}

#[test]
fn numeric_values_sort_before_text() {
    let mut values = vec![
        ParameterValue::from("b"),
        ParameterValue::from(10i64),
        ParameterValue::from("a"),
        ParameterValue::from(2.5),
        ParameterValue::from(-1i64),
    ];
    values.sort();
    let labels: Vec<String> = values.iter().map(ParameterValue::label).collect();
    assert_eq!(labels, vec!["-1", "2.5", "10", "a", "b"]);
}

#[test]
fn numeric_text_sorts_numerically_not_lexically() {
    let mut values: Vec<ParameterValue> = ["10", "9", "0.5", "100"]
        .into_iter()
        .map(ParameterValue::parse)
        .collect();
    values.sort();
    let labels: Vec<String> = values.iter().map(ParameterValue::label).collect();
    assert_eq!(labels, vec!["0.5", "9", "10", "100"]);
}

#[test]
fn int_and_float_with_same_magnitude_are_equal() {
    assert_eq!(ParameterValue::Int(2), ParameterValue::Float(2.0));
    let set: std::collections::BTreeSet<_> =
        [ParameterValue::Int(2), ParameterValue::Float(2.0)].into();
    assert_eq!(set.len(), 1);
}

#[test]
fn sort_is_stable_for_equal_duplicates() {
    let mut values = vec![
        (ParameterValue::Int(1), "first"),
        (ParameterValue::from("x"), "text"),
        (ParameterValue::Float(1.0), "second"),
    ];
    values.sort_by(|a, b| a.0.cmp(&b.0));
    let tags: Vec<&str> = values.iter().map(|(_, t)| *t).collect();
    assert_eq!(tags, vec!["first", "second", "text"]);
}

#[test]
fn labels_keep_float_shape() {
    assert_eq!(ParameterValue::Float(7.0).label(), "7.0");
    assert_eq!(ParameterValue::Float(0.65).label(), "0.65");
    assert_eq!(ParameterValue::Int(7).label(), "7");
}

#[test]
fn numeric_token_check_accepts_float_literals_only() {
    assert!(is_numeric_token("42"));
    assert!(is_numeric_token("0.5"));
    assert!(!is_numeric_token("v2"));
    assert!(!is_numeric_token(""));
}
