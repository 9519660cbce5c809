// Caps assertion utilities
use expset::engine::Caps;

#[allow(dead_code)]
pub fn assert_caps_eq(actual: &Caps, expected: &str) {
    let expected_caps: Caps = expected
        .parse()
        .unwrap_or_else(|e| panic!("invalid expected caps '{}': {}", expected, e));
    assert_eq!(
        actual, &expected_caps,
        "Caps mismatch.\nActual:   {}\nExpected: {}",
        actual, expected_caps
    );
}

#[allow(dead_code)]
pub fn assert_caps_field(caps: &Caps, field: &str, rendered: &str) {
    let found = caps
        .structures()
        .iter()
        .filter_map(|s| s.get(field))
        .map(|v| v.to_string())
        .collect::<Vec<_>>();
    assert!(
        found.iter().any(|v| v == rendered),
        "Expected field '{}' to be {} in caps.\nFound: {:?}\nCaps: {}",
        field,
        rendered,
        found,
        caps
    );
}
