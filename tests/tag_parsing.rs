// tests/tag_parsing.rs
use genz_model::{parse_tags, ExtractError, Tags};
use proptest::prelude::*;
use rstest::rstest;

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[rstest]
#[case::empty("", &[])]
#[case::empty_backquotes("``", &[])]
#[case::one("`json:\"name\"`", &[("json", "name")])]
#[case::two("`json:\"name\" xml:\"name\"`", &[("json", "name"), ("xml", "name")])]
#[case::options("`json:\"name,omitempty\"`", &[("json", "name,omitempty")])]
#[case::options_with_space("`json:\"name, omitempty\"`", &[("json", "name, omitempty")])]
#[case::two_with_options(
    "`json:\"name,omitempty\" xml:\"name\"`",
    &[("json", "name,omitempty"), ("xml", "name")]
)]
#[case::extra_spaces("`json:\"a\"   db:\"b\" `", &[("json", "a"), ("db", "b")])]
#[case::empty_value("`json:\"\"`", &[("json", "")])]
#[case::interpreted("\"json:\\\"id\\\"\"", &[("json", "id")])]
#[case::octal_escapes(r#""json:\"\101\102\"""#, &[("json", "AB")])]
#[case::octal_utf8_bytes(r#""json:\"caf\303\251\"""#, &[("json", "café")])]
#[case::hex_escape(r#""json:\"\x41\"""#, &[("json", "A")])]
fn well_formed(#[case] raw: &str, #[case] expected: &[(&str, &str)]) {
    assert_eq!(parse_tags(raw).unwrap(), tags(expected));
}

#[rstest]
#[case::missing_closing_backquote("`json:\"name\" xml\"name\"")]
#[case::missing_colon("`json:\"name\" xml\"name\"`")]
#[case::unquoted_value("`json:name`")]
#[case::bare_key("`json`")]
#[case::unterminated_value("`json:\"name`")]
#[case::no_separator("`json:\"a\"xml:\"b\"`")]
#[case::empty_key("`:\"a\"`")]
#[case::octal_out_of_range(r#""json:\"\400\"""#)]
#[case::invalid_utf8_bytes(r#""json:\"\377\"""#)]
fn malformed(#[case] raw: &str) {
    let err = parse_tags(raw).unwrap_err();
    assert!(matches!(err, ExtractError::MalformedTag { .. }), "{err:?}");
}

#[test]
fn malformed_error_names_the_offending_pair() {
    let err = parse_tags("`json:\"name\" xml\"name\"`").unwrap_err();
    assert_eq!(
        err,
        ExtractError::MalformedTag {
            tag: "`json:\"name\" xml\"name\"`".into(),
            offending: "xml\"name\"".into(),
        }
    );
}

#[test]
fn repeated_key_keeps_first_position_and_last_value() {
    let parsed = parse_tags("`a:\"1\" b:\"2\" a:\"3\"`").unwrap();
    let pairs: Vec<_> = parsed.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(pairs, [("a", "3"), ("b", "2")]);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn values_round_trip_verbatim(
        pairs in prop::collection::vec(("[a-z][a-z0-9_]{0,7}", "[a-zA-Z0-9 ,=_-]{0,12}"), 0..6)
    ) {
        let raw = format!(
            "`{}`",
            pairs
                .iter()
                .map(|(k, v)| format!("{k}:\"{v}\""))
                .collect::<Vec<_>>()
                .join(" ")
        );
        let parsed = parse_tags(&raw).unwrap();

        let mut expected = Tags::new();
        for (k, v) in &pairs {
            expected.insert(k.clone(), v.clone());
        }
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn never_panics(raw in ".{0,40}") {
        let _ = parse_tags(&raw);
    }
}
