//! Parsing of exiftool output.

use crate::error::ExifToolError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Split `-j` output into one JSON object per file.
///
/// exiftool prints nothing at all when no file produced output, so blank
/// input is an empty list rather than an error. Non-object entries are
/// skipped.
pub fn parse_json_output(output: &str) -> Result<Vec<Map<String, Value>>, ExifToolError> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<Value> =
        serde_json::from_str(output).map_err(|e| ExifToolError::MalformedOutput {
            reason: e.to_string(),
        })?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(object) => Some(object),
            _ => None,
        })
        .collect())
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?P<label>[^:]+?)\s*:\s*(?P<value>.*?)\s*$")
            .expect("text line pattern is valid")
    })
}

/// Parse text-mode output (`Label    : value` lines) into pairs.
///
/// Only the first colon separates label from value, so values such as
/// times keep theirs.
pub fn parse_text_output(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| line_pattern().captures(line))
        .map(|caps| (caps["label"].to_string(), caps["value"].to_string()))
        .collect()
}

/// Value of the first line whose label matches `label`, ignoring case.
pub fn find_text_value(output: &str, label: &str) -> Option<String> {
    parse_text_output(output)
        .into_iter()
        .find(|(l, _)| l.eq_ignore_ascii_case(label))
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_json_output_is_empty() {
        assert!(parse_json_output("").unwrap().is_empty());
        assert!(parse_json_output("  \n").unwrap().is_empty());
    }

    #[test]
    fn json_output_yields_objects() {
        let output = r#"[{"SourceFile":"a.jpg","FocalLength":35},{"SourceFile":"b.jpg"}]"#;
        let objects = parse_json_output(output).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0]["FocalLength"], 35);
    }

    #[test]
    fn truncated_json_is_malformed() {
        let err = parse_json_output(r#"[{"SourceFile":"a.jpg""#).unwrap_err();
        assert!(matches!(err, ExifToolError::MalformedOutput { .. }));
    }

    #[test]
    fn text_output_splits_on_first_colon() {
        let pairs = parse_text_output(
            "Shutter Count                   : 48213\nDate/Time Original              : 2024:05:01 10:11:12\n",
        );
        assert_eq!(pairs[0], ("Shutter Count".to_string(), "48213".to_string()));
        assert_eq!(pairs[1].1, "2024:05:01 10:11:12");
    }

    #[test]
    fn find_text_value_matches_label() {
        let output = "Shutter Count                   : 1234\n";
        assert_eq!(find_text_value(output, "shutter count"), Some("1234".to_string()));
        assert_eq!(find_text_value(output, "Focal Length"), None);
        assert_eq!(find_text_value("", "Shutter Count"), None);
    }
}
