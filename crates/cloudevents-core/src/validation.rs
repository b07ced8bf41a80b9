use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Optional scheme followed by characters legal in a URI reference.
const URI_REFERENCE_PATTERN: &str = r#"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?[^\s<>"{}|\\^`]*$"#;

/// `type/subtype` with optional parameters.
const MEDIA_TYPE_PATTERN: &str =
    r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+\-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+\-]*(?:\s*;.*)?$";

/// Extension attribute names: lowercase ASCII letters and digits.
const EXTENSION_NAME_PATTERN: &str = r"^[a-z0-9]+$";

/// Naive timestamp layouts accepted as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn uri_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URI_REFERENCE_PATTERN).expect("invalid regex"))
}

fn media_type() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MEDIA_TYPE_PATTERN).expect("invalid regex"))
}

fn extension_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EXTENSION_NAME_PATTERN).expect("invalid regex"))
}

/// Returns `true` when the value contains at least one character.
pub fn is_non_empty(value: &str) -> bool {
    !value.is_empty()
}

/// Returns `true` for a non-empty URI reference (absolute URI or relative path).
pub fn is_uri_reference(value: &str) -> bool {
    is_non_empty(value) && uri_reference().is_match(value)
}

/// Returns `true` for a legal extension attribute name.
pub fn is_extension_name(value: &str) -> bool {
    extension_name().is_match(value)
}

/// Returns `true` for an RFC 2045 media type such as `application/json; charset=utf-8`.
pub fn is_media_type(value: &str) -> bool {
    media_type().is_match(value)
}

/// Lowercased `type/subtype` of a media type, parameters stripped.
pub fn media_type_essence(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Returns `true` for media types whose bodies are JSON documents.
pub fn is_json_media_type(value: &str) -> bool {
    let essence = media_type_essence(value);
    essence == "application/json" || essence == "text/json" || essence.ends_with("+json")
}

/// Parses RFC 3339, RFC 2822, or a naive ISO-8601 date-time (read as UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .map(|naive| naive.and_utc())
}

/// Normalizes an accepted timestamp to RFC 3339 UTC with a `Z` suffix.
pub fn normalize_timestamp(value: &str) -> Option<String> {
    parse_timestamp(value).map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
