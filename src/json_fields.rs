//! Minimal field extraction over raw JSON text.
//!
//! Nothing here parses JSON. A key is found by the first textual occurrence of
//! `"key"` anywhere in the input, so a key nested inside a sub-object (or even
//! inside an earlier string literal) is matched before the top-level one.
//! Every absent or malformed value resolves to an empty string or zero; no
//! error is ever reported.

/// Returns the byte offset where the value for `key` begins.
///
/// Whitespace, a single `:` and any whitespace after it are skipped.
pub fn value_start(json: &str, key: &str) -> Option<usize> {
    let pattern = format!("\"{key}\"");
    let bytes = json.as_bytes();

    let mut pos = json.find(&pattern)? + pattern.len();
    pos = skip_whitespace(bytes, pos);
    if bytes.get(pos) == Some(&b':') {
        pos = skip_whitespace(bytes, pos + 1);
    }
    Some(pos)
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Extracts a quoted string value, truncated to `max_len` bytes.
///
/// Escape sequences are copied verbatim (`\"` stays two bytes); they only
/// keep the scan from stopping at an escaped quote. An unterminated string
/// runs to the end of the input. Returns an empty string when the key is
/// missing or the value is not a string.
pub fn extract_string(json: &str, key: &str, max_len: usize) -> String {
    let Some(start) = value_start(json, key) else {
        return String::new();
    };

    let bytes = json.as_bytes();
    if bytes.get(start) != Some(&b'"') {
        return String::new();
    }

    let begin = start + 1;
    let mut pos = begin;
    while pos < bytes.len() && bytes[pos] != b'"' {
        if bytes[pos] == b'\\' && pos + 1 < bytes.len() {
            pos += 2;
        } else {
            pos += 1;
        }
    }

    truncate_at_boundary(&json[begin..pos], max_len).to_string()
}

/// Extracts an integer with `atol` semantics: leading digits only, 0 otherwise.
pub fn extract_i64(json: &str, key: &str) -> i64 {
    value_start(json, key)
        .map(|start| parse_leading_i64(&json.as_bytes()[start..]))
        .unwrap_or(0)
}

/// Extracts a float with `atof` semantics: longest numeric prefix, 0.0 otherwise.
pub fn extract_f64(json: &str, key: &str) -> f64 {
    value_start(json, key)
        .map(|start| parse_leading_f64(&json.as_bytes()[start..]))
        .unwrap_or(0.0)
}

/// Cuts `s` to at most `max_len` bytes without splitting a UTF-8 character.
pub fn truncate_at_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Parses an optionally signed run of decimal digits, ignoring trailing bytes.
///
/// Values that overflow saturate at the `i64` bounds.
pub fn parse_leading_i64(bytes: &[u8]) -> i64 {
    let mut pos = skip_whitespace(bytes, 0);
    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    while let Some(digit) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
        let d = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
        pos += 1;
    }
    value
}

/// Parses the longest floating-point prefix, ignoring trailing bytes.
///
/// Accepts an optional sign, digits with an optional fraction, an optional
/// exponent, and the `inf`/`infinity`/`nan` spellings `atof` understands.
pub fn parse_leading_f64(bytes: &[u8]) -> f64 {
    let start = skip_whitespace(bytes, 0);
    let mut pos = start;
    if matches!(bytes.get(pos), Some(b'-') | Some(b'+')) {
        pos += 1;
    }

    if let Some(special) = parse_special_float(&bytes[pos..]) {
        return if bytes[start] == b'-' { -special } else { special };
    }

    let int_digits = count_digits(bytes, pos);
    pos += int_digits;
    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = count_digits(bytes, pos + 1);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'-') | Some(b'+')) {
            exp += 1;
        }
        let exp_digits = count_digits(bytes, exp);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    std::str::from_utf8(&bytes[start..pos])
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn count_digits(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .map(|rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}

fn parse_special_float(bytes: &[u8]) -> Option<f64> {
    let starts_with = |word: &str| {
        bytes.len() >= word.len() && bytes[..word.len()].eq_ignore_ascii_case(word.as_bytes())
    };
    if starts_with("inf") {
        Some(f64::INFINITY)
    } else if starts_with("nan") {
        Some(f64::NAN)
    } else {
        None
    }
}

/// Finds the end of the object starting at `bytes[start]`.
///
/// `bytes[start]` must be `{`. Braces are counted only outside string
/// literals; a `"` toggles the string state unless it is preceded by an odd
/// run of backslashes. Returns the index one past the matching `}`, or `None`
/// if the object is not closed within `bytes`.
pub fn object_end(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut backslashes = 0usize;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'\\' => {
                backslashes += 1;
                continue;
            }
            b'"' if backslashes % 2 == 0 => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
        backslashes = 0;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_basic() {
        let json = r#"{"name": "nginx", "status":"running"}"#;
        assert_eq!(extract_string(json, "name", 255), "nginx");
        assert_eq!(extract_string(json, "status", 255), "running");
    }

    #[test]
    fn test_extract_string_missing_or_not_string() {
        let json = r#"{"pid": 42}"#;
        assert_eq!(extract_string(json, "name", 255), "");
        assert_eq!(extract_string(json, "pid", 255), "");
    }

    #[test]
    fn test_extract_string_keeps_escapes_verbatim() {
        let json = r#"{"name":"a\"b","pid":1}"#;
        assert_eq!(extract_string(json, "name", 255), r#"a\"b"#);

        let json = r#"{"message":"line\nnext\\"}"#;
        assert_eq!(extract_string(json, "message", 255), r#"line\nnext\\"#);
    }

    #[test]
    fn test_extract_string_truncates() {
        let json = r#"{"name":"abcdefgh"}"#;
        assert_eq!(extract_string(json, "name", 3), "abc");
    }

    #[test]
    fn test_truncate_never_splits_a_character() {
        // "é" is two bytes; cutting at 2 would land inside it
        assert_eq!(truncate_at_boundary("aé", 2), "a");
        assert_eq!(truncate_at_boundary("aé", 3), "aé");
    }

    #[test]
    fn test_extract_string_unterminated_runs_to_end() {
        assert_eq!(extract_string(r#"{"name":"abc"#, "name", 255), "abc");
    }

    #[test]
    fn test_key_search_is_not_scope_aware() {
        // The nested "name" appears first and wins
        let json = r#"{"meta":{"name":"inner"},"name":"outer"}"#;
        assert_eq!(extract_string(json, "name", 255), "inner");

        // A string value spelled like the key matches too, and is not followed by ':'
        let json = r#"{"status":"pid","pid":7}"#;
        assert_eq!(extract_i64(json, "pid"), 0);
    }

    #[test]
    fn test_whitespace_around_colon() {
        let json = "{\"pid\"\n :\t 123 ,\"cpu_percent\" :  4.5}";
        assert_eq!(extract_i64(json, "pid"), 123);
        assert_eq!(extract_f64(json, "cpu_percent"), 4.5);
    }

    #[test]
    fn test_extract_numbers_atol_semantics() {
        assert_eq!(extract_i64(r#"{"pid":"12"}"#, "pid"), 0);
        assert_eq!(extract_i64(r#"{"pid":-15,"x":1}"#, "pid"), -15);
        assert_eq!(extract_i64(r#"{"pid":99abc}"#, "pid"), 99);
        assert_eq!(extract_i64(r#"{"pid":12.9}"#, "pid"), 12);
        assert_eq!(extract_i64(r#"{"other":1}"#, "pid"), 0);
    }

    #[test]
    fn test_parse_leading_i64_saturates() {
        assert_eq!(parse_leading_i64(b"99999999999999999999999"), i64::MAX);
        assert_eq!(parse_leading_i64(b"-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn test_parse_leading_f64_prefixes() {
        assert_eq!(parse_leading_f64(b"95.5,"), 95.5);
        assert_eq!(parse_leading_f64(b"  -2.5e2}"), -250.0);
        assert_eq!(parse_leading_f64(b"1e}"), 1.0);
        assert_eq!(parse_leading_f64(b".5"), 0.5);
        assert_eq!(parse_leading_f64(b"7."), 7.0);
        assert_eq!(parse_leading_f64(b"."), 0.0);
        assert_eq!(parse_leading_f64(b"abc"), 0.0);
        assert_eq!(parse_leading_f64(b"\"3.0\""), 0.0);
        assert_eq!(parse_leading_f64(b"-Infinity"), f64::NEG_INFINITY);
        assert!(parse_leading_f64(b"nan").is_nan());
    }

    #[test]
    fn test_object_end_simple_and_nested() {
        let bytes = br#"{"a":{"b":1}} trailing"#;
        assert_eq!(object_end(bytes, 0), Some(13));
    }

    #[test]
    fn test_object_end_ignores_braces_in_strings() {
        let bytes = br#"{"msg":"} { \" }","x":1}"#;
        assert_eq!(object_end(bytes, 0), Some(bytes.len()));
    }

    #[test]
    fn test_object_end_even_backslash_run_closes_string() {
        // The value is a single escaped backslash, so the next quote closes it
        let bytes = br#"{"path":"C:\\"}"#;
        assert_eq!(object_end(bytes, 0), Some(bytes.len()));
    }

    #[test]
    fn test_object_end_incomplete() {
        assert_eq!(object_end(br#"{"a":{"b":1}"#, 0), None);
        assert_eq!(object_end(b"abc", 0), None);
    }
}
