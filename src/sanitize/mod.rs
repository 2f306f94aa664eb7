//! Filesystem-safe and Docker-safe string helpers.

use chrono::{DateTime, Utc};

/// Characters replaced by [`sanitize_path_segment`], in addition to whitespace.
const UNSAFE_SEGMENT_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitize a string so it can be used as a single path segment.
///
/// Characters that break filenames or Docker volume specs (`\ / : * ? " < > |`
/// and whitespace) become `-`. Runs of `-` collapse to one, and leading or
/// trailing `-` are trimmed.
///
/// # Example
///
/// ```
/// use agentbench::sanitize::sanitize_path_segment;
///
/// assert_eq!(sanitize_path_segment("openai/gpt-4o mini"), "openai-gpt-4o-mini");
/// ```
#[must_use]
pub fn sanitize_path_segment(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        let mapped = if ch.is_whitespace() || UNSAFE_SEGMENT_CHARS.contains(&ch) {
            '-'
        } else {
            ch
        };
        if mapped == '-' && output.ends_with('-') {
            continue;
        }
        output.push(mapped);
    }
    output.trim_matches('-').to_owned()
}

/// Format an RFC 3339 timestamp as `YYYYMMDD-hhmmss` in UTC.
///
/// Empty or unparseable input yields an empty string.
#[must_use]
pub fn sanitize_timestamp_for_filename(iso: &str) -> String {
    DateTime::parse_from_rfc3339(iso.trim())
        .map(|parsed| {
            parsed
                .with_timezone(&Utc)
                .format("%Y%m%d-%H%M%S")
                .to_string()
        })
        .unwrap_or_default()
}
