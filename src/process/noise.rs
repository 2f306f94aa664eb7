//! Line-oriented removal of package-manager progress noise.

use std::sync::LazyLock;

use regex::Regex;

/// Markers identifying Yarn Berry progress lines (`➤ YN0000: ...`).
const DEFAULT_NOISE_MARKERS: &[&str] = &["YN0000"];

#[expect(
    clippy::expect_used,
    reason = "the pattern is assembled from escaped compile-time literals"
)]
static DEFAULT_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&line_pattern(DEFAULT_NOISE_MARKERS)).expect("default noise pattern is valid")
});

/// Strips whole lines containing known noise markers from captured output.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    pattern: Option<Regex>,
}

impl NoiseFilter {
    /// Build a filter that removes every line containing any of `markers`.
    ///
    /// Markers are matched literally. An empty marker list yields a filter
    /// that passes text through unchanged.
    ///
    /// # Errors
    ///
    /// Returns `regex::Error` when the combined pattern exceeds the regex
    /// engine's size limits.
    pub fn new(markers: &[&str]) -> Result<Self, regex::Error> {
        if markers.is_empty() {
            return Ok(Self::disabled());
        }
        Ok(Self {
            pattern: Some(Regex::new(&line_pattern(markers))?),
        })
    }

    /// Build a filter that never removes anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { pattern: None }
    }

    /// Remove noise lines from `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, "").into_owned(),
            None => text.to_owned(),
        }
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            pattern: Some(DEFAULT_NOISE.clone()),
        }
    }
}

fn line_pattern(markers: &[&str]) -> String {
    let alternatives = markers
        .iter()
        .map(|marker| regex::escape(marker))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?m)^[^\n]*(?:{alternatives})[^\n]*(?:\n|$)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("plain output\n", "plain output\n")]
    #[case("➤ YN0000: ┌ Resolution step\nDone\n", "Done\n")]
    #[case(
        "before\n➤ YN0000: · Yarn 4.1.0\n➤ YN0000: └ Completed\nafter\n",
        "before\nafter\n"
    )]
    #[case("tests passed\n➤ YN0000: Done in 0s 120ms", "tests passed\n")]
    #[case("YN0001: real error\n", "YN0001: real error\n")]
    fn default_filter_removes_yarn_progress_lines(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(NoiseFilter::default().apply(input), expected);
    }

    #[rstest]
    fn custom_markers_are_matched_literally() {
        let filter = NoiseFilter::new(&["npm WARN", "[progress]"]).expect("markers compile");
        let input = "npm WARN deprecated\nkeep me\n[progress] 50%\nprogress without brackets\n";
        assert_eq!(
            filter.apply(input),
            "keep me\nprogress without brackets\n"
        );
    }

    #[rstest]
    fn empty_marker_list_disables_filtering() {
        let filter = NoiseFilter::new(&[]).expect("empty list is valid");
        assert_eq!(filter.apply("YN0000: kept\n"), "YN0000: kept\n");
    }

    #[rstest]
    fn disabled_filter_passes_text_through() {
        assert_eq!(NoiseFilter::disabled().apply("YN0000\n"), "YN0000\n");
    }
}
