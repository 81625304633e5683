//! Anchor label sanitization.
//!
//! reStructuredText anchors generated by the publishing pipeline do not
//! survive `:` or `_`, so every label is stripped of both before it is used
//! as a target or reference.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\label\{(.*?)\}").unwrap());

/// Remove characters that are not allowed in anchor labels.
///
/// # Examples
///
/// ```
/// use paper_markup::sanitize_label;
///
/// assert_eq!(sanitize_label("fig:data_flow"), "figdataflow");
/// ```
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    label.chars().filter(|c| !matches!(c, ':' | '_')).collect()
}

/// Rewrite every `\label{...}` in `text` with a sanitized label.
///
/// Everything outside the label arguments is left untouched.
#[must_use]
pub fn sanitize_label_commands(text: &str) -> String {
    LABEL_PATTERN
        .replace_all(text, |caps: &Captures<'_>| {
            format!("\\label{{{}}}", sanitize_label(&caps[1]))
        })
        .into_owned()
}
