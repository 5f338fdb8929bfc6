//! Label name sanitizing and attribute value filtering.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static INVALID_LABEL_NAME_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^[^a-zA-Z_])|([^a-zA-Z0-9_])").expect("static regex"));

/// ASCII word characters, `-`, `/` and `.`.
static ATTRIBUTE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-0-9A-Za-z_/.]*$").expect("static regex"));

/// Attribute value dropped by policy. Not a scrape failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value neither scalar nor text")]
pub struct AttributeRejected;

/// Sanitize a label name per the Prometheus data model: the first
/// character must be a letter or underscore, the rest alphanumeric or
/// underscore. Offending characters become `_`.
pub fn normalise_label(label: &str) -> String {
    INVALID_LABEL_NAME_CHAR.replace_all(label, "_").into_owned()
}

/// Normalise an allowlist, keeping the first occurrence of each name and
/// dropping names in `reserved`.
pub fn normalise_label_list<S: AsRef<str>>(labels: &[S], reserved: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let name = normalise_label(label.as_ref());
        if reserved.contains(&name.as_str()) || out.contains(&name) {
            continue;
        }
        out.push(name);
    }
    out
}

/// Convert raw attribute JSON text to a label value.
///
/// Wrapping quotes are stripped; the rest must be plain text (scalars
/// qualify too). See the Mesos attributes documentation for the value
/// grammar.
pub fn attribute_string(raw: &str) -> Result<String, AttributeRejected> {
    let value = raw.trim_matches('"');
    if ATTRIBUTE_TEXT.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(AttributeRejected)
    }
}
