//! Subtitle label derivation.
//!
//! A label is the first non-empty result of an ordered list of tag lookups,
//! falling back to a positional `sub{n}` label.

use std::collections::HashSet;

use crate::converter::StreamDescriptor;

/// A lookup that may produce a label for a subtitle stream.
type LabelStrategy = fn(&StreamDescriptor) -> Option<&str>;

const STRATEGIES: &[LabelStrategy] = &[from_title, from_language];

fn from_title(stream: &StreamDescriptor) -> Option<&str> {
    stream.tags.title.as_deref()
}

fn from_language(stream: &StreamDescriptor) -> Option<&str> {
    stream.tags.language.as_deref()
}

/// Positional label for the `position`-th subtitle stream of a file.
pub fn positional_label(position: usize) -> String {
    format!("sub{}", position)
}

/// Makes a tag value usable inside a file name.
///
/// Path separators, characters rejected by common filesystems and control
/// characters become `_`. Returns `None` when nothing is left.
pub fn sanitize_label(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

/// Label for a subtitle stream: title tag, else language tag, else `sub{position}`.
pub fn subtitle_label(stream: &StreamDescriptor, position: usize) -> String {
    STRATEGIES
        .iter()
        .filter_map(|strategy| strategy(stream))
        .find_map(sanitize_label)
        .unwrap_or_else(|| positional_label(position))
}

/// Returns `label`, or a suffixed variant when it is already taken, and
/// records the result in `used`.
pub fn make_unique(label: String, position: usize, used: &mut HashSet<String>) -> String {
    let mut candidate = label.clone();
    let mut attempt = 0usize;
    while used.contains(&candidate) {
        candidate = if attempt == 0 {
            format!("{}_{}", label, position)
        } else {
            format!("{}_{}_{}", label, position, attempt)
        };
        attempt += 1;
    }
    used.insert(candidate.clone());
    candidate
}
