//! Utility functions and helpers.

use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9０-９]+").expect("valid regex"));

/// Trim each line and collapse whitespace runs inside it to one space.
/// Blank lines are dropped, line breaks between the rest are kept.
pub fn normalize_lines(s: &str) -> String {
    s.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Parse the first run of ASCII or full-width digits, e.g. `"赞 9999+"` -> `9999`.
///
/// Returns `None` when there is no digit. A run too large for `u64` saturates.
pub fn first_number(s: &str) -> Option<u64> {
    let run = DIGIT_RUN.find(s)?;
    Some(run.as_str().chars().filter_map(digit_value).fold(0u64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(digit)
    }))
}

fn digit_value(c: char) -> Option<u64> {
    match c {
        '0'..='9' => c.to_digit(10).map(u64::from),
        '０'..='９' => Some(u64::from(c as u32 - '０' as u32)),
        _ => None,
    }
}

/// Count chars rather than bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
