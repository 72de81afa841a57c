//! Text clean-up applied to values read from rendered pages.

/// Collapses the whitespace noise of a rendered block of text: every line is
/// trimmed, empty lines are dropped and the rest are joined with `\n`.
///
/// Applying it twice gives the same result as applying it once.
pub fn clean_block(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First line of the trimmed text, itself trimmed
pub fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or_default().trim()
}

/// Lowercases and collapses runs of whitespace into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case- and whitespace-insensitive substring test, the way "has text"
/// matching behaves in a browser
pub fn contains_text(haystack: &str, needle: &str) -> bool {
    normalize_whitespace(haystack).contains(&normalize_whitespace(needle))
}

/// Trimmed text, or `None` if nothing but whitespace is left
pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
