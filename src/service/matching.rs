//! Title matching heuristics
//!
//! These are deliberately coarse string tests, not semantic equality. Call
//! sites go through these named functions so a better metric can replace
//! them in one place.

use strsim::jaro_winkler;

/// Case-insensitive containment in either direction
///
/// Blank inputs never match.
pub fn substring_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Either title's first word occurs (case-insensitively) inside the other title
pub fn first_token_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let (Some(first_a), Some(first_b)) = (a.split_whitespace().next(), b.split_whitespace().next())
    else {
        return false;
    };

    b.contains(first_a) || a.contains(first_b)
}

/// Jaro-Winkler similarity of the lowercased, trimmed titles
pub fn jaro_winkler_similar(a: &str, b: &str, threshold: f64) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    jaro_winkler(&a, &b) >= threshold
}

/// Whether a use case title refers to one the customer already runs
pub fn is_existing_title(title: &str, current_titles: &[String]) -> bool {
    current_titles.iter().any(|t| substring_overlap(title, t))
}
