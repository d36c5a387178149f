//! Centralized title sanitization for target path segments.
//!
//! Every directory and file in the output tree is named after a page title
//! from the navigation index. Titles are arbitrary text ("Q3 / Q4 Planning:
//! Review"), so this module provides the single function that turns them into
//! path-segment-safe names, used consistently by the index walker and anyone
//! computing destination paths.
//!
//! ## Policy
//!
//! Alphanumerics, spaces, `-`, `.` and `_` pass through unchanged. Everything
//! else — path separators, colons, quotes, the lot — becomes `_`. Surrounding
//! whitespace is trimmed. No length limit is enforced.

/// Sanitize a display title into a filesystem-safe path segment.
///
/// Deterministic and idempotent: an already-clean title comes back unchanged.
///
/// - `"Team Space"` → `"Team Space"`
/// - `"Q3/Q4: Plans"` → `"Q3_Q4_ Plans"`
/// - `"  padded  "` → `"padded"`
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '.' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_title_is_unchanged() {
        assert_eq!(sanitize_title("Team Space"), "Team Space");
    }

    #[test]
    fn allowed_punctuation_passes_through() {
        assert_eq!(sanitize_title("v1.2_final-draft"), "v1.2_final-draft");
    }

    #[test]
    fn path_separators_become_underscores() {
        assert_eq!(sanitize_title("Q3/Q4 Plans"), "Q3_Q4 Plans");
        assert_eq!(sanitize_title("a\\b"), "a_b");
    }

    #[test]
    fn reserved_characters_become_underscores() {
        assert_eq!(sanitize_title("Plan: 2024?"), "Plan_ 2024_");
        assert_eq!(sanitize_title("<Home>"), "_Home_");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(sanitize_title("  padded  "), "padded");
    }

    #[test]
    fn unicode_alphanumerics_are_kept() {
        assert_eq!(sanitize_title("Überblick 2024"), "Überblick 2024");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_title("Q3/Q4: Plans & Goals");
        assert_eq!(sanitize_title(&once), once);
    }

    #[test]
    fn empty_title_stays_empty() {
        assert_eq!(sanitize_title(""), "");
    }
}
