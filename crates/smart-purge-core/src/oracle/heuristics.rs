//! Name-based matching for temporary and working views.

const DELIMITERS: [char; 3] = [' ', '_', '-'];

/// First pattern (in list order) found in `name` at a word boundary.
///
/// A pattern matches when it opens a word: at the start of the name or right
/// after a delimiter (space, `_`, `-`). Matching ignores case.
pub fn match_temp_pattern<'p>(name: &str, patterns: &'p [String]) -> Option<&'p str> {
    let name = name.to_lowercase();
    patterns
        .iter()
        .map(|p| p.as_str())
        .find(|pattern| matches_at_boundary(&name, &pattern.to_lowercase()))
}

fn matches_at_boundary(name: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if name.starts_with(pattern) {
        return true;
    }
    name.match_indices(pattern)
        .any(|(start, _)| name[..start].ends_with(&DELIMITERS[..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TEMP_VIEW_PATTERNS;

    fn patterns() -> Vec<String> {
        DEFAULT_TEMP_VIEW_PATTERNS.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_matches_at_start_and_after_delimiters() {
        let p = patterns();
        assert_eq!(match_temp_pattern("Temp Section A", &p), Some("temp"));
        assert_eq!(match_temp_pattern("Level 1_working", &p), Some("working"));
        assert_eq!(match_temp_pattern("Level 1 - Copy 1", &p), Some("copy"));
        assert_eq!(match_temp_pattern("WIP-facade", &p), Some("wip"));
    }

    #[test]
    fn test_embedded_words_do_not_match() {
        let p = patterns();
        assert_eq!(match_temp_pattern("Contemporary Lobby", &p), None);
        assert_eq!(match_temp_pattern("Level 1", &p), None);
        assert_eq!(match_temp_pattern("Boldface Elevation", &p), None);
    }

    #[test]
    fn test_pattern_closing_a_longer_word_does_not_match() {
        let p = patterns();
        assert_eq!(match_temp_pattern("Scaffold Plan", &p), None);
        assert_eq!(match_temp_pattern("Bold Elevation", &p), None);
        assert_eq!(match_temp_pattern("Level 2 Old", &p), Some("old"));
    }

    #[test]
    fn test_first_pattern_in_list_order_wins() {
        let p = patterns();
        // "test" precedes "copy" in the list even though "copy" appears first in the name.
        assert_eq!(match_temp_pattern("Copy of test view", &p), Some("test"));
    }

    #[test]
    fn test_custom_patterns_and_empty_pattern() {
        let p = vec![String::new(), "Scratch".to_string()];
        assert_eq!(match_temp_pattern("roof scratch", &p), Some("Scratch"));
        assert_eq!(match_temp_pattern("roof", &p), None);
    }
}
