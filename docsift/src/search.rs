//! Case-insensitive literal keyword matching with context snippets.

use regex::{Regex, RegexBuilder};

use crate::config::SearchConfig;
use crate::errors::{DocsiftError, Result};
use crate::models::Snippet;

/// Occurrence count and leading snippets for one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHits {
    /// Non-overlapping occurrences, left to right.
    pub count: usize,
    /// Context around the first occurrences.
    pub snippets: Vec<Snippet>,
}

/// Matches one keyword against extracted text.
///
/// Regex metacharacters in the keyword are matched literally.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: String,
    pattern: Regex,
    window: usize,
    max_snippets: usize,
}

impl KeywordMatcher {
    /// Compiles a matcher for the trimmed `keyword`.
    ///
    /// Returns [`DocsiftError::EmptyKeyword`] when nothing is left after trimming.
    pub fn new(keyword: &str, config: &SearchConfig) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(DocsiftError::EmptyKeyword);
        }

        let pattern = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .map_err(|e| DocsiftError::InvalidKeyword(e.to_string()))?;

        Ok(Self {
            keyword: keyword.to_string(),
            pattern,
            window: config.snippet_window,
            max_snippets: config.max_snippets,
        })
    }

    /// The trimmed keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Counts non-overlapping occurrences in `text`.
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    /// Counts occurrences and builds snippets; `None` when nothing matched.
    #[must_use]
    pub fn search(&self, text: &str) -> Option<KeywordHits> {
        let mut count = 0;
        let mut snippets = Vec::new();

        for found in self.pattern.find_iter(text) {
            count += 1;
            if snippets.len() < self.max_snippets {
                snippets.push(snippet(text, found.start(), found.end(), self.window));
            }
        }

        (count > 0).then_some(KeywordHits { count, snippets })
    }

    /// Wraps every occurrence in `text` with `open` and `close`, keeping its casing.
    #[must_use]
    pub fn highlight(&self, text: &str, open: &str, close: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &regex::Captures<'_>| format!("{open}{}{close}", &caps[0]))
            .into_owned()
    }
}

/// Builds the context window around `text[start..end]`.
///
/// The window extends `window` characters each way, clamped to the text.
fn snippet(text: &str, start: usize, end: usize, window: usize) -> Snippet {
    let lo = if window == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .nth(window - 1)
            .map_or(0, |(i, _)| i)
    };
    let hi = text[end..]
        .char_indices()
        .nth(window)
        .map_or(text.len(), |(i, _)| end + i);

    let context = text[lo..hi].replace(['\n', '\r'], " ");
    Snippet {
        text: context.trim().to_string(),
        start: lo,
        end: hi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn matcher(keyword: &str) -> KeywordMatcher {
        KeywordMatcher::new(keyword, &SearchConfig::default()).unwrap()
    }

    #[test]
    fn test_counts_case_insensitive() {
        let hits = matcher("clinical").search("Clinical trial. CLINICAL data.").unwrap();
        assert_eq!(hits.count, 2);
        assert_eq!(hits.snippets.len(), 2);
    }

    #[test]
    fn test_keyword_is_trimmed() {
        let m = matcher("  trial \n");
        assert_eq!(m.keyword(), "trial");
        assert_eq!(m.count("Trial and trial"), 2);
    }

    #[test]
    fn test_blank_keyword_rejected() {
        for keyword in ["", "   ", "\t\n"] {
            let err = KeywordMatcher::new(keyword, &SearchConfig::default()).unwrap_err();
            assert!(matches!(err, DocsiftError::EmptyKeyword));
        }
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let m = matcher("a.b(c)");
        assert_eq!(m.count("xa.b(c)y"), 1);
        assert_eq!(m.count("axbcy"), 0);
        assert!(m.search("axbcy").is_none());
    }

    #[test]
    fn test_non_overlapping() {
        assert_eq!(matcher("aa").count("aaaa"), 2);
        assert_eq!(matcher("aa").count("aaa"), 1);
    }

    #[test]
    fn test_snippets_capped() {
        let text = "drug ".repeat(10);
        let hits = matcher("drug").search(&text).unwrap();
        assert_eq!(hits.count, 10);
        assert_eq!(hits.snippets.len(), 3);
    }

    #[test]
    fn test_snippet_at_text_start_and_end() {
        let text = "keyword in the middle of a rather long sentence ending with keyword";
        let hits = matcher("keyword").search(text).unwrap();

        let first = &hits.snippets[0];
        assert_eq!(first.start, 0);
        assert!(first.text.starts_with("keyword in the middle"));

        let last = &hits.snippets[1];
        assert_eq!(last.end, text.len());
        assert!(last.text.ends_with("ending with keyword"));
    }

    #[test]
    fn test_snippet_window_size() {
        let text = format!("{}needle{}", "x".repeat(50), "y".repeat(50));
        let hits = matcher("needle").search(&text).unwrap();

        assert_eq!(hits.snippets[0].text, format!("{}needle{}", "x".repeat(30), "y".repeat(30)));
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let text = "é".repeat(40) + "needle" + &"ü".repeat(40);
        let hits = matcher("needle").search(&text).unwrap();

        let snippet = &hits.snippets[0];
        assert_eq!(snippet.text.chars().count(), 66);
        assert!(text.is_char_boundary(snippet.start));
        assert!(text.is_char_boundary(snippet.end));
    }

    #[test]
    fn test_snippet_replaces_newlines() {
        let hits = matcher("trial").search("first line\nclinical trial\r\nnext").unwrap();
        assert!(!hits.snippets[0].text.contains('\n'));
        assert!(!hits.snippets[0].text.contains('\r'));
        assert!(hits.snippets[0].text.contains("clinical trial"));
    }

    #[test]
    fn test_highlight_preserves_case() {
        let m = matcher("clinical");
        assert_eq!(
            m.highlight("a CLINICAL and Clinical report", "**", "**"),
            "a **CLINICAL** and **Clinical** report"
        );
    }

    #[test]
    fn test_zero_window() {
        let config = SearchConfig {
            snippet_window: 0,
            max_snippets: 1,
        };
        let m = KeywordMatcher::new("mid", &config).unwrap();
        let hits = m.search("left mid right").unwrap();
        assert_eq!(hits.snippets[0].text, "mid");
    }

    fn naive_count(haystack: &str, needle: &str) -> usize {
        let haystack = haystack.to_ascii_lowercase();
        let needle = needle.to_ascii_lowercase();
        let mut count = 0;
        let mut from = 0;
        while let Some(pos) = haystack[from..].find(&needle) {
            count += 1;
            from += pos + needle.len();
        }
        count
    }

    proptest! {
        #[test]
        fn prop_count_matches_naive(text in "[a-cA-C .]{0,80}", keyword in "[a-cA-C.]{1,3}") {
            let m = matcher(&keyword);
            prop_assert_eq!(m.count(&text), naive_count(&text, &keyword));
        }

        #[test]
        fn prop_snippets_within_bounds(text in "\\PC{0,120}", keyword in "[a-z]{1,2}") {
            let m = matcher(&keyword);
            if let Some(hits) = m.search(&text) {
                prop_assert!(hits.count >= 1);
                prop_assert!(hits.snippets.len() <= 3);
                for s in &hits.snippets {
                    prop_assert!(s.start <= s.end && s.end <= text.len());
                    prop_assert!(text.is_char_boundary(s.start));
                    prop_assert!(text.is_char_boundary(s.end));
                }
            }
        }
    }
}
