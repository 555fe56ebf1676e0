//! Terminal rendering of search reports.

use std::fmt::Write;

use docsift::models::SearchReport;
use docsift::search::KeywordMatcher;

/// ANSI escape codes for terminal colors
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const YELLOW_BOLD: &str = "\x1b[1;33m";
}

/// How emphasis is written: ANSI codes on a terminal, markdown-style markers otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn keyword(self) -> (&'static str, &'static str) {
        if self.color {
            (colors::YELLOW_BOLD, colors::RESET)
        } else {
            ("**", "**")
        }
    }

    fn bold(self, text: &str) -> String {
        if self.color {
            format!("{}{text}{}", colors::BOLD, colors::RESET)
        } else {
            text.to_string()
        }
    }

    fn dim(self, text: &str) -> String {
        if self.color {
            format!("{}{text}{}", colors::DIM, colors::RESET)
        } else {
            text.to_string()
        }
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Renders matches best first, followed by a summary of what was skipped.
pub fn render_report(report: &SearchReport, matcher: &KeywordMatcher, style: Style) -> String {
    let mut out = String::new();
    let (open, close) = style.keyword();

    if report.results.is_empty() {
        out.push_str("No matches found. Try a different search term.\n");
    } else {
        let _ = writeln!(
            out,
            "Found {}\n",
            plural(
                report.results.len(),
                "matching document",
                "matching documents"
            )
        );
        for (rank, found) in report.results.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} ({})",
                rank + 1,
                style.bold(&found.document.title),
                plural(found.occurrence_count, "match", "matches")
            );
            let _ = writeln!(out, "   {}", style.dim(&found.document.url));
            for snippet in &found.snippets {
                let _ = writeln!(
                    out,
                    "   - ...{}...",
                    matcher.highlight(&snippet.text, open, close)
                );
            }
            out.push('\n');
        }
    }

    if report.cancelled {
        let _ = writeln!(
            out,
            "Search interrupted: results cover {} of {} documents.",
            report.documents_processed, report.documents_total
        );
    }
    if !report.empty_documents.is_empty() {
        let _ = writeln!(
            out,
            "{} had no extractable text.",
            plural(report.empty_documents.len(), "document", "documents")
        );
    }
    if !report.failures.is_empty() {
        let _ = writeln!(
            out,
            "{} could not be searched:",
            plural(report.failures.len(), "document", "documents")
        );
        for failure in &report.failures {
            let _ = writeln!(
                out,
                "   - {} [{}]: {}",
                failure.document.title, failure.stage, failure.message
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift::config::SearchConfig;
    use docsift::models::{DocumentFailure, DocumentRef, FailureStage, ResultSet};

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new("trial", &SearchConfig::default()).unwrap()
    }

    fn report_with_match() -> SearchReport {
        let text = "Phase III Trial of the drug; the trial ended.";
        let hits = matcher().search(text).unwrap();
        let mut report = SearchReport::new("trial", 2);
        report.documents_processed = 2;
        report.results = ResultSet::from_matches(vec![docsift::models::SearchMatch {
            document: DocumentRef::new("Minutes 12", "https://example.com/d/1"),
            occurrence_count: hits.count,
            snippets: hits.snippets,
            strategy: "lopdf".to_string(),
        }]);
        report
    }

    #[test]
    fn test_no_matches_message() {
        let report = SearchReport::new("trial", 0);
        let out = render_report(&report, &matcher(), Style::new(false));
        assert_eq!(out, "No matches found. Try a different search term.\n");
    }

    #[test]
    fn test_matches_plain() {
        let out = render_report(&report_with_match(), &matcher(), Style::new(false));

        assert!(out.starts_with("Found 1 matching document\n"));
        assert!(out.contains("1. Minutes 12 (2 matches)"));
        assert!(out.contains("https://example.com/d/1"));
        assert!(out.contains("**Trial**"));
        assert!(out.contains("   - ..."));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_matches_colored() {
        let out = render_report(&report_with_match(), &matcher(), Style::new(true));
        assert!(out.contains(&format!("{}Trial{}", colors::YELLOW_BOLD, colors::RESET)));
        assert!(out.contains(&format!("{}Minutes 12{}", colors::BOLD, colors::RESET)));
    }

    #[test]
    fn test_summary_lines() {
        let mut report = report_with_match();
        report.documents_total = 5;
        report.cancelled = true;
        report
            .empty_documents
            .push(DocumentRef::new("Scan", "https://example.com/d/2"));
        report.failures.push(DocumentFailure::new(
            DocumentRef::new("Broken", "https://example.com/d/3"),
            FailureStage::Fetch,
            "connection reset",
        ));

        let out = render_report(&report, &matcher(), Style::new(false));

        assert!(out.contains("Search interrupted: results cover 2 of 5 documents."));
        assert!(out.contains("1 document had no extractable text."));
        assert!(out.contains("1 document could not be searched:"));
        assert!(out.contains("Broken"));
        assert!(out.contains("connection reset"));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "match", "matches"), "1 match");
        assert_eq!(plural(2, "match", "matches"), "2 matches");
        assert_eq!(plural(0, "document", "documents"), "0 documents");
    }
}
