use serde::Serialize;

use crate::document::DocumentMeta;
use crate::index::DocumentIndex;
use crate::ranking::{rank_results, Heuristic};

/// Matches recorded per document; later occurrences are dropped.
pub const MAX_MATCHES_PER_DOC: usize = 5;

/// Separator between the context lines around a match.
const CONTEXT_SEPARATOR: &str = " | ";

/// One query occurrence inside a document.
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    /// 1-indexed line number of the matched line.
    pub line: usize,
    /// The matched line, trimmed.
    pub text: String,
    /// Trimmed neighbouring lines joined with `" | "`.
    pub context: String,
}

/// Ranked search hit for one document.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: DocumentMeta,
    pub matches: Vec<SearchMatch>,
    pub score: f64,
}

/// Free-text search over the document index.
///
/// Each call re-reads content through the index; nothing is mutated,
/// so concurrent calls are independent.
pub struct SearchEngine {
    index: DocumentIndex,
    heuristic: Heuristic,
}

impl SearchEngine {
    pub fn new(index: DocumentIndex) -> Self {
        Self {
            index,
            heuristic: Heuristic::default(),
        }
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    /// Rank documents containing the query as a literal,
    /// case-insensitive substring.
    ///
    /// Blank queries yield an empty vec. Documents whose content does
    /// not resolve are skipped silently; their absence from the
    /// results is the only observable effect. Never errors.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();

        for document in self.index.list_documents() {
            let content = self.index.get_content(&document.path);
            if content.is_empty() {
                continue;
            }

            let lines: Vec<&str> = content.split('\n').collect();
            let matches = collect_matches(&lines, &term);
            if matches.is_empty() {
                continue;
            }

            let kept: Vec<SearchMatch> = matches.into_iter().take(MAX_MATCHES_PER_DOC).collect();
            let score = self.heuristic.score(&document.title, &term, &kept);

            results.push(SearchResult {
                document,
                matches: kept,
                score,
            });
        }

        rank_results(&mut results);
        tracing::debug!(query = %term, results = results.len(), "search complete");

        results
    }
}

/// Scan every line for literal occurrences of `term`, which must
/// already be lowercased. The cursor advances by the term length
/// after each hit, so occurrences never overlap; repeated hits on one
/// line each produce an entry.
fn collect_matches(lines: &[&str], term: &str) -> Vec<SearchMatch> {
    let mut matches = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let lowered = line.to_lowercase();

        let mut cursor = 0;
        while let Some(found) = lowered[cursor..].find(term) {
            matches.push(SearchMatch {
                line: i + 1,
                text: line.trim().to_string(),
                context: context_around(lines, i),
            });
            cursor += found + term.len();
        }
    }

    matches
}

/// Trimmed lines immediately before and after line `i`, clipped to
/// the document bounds, joined with the context separator.
fn context_around(lines: &[&str], i: usize) -> String {
    let mut context = Vec::new();
    if i > 0 {
        context.push(lines[i - 1].trim());
    }
    if i + 1 < lines.len() {
        context.push(lines[i + 1].trim());
    }
    context.join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;

    fn engine_from(entries: Vec<(&str, &str)>) -> SearchEngine {
        let corpus = Corpus::from_entries(
            entries
                .into_iter()
                .map(|(path, raw)| (path.to_string(), raw.to_string()))
                .collect(),
        );
        SearchEngine::new(DocumentIndex::new(corpus))
    }

    #[test]
    fn test_blank_queries_yield_nothing() {
        let engine = engine_from(vec![("a.md", "# A\ncontent")]);
        assert!(engine.search("").is_empty());
        assert!(engine.search("   \t\n").is_empty());
    }

    #[test]
    fn test_basic_match_with_line_and_context() {
        let engine = engine_from(vec![(
            "guide.md",
            "# Guide\nbefore\nthe setup line\nafter\n",
        )]);

        let results = engine.search("Setup");
        assert_eq!(results.len(), 1);

        let m = &results[0].matches[0];
        assert_eq!(m.line, 3);
        assert_eq!(m.text, "the setup line");
        assert_eq!(m.context, "before | after");
    }

    #[test]
    fn test_context_clipped_at_document_edges() {
        let engine = engine_from(vec![("edge.md", "# match here\ntail")]);
        let results = engine.search("match");
        assert_eq!(results[0].matches[0].context, "tail");
    }

    #[test]
    fn test_cjk_document() {
        let engine = engine_from(vec![(
            "help/操作說明.md",
            "# 操作說明\n這是測試內容 test 文字\n",
        )]);

        let results = engine.search("test");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matches[0].text, "這是測試內容 test 文字");
        assert_eq!(results[0].matches[0].line, 2);
        assert!(results[0].score >= 1.0);
    }

    #[test]
    fn test_repeated_occurrences_on_one_line() {
        let engine = engine_from(vec![("rep.md", "# R\nfoo foo foo\n")]);
        let results = engine.search("foo");
        assert_eq!(results[0].matches.len(), 3);
        assert!(results[0].matches.iter().all(|m| m.line == 2));
    }

    #[test]
    fn test_overlapping_occurrences_not_double_counted() {
        let engine = engine_from(vec![("ov.md", "# O\naaaa\n")]);
        let results = engine.search("aa");
        // Cursor advances past each hit: "aaaa" holds two, not three.
        assert_eq!(results[0].matches.len(), 2);
    }

    #[test]
    fn test_matches_capped_at_five() {
        let body = "# Caps\n".to_string() + &"needle\n".repeat(9);
        let engine = engine_from(vec![("caps.md", body.as_str())]);
        let results = engine.search("needle");
        assert_eq!(results[0].matches.len(), MAX_MATCHES_PER_DOC);
        // Earliest matches are the ones kept.
        assert_eq!(results[0].matches[0].line, 2);
        assert_eq!(results[0].matches[4].line, 6);
    }

    #[test]
    fn test_query_characters_are_literal() {
        let engine = engine_from(vec![("lit.md", "# L\nuse a.*b carefully\nnot axb\n")]);
        let results = engine.search("a.*b");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matches.len(), 1);
        assert_eq!(results[0].matches[0].line, 2);
    }

    #[test]
    fn test_title_match_outranks_body_match() {
        let engine = engine_from(vec![
            ("other.md", "# Other\nbilling details\n"),
            ("billing.md", "# Billing\nbilling details\n"),
        ]);

        let results = engine.search("billing");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "billing");
        assert!(results[0].score >= results[1].score + 10.0);
    }

    #[test]
    fn test_unresolvable_content_skipped() {
        let engine = engine_from(vec![
            ("empty.md", ""),
            ("full.md", "# Full\nsomething here\n"),
        ]);

        let results = engine.search("something");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "full");
    }

    #[test]
    fn test_search_is_idempotent() {
        let engine = engine_from(vec![
            ("a.md", "# Alpha\nshared term\n"),
            ("b.md", "# Beta\nshared term\nshared again\n"),
        ]);

        let first = engine.search("shared");
        let second = engine.search("shared");

        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.document.id, y.document.id);
            assert_eq!(x.score, y.score);
            assert_eq!(x.matches.len(), y.matches.len());
        }
    }

    #[test]
    fn test_extra_occurrence_increases_score() {
        let one = engine_from(vec![("d.md", "# D\nterm\n")]);
        let two = engine_from(vec![("d.md", "# D\nterm\nterm\n")]);

        let s1 = one.search("term")[0].score;
        let s2 = two.search("term")[0].score;
        assert!(s2 > s1);
    }
}
