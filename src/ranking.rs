use crate::engine::{SearchMatch, SearchResult};

/// Relevance heuristic parameters
pub struct Heuristic {
    title_bonus: f64,
    heading_bonus: f64,
}

impl Default for Heuristic {
    fn default() -> Self {
        Self {
            title_bonus: 10.0,  // Query appears in the document title
            heading_bonus: 5.0, // Per match on a heading line
        }
    }
}

impl Heuristic {
    pub fn new(title_bonus: f64, heading_bonus: f64) -> Self {
        Self {
            title_bonus,
            heading_bonus,
        }
    }

    /// Score a document from its kept matches.
    ///
    /// `query` must already be trimmed and lowercased. The score is
    /// the kept-match count, plus the title bonus when the title
    /// contains the query, plus the heading bonus per match whose
    /// line starts with `#`, plus a position bonus rewarding matches
    /// near the top of the document.
    pub fn score(&self, title: &str, query: &str, matches: &[SearchMatch]) -> f64 {
        if matches.is_empty() {
            return 0.0;
        }

        let mut score = matches.len() as f64;

        if title.to_lowercase().contains(query) {
            score += self.title_bonus;
        }

        let heading_hits = matches.iter().filter(|m| m.text.starts_with('#')).count();
        score += self.heading_bonus * heading_hits as f64;

        let avg_line = matches.iter().map(|m| m.line).sum::<usize>() as f64 / matches.len() as f64;
        score += (10.0 - (avg_line / 10.0).floor()).max(0.0);

        score
    }
}

/// Sort results by score descending. The sort is stable, so equal
/// scores keep their corpus order.
pub fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMeta;

    fn match_at(line: usize, text: &str) -> SearchMatch {
        SearchMatch {
            line,
            text: text.to_string(),
            context: String::new(),
        }
    }

    #[test]
    fn test_score_counts_matches_and_position() {
        let heuristic = Heuristic::default();
        let matches = vec![match_at(2, "plain line")];
        // 1 match + no title/heading bonus + position bonus 10
        let score = heuristic.score("Title", "plain", &matches);
        assert_eq!(score, 11.0);
    }

    #[test]
    fn test_title_bonus() {
        let heuristic = Heuristic::default();
        let matches = vec![match_at(2, "plain line")];
        let with_title = heuristic.score("Plain Talk", "plain", &matches);
        let without_title = heuristic.score("Other", "plain", &matches);
        assert_eq!(with_title - without_title, 10.0);
    }

    #[test]
    fn test_heading_bonus_per_heading_match() {
        let heuristic = Heuristic::default();
        let plain = vec![match_at(1, "setup notes"), match_at(3, "more setup")];
        let headed = vec![match_at(1, "# setup notes"), match_at(3, "## more setup")];
        let diff = heuristic.score("t", "setup", &headed) - heuristic.score("t", "setup", &plain);
        assert_eq!(diff, 10.0);
    }

    #[test]
    fn test_position_bonus_fades_with_depth() {
        let heuristic = Heuristic::default();
        let near = heuristic.score("t", "q", &[match_at(5, "x")]);
        let far = heuristic.score("t", "q", &[match_at(95, "x")]);
        assert_eq!(near, 11.0); // 1 + max(0, 10 - floor(5/10))
        assert_eq!(far, 2.0); // 1 + max(0, 10 - floor(95/10))

        let very_far = heuristic.score("t", "q", &[match_at(500, "x")]);
        assert_eq!(very_far, 1.0); // bonus clamps at zero
    }

    #[test]
    fn test_rank_results_stable_descending() {
        let doc = |id: &str| DocumentMeta {
            id: id.to_string(),
            title: id.to_string(),
            path: format!("{id}.md"),
        };
        let result = |id: &str, score: f64| SearchResult {
            document: doc(id),
            matches: Vec::new(),
            score,
        };

        let mut results = vec![result("a", 2.0), result("b", 5.0), result("c", 2.0)];
        rank_results(&mut results);

        let ids: Vec<&str> = results.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
