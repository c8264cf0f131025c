// Re-export main components
pub mod api;
pub mod corpus;
pub mod document;
pub mod engine;
pub mod index;
pub mod markdown;
pub mod ranking;

// Re-export commonly used types
pub use corpus::{Corpus, CorpusError};
pub use document::DocumentMeta;
pub use engine::{SearchEngine, SearchMatch, SearchResult};
pub use index::DocumentIndex;
pub use markdown::{parse, Frontmatter, ParsedMarkdown};

// Re-export error types
pub use anyhow::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_workflow() {
        let corpus = Corpus::from_entries(vec![(
            "help/getting-started.md".to_string(),
            "# Getting Started\nInstall the app, then sign in.\n".to_string(),
        )]);

        let engine = SearchEngine::new(DocumentIndex::new(corpus));

        // Search
        let results = engine.search("sign in");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "getting-started");

        // Render the matched document
        let content = engine.index().get_content(&results[0].document.path);
        let parsed = parse(&content);
        assert!(parsed.html_content.contains("<p>Install the app, then sign in.</p>"));
    }
}
