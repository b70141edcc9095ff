//! Renders a document group into a single prompt body under a token budget.
//!
//! Documents are included whole, greedily, until the budget margin is
//! reached. Documents past that point are dropped from this agent's view
//! rather than redistributed; that keeps each agent's context strictly
//! chronological and each request's cost bounded.

use std::fmt::Write;

use crate::document::Document;
use crate::tokens::TokenCounter;

/// Fraction of the token ceiling available to document content. The
/// remaining 30% is reserved for the surrounding prompt and the response.
const CONTEXT_MARGIN: f64 = 0.7;

/// Separator between rendered documents.
const DOC_DELIMITER: &str = "\n\n---\n\n";

/// Renders `documents` into one prompt body whose document content stays
/// within `token_ceiling * 0.7`.
///
/// Documents are visited in group order; each is included only when its
/// token count still fits the remaining margin, and the first document
/// that does not fit ends inclusion entirely. An empty result is valid:
/// a single oversized first document yields no content.
#[must_use]
pub fn format_group(
    documents: &[Document],
    token_ceiling: usize,
    counter: &TokenCounter,
) -> String {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let margin = (token_ceiling as f64 * CONTEXT_MARGIN) as usize;

    let mut included: Vec<String> = Vec::with_capacity(documents.len());
    let mut used_tokens = 0_usize;

    for document in documents {
        let rendered = render_document(document);
        let tokens = counter.count_tokens(&rendered);
        if used_tokens + tokens > margin {
            break;
        }
        used_tokens += tokens;
        included.push(rendered);
    }

    included.join(DOC_DELIMITER)
}

/// Renders one document with its thread metadata header.
fn render_document(document: &Document) -> String {
    let meta = &document.metadata;
    let mut out = String::new();
    let _ = writeln!(out, "Thread: {}", meta.thread_title);
    let _ = writeln!(out, "Author: {}", meta.author);
    let _ = writeln!(
        out,
        "Posted: {}",
        meta.timestamp
            .map_or_else(|| "unknown".to_string(), |ts| ts.to_rfc3339()),
    );
    if let Some(score) = meta.score {
        let _ = writeln!(out, "Score: {score}");
    }
    let _ = write!(out, "\n{}", document.content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMeta;
    use chrono::{TimeZone, Utc};

    fn doc(content: &str) -> Document {
        Document {
            content: content.to_string(),
            metadata: DocumentMeta {
                thread_title: "Thread title".to_string(),
                author: "author".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
                score: Some(3),
            },
        }
    }

    #[test]
    fn test_render_includes_metadata_and_content() {
        let rendered = render_document(&doc("the post body"));
        assert!(rendered.contains("Thread: Thread title"));
        assert!(rendered.contains("Author: author"));
        assert!(rendered.contains("Posted: 2024-01-01"));
        assert!(rendered.contains("Score: 3"));
        assert!(rendered.ends_with("the post body"));
    }

    #[test]
    fn test_render_omits_missing_score() {
        let mut d = doc("body");
        d.metadata.score = None;
        let rendered = render_document(&d);
        assert!(!rendered.contains("Score:"));
        assert!(rendered.contains("Posted:"));
    }

    #[test]
    fn test_render_unknown_timestamp() {
        let mut d = doc("body");
        d.metadata.timestamp = None;
        assert!(render_document(&d).contains("Posted: unknown"));
    }

    #[test]
    fn test_all_documents_fit_generous_budget() {
        let counter = TokenCounter::new();
        let docs = vec![doc("first"), doc("second"), doc("third")];
        let formatted = format_group(&docs, 100_000, &counter);
        assert!(formatted.contains("first"));
        assert!(formatted.contains("second"));
        assert!(formatted.contains("third"));
        assert_eq!(formatted.matches("\n\n---\n\n").count(), 2);
    }

    #[test]
    fn test_trailing_documents_dropped_at_margin() {
        let counter = TokenCounter::new();
        let small = doc("short");
        let per_doc = counter.count_tokens(&render_document(&small));
        // Budget fits exactly two documents inside the 70% margin.
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ceiling = ((per_doc * 2) as f64 / CONTEXT_MARGIN).ceil() as usize + 1;
        let docs = vec![doc("short"), doc("short"), doc("short"), doc("short")];
        let formatted = format_group(&docs, ceiling, &counter);
        assert_eq!(formatted.matches("short").count(), 2);
    }

    #[test]
    fn test_oversized_first_document_yields_empty() {
        let counter = TokenCounter::new();
        let docs = vec![doc(&"word ".repeat(500))];
        let formatted = format_group(&docs, 10, &counter);
        assert!(formatted.is_empty());
    }

    #[test]
    fn test_empty_group_yields_empty() {
        let counter = TokenCounter::new();
        assert!(format_group(&[], 1000, &counter).is_empty());
    }

    #[test]
    fn test_content_stays_within_margin() {
        let counter = TokenCounter::new();
        let docs: Vec<Document> = (0..30).map(|i| doc(&format!("post number {i} "))).collect();
        let ceiling = 200;
        let formatted = format_group(&docs, ceiling, &counter);
        // Included document tokens must respect the 70% margin; delimiters
        // add a little on top but the full ceiling still bounds the result.
        assert!(counter.count_tokens(&formatted) <= ceiling);
    }
}
