//! Retrieved forum documents and the store that supplies them.
//!
//! A [`Document`] is one retrieved unit of forum content (a post or a
//! thread excerpt) with its scrape metadata. The core never mutates
//! documents; it only sorts, groups, and renders them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Scrape metadata attached to a retrieved document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Title of the forum thread the document came from.
    #[serde(default)]
    pub thread_title: String,
    /// Author of the post.
    #[serde(default)]
    pub author: String,
    /// When the post was made. Missing or unparseable timestamps are
    /// treated as the minimum representable instant, so such documents
    /// sort first and ordering stays stable across runs.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Forum score (upvotes) when the source exposes one.
    #[serde(default)]
    pub score: Option<i64>,
}

/// One retrieved unit of forum content. Immutable once retrieved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Post body text.
    pub content: String,
    /// Scrape metadata.
    #[serde(default)]
    pub metadata: DocumentMeta,
}

impl Document {
    /// Timestamp used for chronological ordering, defaulting missing
    /// values to the minimum representable instant.
    #[must_use]
    pub fn sort_timestamp(&self) -> DateTime<Utc> {
        self.metadata.timestamp.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// An ordered, contiguous slice of the time-sorted corpus assigned to one
/// analysis agent. Created by the partitioner, consumed once by the
/// runner, never mutated after creation.
#[derive(Debug, Clone)]
pub struct DocumentGroup {
    /// Documents in this group, in chronological order.
    pub documents: Vec<Document>,
}

impl DocumentGroup {
    /// Number of documents in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the group holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// External document retriever.
///
/// Owned by the surrounding application (vector index, embedding model,
/// and ingestion are out of scope here); the orchestrator only consumes
/// the ranked documents it returns. An empty result is a valid terminal
/// condition, not an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns documents ranked against `query`, possibly empty.
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sort_timestamp_defaults_to_minimum() {
        let doc = Document {
            content: "body".to_string(),
            metadata: DocumentMeta::default(),
        };
        assert_eq!(doc.sort_timestamp(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_sort_timestamp_uses_metadata() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single();
        let doc = Document {
            content: "body".to_string(),
            metadata: DocumentMeta {
                timestamp: ts,
                ..DocumentMeta::default()
            },
        };
        assert_eq!(Some(doc.sort_timestamp()), ts);
    }

    #[test]
    fn test_document_deserializes_with_missing_metadata() {
        let doc: Document = serde_json::from_str(r#"{"content": "just text"}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(doc.content, "just text");
        assert!(doc.metadata.thread_title.is_empty());
        assert!(doc.metadata.timestamp.is_none());
    }

    #[test]
    fn test_document_deserializes_full_metadata() {
        let json = r#"{
            "content": "the post",
            "metadata": {
                "thread_title": "Best practices?",
                "author": "alice",
                "timestamp": "2024-03-01T12:00:00Z",
                "score": 42
            }
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert_eq!(doc.metadata.author, "alice");
        assert_eq!(doc.metadata.score, Some(42));
        assert!(doc.metadata.timestamp.is_some());
    }
}
