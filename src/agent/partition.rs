//! Deterministic document partitioning for agent fan-out.
//!
//! Sorts retrieved documents chronologically and splits them into
//! near-equal contiguous groups, one per analysis agent. The final group
//! absorbs any remainder so no document is ever dropped.

use crate::document::{Document, DocumentGroup};

/// Partitions `documents` into at most `agent_count` chronological groups.
///
/// Documents are stable-sorted ascending by timestamp (missing timestamps
/// sort first via the minimum-instant default) and walked in strides of
/// `max(1, len / agent_count)`. The last requested group takes everything
/// left, so group sizes differ by at most the remainder and the
/// concatenation of all groups is exactly the sorted input.
///
/// Empty input yields no groups; `agent_count` larger than the document
/// count yields one single-document group per document.
#[must_use]
pub fn partition_documents(documents: Vec<Document>, agent_count: usize) -> Vec<DocumentGroup> {
    if documents.is_empty() || agent_count == 0 {
        return Vec::new();
    }

    let mut remaining = documents;
    remaining.sort_by_key(Document::sort_timestamp);

    let chunk_size = (remaining.len() / agent_count).max(1);
    let mut groups = Vec::with_capacity(agent_count);

    while !remaining.is_empty() {
        // The last requested group absorbs the remainder.
        if groups.len() + 1 == agent_count {
            groups.push(DocumentGroup {
                documents: std::mem::take(&mut remaining),
            });
            break;
        }
        let rest = remaining.split_off(chunk_size.min(remaining.len()));
        groups.push(DocumentGroup {
            documents: remaining,
        });
        remaining = rest;
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMeta;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn doc(content: &str, hour: Option<u32>) -> Document {
        Document {
            content: content.to_string(),
            metadata: DocumentMeta {
                timestamp: hour
                    .and_then(|h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).single()),
                ..DocumentMeta::default()
            },
        }
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(partition_documents(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_seven_documents_three_agents() {
        let docs: Vec<Document> = (0..7).map(|i| doc(&format!("d{i}"), Some(i))).collect();
        let groups = partition_documents(docs, 3);
        let sizes: Vec<usize> = groups.iter().map(DocumentGroup::len).collect();
        assert_eq!(sizes, vec![2, 2, 3]);
    }

    #[test]
    fn test_sorted_by_timestamp_ascending() {
        let docs = vec![doc("late", Some(12)), doc("early", Some(3)), doc("mid", Some(8))];
        let groups = partition_documents(docs, 1);
        let order: Vec<&str> = groups[0]
            .documents
            .iter()
            .map(|d| d.content.as_str())
            .collect();
        assert_eq!(order, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_missing_timestamp_sorts_first() {
        let docs = vec![doc("dated", Some(5)), doc("undated", None)];
        let groups = partition_documents(docs, 1);
        assert_eq!(groups[0].documents[0].content, "undated");
    }

    #[test]
    fn test_more_agents_than_documents() {
        let docs: Vec<Document> = (0..3).map(|i| doc(&format!("d{i}"), Some(i))).collect();
        let groups = partition_documents(docs, 5);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn test_single_agent_takes_everything() {
        let docs: Vec<Document> = (0..9).map(|i| doc(&format!("d{i}"), Some(i))).collect();
        let groups = partition_documents(docs, 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 9);
    }

    #[test]
    fn test_no_group_is_empty() {
        for n in 1_u32..20 {
            for agents in 1_usize..8 {
                let docs: Vec<Document> =
                    (0..n).map(|i| doc(&format!("d{i}"), Some(i % 24))).collect();
                let groups = partition_documents(docs, agents);
                assert!(groups.iter().all(|g| !g.is_empty()));
                assert!(groups.len() <= agents);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_partition_preserves_sorted_sequence(
            lens in proptest::collection::vec(0_u32..24, 0..40),
            agents in 1_usize..10,
        ) {
            let docs: Vec<Document> = lens
                .iter()
                .enumerate()
                .map(|(i, &h)| doc(&format!("d{i}-{h}"), Some(h)))
                .collect();

            let mut expected = docs.clone();
            expected.sort_by_key(Document::sort_timestamp);
            let expected: Vec<String> =
                expected.into_iter().map(|d| d.content).collect();

            let groups = partition_documents(docs, agents);
            let flattened: Vec<String> = groups
                .into_iter()
                .flat_map(|g| g.documents.into_iter().map(|d| d.content))
                .collect();

            // No loss, no duplication, partition order matches sort order.
            prop_assert_eq!(flattened, expected);
        }

        #[test]
        fn prop_group_count_bounded(
            n in 0_usize..60,
            agents in 1_usize..12,
        ) {
            let docs: Vec<Document> = (0_u32..)
                .take(n)
                .map(|i| doc(&format!("d{i}"), Some(i % 24)))
                .collect();
            let groups = partition_documents(docs, agents);
            prop_assert!(groups.len() <= agents);
            if n > 0 {
                prop_assert!(!groups.is_empty());
            }
        }
    }
}
