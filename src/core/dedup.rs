//! Deduplication of replayed log records
//!
//! Log replay writes the same request more than once. Within one file a
//! record is identified by its `message_id:request_id` pair; records missing
//! either half carry no identity and are always kept.

use std::collections::HashSet;

/// Stable identity of a Claude record, if it has one
pub(crate) fn unique_hash(message_id: Option<&str>, request_id: Option<&str>) -> Option<String> {
    match (message_id, request_id) {
        (Some(message_id), Some(request_id)) => Some(format!("{message_id}:{request_id}")),
        _ => None,
    }
}

/// Per-file set of identities already seen
#[derive(Debug, Default)]
pub(crate) struct DedupSet {
    seen: HashSet<String>,
    duplicates: usize,
}

impl DedupSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the record should be kept.
    pub(crate) fn admit(&mut self, key: Option<String>) -> bool {
        let Some(key) = key else {
            return true;
        };
        if self.seen.insert(key) {
            true
        } else {
            self.duplicates += 1;
            false
        }
    }

    /// Number of records suppressed so far
    pub(crate) fn duplicates(&self) -> usize {
        self.duplicates
    }
}
