use crate::links::CatalogIdentifier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Sharing statistics for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareRecord {
    pub identifier: CatalogIdentifier,
    /// Most recently shared form of the link.
    pub canonical_url: String,
    pub share_count: u64,
    pub first_seen_at: Option<DateTime<Utc>>,
    pub first_sharer_id: Option<String>,
    pub sharer_ids: BTreeSet<String>,
}

impl ShareRecord {
    pub(super) fn empty(identifier: CatalogIdentifier) -> Self {
        Self {
            identifier,
            canonical_url: String::new(),
            share_count: 0,
            first_seen_at: None,
            first_sharer_id: None,
            sharer_ids: BTreeSet::new(),
        }
    }

    pub(super) fn apply_share(&mut self, url: &str, user_id: &str, now: DateTime<Utc>) {
        self.share_count += 1;
        url.clone_into(&mut self.canonical_url);
        self.sharer_ids.insert(user_id.to_string());
        if self.first_seen_at.is_none() {
            self.first_seen_at = Some(now);
            self.first_sharer_id = Some(user_id.to_string());
        }
    }

    pub fn unique_sharers(&self) -> usize {
        self.sharer_ids.len()
    }
}
