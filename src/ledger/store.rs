use super::record::ShareRecord;
use crate::links::CatalogIdentifier;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory share counts, one record per catalog item.
///
/// A single lock guards the whole ledger, so every read sees a consistent
/// snapshot. Records are kept in first-share order, which is also the
/// tie-break order of [`ShareLedger::top_n`].
/// Counts for one item as they stood right after a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareTally {
    pub share_count: u64,
    pub unique_sharers: usize,
}

#[derive(Debug, Default)]
pub struct ShareLedger {
    inner: Mutex<LedgerInner>,
}

#[derive(Debug, Default)]
struct LedgerInner {
    records: Vec<ShareRecord>,
    index: HashMap<CatalogIdentifier, usize>,
}

impl LedgerInner {
    fn get(&self, identifier: &CatalogIdentifier) -> Option<&ShareRecord> {
        self.index.get(identifier).map(|&slot| &self.records[slot])
    }

    fn get_or_create(&mut self, identifier: &CatalogIdentifier) -> &mut ShareRecord {
        let slot = if let Some(&slot) = self.index.get(identifier) {
            slot
        } else {
            let slot = self.records.len();
            self.records.push(ShareRecord::empty(identifier.clone()));
            self.index.insert(identifier.clone(), slot);
            slot
        };
        &mut self.records[slot]
    }
}

impl ShareLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one share of `identifier` by `user_id` and return the updated
    /// tally, read under the same lock. Empty identifiers are ignored.
    pub fn record_share(
        &self,
        identifier: &CatalogIdentifier,
        url: &str,
        user_id: &str,
    ) -> Option<ShareTally> {
        if identifier.is_empty() {
            return None;
        }
        let mut inner = self.lock();
        let record = inner.get_or_create(identifier);
        record.apply_share(url, user_id, Utc::now());
        tracing::debug!(
            app_id = %identifier,
            count = record.share_count,
            "recorded share"
        );
        Some(ShareTally {
            share_count: record.share_count,
            unique_sharers: record.unique_sharers(),
        })
    }

    pub fn count_for(&self, identifier: &CatalogIdentifier) -> u64 {
        self.lock().get(identifier).map_or(0, |r| r.share_count)
    }

    pub fn unique_sharers(&self, identifier: &CatalogIdentifier) -> usize {
        self.lock().get(identifier).map_or(0, ShareRecord::unique_sharers)
    }

    pub fn record(&self, identifier: &CatalogIdentifier) -> Option<ShareRecord> {
        self.lock().get(identifier).cloned()
    }

    /// Most shared items first; equal counts keep first-share order.
    pub fn top_n(&self, n: usize) -> Vec<(CatalogIdentifier, ShareRecord)> {
        let mut ranked = self.lock().records.clone();
        ranked.sort_by(|a, b| b.share_count.cmp(&a.share_count));
        ranked.truncate(n);
        ranked
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect()
    }

    pub fn total_shares(&self) -> u64 {
        self.lock().records.iter().map(|r| r.share_count).sum()
    }

    /// Number of distinct items shared so far.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
