//! Keyed UBODT storage.
//!
//! Rows live in an `FxHashMap` keyed by `(source_road, target_road)`, which
//! is the matcher's O(1) lookup path.  Sorted views are produced on demand
//! for export.

use std::collections::BTreeSet;

use log::debug;
use rustc_hash::FxHashMap;

use fmm_core::RoadId;

use crate::road::RoadStore;
use crate::ubodt::UbodtRecord;
use crate::{NetworkError, NetworkResult};

#[derive(Clone, Debug, Default)]
pub struct UbodtStore {
    rows: FxHashMap<(RoadId, RoadId), UbodtRecord>,
}

impl UbodtStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Cheapest known row for `(source, target)`, or `None` if no path within
    /// the threshold it was built with exists.
    #[inline]
    pub fn lookup(&self, source: RoadId, target: RoadId) -> Option<&UbodtRecord> {
        self.rows.get(&(source, target))
    }

    /// Resolve a row's `next` reference.
    #[inline]
    pub fn next(&self, record: &UbodtRecord) -> Option<&UbodtRecord> {
        record.next_key().and_then(|key| self.rows.get(&key))
    }

    /// Full road sequence `source, …, target` by following `next` rows.
    ///
    /// `None` if there is no row for the pair or the chain is broken (for
    /// example after a partial reload that dropped an intermediate row).
    pub fn path(&self, source: RoadId, target: RoadId) -> Option<Vec<RoadId>> {
        if source == target {
            return Some(vec![source]);
        }
        let mut record = self.lookup(source, target)?;
        let mut path = vec![source];
        loop {
            path.push(record.source_next);
            match record.next_key() {
                None => return Some(path),
                Some(key) => record = self.rows.get(&key)?,
            }
            // A well-formed chain is strictly shorter than the table.
            if path.len() > self.rows.len() + 1 {
                return None;
            }
        }
    }

    /// Every row, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &UbodtRecord> + '_ {
        self.rows.values()
    }

    /// Rows sorted by `(source_road, target_road)`, optionally only those
    /// with `cost <= thresh`.
    pub fn sorted(&self, thresh: Option<f64>) -> Vec<UbodtRecord> {
        let mut rows: Vec<UbodtRecord> = self
            .rows
            .values()
            .filter(|r| thresh.is_none_or(|t| r.cost <= t))
            .copied()
            .collect();
        rows.sort_unstable_by(UbodtRecord::key_cmp);
        rows
    }

    /// Drop every row and insert `records`.
    pub fn replace(&mut self, records: Vec<UbodtRecord>) {
        self.rows.clear();
        self.merge(records);
    }

    /// Upsert `records` by key; later duplicates win.
    pub fn merge<I: IntoIterator<Item = UbodtRecord>>(&mut self, records: I) {
        let before = self.rows.len();
        self.rows.extend(records.into_iter().map(|r| (r.key(), r)));
        debug!("UBODT merge: {} -> {} rows", before, self.rows.len());
    }

    /// Replace exactly the rows whose source is in `sources`; rows for other
    /// sources are kept.
    pub fn replace_sources(&mut self, sources: &[RoadId], records: Vec<UbodtRecord>) {
        let sources: BTreeSet<RoadId> = sources.iter().copied().collect();
        self.rows.retain(|(s, _), _| !sources.contains(s));
        self.merge(records);
    }

    /// Drop every row whose path uses `id`.  Returns how many rows were
    /// removed.
    ///
    /// Rows naming `id` directly go first.  A row that only passes through
    /// `id` further along its path then has a `next` chain that ends at a
    /// missing row; those are dropped until every chain resolves again.
    pub fn purge_road(&mut self, id: RoadId) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, r| {
            r.source_road != id && r.target_road != id && r.source_next != id && r.target_prev != id
        });
        loop {
            let broken: Vec<(RoadId, RoadId)> = self
                .rows
                .values()
                .filter(|r| r.next_key().is_some_and(|key| !self.rows.contains_key(&key)))
                .map(UbodtRecord::key)
                .collect();
            if broken.is_empty() {
                break;
            }
            for key in broken {
                self.rows.remove(&key);
            }
        }
        before - self.rows.len()
    }
}

/// Check `records` against `roads`: every id must exist and every cost must
/// be finite and non-negative.
pub(crate) fn validate(records: &[UbodtRecord], roads: &RoadStore) -> NetworkResult<()> {
    for r in records {
        if !(r.cost.is_finite() && r.cost >= 0.0) {
            return Err(NetworkError::MalformedRecord(format!("{r}: cost must be finite and >= 0")));
        }
        roads.ensure_all(&[r.source_road, r.target_road, r.source_next, r.target_prev])?;
    }
    Ok(())
}
