//! Directed adjacency between roads.
//!
//! A link `(s, t)` means traffic may leave the end of road `s` and enter the
//! start of road `t`.  Both directions are indexed so `prev_roads` is as
//! cheap as `next_roads`.  Neighbour sets are `BTreeSet`s: iteration order is
//! ascending `RoadId`, which keeps every downstream consumer (CSR snapshot,
//! serialization) deterministic without extra sorting.
//!
//! `Topology` does not know which roads exist; existence checks belong to
//! the owning [`Network`](crate::Network), which validates before calling in.

use std::collections::{BTreeMap, BTreeSet};

use fmm_core::RoadId;

#[derive(Clone, Debug, Default)]
pub struct Topology {
    next: BTreeMap<RoadId, BTreeSet<RoadId>>,
    prev: BTreeMap<RoadId, BTreeSet<RoadId>>,
    link_count: usize,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `source → target`.  Returns `false` if the link already existed.
    pub fn insert(&mut self, source: RoadId, target: RoadId) -> bool {
        let added = self.next.entry(source).or_default().insert(target);
        if added {
            self.prev.entry(target).or_default().insert(source);
            self.link_count += 1;
        }
        added
    }

    /// Remove `source → target`.  Returns `false` if there was no such link.
    pub fn remove(&mut self, source: RoadId, target: RoadId) -> bool {
        let removed = remove_from(&mut self.next, source, target);
        if removed {
            remove_from(&mut self.prev, target, source);
            self.link_count -= 1;
        }
        removed
    }

    /// Drop every link touching `id` (both directions, including a
    /// self-loop).  Returns the number of links removed.
    pub fn detach(&mut self, id: RoadId) -> usize {
        let before = self.link_count;
        let outgoing = self.next.remove(&id).unwrap_or_default();
        for target in &outgoing {
            if *target != id {
                remove_from(&mut self.prev, *target, id);
            }
        }
        self.link_count -= outgoing.len();

        let incoming = self.prev.remove(&id).unwrap_or_default();
        for source in &incoming {
            if *source != id {
                remove_from(&mut self.next, *source, id);
                self.link_count -= 1;
            }
        }
        before - self.link_count
    }

    #[inline]
    pub fn contains(&self, source: RoadId, target: RoadId) -> bool {
        self.next.get(&source).is_some_and(|s| s.contains(&target))
    }

    /// Successors of `id` in ascending order (empty if none).
    pub fn next(&self, id: RoadId) -> impl Iterator<Item = RoadId> + '_ {
        self.next.get(&id).into_iter().flatten().copied()
    }

    /// Predecessors of `id` in ascending order (empty if none).
    pub fn prev(&self, id: RoadId) -> impl Iterator<Item = RoadId> + '_ {
        self.prev.get(&id).into_iter().flatten().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.link_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.link_count == 0
    }

    /// Every link in ascending `(source, target)` order.
    pub fn links(&self) -> impl Iterator<Item = (RoadId, RoadId)> + '_ {
        self.next
            .iter()
            .flat_map(|(&s, targets)| targets.iter().map(move |&t| (s, t)))
    }
}

/// Remove `value` from the set under `key`, dropping the set once empty.
fn remove_from(map: &mut BTreeMap<RoadId, BTreeSet<RoadId>>, key: RoadId, value: RoadId) -> bool {
    let Some(set) = map.get_mut(&key) else {
        return false;
    };
    let removed = set.remove(&value);
    if set.is_empty() {
        map.remove(&key);
    }
    removed
}
