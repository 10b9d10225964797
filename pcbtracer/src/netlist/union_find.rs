//! Disjoint sets over point ids.
//!
//! Ids are mapped to dense slots on first use; `parent` and `rank` are flat
//! arrays indexed by slot.

use std::collections::HashMap;

use crate::project::PointId;

#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    slots: HashMap<PointId, usize>,
    ids: Vec<PointId>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
            ids: Vec::with_capacity(capacity),
            parent: Vec::with_capacity(capacity),
            rank: Vec::with_capacity(capacity),
        }
    }

    /// Register `id` as its own set if it is new
    pub fn register(&mut self, id: PointId) -> usize {
        if let Some(&slot) = self.slots.get(&id) {
            return slot;
        }
        let slot = self.ids.len();
        self.slots.insert(id, slot);
        self.ids.push(id);
        self.parent.push(slot);
        self.rank.push(0);
        slot
    }

    /// Representative of the set containing `id`, registering it if needed
    pub fn find(&mut self, id: PointId) -> PointId {
        let slot = self.register(id);
        let root = self.find_slot(slot);
        self.ids[root]
    }

    fn find_slot(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression
        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Merge the sets of `a` and `b`; returns `false` if already merged
    pub fn union(&mut self, a: PointId, b: PointId) -> bool {
        let slot_a = self.register(a);
        let slot_b = self.register(b);
        let root_a = self.find_slot(slot_a);
        let root_b = self.find_slot(slot_b);

        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] = self.rank[root_a].saturating_add(1);
            }
        }

        true
    }

    pub fn connected(&mut self, a: PointId, b: PointId) -> bool {
        self.find(a) == self.find(b)
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of registered ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
