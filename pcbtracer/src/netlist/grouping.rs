//! Net Grouping Engine
//!
//! Groups nodes into nets: trace edges connect their endpoints, and every
//! node on the same power bus (or the same ground bus) joins one net even
//! without a drawn trace between them.

use indexmap::IndexMap;
use std::collections::HashMap;

use super::node::{Edge, Node, NodeMap};
use super::union_find::UnionFind;
use crate::options::NetlistOptions;
use crate::project::PointId;

/// Nets keyed by their root id, in order of each net's lowest member id
pub type NetGroups = IndexMap<PointId, Vec<Node>>;

/// Union-find based net grouping
#[derive(Debug, Clone, Default)]
pub struct NetGrouper {
    merge_ground_buses: bool,
}

impl NetGrouper {
    pub fn new(options: &NetlistOptions) -> Self {
        Self {
            merge_ground_buses: options.merge_ground_buses,
        }
    }

    /// Partition `nodes` into nets
    pub fn group(&self, nodes: &NodeMap, edges: &[Edge]) -> NetGroups {
        let mut uf = UnionFind::with_capacity(nodes.len());

        for edge in edges {
            if nodes.contains_key(&edge.a) && nodes.contains_key(&edge.b) {
                uf.union(edge.a, edge.b);
            }
        }

        let mut power_rails: HashMap<&str, PointId> = HashMap::new();
        let mut ground_rails: HashMap<&str, PointId> = HashMap::new();
        let mut common_ground: Option<PointId> = None;

        for node in nodes.values() {
            if let Some(bus) = node.power_bus_ref.as_deref() {
                let first = *power_rails.entry(bus).or_insert(node.id);
                uf.union(first, node.id);
            }

            if let Some(bus) = node.ground_bus_ref.as_deref() {
                let first = if self.merge_ground_buses {
                    *common_ground.get_or_insert(node.id)
                } else {
                    *ground_rails.entry(bus).or_insert(node.id)
                };
                uf.union(first, node.id);
            }
        }

        let mut groups = NetGroups::new();
        for (&id, node) in nodes {
            let root = uf.find(id);
            groups.entry(root).or_default().push(node.clone());
        }

        tracing::debug!(
            "Grouped {} nodes into {} nets ({} edges)",
            nodes.len(),
            groups.len(),
            edges.len()
        );

        groups
    }
}

/// Map every node id to the root of its net
pub fn root_index(groups: &NetGroups) -> HashMap<PointId, PointId> {
    groups
        .iter()
        .flat_map(|(&root, members)| members.iter().map(move |n| (n.id, root)))
        .collect()
}
