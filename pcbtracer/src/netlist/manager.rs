//! Connectivity Manager
//!
//! Owns the one authoritative snapshot of the connectivity graph and keeps
//! it in step with the drawing. Callers invoke [`ConnectivityManager::sync_from_state`]
//! after every edit; when the input fingerprint is unchanged the call is a
//! no-op, otherwise the whole snapshot is rebuilt and swapped in at once.
//!
//! Ground and power symbols *associate* with the node at their point id and
//! change its displayed kind. Each rebuild starts from the drawing, so
//! deleting the symbol restores the drawn kind, and
//! [`ConnectivityManager::drawn_kind`] reports it while the symbol is there.
//!
//! Every query returns owned data; nothing hands out references into the
//! snapshot.

use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::builder::{BuiltGraph, GraphBuilder, UnconnectedPin};
use super::fingerprint::InputFingerprint;
use super::grouping::{root_index, NetGrouper, NetGroups};
use super::naming::{normalize_voltage, NetNamer, NetNames, NetRole};
use super::node::{Edge, Node, NodeKind, NodeMap};
use super::report::{ConnectivityStats, NetEntry, NetMember, NetPin, NetlistReport};
use super::ConnectivityError;
use crate::diagnostics::{DiagnosticsSink, NoopSink};
use crate::options::NetlistOptions;
use crate::project::{DrawingState, PointId, ProjectSnapshot};

/// Result of a sync call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Input matched the committed snapshot
    Unchanged,
    /// A new snapshot was built and committed
    Rebuilt,
}

/// Power association of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerInfo {
    pub bus_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_name: Option<String>,
    /// Voltage as written on the bus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
    /// Normalized form, e.g. `+3V3`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_voltage: Option<String>,
}

/// A component pin sitting on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPinInfo {
    pub component_id: String,
    pub designator: String,
    /// 1-based display number
    pub pin_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SyncState {
    Dirty,
    Clean(InputFingerprint),
}

/// Everything derived from one drawing state
#[derive(Debug, Clone, Default)]
struct ConnectivitySnapshot {
    nodes: NodeMap,
    edges: Vec<Edge>,
    adjacency: UnGraphMap<PointId, ()>,
    net_groups: NetGroups,
    net_names: NetNames,
    net_of: HashMap<PointId, PointId>,
    ground_nodes: HashSet<PointId>,
    power_nodes: HashMap<PointId, PowerInfo>,
    node_traces: HashMap<PointId, Vec<String>>,
    node_components: HashMap<PointId, Vec<String>>,
    component_pins: HashMap<String, BTreeMap<usize, PointId>>,
    designators: BTreeMap<String, String>,
    /// Structural kind of every node that sits under a rail
    drawn_kinds: HashMap<PointId, NodeKind>,
    vias: BTreeSet<PointId>,
    pads: BTreeSet<PointId>,
    unconnected_pins: Vec<UnconnectedPin>,
}

/// Long-lived, incrementally synchronized connectivity cache
pub struct ConnectivityManager {
    options: NetlistOptions,
    sink: Arc<dyn DiagnosticsSink>,
    state: SyncState,
    snapshot: ConnectivitySnapshot,
    rebuilds: u64,
}

impl Default for ConnectivityManager {
    fn default() -> Self {
        Self::new(NetlistOptions::default())
    }
}

impl std::fmt::Debug for ConnectivityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityManager")
            .field("options", &self.options)
            .field("dirty", &self.is_dirty())
            .field("nodes", &self.snapshot.nodes.len())
            .field("nets", &self.snapshot.net_groups.len())
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}

impl ConnectivityManager {
    pub fn new(options: NetlistOptions) -> Self {
        Self {
            options,
            sink: Arc::new(NoopSink),
            state: SyncState::Dirty,
            snapshot: ConnectivitySnapshot::default(),
            rebuilds: 0,
        }
    }

    /// Replace the diagnostics sink
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &NetlistOptions {
        &self.options
    }

    /// Change options; the next sync rebuilds
    pub fn set_options(&mut self, options: NetlistOptions) {
        if options != self.options {
            self.options = options;
            self.mark_dirty();
        }
    }

    /// Force the next sync to rebuild
    pub fn mark_dirty(&mut self) {
        self.state = SyncState::Dirty;
    }

    pub fn is_dirty(&self) -> bool {
        self.state == SyncState::Dirty
    }

    /// Number of committed rebuilds
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Sync against a whole project snapshot
    pub fn sync(&mut self, project: &ProjectSnapshot) -> Result<SyncOutcome, ConnectivityError> {
        self.sync_from_state(project.drawing_state())
    }

    /// Bring the snapshot in line with `state`.
    ///
    /// On error nothing is committed and the previous snapshot keeps
    /// answering queries.
    pub fn sync_from_state(
        &mut self,
        state: DrawingState<'_>,
    ) -> Result<SyncOutcome, ConnectivityError> {
        let fingerprint = InputFingerprint::of(state);
        if let SyncState::Clean(current) = &self.state {
            if *current == fingerprint {
                return Ok(SyncOutcome::Unchanged);
            }
        }

        let started = Instant::now();
        let snapshot = match self.rebuild(state) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Connectivity rebuild failed, keeping previous snapshot: {}", e);
                return Err(e);
            }
        };

        self.snapshot = snapshot;
        self.state = SyncState::Clean(fingerprint);
        self.rebuilds += 1;

        tracing::debug!(
            "Connectivity rebuilt in {:?}: {} nodes, {} edges, {} nets",
            started.elapsed(),
            self.snapshot.nodes.len(),
            self.snapshot.edges.len(),
            self.snapshot.net_groups.len()
        );

        Ok(SyncOutcome::Rebuilt)
    }

    /// Build a complete snapshot without touching `self`
    fn rebuild(
        &self,
        state: DrawingState<'_>,
    ) -> Result<ConnectivitySnapshot, ConnectivityError> {
        let BuiltGraph {
            mut nodes,
            edges,
            traces,
            vias,
            pads,
            pins,
            unconnected_pins,
            designators,
            buses,
        } = GraphBuilder::new(&self.options, self.sink.as_ref()).build(state)?;

        let drawn_kinds = apply_associations(&mut nodes);

        let net_groups = NetGrouper::new(&self.options).group(&nodes, &edges);
        let net_names = NetNamer::new(&self.options).name(&net_groups);
        let net_of = root_index(&net_groups);

        let mut adjacency = UnGraphMap::with_capacity(nodes.len(), edges.len());
        for edge in &edges {
            adjacency.add_edge(edge.a, edge.b, ());
        }

        let mut ground_nodes = HashSet::new();
        let mut power_nodes = HashMap::new();
        for node in nodes.values() {
            if node.ground_bus_ref.is_some() {
                ground_nodes.insert(node.id);
            }
            if let Some(bus_id) = &node.power_bus_ref {
                power_nodes.insert(
                    node.id,
                    PowerInfo {
                        bus_id: bus_id.clone(),
                        bus_name: buses.power_bus(bus_id).map(|b| b.name.clone()),
                        voltage: node.voltage.clone(),
                        normalized_voltage: node.voltage.as_deref().map(normalize_voltage),
                    },
                );
            }
        }

        let mut node_traces: HashMap<PointId, Vec<String>> = HashMap::new();
        for (trace_id, vertices) in &traces {
            for id in vertices {
                let list = node_traces.entry(*id).or_default();
                if !list.contains(trace_id) {
                    list.push(trace_id.clone());
                }
            }
        }

        let mut node_components: HashMap<PointId, Vec<String>> = HashMap::new();
        let mut component_pins: HashMap<String, BTreeMap<usize, PointId>> = HashMap::new();
        for pin in &pins {
            let list = node_components.entry(pin.node).or_default();
            if !list.contains(&pin.component_id) {
                list.push(pin.component_id.clone());
            }
            component_pins
                .entry(pin.component_id.clone())
                .or_default()
                .insert(pin.pin_index, pin.node);
        }

        let snapshot = ConnectivitySnapshot {
            nodes,
            edges,
            adjacency,
            net_groups,
            net_names,
            net_of,
            ground_nodes,
            power_nodes,
            node_traces,
            node_components,
            component_pins,
            designators,
            drawn_kinds,
            vias,
            pads,
            unconnected_pins,
        };

        Ok(snapshot)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn node(&self, id: PointId) -> Option<Node> {
        self.snapshot.nodes.get(&id).cloned()
    }

    /// Kind `id` was drawn as, before any ground or power association.
    /// A node that only exists because of a rail symbol reports the rail kind.
    pub fn drawn_kind(&self, id: PointId) -> Option<NodeKind> {
        self.snapshot
            .drawn_kinds
            .get(&id)
            .copied()
            .or_else(|| self.snapshot.nodes.get(&id).map(|n| n.kind))
    }

    pub fn nodes(&self) -> NodeMap {
        self.snapshot.nodes.clone()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.snapshot.edges.clone()
    }

    pub fn net_groups(&self) -> NetGroups {
        self.snapshot.net_groups.clone()
    }

    pub fn net_names(&self) -> NetNames {
        self.snapshot.net_names.clone()
    }

    /// Non-trace-point nodes reachable from `id` along drawn traces,
    /// excluding `id` itself. Bus membership does not count as a connection
    /// here.
    pub fn nodes_connected_to(&self, id: PointId) -> Vec<Node> {
        let graph = &self.snapshot.adjacency;
        if !graph.contains_node(id) {
            return Vec::new();
        }

        let mut connected = Vec::new();
        let mut dfs = Dfs::new(graph, id);
        while let Some(next) = dfs.next(graph) {
            if next == id {
                continue;
            }
            if let Some(node) = self.snapshot.nodes.get(&next) {
                if node.kind != NodeKind::TracePoint {
                    connected.push(node.clone());
                }
            }
        }
        connected
    }

    /// Every member of the net containing `id`; empty for unknown ids
    pub fn net_for_node(&self, id: PointId) -> Vec<Node> {
        let Some(node) = self.snapshot.nodes.get(&id) else {
            return Vec::new();
        };
        self.snapshot
            .net_of
            .get(&id)
            .and_then(|root| self.snapshot.net_groups.get(root))
            .cloned()
            .unwrap_or_else(|| vec![node.clone()])
    }

    pub fn net_name_for_node(&self, id: PointId) -> Option<String> {
        let root = self.snapshot.net_of.get(&id)?;
        self.snapshot.net_names.get(root).cloned()
    }

    pub fn is_ground_node(&self, id: PointId) -> bool {
        self.snapshot.ground_nodes.contains(&id)
    }

    pub fn is_power_node(&self, id: PointId) -> bool {
        self.snapshot.power_nodes.contains_key(&id)
    }

    pub fn power_info(&self, id: PointId) -> Option<PowerInfo> {
        self.snapshot.power_nodes.get(&id).cloned()
    }

    /// Trace strokes passing through `id`
    pub fn traces_on_node(&self, id: PointId) -> Vec<String> {
        self.snapshot.node_traces.get(&id).cloned().unwrap_or_default()
    }

    /// Components with at least one pin on `id`
    pub fn components_on_node(&self, id: PointId) -> Vec<String> {
        self.snapshot
            .node_components
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Pin index → node id for one component
    pub fn component_pin_map(&self, component_id: &str) -> BTreeMap<usize, PointId> {
        self.snapshot
            .component_pins
            .get(component_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All component pins on `id`, ordered by component then pin
    pub fn component_pins_on_node(&self, id: PointId) -> Vec<ComponentPinInfo> {
        let Some(components) = self.snapshot.node_components.get(&id) else {
            return Vec::new();
        };

        let mut pins = Vec::new();
        for component_id in components {
            let Some(pin_map) = self.snapshot.component_pins.get(component_id) else {
                continue;
            };
            let designator = self
                .snapshot
                .designators
                .get(component_id)
                .cloned()
                .unwrap_or_else(|| component_id.clone());

            for (&pin_index, &node) in pin_map {
                if node == id {
                    pins.push(ComponentPinInfo {
                        component_id: component_id.clone(),
                        designator: designator.clone(),
                        pin_number: pin_index + 1,
                    });
                }
            }
        }
        pins
    }

    /// Points drawn as vias, regardless of displayed kind
    pub fn vias(&self) -> Vec<PointId> {
        self.snapshot.vias.iter().copied().collect()
    }

    /// Points drawn as pads, regardless of displayed kind
    pub fn pads(&self) -> Vec<PointId> {
        self.snapshot.pads.iter().copied().collect()
    }

    pub fn is_via(&self, id: PointId) -> bool {
        self.snapshot.vias.contains(&id)
    }

    pub fn unconnected_pins(&self) -> Vec<UnconnectedPin> {
        self.snapshot.unconnected_pins.clone()
    }

    pub fn stats(&self) -> ConnectivityStats {
        let snapshot = &self.snapshot;
        let mut stats = ConnectivityStats {
            node_count: snapshot.nodes.len(),
            edge_count: snapshot.edges.len(),
            net_count: snapshot.net_groups.len(),
            unconnected_pins: snapshot.unconnected_pins.len(),
            rebuilds: self.rebuilds,
            ..ConnectivityStats::default()
        };

        for members in snapshot.net_groups.values() {
            match NetRole::of(members) {
                NetRole::Ground => stats.ground_nets += 1,
                NetRole::Power => stats.power_nets += 1,
                NetRole::Signal => stats.signal_nets += 1,
            }
            if members.len() == 1 {
                stats.singleton_nets += 1;
            }
        }

        stats
    }

    /// Serializable export of the current snapshot
    pub fn report(&self) -> NetlistReport {
        let snapshot = &self.snapshot;
        let nets = snapshot
            .net_groups
            .iter()
            .map(|(root, members)| {
                let pins = members
                    .iter()
                    .flat_map(|n| {
                        self.component_pins_on_node(n.id)
                            .into_iter()
                            .map(move |p| NetPin {
                                component_id: p.component_id,
                                designator: p.designator,
                                pin_number: p.pin_number,
                                node: n.id,
                            })
                    })
                    .collect();

                NetEntry {
                    name: snapshot.net_names.get(root).cloned().unwrap_or_default(),
                    role: NetRole::of(members),
                    nodes: members
                        .iter()
                        .map(|n| NetMember {
                            id: n.id,
                            kind: n.kind,
                        })
                        .collect(),
                    pins,
                }
            })
            .collect();

        NetlistReport {
            generated_at: chrono::Utc::now(),
            stats: self.stats(),
            nets,
            unconnected_pins: snapshot.unconnected_pins.clone(),
        }
    }
}

/// Apply ground/power associations to the freshly built nodes.
///
/// Associated nodes display `Ground`/`Power` (component pins keep their
/// kind). Returns the structural kind each associated node was drawn as.
/// Nodes are rebuilt from the drawing on every sync, so a node whose
/// association is gone comes back with its drawn kind on its own.
fn apply_associations(nodes: &mut NodeMap) -> HashMap<PointId, NodeKind> {
    let mut drawn_kinds = HashMap::new();

    for node in nodes.values_mut() {
        let rail_kind = if node.ground_bus_ref.is_some() {
            NodeKind::Ground
        } else if node.power_bus_ref.is_some() {
            NodeKind::Power
        } else {
            continue;
        };

        if node.kind.is_structural() {
            drawn_kinds.insert(node.id, node.kind);
        }
        if node.kind != NodeKind::ComponentPin {
            node.kind = rail_kind;
        }
    }

    drawn_kinds
}
