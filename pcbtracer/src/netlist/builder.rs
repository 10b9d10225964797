//! Graph Builder
//!
//! Turns the drawn primitives into a node map keyed by point id. Categories
//! are merged in a fixed order (vias/pads, traces, power symbols, ground
//! symbols, component pins) so cross-category precedence never depends on
//! input order. Within a category, records are visited in id order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::bus::BusRegistry;
use super::node::{ComponentRef, Edge, Node, NodeKind, NodeMap, Position};
use super::ConnectivityError;
use crate::diagnostics::DiagnosticsSink;
use crate::options::NetlistOptions;
use crate::project::{
    Component, DrawingState, GroundSymbol, PointId, PowerSymbol, Stroke, StrokeType,
};

/// Why a component pin produced no node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnconnectedReason {
    /// Empty or missing connection entry
    Empty,
    /// Non-numeric or non-positive connection string
    Malformed,
}

/// A component pin that is not attached to any point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnconnectedPin {
    pub component_id: String,
    pub designator: String,
    /// 1-based display number
    pub pin_number: usize,
    pub reason: UnconnectedReason,
}

/// A connected component pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinLink {
    pub component_id: String,
    /// Zero-based index into the pin table
    pub pin_index: usize,
    pub node: PointId,
}

/// Output of one build: nodes plus the side tables the manager indexes
#[derive(Debug, Clone, Default)]
pub struct BuiltGraph {
    pub nodes: NodeMap,
    pub edges: Vec<Edge>,
    /// Trace stroke id with the identified vertices it passes through
    pub traces: Vec<(String, Vec<PointId>)>,
    /// Points drawn as vias, whatever kind the node ended up with
    pub vias: BTreeSet<PointId>,
    /// Points drawn as pads, whatever kind the node ended up with
    pub pads: BTreeSet<PointId>,
    /// Every connected pin, including several pins on one node
    pub pins: Vec<PinLink>,
    pub unconnected_pins: Vec<UnconnectedPin>,
    /// Display designator of every component that was kept
    pub designators: BTreeMap<String, String>,
    pub buses: BusRegistry,
}

/// Builds node maps from drawing state
pub struct GraphBuilder<'a> {
    options: &'a NetlistOptions,
    sink: &'a dyn DiagnosticsSink,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(options: &'a NetlistOptions, sink: &'a dyn DiagnosticsSink) -> Self {
        Self { options, sink }
    }

    /// Build the node map, edges and side tables for one drawing state
    pub fn build(&self, state: DrawingState<'_>) -> Result<BuiltGraph, ConnectivityError> {
        Self::validate(state)?;

        let registry = BusRegistry::new(state.power_buses, state.ground_buses, self.sink);
        let mut graph = BuiltGraph::default();

        let strokes = self.unique_by_id(
            state.strokes,
            "stroke",
            |s| s.id.as_str(),
            |s| {
                // Bit patterns give coordinates a total order
                let points: Vec<_> = s
                    .points
                    .iter()
                    .map(|p| (p.id, p.x.to_bits(), p.y.to_bits()))
                    .collect();
                (s.stroke_type, points, s.layer.clone())
            },
        );
        let components = self.unique_by_id(
            state.components,
            "component",
            |c| c.id.as_str(),
            |c| {
                (
                    c.pin_connections.clone(),
                    c.pin_count,
                    c.designator.clone(),
                    c.component_type.clone(),
                    c.x.to_bits(),
                    c.y.to_bits(),
                )
            },
        );

        // Step 1: vias and pads
        for stroke in strokes.iter().copied() {
            if !stroke.is_trace() {
                self.add_landing(stroke, &mut graph);
            }
        }

        // Step 2: trace vertices
        for stroke in strokes.iter().copied() {
            if stroke.is_trace() {
                self.add_trace(stroke, &mut graph);
            }
        }

        // Step 3: power symbols
        for symbol in sorted_by_key(state.power_symbols, |s| s.id.as_str()) {
            self.add_power_symbol(symbol, &registry, &mut graph.nodes);
        }

        // Step 4: ground symbols
        for symbol in sorted_by_key(state.ground_symbols, |s| s.id.as_str()) {
            self.add_ground_symbol(symbol, &registry, &mut graph.nodes);
        }

        // Step 5: component pins
        for component in components {
            self.add_component_pins(component, &mut graph);
        }

        graph.edges = trace_edges(strokes);
        graph.buses = registry;

        Ok(graph)
    }

    /// Node map only
    pub fn build_nodes(&self, state: DrawingState<'_>) -> Result<NodeMap, ConnectivityError> {
        self.build(state).map(|graph| graph.nodes)
    }

    /// One record per id, in id order. A repeated id is warned about and
    /// only the record whose `tiebreak` sorts first is kept, so the survivor
    /// never depends on input order.
    fn unique_by_id<'s, T, K: Ord>(
        &self,
        items: &'s [T],
        label: &str,
        id: impl Fn(&T) -> &str,
        tiebreak: impl Fn(&T) -> K,
    ) -> Vec<&'s T> {
        let mut sorted: Vec<&T> = items.iter().collect();
        sorted.sort_by(|a, b| id(a).cmp(id(b)).then_with(|| tiebreak(a).cmp(&tiebreak(b))));

        let mut unique: Vec<&T> = Vec::with_capacity(sorted.len());
        for item in sorted {
            match unique.last() {
                Some(last) if id(last) == id(item) => {
                    self.sink.warn(&format!(
                        "Duplicate {} id '{}' ignored",
                        label,
                        id(item)
                    ));
                }
                _ => unique.push(item),
            }
        }
        unique
    }

    /// Reject coordinates that cannot be placed
    fn validate(state: DrawingState<'_>) -> Result<(), ConnectivityError> {
        for stroke in state.strokes {
            for point in &stroke.points {
                if point.id.is_some() && !(point.x.is_finite() && point.y.is_finite()) {
                    return Err(ConnectivityError::NonFiniteCoordinate(format!(
                        "stroke '{}'",
                        stroke.id
                    )));
                }
            }
        }

        for symbol in state.power_symbols {
            if symbol.point_id.is_some() && !(symbol.x.is_finite() && symbol.y.is_finite()) {
                return Err(ConnectivityError::NonFiniteCoordinate(format!(
                    "power symbol '{}'",
                    symbol.id
                )));
            }
        }

        for symbol in state.ground_symbols {
            if symbol.point_id.is_some() && !(symbol.x.is_finite() && symbol.y.is_finite()) {
                return Err(ConnectivityError::NonFiniteCoordinate(format!(
                    "ground symbol '{}'",
                    symbol.id
                )));
            }
        }

        for component in state.components {
            if !(component.x.is_finite() && component.y.is_finite()) {
                return Err(ConnectivityError::NonFiniteCoordinate(format!(
                    "component '{}'",
                    component.id
                )));
            }
        }

        Ok(())
    }

    fn add_landing(&self, stroke: &Stroke, graph: &mut BuiltGraph) {
        let Some(point) = stroke.anchor() else {
            return;
        };
        let Some(id) = point.id else {
            self.sink.info(&format!(
                "{} '{}' has no point id and is not connected",
                stroke.stroke_type, stroke.id
            ));
            return;
        };

        let kind = match stroke.stroke_type {
            StrokeType::Pad => {
                graph.pads.insert(id);
                NodeKind::Pad
            }
            _ => {
                graph.vias.insert(id);
                NodeKind::Via
            }
        };

        graph
            .nodes
            .entry(id)
            .or_insert_with(|| Node::new(id, kind, Position::new(point.x, point.y)))
            .mark_landing(kind);
    }

    fn add_trace(&self, stroke: &Stroke, graph: &mut BuiltGraph) {
        let mut vertices = Vec::with_capacity(stroke.points.len());

        for point in &stroke.points {
            let Some(id) = point.id else {
                self.sink.info(&format!(
                    "Trace '{}' has a vertex without point id at ({}, {})",
                    stroke.id, point.x, point.y
                ));
                continue;
            };
            graph
                .nodes
                .entry(id)
                .or_insert_with(|| Node::new(id, NodeKind::TracePoint, Position::new(point.x, point.y)));
            vertices.push(id);
        }

        graph.traces.push((stroke.id.clone(), vertices));
    }

    fn add_power_symbol(&self, symbol: &PowerSymbol, registry: &BusRegistry, nodes: &mut NodeMap) {
        let Some(id) = symbol.point_id else {
            self.sink.info(&format!("Power symbol '{}' is not placed on a point", symbol.id));
            return;
        };

        if registry.power_bus(&symbol.power_bus_id).is_none() {
            self.sink.warn(&format!(
                "Power symbol '{}' references unknown power bus '{}'",
                symbol.id, symbol.power_bus_id
            ));
        }

        nodes
            .entry(id)
            .or_insert_with(|| Node::new(id, NodeKind::Power, Position::new(symbol.x, symbol.y)))
            .attach_power(&symbol.power_bus_id, registry.voltage_for(&symbol.power_bus_id));
    }

    fn add_ground_symbol(&self, symbol: &GroundSymbol, registry: &BusRegistry, nodes: &mut NodeMap) {
        let Some(id) = symbol.point_id else {
            self.sink.info(&format!("Ground symbol '{}' is not placed on a point", symbol.id));
            return;
        };

        let bus_id = match symbol.ground_bus_id.as_deref().map(str::trim) {
            Some(bus) if !bus.is_empty() => {
                if registry.ground_bus(bus).is_none() {
                    self.sink.warn(&format!(
                        "Ground symbol '{}' references unknown ground bus '{}'",
                        symbol.id, bus
                    ));
                }
                bus
            }
            _ => self.options.default_ground_bus.as_str(),
        };

        nodes
            .entry(id)
            .or_insert_with(|| Node::new(id, NodeKind::Ground, Position::new(symbol.x, symbol.y)))
            .attach_ground(bus_id);
    }

    fn add_component_pins(&self, component: &Component, graph: &mut BuiltGraph) {
        let designator = component.display_designator();
        graph
            .designators
            .insert(component.id.clone(), designator.to_string());
        let mut connections = component.pin_connections.as_slice();

        if component.pin_count > 0 && connections.len() > component.pin_count {
            self.sink.warn(&format!(
                "Component '{}' lists {} pin connections for {} pins; extra entries ignored",
                designator,
                connections.len(),
                component.pin_count
            ));
            connections = &connections[..component.pin_count];
        }

        for (pin_index, connection) in connections.iter().enumerate() {
            let raw = connection.as_deref().map(str::trim).unwrap_or("");
            if raw.is_empty() {
                graph.unconnected_pins.push(UnconnectedPin {
                    component_id: component.id.clone(),
                    designator: designator.to_string(),
                    pin_number: pin_index + 1,
                    reason: UnconnectedReason::Empty,
                });
                continue;
            }

            let Some(id) = PointId::parse_connection(raw) else {
                self.sink.warn(&format!(
                    "Pin {} of {} has invalid connection '{}'; treated as unconnected",
                    pin_index + 1,
                    designator,
                    raw
                ));
                graph.unconnected_pins.push(UnconnectedPin {
                    component_id: component.id.clone(),
                    designator: designator.to_string(),
                    pin_number: pin_index + 1,
                    reason: UnconnectedReason::Malformed,
                });
                continue;
            };

            graph.pins.push(PinLink {
                component_id: component.id.clone(),
                pin_index,
                node: id,
            });
            let component_ref = ComponentRef {
                component_id: component.id.clone(),
                pin_index,
            };
            graph
                .nodes
                .entry(id)
                .or_insert_with(|| {
                    Node::new(id, NodeKind::ComponentPin, Position::new(component.x, component.y))
                })
                .attach_component(component_ref);
        }
    }
}

/// Edges between consecutive identified vertices of every trace.
///
/// Vertices without an id are skipped, so their neighbours connect directly.
pub fn trace_edges<'a>(strokes: impl IntoIterator<Item = &'a Stroke>) -> Vec<Edge> {
    let mut edges = Vec::new();

    for stroke in strokes.into_iter().filter(|s| s.is_trace()) {
        let mut previous: Option<PointId> = None;
        for id in stroke.points.iter().filter_map(|p| p.id) {
            if let Some(prev) = previous {
                if let Some(edge) = Edge::new(prev, id) {
                    edges.push(edge);
                }
            }
            previous = Some(id);
        }
    }

    edges
}

fn sorted_by_key<'s, T>(items: &'s [T], key: impl Fn(&T) -> &str) -> Vec<&'s T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| key(a).cmp(key(b)));
    sorted
}
