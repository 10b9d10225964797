//! Electrical nodes and trace edges

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::project::PointId;

/// Classification of an electrical point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Via,
    Pad,
    TracePoint,
    Power,
    Ground,
    ComponentPin,
}

impl NodeKind {
    /// Kinds a node has on its own, without any ground or power symbol
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            NodeKind::Via | NodeKind::Pad | NodeKind::TracePoint | NodeKind::ComponentPin
        )
    }

    /// Kinds assigned by a ground or power association
    pub fn is_rail(self) -> bool {
        matches!(self, NodeKind::Power | NodeKind::Ground)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Via => write!(f, "via"),
            NodeKind::Pad => write!(f, "pad"),
            NodeKind::TracePoint => write!(f, "trace point"),
            NodeKind::Power => write!(f, "power"),
            NodeKind::Ground => write!(f, "ground"),
            NodeKind::ComponentPin => write!(f, "component pin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Which component pin sits on a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentRef {
    pub component_id: String,
    /// Zero-based index into the component's pin table
    pub pin_index: usize,
}

/// One electrical point.
///
/// All setters are additive: once a reference is present no later merge
/// clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: PointId,
    pub kind: NodeKind,
    pub position: Position,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_ref: Option<ComponentRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_bus_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_bus_ref: Option<String>,
}

impl Node {
    pub fn new(id: PointId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            component_ref: None,
            power_bus_ref: None,
            voltage: None,
            ground_bus_ref: None,
        }
    }

    /// Mark as via or pad. Upgrades a plain trace point; a component pin or
    /// an earlier via/pad keeps its kind.
    pub(crate) fn mark_landing(&mut self, kind: NodeKind) {
        if self.kind == NodeKind::TracePoint {
            self.kind = kind;
        }
    }

    /// The first bus wins; its voltage may only come from that same bus
    pub(crate) fn attach_power(&mut self, bus_id: &str, voltage: Option<&str>) {
        match &self.power_bus_ref {
            None => {
                self.power_bus_ref = Some(bus_id.to_string());
                self.voltage = voltage.map(str::to_string);
            }
            Some(current) if current == bus_id && self.voltage.is_none() => {
                self.voltage = voltage.map(str::to_string);
            }
            Some(_) => {}
        }
    }

    pub(crate) fn attach_ground(&mut self, bus_id: &str) {
        if self.ground_bus_ref.is_none() {
            self.ground_bus_ref = Some(bus_id.to_string());
        }
    }

    /// Component pins take precedence over every other kind
    pub(crate) fn attach_component(&mut self, component_ref: ComponentRef) {
        if self.component_ref.is_none() {
            self.component_ref = Some(component_ref);
        }
        self.kind = NodeKind::ComponentPin;
    }

    pub fn is_grounded(&self) -> bool {
        self.kind == NodeKind::Ground || self.ground_bus_ref.is_some()
    }

    pub fn is_powered(&self) -> bool {
        self.kind == NodeKind::Power || self.power_bus_ref.is_some() || self.voltage.is_some()
    }
}

/// Node map keyed by point id; iteration is in ascending id order
pub type NodeMap = BTreeMap<PointId, Node>;

/// Unordered pair of distinct node ids from one trace segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: PointId,
    pub b: PointId,
}

impl Edge {
    /// `None` for a degenerate segment whose ends share an id
    pub fn new(a: PointId, b: PointId) -> Option<Self> {
        if a == b {
            None
        } else {
            Some(Self { a, b })
        }
    }

    pub fn touches(&self, id: PointId) -> bool {
        self.a == id || self.b == id
    }
}
