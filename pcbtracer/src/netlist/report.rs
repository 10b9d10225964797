//! Netlist export types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::builder::UnconnectedPin;
use super::naming::NetRole;
use super::node::NodeKind;
use crate::project::PointId;

/// Summary counts for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub net_count: usize,
    pub signal_nets: usize,
    pub power_nets: usize,
    pub ground_nets: usize,
    /// Nets with a single member
    pub singleton_nets: usize,
    pub unconnected_pins: usize,
    pub rebuilds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetMember {
    pub id: PointId,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPin {
    pub component_id: String,
    pub designator: String,
    pub pin_number: usize,
    pub node: PointId,
}

/// One named net
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetEntry {
    pub name: String,
    pub role: NetRole,
    pub nodes: Vec<NetMember>,
    pub pins: Vec<NetPin>,
}

impl NetEntry {
    /// `R1.1, U1.4` style pin list
    pub fn pin_list(&self) -> String {
        self.pins
            .iter()
            .map(|p| format!("{}.{}", p.designator, p.pin_number))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Full netlist export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetlistReport {
    pub generated_at: DateTime<Utc>,
    pub stats: ConnectivityStats,
    pub nets: Vec<NetEntry>,
    pub unconnected_pins: Vec<UnconnectedPin>,
}

impl NetlistReport {
    pub fn net(&self, name: &str) -> Option<&NetEntry> {
        self.nets.iter().find(|n| n.name == name)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
