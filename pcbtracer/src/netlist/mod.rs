//! Connectivity & Netlist Engine
//!
//! Pipeline, rebuilt from scratch on every sync:
//! primitives → node map ([`builder`]) → nets ([`grouping`]) → names
//! ([`naming`]) → query indices ([`manager`]).

pub mod builder;
pub mod bus;
pub mod fingerprint;
pub mod grouping;
pub mod manager;
pub mod naming;
pub mod node;
pub mod report;
pub mod shared;
pub mod union_find;

use thiserror::Error;

pub use builder::{BuiltGraph, GraphBuilder, PinLink, UnconnectedPin, UnconnectedReason};
pub use bus::BusRegistry;
pub use fingerprint::InputFingerprint;
pub use grouping::{NetGrouper, NetGroups};
pub use manager::{ComponentPinInfo, ConnectivityManager, PowerInfo, SyncOutcome};
pub use naming::{normalize_voltage, NetNamer, NetNames, NetRole};
pub use node::{ComponentRef, Edge, Node, NodeKind, NodeMap, Position};
pub use report::{ConnectivityStats, NetEntry, NetMember, NetPin, NetlistReport};
pub use shared::SharedConnectivity;
pub use union_find::UnionFind;

/// Errors that abort a rebuild. The previously committed snapshot survives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    #[error("Non-finite coordinate on {0}")]
    NonFiniteCoordinate(String),
}
