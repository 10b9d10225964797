//! PCB Tracer - connectivity and netlist engine for traced PCB drawings
//!
//! This library turns the primitives of a traced board (vias, pads, traces,
//! component pin tables, power and ground symbols) into an electrical
//! connectivity graph, groups the graph into nets and names them.
//!
//! # Quick Start
//!
//! ```no_run
//! use pcbtracer::{OptionOverrides, TracerCore};
//! use std::path::Path;
//!
//! let report = TracerCore::netlist(
//!     Path::new("board.json"),
//!     &OptionOverrides::default(),
//! ).unwrap();
//!
//! for net in &report.nets {
//!     println!("{}: {}", net.name, net.pin_list());
//! }
//! ```
//!
//! # Features
//!
//! - **Incremental sync**: [`ConnectivityManager`] rebuilds only when the
//!   drawing's connectivity-relevant content changed
//! - **Net grouping**: traces, shared point ids and power/ground buses
//! - **Deterministic naming**: `GND`, normalized voltages such as `+3V3`,
//!   and sequential signal names
//! - **Queries**: nets, connected nodes, component pins, power info

pub mod core;
pub mod diagnostics;
pub mod netlist;
pub mod options;
pub mod project;

// Re-export main types
pub use crate::core::{OptionOverrides, TracedProject, TracerCore, TracerError};
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticsSink, NoopSink, RecordingSink, TracingSink};
pub use netlist::{
    ComponentPinInfo, ConnectivityError, ConnectivityManager, ConnectivityStats, NetEntry,
    NetRole, NetlistReport, Node, NodeKind, PowerInfo, SharedConnectivity, SyncOutcome,
};
pub use options::NetlistOptions;
pub use project::{
    Component, DrawingState, GroundBus, GroundSymbol, PointId, PowerBus, PowerSymbol,
    ProjectLoader, ProjectSnapshot, Stroke, StrokePoint, StrokeType,
};

/// Load a project file (convenience wrapper).
pub fn load_project(path: &std::path::Path) -> Result<ProjectSnapshot, TracerError> {
    ProjectLoader::load(path)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ConnectivityManager, NetlistOptions, NodeKind, PointId, ProjectSnapshot, SyncOutcome,
        TracerCore, TracerError,
    };
}
