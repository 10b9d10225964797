//! Core netlist API shared by the CLI and embedding hosts.
//! No UI or app state dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::diagnostics::TracingSink;
use crate::netlist::{ConnectivityError, ConnectivityManager, NetlistReport};
use crate::options::NetlistOptions;
use crate::project::{ProjectLoader, ProjectSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum TracerError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),
}

impl From<serde_json::Error> for TracerError {
    fn from(e: serde_json::Error) -> Self {
        TracerError::Parse(e.to_string())
    }
}

/// Command-line style overrides applied on top of project options
#[derive(Clone, Debug, Default)]
pub struct OptionOverrides {
    pub signal_prefix: Option<String>,
    pub ground_name: Option<String>,
    pub merge_ground_buses: bool,
}

impl OptionOverrides {
    pub fn apply(&self, mut options: NetlistOptions) -> NetlistOptions {
        if let Some(prefix) = &self.signal_prefix {
            options.signal_prefix = prefix.clone();
        }
        if let Some(name) = &self.ground_name {
            options.ground_name = name.clone();
        }
        if self.merge_ground_buses {
            options.merge_ground_buses = true;
        }
        options
    }
}

/// Loaded project plus the manager synced against it
pub struct TracedProject {
    pub project: ProjectSnapshot,
    pub manager: ConnectivityManager,
}

impl TracedProject {
    pub fn report(&self) -> NetlistReport {
        self.manager.report()
    }
}

/// Core API used by the CLI.
pub struct TracerCore;

impl TracerCore {
    /// Options stored in the project, with `overrides` applied
    pub fn resolve_options(project: &ProjectSnapshot, overrides: &OptionOverrides) -> NetlistOptions {
        overrides.apply(project.options.clone().unwrap_or_default())
    }

    /// Build a manager for `project` and sync it once
    pub fn trace(
        project: ProjectSnapshot,
        overrides: &OptionOverrides,
    ) -> Result<TracedProject, TracerError> {
        let options = Self::resolve_options(&project, overrides);
        let mut manager = ConnectivityManager::new(options).with_sink(Arc::new(TracingSink));
        manager.sync(&project)?;
        Ok(TracedProject { project, manager })
    }

    /// Load and trace a project file
    pub fn trace_file(path: &Path, overrides: &OptionOverrides) -> Result<TracedProject, TracerError> {
        let project = ProjectLoader::load(path)?;
        Self::trace(project, overrides)
    }

    /// Netlist report for a project file
    pub fn netlist(path: &Path, overrides: &OptionOverrides) -> Result<NetlistReport, TracerError> {
        Ok(Self::trace_file(path, overrides)?.report())
    }
}
