//! Project Loader
//!
//! Reads the persisted project JSON. Keys are camelCase, unknown keys are
//! ignored and missing collections default to empty.

use std::fs;
use std::path::Path;

use super::schema::ProjectSnapshot;
use crate::core::TracerError;

pub struct ProjectLoader;

impl ProjectLoader {
    /// Load a project file from disk
    pub fn load(path: &Path) -> Result<ProjectSnapshot, TracerError> {
        let content = fs::read_to_string(path)?;
        let project = Self::parse_str(&content)
            .map_err(|e| TracerError::Parse(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            "Loaded project {}: {} strokes, {} components, {} power / {} ground symbols",
            path.display(),
            project.strokes.len(),
            project.components.len(),
            project.power_symbols.len(),
            project.ground_symbols.len()
        );

        Ok(project)
    }

    /// Parse project JSON from a string
    pub fn parse_str(content: &str) -> Result<ProjectSnapshot, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Write a project back out as pretty JSON
    pub fn save(project: &ProjectSnapshot, path: &Path) -> Result<(), TracerError> {
        let json = serde_json::to_string_pretty(project)?;
        fs::write(path, json)?;
        Ok(())
    }
}
