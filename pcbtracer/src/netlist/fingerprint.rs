//! Structural fingerprint of a drawing state.
//!
//! Two states with equal fingerprints produce the same connectivity. The
//! fingerprint holds sorted id lists (their lengths double as counts) plus
//! the references that decide connectivity, so computing and comparing it
//! costs O(total ids) rather than a rebuild.
//!
//! Coordinates are not part of the fingerprint; a caller that only moved
//! primitives must call `mark_dirty` to refresh node positions.

use crate::project::{DrawingState, PointId, StrokeType};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFingerprint {
    strokes: Vec<(String, StrokeType, Vec<Option<PointId>>)>,
    components: Vec<(String, String, usize, Vec<Option<String>>)>,
    power_symbols: Vec<(String, Option<PointId>, String)>,
    ground_symbols: Vec<(String, Option<PointId>, Option<String>)>,
    /// Id, name and voltage; the name is reported by power queries
    power_buses: Vec<(String, String, String)>,
    ground_buses: Vec<String>,
}

impl InputFingerprint {
    pub fn of(state: DrawingState<'_>) -> Self {
        let mut strokes: Vec<_> = state
            .strokes
            .iter()
            .map(|s| {
                (
                    s.id.clone(),
                    s.stroke_type,
                    s.points.iter().map(|p| p.id).collect(),
                )
            })
            .collect();
        strokes.sort();

        let mut components: Vec<_> = state
            .components
            .iter()
            .map(|c| {
                (
                    c.id.clone(),
                    c.display_designator().to_string(),
                    c.pin_count,
                    c.pin_connections.clone(),
                )
            })
            .collect();
        components.sort();

        let mut power_symbols: Vec<_> = state
            .power_symbols
            .iter()
            .map(|s| (s.id.clone(), s.point_id, s.power_bus_id.clone()))
            .collect();
        power_symbols.sort();

        let mut ground_symbols: Vec<_> = state
            .ground_symbols
            .iter()
            .map(|s| (s.id.clone(), s.point_id, s.ground_bus_id.clone()))
            .collect();
        ground_symbols.sort();

        let mut power_buses: Vec<_> = state
            .power_buses
            .iter()
            .map(|b| (b.id.clone(), b.name.clone(), b.voltage.clone()))
            .collect();
        power_buses.sort();

        let mut ground_buses: Vec<_> = state.ground_buses.iter().map(|b| b.id.clone()).collect();
        ground_buses.sort();

        Self {
            strokes,
            components,
            power_symbols,
            ground_symbols,
            power_buses,
            ground_buses,
        }
    }

    /// Number of top-level records covered
    pub fn record_count(&self) -> usize {
        self.strokes.len()
            + self.components.len()
            + self.power_symbols.len()
            + self.ground_symbols.len()
            + self.power_buses.len()
            + self.ground_buses.len()
    }
}
