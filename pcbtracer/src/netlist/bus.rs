//! Bus Registry
//!
//! Indexes the power and ground bus catalogs by id. Nodes only ever hold a
//! bus id; anything else about a bus is looked up here.

use std::collections::HashMap;

use crate::diagnostics::DiagnosticsSink;
use crate::project::{GroundBus, PowerBus};

/// Power and ground bus catalogs, indexed by id
#[derive(Debug, Clone, Default)]
pub struct BusRegistry {
    power: HashMap<String, PowerBus>,
    ground: HashMap<String, GroundBus>,
}

impl BusRegistry {
    /// Build the registry. A repeated bus id keeps its first definition.
    pub fn new(
        power_buses: &[PowerBus],
        ground_buses: &[GroundBus],
        sink: &dyn DiagnosticsSink,
    ) -> Self {
        let mut registry = Self::default();

        for bus in power_buses {
            if registry.power.contains_key(&bus.id) {
                sink.warn(&format!("Duplicate power bus id '{}' ignored", bus.id));
                continue;
            }
            registry.power.insert(bus.id.clone(), bus.clone());
        }

        for bus in ground_buses {
            if registry.ground.contains_key(&bus.id) {
                sink.warn(&format!("Duplicate ground bus id '{}' ignored", bus.id));
                continue;
            }
            registry.ground.insert(bus.id.clone(), bus.clone());
        }

        registry
    }

    pub fn power_bus(&self, id: &str) -> Option<&PowerBus> {
        self.power.get(id)
    }

    pub fn ground_bus(&self, id: &str) -> Option<&GroundBus> {
        self.ground.get(id)
    }

    /// Voltage string of a power bus, if the bus exists and has one
    pub fn voltage_for(&self, power_bus_id: &str) -> Option<&str> {
        self.power
            .get(power_bus_id)
            .map(|b| b.voltage.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn power_bus_count(&self) -> usize {
        self.power.len()
    }

    pub fn ground_bus_count(&self) -> usize {
        self.ground.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;

    #[test]
    fn test_lookup_and_voltage() {
        let sink = RecordingSink::new();
        let registry = BusRegistry::new(
            &[
                PowerBus::new("P1", "VCC", "+3.3V"),
                PowerBus::new("P2", "UNSET", "  "),
            ],
            &[GroundBus::new("G1", "GND")],
            &sink,
        );

        assert_eq!(registry.voltage_for("P1"), Some("+3.3V"));
        assert_eq!(registry.voltage_for("P2"), None);
        assert_eq!(registry.voltage_for("P9"), None);
        assert_eq!(registry.ground_bus("G1").map(|b| b.name.as_str()), Some("GND"));
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_duplicate_bus_keeps_first() {
        let sink = RecordingSink::new();
        let registry = BusRegistry::new(
            &[PowerBus::new("P1", "A", "5V"), PowerBus::new("P1", "B", "12V")],
            &[],
            &sink,
        );

        assert_eq!(registry.power_bus_count(), 1);
        assert_eq!(registry.voltage_for("P1"), Some("5V"));
        assert_eq!(sink.warnings().len(), 1);
    }
}
