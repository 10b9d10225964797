//! Trace a small board in code and print its netlist.
//!
//! Run with: cargo run --example trace_board

use pcbtracer::prelude::*;
use pcbtracer::{Component, GroundBus, GroundSymbol, PowerBus, PowerSymbol, Stroke};

fn main() -> Result<(), TracerError> {
    let mut project = ProjectSnapshot::new();

    project.add_stroke(Stroke::pad("p1", 1, 0.0, 0.0));
    project.add_stroke(Stroke::pad("p2", 2, 20.0, 0.0));
    project.add_stroke(Stroke::via("v3", 3, 40.0, 0.0));
    project.add_stroke(Stroke::trace("t1", &[(2, 20.0, 0.0), (4, 30.0, 0.0), (3, 40.0, 0.0)]));

    project.add_power_bus(PowerBus::new("VCC", "VCC", "+3.3V"));
    project.add_ground_bus(GroundBus::new("GND", "GND"));
    project.add_power_symbol(PowerSymbol::new("pwr1", 1, "VCC"));
    project.add_ground_symbol(GroundSymbol::new("gnd1", 3).on_bus("GND"));

    project.add_component(
        Component::new("r1", "Resistor")
            .with_designator("R1")
            .with_pins(&["1", "2"]),
    );
    project.add_component(
        Component::new("led1", "LED")
            .with_designator("D1")
            .with_pins(&["2", "3"]),
    );

    let traced = TracerCore::trace(project, &Default::default())?;

    for net in traced.report().nets {
        println!("{:<6} {}", net.name, net.pin_list());
    }

    Ok(())
}
