//! Integration tests for the PCB Tracer library

use pcbtracer::prelude::*;
use pcbtracer::{OptionOverrides, ProjectLoader, RecordingSink, SharedConnectivity};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> ProjectSnapshot {
    ProjectLoader::load(&fixture_path(name)).expect("fixture should load")
}

fn synced(project: &ProjectSnapshot) -> ConnectivityManager {
    let mut manager = ConnectivityManager::new(project.options.clone().unwrap_or_default());
    manager.sync(project).expect("fixture should sync");
    manager
}

#[test]
fn test_simple_board_netlist() {
    let report = TracerCore::netlist(&fixture_path("simple_board.json"), &OptionOverrides::default())
        .expect("simple board should trace");

    let names: Vec<&str> = report.nets.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["N$1", "N$2", "GND", "+3V3"]);

    assert_eq!(report.net("N$1").map(|n| n.pin_list()).as_deref(), Some("R1.1, U1.1"));
    assert_eq!(report.net("N$2").map(|n| n.pin_list()).as_deref(), Some("C1.1"));
    assert_eq!(report.net("GND").map(|n| n.pin_list()).as_deref(), Some("C1.2, U1.2"));
    assert_eq!(report.net("+3V3").map(|n| n.pin_list()).as_deref(), Some("R1.2"));

    assert_eq!(report.stats.node_count, 7);
    assert_eq!(report.stats.edge_count, 3);
    assert_eq!(report.stats.signal_nets, 2);
    assert_eq!(report.stats.power_nets, 1);
    assert_eq!(report.stats.ground_nets, 1);
    assert_eq!(report.stats.unconnected_pins, 2);
}

#[test]
fn test_simple_board_diagnostics() {
    let project = load("simple_board.json");
    let sink = Arc::new(RecordingSink::new());
    let mut manager = ConnectivityManager::default().with_sink(sink.clone());
    manager.sync(&project).unwrap();

    let warnings = sink.warnings();
    assert_eq!(warnings.len(), 1, "warnings: {:?}", warnings);
    assert!(warnings[0].contains("U1"));
    assert!(warnings[0].contains("abc"));
}

#[test]
fn test_partition_covers_every_node_once() {
    let manager = synced(&load("simple_board.json"));

    let mut seen = HashSet::new();
    for members in manager.net_groups().values() {
        for node in members {
            assert!(seen.insert(node.id), "node {} is in two nets", node.id);
        }
    }
    let all: HashSet<PointId> = manager.nodes().keys().copied().collect();
    assert_eq!(seen, all);
}

#[test]
fn test_rebuild_is_idempotent_and_order_independent() {
    let project = load("simple_board.json");
    let first = synced(&project);

    let mut shuffled = project.clone();
    shuffled.strokes.reverse();
    shuffled.components.reverse();
    let second = synced(&shuffled);

    assert_eq!(first.nodes(), second.nodes());
    // Root ids may differ; names and membership may not
    assert_eq!(
        first.net_names().values().collect::<Vec<_>>(),
        second.net_names().values().collect::<Vec<_>>()
    );
    for (id, _) in first.nodes() {
        assert_eq!(first.net_name_for_node(id), second.net_name_for_node(id));
    }
    assert_eq!(
        first.net_groups().values().map(Vec::len).collect::<Vec<_>>(),
        second.net_groups().values().map(Vec::len).collect::<Vec<_>>()
    );
}

#[test]
fn test_kind_precedence_on_fixture() {
    let manager = synced(&load("simple_board.json"));

    // Via 1 carries R1 pin 1
    assert_eq!(manager.node(PointId(1)).map(|n| n.kind), Some(NodeKind::ComponentPin));
    assert!(manager.vias().contains(&PointId(1)));
    assert!(manager.pads().contains(&PointId(3)));
    assert_eq!(manager.node(PointId(10)).map(|n| n.kind), Some(NodeKind::TracePoint));

    assert!(manager.is_ground_node(PointId(5)));
    assert!(manager.is_power_node(PointId(6)));
    let power = manager.power_info(PointId(6)).unwrap();
    assert_eq!(power.bus_id, "P1");
    assert_eq!(power.voltage.as_deref(), Some("3.3 VDC"));
}

#[test]
fn test_connected_nodes_and_indices() {
    let manager = synced(&load("simple_board.json"));

    let connected: Vec<PointId> = manager
        .nodes_connected_to(PointId(1))
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(connected, vec![PointId(2)]);

    assert_eq!(manager.traces_on_node(PointId(10)), vec!["t1".to_string()]);
    let mut on_five = manager.components_on_node(PointId(5));
    on_five.sort();
    assert_eq!(on_five, vec!["c1".to_string(), "u1".to_string()]);

    let u1 = manager.component_pin_map("u1");
    assert_eq!(u1.len(), 2);
    assert_eq!(u1.get(&0), Some(&PointId(2)));
    assert_eq!(u1.get(&1), Some(&PointId(5)));
}

#[test]
fn test_split_ground_buses() {
    let project = load("split_ground.json");

    let separate = synced(&project);
    assert_eq!(separate.stats().ground_nets, 2);
    assert_eq!(separate.net_for_node(PointId(1)).len(), 2);
    assert_eq!(separate.net_for_node(PointId(2)).len(), 1);

    let merged = TracerCore::trace(
        project,
        &OptionOverrides {
            merge_ground_buses: true,
            ..OptionOverrides::default()
        },
    )
    .unwrap();
    assert_eq!(merged.manager.stats().ground_nets, 1);
    assert_eq!(merged.manager.net_for_node(PointId(2)).len(), 3);
}

#[test]
fn test_project_options_are_applied() {
    let traced = TracerCore::trace_file(&fixture_path("custom_options.json"), &OptionOverrides::default())
        .unwrap();
    let names: Vec<String> = traced.report().nets.into_iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["NET1", "NET2", "0V"]);
}

#[test]
fn test_incremental_edit_cycle() {
    let mut project = load("simple_board.json");
    let mut manager = synced(&project);

    assert_eq!(manager.sync(&project).unwrap(), SyncOutcome::Unchanged);

    // Drop the ground symbol on via 5
    project.ground_symbols.clear();
    assert_eq!(manager.sync(&project).unwrap(), SyncOutcome::Rebuilt);
    assert!(!manager.is_ground_node(PointId(5)));
    assert_eq!(manager.node(PointId(5)).map(|n| n.kind), Some(NodeKind::ComponentPin));
    assert_eq!(manager.net_name_for_node(PointId(5)).as_deref(), Some("N$3"));
    assert_eq!(manager.rebuild_count(), 2);
}

#[test]
fn test_shared_connectivity_handle() {
    let shared = SharedConnectivity::new(ConnectivityManager::default());
    shared.sync(&load("simple_board.json")).unwrap();

    let name = shared.read(|m| m.net_name_for_node(PointId(6)));
    assert_eq!(name.as_deref(), Some("+3V3"));
}

#[test]
fn test_report_serializes() {
    let manager = synced(&load("simple_board.json"));
    let json = manager.report().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value["generated_at"].is_string());
    assert_eq!(value["nets"][0]["name"], "N$1");
    assert_eq!(value["unconnected_pins"][1]["reason"], "malformed");
}
