//! PCB Tracer CLI - netlists from traced PCB projects on the command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pcbtracer::{
    NetRole, NetlistReport, OptionOverrides, PointId, TracedProject, TracerCore,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pcbtracer")]
#[command(about = "Derive nets and netlists from traced PCB projects", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every net in a project
    Nets {
        /// Path to the project JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if any component pin is unconnected
        #[arg(long)]
        fail_on_unconnected: bool,

        #[command(flatten)]
        naming: NamingArgs,
    },

    /// Show one node: kind, net, connected nodes and pins
    Node {
        /// Path to the project JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Point id of the node
        #[arg(value_name = "ID")]
        id: u64,

        #[command(flatten)]
        naming: NamingArgs,
    },

    /// Print connectivity statistics
    Stats {
        /// Path to the project JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        #[command(flatten)]
        naming: NamingArgs,
    },
}

#[derive(Args, Clone, Default)]
struct NamingArgs {
    /// Prefix for signal net names (default "N$")
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Name used for ground nets (default "GND")
    #[arg(long, value_name = "NAME")]
    ground_name: Option<String>,

    /// Join all ground buses into one common ground net
    #[arg(long)]
    merge_ground: bool,
}

impl NamingArgs {
    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            signal_prefix: self.prefix.clone(),
            ground_name: self.ground_name.clone(),
            merge_ground_buses: self.merge_ground,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Nets {
            file,
            format,
            fail_on_unconnected,
            naming,
        } => handle_nets(&file, format, fail_on_unconnected, &naming),
        Commands::Node { file, id, naming } => handle_node(&file, id, &naming),
        Commands::Stats {
            file,
            format,
            naming,
        } => handle_stats(&file, format, &naming),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

/// `RUST_LOG` wins; otherwise `--verbose` turns on engine diagnostics
fn init_logging(verbose: bool) {
    let default_level = if verbose { "pcbtracer=debug" } else { "pcbtracer=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn trace(file: &Path, naming: &NamingArgs) -> Result<TracedProject> {
    TracerCore::trace_file(file, &naming.overrides())
        .with_context(|| format!("failed to trace {}", file.display()))
}

fn handle_nets(
    file: &Path,
    format: OutputFormat,
    fail_on_unconnected: bool,
    naming: &NamingArgs,
) -> Result<i32> {
    let report = trace(file, naming)?.report();

    match format {
        OutputFormat::Human => output_nets_human(file, &report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if fail_on_unconnected && !report.unconnected_pins.is_empty() {
        return Ok(1);
    }
    Ok(0)
}

fn output_nets_human(file: &Path, report: &NetlistReport) {
    println!("\nFile: {}", file.display());
    println!("{}", "─".repeat(60));

    if report.nets.is_empty() {
        println!("  No nets found");
        return;
    }

    for net in &report.nets {
        let role = match net.role {
            NetRole::Ground => "ground",
            NetRole::Power => "power",
            NetRole::Signal => "signal",
        };
        println!("\n  {} ({}, {} nodes)", net.name, role, net.nodes.len());

        let nodes: Vec<String> = net
            .nodes
            .iter()
            .map(|n| format!("{} ({})", n.id, n.kind))
            .collect();
        println!("    Nodes: {}", nodes.join(", "));
        if !net.pins.is_empty() {
            println!("    Pins:  {}", net.pin_list());
        }
    }

    if !report.unconnected_pins.is_empty() {
        println!("\n  UNCONNECTED PINS:");
        for pin in &report.unconnected_pins {
            println!("    - {} pin {}", pin.designator, pin.pin_number);
        }
    }

    println!("\n  Summary:");
    println!("    Nets:        {}", report.stats.net_count);
    println!("    Signal:      {}", report.stats.signal_nets);
    println!("    Power:       {}", report.stats.power_nets);
    println!("    Ground:      {}", report.stats.ground_nets);
    println!("    Unconnected: {}", report.stats.unconnected_pins);
}

fn handle_node(file: &Path, id: u64, naming: &NamingArgs) -> Result<i32> {
    let traced = trace(file, naming)?;
    let manager = &traced.manager;
    let id = PointId(id);

    let Some(node) = manager.node(id) else {
        eprintln!("Error: Node {} not found in {}", id, file.display());
        return Ok(1);
    };

    println!("Node {}", node.id);
    println!("  Kind:     {}", node.kind);
    if let Some(drawn) = manager.drawn_kind(id).filter(|k| *k != node.kind) {
        println!("  Drawn as: {}", drawn);
    }
    println!("  Position: ({}, {})", node.position.x, node.position.y);
    if let Some(name) = manager.net_name_for_node(id) {
        println!("  Net:      {}", name);
    }
    if manager.is_via(id) {
        println!("  Via:      yes");
    }
    if manager.is_ground_node(id) {
        println!("  Ground:   {}", node.ground_bus_ref.as_deref().unwrap_or("-"));
    }
    if let Some(power) = manager.power_info(id) {
        let voltage = power
            .normalized_voltage
            .as_deref()
            .or(power.voltage.as_deref())
            .unwrap_or("-");
        println!("  Power:    {} ({})", power.bus_id, voltage);
    }

    let traces = manager.traces_on_node(id);
    if !traces.is_empty() {
        println!("  Traces:   {}", traces.join(", "));
    }

    let pins = manager.component_pins_on_node(id);
    if !pins.is_empty() {
        let pins: Vec<String> = pins
            .iter()
            .map(|p| format!("{}.{}", p.designator, p.pin_number))
            .collect();
        println!("  Pins:     {}", pins.join(", "));
    }

    let connected: Vec<String> = manager
        .nodes_connected_to(id)
        .iter()
        .map(|n| format!("{} ({})", n.id, n.kind))
        .collect();
    if connected.is_empty() {
        println!("  Connected: none");
    } else {
        println!("  Connected: {}", connected.join(", "));
    }

    Ok(0)
}

fn handle_stats(file: &Path, format: OutputFormat, naming: &NamingArgs) -> Result<i32> {
    let traced = trace(file, naming)?;
    let stats = traced.manager.stats();

    match format {
        OutputFormat::Human => {
            println!("\nFile: {}", file.display());
            println!("{}", "─".repeat(60));
            println!("  Nodes:          {}", stats.node_count);
            println!("  Edges:          {}", stats.edge_count);
            println!("  Nets:           {}", stats.net_count);
            println!("  Signal nets:    {}", stats.signal_nets);
            println!("  Power nets:     {}", stats.power_nets);
            println!("  Ground nets:    {}", stats.ground_nets);
            println!("  Single-node:    {}", stats.singleton_nets);
            println!("  Unconnected:    {}", stats.unconnected_pins);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": file.display().to_string(),
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(0)
}
