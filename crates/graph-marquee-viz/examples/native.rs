//! Native desktop runner for graph-marquee-viz development.
//!
//! Run with: cargo run --example native --features native
//! With a graph: cargo run --example native --features native -- --graph network.json

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::{run_native, NativeOptions};
use graph_marquee_core::{NetworkGraph, OverlayConfig};
use graph_marquee_viz::MarqueeGraphApp;
use tracing::info;

/// Right-drag marquee selection over a node-link graph.
#[derive(Debug, Parser)]
#[command(name = "graph-marquee", version)]
struct Args {
    /// Overlay config JSON (defaults to the per-user config file)
    #[arg(short, long, env = "GRAPH_MARQUEE_CONFIG")]
    config: Option<PathBuf>,

    /// Network JSON with keyed nodes and edges (defaults to the sample network)
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// Override the edge-joint marker
    #[arg(long)]
    marker: Option<String>,
}

fn main() -> Result<()> {
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("graph_marquee_viz=debug,graph_marquee_core=debug")
            }))
            .init();
    }

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_path(path)?.with_env_overrides(),
        None => OverlayConfig::load()?,
    };
    if let Some(marker) = args.marker {
        config.set("edge_joint_marker", &marker)?;
    }

    let network = args
        .graph
        .as_ref()
        .map(|path| {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            NetworkGraph::from_json(&json).with_context(|| format!("parsing {}", path.display()))
        })
        .transpose()?;

    info!(
        button = config.trigger_button.label(),
        marker = %config.edge_joint_marker,
        graph = ?args.graph,
        "starting"
    );

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Graph Marquee"),
        ..Default::default()
    };

    run_native(
        "Graph Marquee",
        options,
        Box::new(move |cc| Ok(Box::new(MarqueeGraphApp::with_config(cc, config, network)))),
    )
    .map_err(|err| anyhow!("eframe: {err}"))
}
