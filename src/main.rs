use clap::{Parser, Subcommand};
use construct_graph::config::GraphSpec;
use construct_graph::graph::{Entry, Output, Structure};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "construct-graph")]
#[command(about = "Assemble and step hierarchical construct graphs", long_about = None)]
struct Cli {
    /// Log assembly and per-tick activity.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a graph (validating every link) and print its execution order.
    Check {
        #[arg(long)]
        graph: String,
    },

    /// Assemble a graph and step it, writing per-tick outputs as JSON.
    Run {
        #[arg(long)]
        graph: String,

        #[arg(long, default_value_t = 1)]
        ticks: usize,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
}

#[derive(Serialize)]
struct TickReport {
    tick: usize,
    output: Output,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Commands::Check { graph } => {
            let root = GraphSpec::load(&graph)?.assemble()?;
            let mut lines = Vec::new();
            describe(&root, 0, &mut lines);
            println!("{}", lines.join("\n"));
        }
        Commands::Run { graph, ticks, out } => {
            // 1) Parse + assemble (links are validated here, before any tick).
            let mut root = GraphSpec::load(&graph)?.assemble()?;

            // 2) Step.
            let mut reports = Vec::with_capacity(ticks);
            for tick in 1..=ticks {
                let output = root.step()?.clone();
                tracing::info!(tick, nodes = output.len(), "tick complete");
                reports.push(TickReport { tick, output });
            }

            // 3) Write.
            let json = serde_json::to_string_pretty(&reports)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Wrote {}", path);
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("construct_graph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("construct_graph=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One line per node, indented by depth, with each leaf's inputs.
fn describe(structure: &Structure, depth: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    lines.push(format!("{}{}", pad, structure.symbol()));
    for entry in structure.entries() {
        match entry {
            Entry::Structure(s) => describe(s, depth + 1, lines),
            Entry::Construct(c) => {
                let inputs: Vec<String> = c.inputs().iter().map(ToString::to_string).collect();
                if inputs.is_empty() {
                    lines.push(format!("{}  {}", pad, c.symbol()));
                } else {
                    lines.push(format!("{}  {} <- {}", pad, c.symbol(), inputs.join(", ")));
                }
            }
        }
    }
}
