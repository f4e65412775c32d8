mod analyze;
mod common;
mod inspect;
mod layout;
mod schema;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use common::ViewArgs;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-atlas")]
#[command(version)]
#[command(about = "Analyze and lay out the relationship graph of a database schema", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize tables, relationships, cycles, levels and clusters
    Analyze {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show dependency levels (referenced tables first)
    Levels {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Group tables into connected clusters with domain names
    Clusters {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show the primary-parent tree of the schema
    Hierarchy {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show relationship counts between table pairs
    Matrix {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Compute node coordinates for a diagram
    Layout {
        #[command(flatten)]
        view: ViewArgs,

        /// Layout engine: layered or force
        #[arg(long, default_value = "layered")]
        engine: String,

        /// Flow direction for the layered engine: tb or lr
        #[arg(short, long)]
        direction: Option<String>,

        /// Step budget for the force engine
        #[arg(long)]
        iterations: Option<usize>,

        /// Show progress while the force simulation runs
        #[arg(short, long)]
        progress: bool,
    },

    /// Print JSON Schemas for --json output
    Schema {
        /// Only print the schema for this command
        #[arg(short, long)]
        command: Option<String>,

        /// Write one <name>.schema.json file per schema into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// List available schema names
        #[arg(long, conflicts_with_all = ["command", "output_dir"])]
        list: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Analyze { view } => analyze::run(view),
        Commands::Levels { view } => inspect::run_levels(view),
        Commands::Clusters { view } => inspect::run_clusters(view),
        Commands::Hierarchy { view } => inspect::run_hierarchy(view),
        Commands::Matrix { view } => inspect::run_matrix(view),
        Commands::Layout {
            view,
            engine,
            direction,
            iterations,
            progress,
        } => layout::run(view, engine, direction, iterations, progress),
        Commands::Schema {
            command,
            output_dir,
            list,
        } => schema::run(command, output_dir, list),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "schema-atlas",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
