//! CLI for generating schema snapshots.
//!
//! Usage:
//!   gen-schema --scale medium --seed 42 > fixtures/medium.json
//!   gen-schema --tables 500 --back-references 10 -o large.json

use clap::Parser;
use schema_gen::{Generator, GeneratorConfig, Scale};
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "gen-schema")]
#[command(about = "Generate schema snapshots for schema-atlas", long_about = None)]
struct Args {
    /// Scale preset: small, medium, large, xlarge
    /// Ignored if --tables is specified
    #[arg(short, long, default_value = "small")]
    scale: String,

    /// Exact number of tables
    #[arg(short, long)]
    tables: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Maximum foreign keys per table
    #[arg(long, default_value = "3")]
    max_foreign_keys: usize,

    /// Foreign keys pointing at later tables (introduces cycles)
    #[arg(long, default_value = "0")]
    back_references: usize,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let scale: Scale = args.scale.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let config = GeneratorConfig {
        tables: args.tables.unwrap_or_else(|| scale.tables()),
        max_foreign_keys: args.max_foreign_keys,
        back_references: args.back_references,
        ..GeneratorConfig::default()
    };

    let snapshot = Generator::with_config(args.seed, config).generate();
    let json = snapshot.to_json()?;

    match args.output {
        Some(path) => {
            fs::write(&path, json)?;
            eprintln!(
                "Generated {} tables, {} foreign keys -> {}",
                snapshot.tables.len(),
                snapshot.foreign_keys.len(),
                path
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
