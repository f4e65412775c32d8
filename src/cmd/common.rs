//! Arguments and plumbing shared by the analysis commands.

use crate::config::AtlasConfig;
use crate::graph::{Focus, ViewFilter};
use crate::schema::{ModelWarning, SchemaModel};
use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Input snapshot, table selection and output options
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Schema snapshot file (.json, .yaml or .yml)
    pub file: PathBuf,

    /// Keep tables whose name or column names contain this text (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only include tables matching these glob patterns (comma-separated)
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Exclude tables matching these glob patterns (comma-separated)
    #[arg(short, long)]
    pub exclude: Option<String>,

    /// Restrict the view to a table and its direct relationships
    #[arg(long)]
    pub focus: Option<String>,

    /// With --focus: follow referenced tables transitively
    #[arg(long, requires = "focus")]
    pub transitive: bool,

    /// With --focus: follow referencing tables transitively
    #[arg(long, requires = "focus")]
    pub reverse: bool,

    /// With --focus: maximum traversal depth
    #[arg(long, requires = "focus")]
    pub max_depth: Option<usize>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Loaded snapshot plus configuration
pub struct Input {
    pub model: SchemaModel,
    pub config: AtlasConfig,
    pub warnings: Vec<ModelWarning>,
}

impl ViewArgs {
    /// Load the snapshot and configuration
    pub fn load(&self) -> Result<Input> {
        if !self.file.exists() {
            bail!("input file does not exist: {}", self.file.display());
        }

        let model = SchemaModel::load(&self.file)?;
        let config = match &self.config {
            Some(path) => AtlasConfig::load(path)?,
            None => AtlasConfig::default(),
        };

        // validate() logs each warning through tracing
        let warnings = model.validate();

        if let Some(table) = &self.focus {
            if model.table(table).is_none() {
                bail!("table '{}' not found in schema", table);
            }
        }

        tracing::debug!(
            file = %self.file.display(),
            tables = model.len(),
            foreign_keys = model.foreign_keys.len(),
            "loaded schema snapshot"
        );

        Ok(Input {
            model,
            config,
            warnings,
        })
    }

    /// Table selection from the command-line flags
    pub fn filter(&self) -> ViewFilter {
        ViewFilter {
            search: self.filter.clone(),
            include: self
                .tables
                .as_deref()
                .map(ViewFilter::parse_patterns)
                .unwrap_or_default(),
            exclude: self
                .exclude
                .as_deref()
                .map(ViewFilter::parse_patterns)
                .unwrap_or_default(),
            focus: self.focus.as_ref().map(|table| Focus {
                table: table.clone(),
                transitive: self.transitive,
                reverse: self.reverse,
                max_depth: self.max_depth,
            }),
        }
    }

    /// Write either the JSON document or its text rendering
    pub fn emit<T, F>(&self, doc: &T, render: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        let content = if self.json {
            let mut json = serde_json::to_string_pretty(doc)?;
            json.push('\n');
            json
        } else {
            render(doc)
        };

        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create directory: {}", parent.display())
                        })?;
                    }
                }
                fs::write(path, content)
                    .with_context(|| format!("Failed to write output: {}", path.display()))?;
                if !self.json {
                    eprintln!("Wrote {}", path.display());
                }
            }
            None => print!("{}", content),
        }
        Ok(())
    }
}
