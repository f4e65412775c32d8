//! Schema model for graph analysis.
//!
//! This module provides:
//! - The normalized data model for tables, columns, foreign keys and enums
//! - Loading of schema snapshots from JSON or YAML files
//! - Producer-contract checks that report (but never reject) malformed input

mod validate;

pub use validate::*;

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Target of a foreign-key column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnRef {
    /// Referenced table name
    pub table: String,
    /// Referenced column name
    pub column: String,
}

/// Column definition within a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Normalized type tag (e.g. "integer", "varchar", "uuid")
    pub data_type: String,
    #[serde(default)]
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default)]
    pub is_unique: bool,
    /// Present iff `is_foreign_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnRef>,
}

impl Column {
    /// Create a plain, nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default_value: None,
            is_primary_key: false,
            is_foreign_key: false,
            is_unique: false,
            references: None,
        }
    }

    /// Mark this column as the primary key
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    /// Mark this column as a foreign key referencing `table.column`
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.is_foreign_key = true;
        self.references = Some(ColumnRef {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// A named relation; the fundamental graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    /// Table name, unique across the model
    pub name: String,
    /// Owning database schema (informational only)
    #[serde(default)]
    pub schema: String,
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table in the `public` schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: "public".to_string(),
            columns: Vec::new(),
        }
    }

    /// Append a column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Foreign key constraint: a directed edge `source_table -> target_table`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// Constraint name (advisory identifier)
    #[serde(default)]
    pub constraint_name: String,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

impl ForeignKey {
    /// Create a foreign key with a conventional `fk_<table>_<column>` name
    pub fn new(
        source_table: impl Into<String>,
        source_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        let source_table = source_table.into();
        let source_column = source_column.into();
        Self {
            constraint_name: format!("fk_{}_{}", source_table, source_column),
            source_table,
            source_column,
            target_table: target_table.into(),
            target_column: target_column.into(),
        }
    }

    /// Check if this key references its own table
    pub fn is_self_reference(&self) -> bool {
        self.source_table == self.target_table
    }
}

/// Enumerated type definition (carried along, not analyzed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Complete schema snapshot; immutable for the duration of an analysis pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
}

/// Snapshot file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Detect format from a file extension (defaults to JSON)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Json,
        }
    }
}

impl SchemaModel {
    /// Create a model from tables and foreign keys
    pub fn new(tables: Vec<Table>, foreign_keys: Vec<ForeignKey>) -> Self {
        Self {
            tables,
            foreign_keys,
            enums: Vec::new(),
        }
    }

    /// Load a snapshot from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema snapshot: {}", path.display()))?;
        Self::parse(&content, SnapshotFormat::from_path(path))
            .with_context(|| format!("invalid schema snapshot: {}", path.display()))
    }

    /// Parse a snapshot from a string
    pub fn parse(content: &str, format: SnapshotFormat) -> anyhow::Result<Self> {
        let model = match format {
            SnapshotFormat::Json => serde_json::from_str(content)?,
            SnapshotFormat::Yaml => serde_yaml_ng::from_str(content)?,
        };
        Ok(model)
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get the number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the model has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total column count across all tables
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}
