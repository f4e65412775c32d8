//! Producer-contract checks for schema snapshots.
//!
//! The analysis algorithms silently skip malformed input. These checks exist
//! so callers can surface what was skipped; they never reject a model.

use super::SchemaModel;
use ahash::AHashSet;
use std::fmt;

/// A producer-contract violation found in a schema snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelWarning {
    /// Two tables share a name
    DuplicateTable { table: String },
    /// Two columns of one table share a name
    DuplicateColumn { table: String, column: String },
    /// Foreign key whose source or target table is not in the model
    DanglingForeignKey {
        constraint: String,
        missing_table: String,
    },
    /// Column flagged as a foreign key without a `references` target
    MissingReference { table: String, column: String },
}

impl fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelWarning::DuplicateTable { table } => {
                write!(f, "duplicate table name '{}'", table)
            }
            ModelWarning::DuplicateColumn { table, column } => {
                write!(f, "duplicate column '{}' in table '{}'", column, table)
            }
            ModelWarning::DanglingForeignKey {
                constraint,
                missing_table,
            } => write!(
                f,
                "foreign key '{}' references unknown table '{}'",
                constraint, missing_table
            ),
            ModelWarning::MissingReference { table, column } => write!(
                f,
                "column '{}.{}' is marked as a foreign key but has no reference",
                table, column
            ),
        }
    }
}

impl SchemaModel {
    /// Report producer-contract violations, in model order
    pub fn validate(&self) -> Vec<ModelWarning> {
        let mut warnings = Vec::new();
        let mut names: AHashSet<&str> = AHashSet::with_capacity(self.tables.len());

        for table in &self.tables {
            if !names.insert(table.name.as_str()) {
                warnings.push(ModelWarning::DuplicateTable {
                    table: table.name.clone(),
                });
            }

            let mut columns: AHashSet<&str> = AHashSet::with_capacity(table.columns.len());
            for col in &table.columns {
                if !columns.insert(col.name.as_str()) {
                    warnings.push(ModelWarning::DuplicateColumn {
                        table: table.name.clone(),
                        column: col.name.clone(),
                    });
                }
                if col.is_foreign_key && col.references.is_none() {
                    warnings.push(ModelWarning::MissingReference {
                        table: table.name.clone(),
                        column: col.name.clone(),
                    });
                }
            }
        }

        for fk in &self.foreign_keys {
            for endpoint in [&fk.source_table, &fk.target_table] {
                if !names.contains(endpoint.as_str()) {
                    warnings.push(ModelWarning::DanglingForeignKey {
                        constraint: fk.constraint_name.clone(),
                        missing_table: endpoint.clone(),
                    });
                }
            }
        }

        for warning in &warnings {
            tracing::warn!(%warning, "schema snapshot violates producer contract");
        }

        warnings
    }
}
