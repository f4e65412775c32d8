//! JSON Schema generation for CLI output types.
//!
//! This module provides schema generation for all commands that support --json output.
//! Schemas are generated using the schemars crate and can be exported via the `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Returns all JSON schemas for commands that support --json output.
/// Uses BTreeMap for deterministic ordering (important for diffable output).
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    schemas.insert(
        "analyze",
        schema_for!(crate::output::AnalyzeJsonOutput),
    );
    schemas.insert(
        "clusters",
        schema_for!(crate::output::ClustersJsonOutput),
    );
    schemas.insert(
        "hierarchy",
        schema_for!(crate::output::HierarchyJsonOutput),
    );
    schemas.insert("layout", schema_for!(crate::output::LayoutJsonOutput));
    schemas.insert("levels", schema_for!(crate::output::LevelsJsonOutput));
    schemas.insert("matrix", schema_for!(crate::output::MatrixJsonOutput));

    // Input snapshot format, for producers
    schemas.insert("snapshot", schema_for!(crate::schema::SchemaModel));

    schemas
}

/// Generate a single schema by command name.
pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
