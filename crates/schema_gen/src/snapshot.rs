//! Serializable snapshot types.
//!
//! Field names follow the camelCase snapshot format.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnRef>,
}

impl Column {
    pub fn primary_key(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: "integer".to_string(),
            is_nullable: false,
            is_primary_key: true,
            is_foreign_key: false,
            is_unique: true,
            references: None,
        }
    }

    pub fn data(name: &str, data_type: &str, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            is_nullable: nullable,
            is_primary_key: false,
            is_foreign_key: false,
            is_unique: false,
            references: None,
        }
    }

    pub fn foreign_key(name: &str, table: &str, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            data_type: "integer".to_string(),
            is_nullable: nullable,
            is_primary_key: false,
            is_foreign_key: true,
            is_unique: false,
            references: Some(ColumnRef {
                table: table.to_string(),
                column: "id".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub schema: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub constraint_name: String,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// A complete generated schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tables: Vec<Table>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Number of foreign keys whose source and target differ
    pub fn cross_table_keys(&self) -> usize {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.source_table != fk.target_table)
            .count()
    }
}
