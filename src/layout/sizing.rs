use crate::schema::Table;
use serde::{Deserialize, Serialize};

/// Node box dimensions for diagram views.
///
/// Width is fixed; height grows with the column count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSizing {
    pub width: f64,
    /// Space reserved for the table name
    pub header_height: f64,
    /// Height added per column
    pub row_height: f64,
}

impl Default for NodeSizing {
    fn default() -> Self {
        Self {
            width: 250.0,
            header_height: 40.0,
            row_height: 28.0,
        }
    }
}

impl NodeSizing {
    pub fn height_for(&self, column_count: usize) -> f64 {
        self.header_height + column_count as f64 * self.row_height
    }

    /// Width and height of a table node
    pub fn node_size(&self, table: &Table) -> (f64, f64) {
        (self.width, self.height_for(table.columns.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn test_node_size_no_columns() {
        let sizing = NodeSizing::default();
        let (w, h) = sizing.node_size(&Table::new("empty"));
        assert_eq!(w, 250.0);
        assert_eq!(h, 40.0);
    }

    #[test]
    fn test_height_grows_with_columns() {
        let sizing = NodeSizing::default();
        let small = Table::new("a").with_column(Column::new("id", "integer"));
        let large = Table::new("b")
            .with_column(Column::new("id", "integer"))
            .with_column(Column::new("name", "text"))
            .with_column(Column::new("created_at", "timestamp"));

        let (_, h_small) = sizing.node_size(&small);
        let (_, h_large) = sizing.node_size(&large);
        assert_eq!(h_small, 68.0);
        assert_eq!(h_large, 124.0);
    }
}
