//! Filtered schema view: the table subset every analysis pass runs on.

use crate::schema::{ForeignKey, SchemaModel, Table};
use ahash::{AHashMap, AHashSet};
use glob::Pattern;
use std::collections::VecDeque;

/// Focus on one table and its relationships
#[derive(Debug, Clone, Default)]
pub struct Focus {
    /// Table to focus on
    pub table: String,
    /// Follow dependencies (referenced tables) transitively
    pub transitive: bool,
    /// Follow dependents (referencing tables) transitively
    pub reverse: bool,
    /// Maximum traversal depth for transitive/reverse
    pub max_depth: Option<usize>,
}

/// Table selection applied when building a [`SchemaView`]
#[derive(Debug, Clone, Default)]
pub struct ViewFilter {
    /// Case-insensitive substring matched against table and column names
    pub search: Option<String>,
    /// Keep only tables matching one of these globs
    pub include: Vec<Pattern>,
    /// Drop tables matching one of these globs
    pub exclude: Vec<Pattern>,
    /// Restrict to the neighbourhood of one table
    pub focus: Option<Focus>,
}

impl ViewFilter {
    /// Filter by search query only
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            ..Self::default()
        }
    }

    /// Parse comma-separated glob lists, ignoring invalid patterns
    pub fn parse_patterns(list: &str) -> Vec<Pattern> {
        list.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| Pattern::new(s).ok())
            .collect()
    }
}

/// Check whether a table passes a case-insensitive substring query.
///
/// A table passes when its name or any of its column names contains the query.
pub fn matches_search(table: &Table, query: &str) -> bool {
    let query = query.to_lowercase();
    if query.is_empty() {
        return true;
    }
    table.name.to_lowercase().contains(&query)
        || table
            .columns
            .iter()
            .any(|c| c.name.to_lowercase().contains(&query))
}

/// A filtered view of a schema model.
///
/// Tables keep model order. Edges are the model's foreign keys whose source and
/// target both belong to the view, in model order; keys pointing at tables
/// outside the view (or unknown tables) are dropped.
#[derive(Debug, Clone)]
pub struct SchemaView<'a> {
    model: &'a SchemaModel,
    tables: Vec<&'a Table>,
    index: AHashMap<&'a str, usize>,
    edges: Vec<&'a ForeignKey>,
}

impl<'a> SchemaView<'a> {
    /// Create a view containing every table of the model
    pub fn full(model: &'a SchemaModel) -> Self {
        Self::new(model, &ViewFilter::default())
    }

    /// Create a filtered view
    pub fn new(model: &'a SchemaModel, filter: &ViewFilter) -> Self {
        let mut seen: AHashSet<&str> = AHashSet::with_capacity(model.tables.len());
        let mut keep: Vec<&Table> = model
            .tables
            .iter()
            // First occurrence wins for duplicate names
            .filter(|t| seen.insert(t.name.as_str()))
            .collect();

        if let Some(query) = filter.search.as_deref() {
            keep.retain(|t| matches_search(t, query));
        }

        if !filter.include.is_empty() {
            keep.retain(|t| filter.include.iter().any(|p| p.matches(&t.name)));
        }

        if !filter.exclude.is_empty() {
            keep.retain(|t| !filter.exclude.iter().any(|p| p.matches(&t.name)));
        }

        let mut view = Self::from_tables(model, keep);

        if let Some(focus) = &filter.focus {
            let nodes = view.focus_nodes(focus);
            let remaining = view
                .tables
                .iter()
                .copied()
                .filter(|t| nodes.contains(t.name.as_str()))
                .collect();
            view = Self::from_tables(model, remaining);
        }

        tracing::debug!(
            tables = view.len(),
            edges = view.edge_count(),
            "built schema view"
        );

        view
    }

    fn from_tables(model: &'a SchemaModel, tables: Vec<&'a Table>) -> Self {
        let index: AHashMap<&str, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();

        let edges = model
            .foreign_keys
            .iter()
            .filter(|fk| {
                index.contains_key(fk.source_table.as_str())
                    && index.contains_key(fk.target_table.as_str())
            })
            .collect();

        Self {
            model,
            tables,
            index,
            edges,
        }
    }

    /// The model this view was built from
    pub fn model(&self) -> &'a SchemaModel {
        self.model
    }

    /// Tables in model order
    pub fn tables(&self) -> &[&'a Table] {
        &self.tables
    }

    /// Foreign keys with both endpoints in the view, in model order
    pub fn edges(&self) -> &[&'a ForeignKey] {
        &self.edges
    }

    /// Table names in view order
    pub fn table_names(&self) -> Vec<&'a str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Position of a table within the view
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check whether a table is part of the view
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Option<&'a Table> {
        self.position(name).map(|i| self.tables[i])
    }

    /// Get the number of tables in the view
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the view is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Get the number of edges in the view
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Total column count of the tables in the view
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    fn focus_nodes(&self, focus: &Focus) -> AHashSet<&'a str> {
        let mut result = AHashSet::new();
        let Some(table) = self.table(&focus.table) else {
            return result;
        };
        result.insert(table.name.as_str());

        let (outgoing, incoming) = self.build_adjacency_maps();

        if focus.transitive {
            traverse(&outgoing, &table.name, focus.max_depth, &mut result);
        }

        if focus.reverse {
            traverse(&incoming, &table.name, focus.max_depth, &mut result);
        }

        // Direct neighbours only
        if !focus.transitive && !focus.reverse {
            for map in [&outgoing, &incoming] {
                if let Some(neighbors) = map.get(table.name.as_str()) {
                    result.extend(neighbors.iter().copied());
                }
            }
        }

        result
    }

    #[allow(clippy::type_complexity)]
    fn build_adjacency_maps(
        &self,
    ) -> (
        AHashMap<&'a str, Vec<&'a str>>,
        AHashMap<&'a str, Vec<&'a str>>,
    ) {
        let mut outgoing: AHashMap<&str, Vec<&str>> = AHashMap::new();
        let mut incoming: AHashMap<&str, Vec<&str>> = AHashMap::new();

        for fk in &self.edges {
            outgoing
                .entry(fk.source_table.as_str())
                .or_default()
                .push(fk.target_table.as_str());
            incoming
                .entry(fk.target_table.as_str())
                .or_default()
                .push(fk.source_table.as_str());
        }

        (outgoing, incoming)
    }
}

fn traverse<'a>(
    adjacency: &AHashMap<&'a str, Vec<&'a str>>,
    start: &'a str,
    max_depth: Option<usize>,
    result: &mut AHashSet<&'a str>,
) {
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if let Some(max) = max_depth {
            if depth >= max {
                continue;
            }
        }

        if let Some(neighbors) = adjacency.get(current) {
            for &neighbor in neighbors {
                if result.insert(neighbor) {
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn create_test_model() -> SchemaModel {
        SchemaModel::new(
            vec![
                Table::new("users")
                    .with_column(Column::new("id", "integer").primary_key())
                    .with_column(Column::new("email", "varchar")),
                Table::new("orders")
                    .with_column(Column::new("id", "integer").primary_key())
                    .with_column(Column::new("user_id", "integer").references("users", "id")),
                Table::new("order_items")
                    .with_column(Column::new("order_id", "integer").references("orders", "id")),
                Table::new("audit_log").with_column(Column::new("payload", "jsonb")),
            ],
            vec![
                ForeignKey::new("orders", "user_id", "users", "id"),
                ForeignKey::new("order_items", "order_id", "orders", "id"),
                ForeignKey::new("orders", "ghost_id", "ghosts", "id"),
            ],
        )
    }

    #[test]
    fn test_full_view_drops_dangling_edges() {
        let model = create_test_model();
        let view = SchemaView::full(&model);

        assert_eq!(view.len(), 4);
        assert_eq!(view.edge_count(), 2);
        assert_eq!(
            view.table_names(),
            vec!["users", "orders", "order_items", "audit_log"]
        );
        assert_eq!(view.column_count(), 6);
    }

    #[test]
    fn test_search_matches_table_or_column_names() {
        let model = create_test_model();

        let view = SchemaView::new(&model, &ViewFilter::search("ORDER"));
        assert_eq!(view.table_names(), vec!["orders", "order_items"]);
        assert_eq!(view.edge_count(), 1);

        // "email" only matches a column of users
        let view = SchemaView::new(&model, &ViewFilter::search("Email"));
        assert_eq!(view.table_names(), vec!["users"]);
        assert_eq!(view.edge_count(), 0);

        let view = SchemaView::new(&model, &ViewFilter::search(""));
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn test_include_exclude_globs() {
        let model = create_test_model();

        let filter = ViewFilter {
            include: ViewFilter::parse_patterns("order*, users"),
            exclude: ViewFilter::parse_patterns("*_items"),
            ..ViewFilter::default()
        };
        let view = SchemaView::new(&model, &filter);
        assert_eq!(view.table_names(), vec!["users", "orders"]);
        assert_eq!(view.edge_count(), 1);
    }

    #[test]
    fn test_focus_direct_neighbours() {
        let model = create_test_model();
        let filter = ViewFilter {
            focus: Some(Focus {
                table: "users".to_string(),
                ..Focus::default()
            }),
            ..ViewFilter::default()
        };
        let view = SchemaView::new(&model, &filter);
        assert_eq!(view.table_names(), vec!["users", "orders"]);
    }

    #[test]
    fn test_focus_reverse_transitive() {
        let model = create_test_model();
        let filter = ViewFilter {
            focus: Some(Focus {
                table: "users".to_string(),
                reverse: true,
                ..Focus::default()
            }),
            ..ViewFilter::default()
        };
        let view = SchemaView::new(&model, &filter);
        assert_eq!(view.table_names(), vec!["users", "orders", "order_items"]);

        let filter = ViewFilter {
            focus: Some(Focus {
                table: "users".to_string(),
                reverse: true,
                max_depth: Some(1),
                ..Focus::default()
            }),
            ..ViewFilter::default()
        };
        let view = SchemaView::new(&model, &filter);
        assert_eq!(view.table_names(), vec!["users", "orders"]);
    }

    #[test]
    fn test_focus_unknown_table_is_empty() {
        let model = create_test_model();
        let filter = ViewFilter {
            focus: Some(Focus {
                table: "nope".to_string(),
                ..Focus::default()
            }),
            ..ViewFilter::default()
        };
        let view = SchemaView::new(&model, &filter);
        assert!(view.is_empty());
        assert_eq!(view.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_table_names_keep_first() {
        let model = SchemaModel::new(
            vec![
                Table::new("a").with_column(Column::new("first", "integer")),
                Table::new("a").with_column(Column::new("second", "integer")),
            ],
            vec![],
        );
        let view = SchemaView::full(&model);
        assert_eq!(view.len(), 1);
        assert_eq!(view.table("a").unwrap().columns[0].name, "first");
    }
}
