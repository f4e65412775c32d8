//! Dependency and adjacency structures built from a schema view.
//!
//! Provides:
//! - Directed dependency sets (table -> distinct tables it references)
//! - Undirected adjacency counting every foreign key, duplicates included
//! - In/out/total degree statistics

use crate::graph::view::SchemaView;
use ahash::{AHashMap, AHashSet};

/// Derived graph structures for one schema view.
///
/// Every table of the view has an entry in each map, even when it has no
/// relationships. Self references are excluded from dependencies and
/// adjacency and counted separately.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Table names in view order
    pub order: Vec<String>,
    /// For each table, the distinct tables it directly depends on (first-seen order)
    pub dependencies: AHashMap<String, Vec<String>>,
    /// For each table, the tables that directly depend on it (first-seen order)
    pub dependents: AHashMap<String, Vec<String>>,
    /// Undirected neighbour list; one entry per foreign key per direction
    pub adjacency: AHashMap<String, Vec<String>>,
    /// Number of foreign keys pointing at each table
    pub in_degree: AHashMap<String, usize>,
    /// Number of foreign keys leaving each table
    pub out_degree: AHashMap<String, usize>,
    /// Number of self-referencing foreign keys per table
    pub self_references: AHashMap<String, usize>,
}

impl DependencyGraph {
    /// Build the graph from a view in O(T + F)
    pub fn from_view(view: &SchemaView) -> Self {
        let n = view.len();
        let mut graph = Self {
            order: Vec::with_capacity(n),
            dependencies: AHashMap::with_capacity(n),
            dependents: AHashMap::with_capacity(n),
            adjacency: AHashMap::with_capacity(n),
            in_degree: AHashMap::with_capacity(n),
            out_degree: AHashMap::with_capacity(n),
            self_references: AHashMap::new(),
        };

        for table in view.tables() {
            let name = table.name.clone();
            graph.dependencies.insert(name.clone(), Vec::new());
            graph.dependents.insert(name.clone(), Vec::new());
            graph.adjacency.insert(name.clone(), Vec::new());
            graph.in_degree.insert(name.clone(), 0);
            graph.out_degree.insert(name.clone(), 0);
            graph.order.push(name);
        }

        let mut seen_pairs: AHashSet<(&str, &str)> = AHashSet::with_capacity(view.edge_count());

        for fk in view.edges() {
            let source = fk.source_table.as_str();
            let target = fk.target_table.as_str();

            if fk.is_self_reference() {
                *graph
                    .self_references
                    .entry(source.to_string())
                    .or_insert(0) += 1;
                continue;
            }

            if seen_pairs.insert((source, target)) {
                if let Some(deps) = graph.dependencies.get_mut(source) {
                    deps.push(target.to_string());
                }
                if let Some(dependents) = graph.dependents.get_mut(target) {
                    dependents.push(source.to_string());
                }
            }

            if let Some(neighbors) = graph.adjacency.get_mut(source) {
                neighbors.push(target.to_string());
            }
            if let Some(neighbors) = graph.adjacency.get_mut(target) {
                neighbors.push(source.to_string());
            }
            if let Some(out) = graph.out_degree.get_mut(source) {
                *out += 1;
            }
            if let Some(inc) = graph.in_degree.get_mut(target) {
                *inc += 1;
            }
        }

        graph
    }

    /// Get the number of tables in the graph
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct tables a table depends on
    pub fn dependencies_of(&self, table: &str) -> &[String] {
        self.dependencies
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct tables depending on a table
    pub fn dependents_of(&self, table: &str) -> &[String] {
        self.dependents.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Undirected degree: foreign keys touching the table, self references excluded
    pub fn degree(&self, table: &str) -> usize {
        self.adjacency.get(table).map(Vec::len).unwrap_or(0)
    }

    /// Tables with no dependencies, in view order
    pub fn root_tables(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|t| self.dependencies_of(t).is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Tables nothing depends on, in view order
    pub fn leaf_tables(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|t| self.dependents_of(t).is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Tables with no relationships at all, in view order
    pub fn isolated_tables(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|t| self.degree(t) == 0)
            .map(String::as_str)
            .collect()
    }

    /// Table names sorted by descending degree; ties keep view order
    pub fn by_degree(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.order.iter().map(String::as_str).collect();
        // Stable sort keeps view order among equal degrees
        names.sort_by(|a, b| self.degree(b).cmp(&self.degree(a)));
        names
    }
}
