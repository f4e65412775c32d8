//! Dependency levels: best-effort topological stratification.
//!
//! Level 0 holds tables that depend on nothing; each further level holds the
//! tables whose dependencies were all placed in earlier levels. When a round
//! can place nothing (a dependency cycle), every remaining table is placed in
//! that round's level. This may co-locate mutually dependent tables but always
//! terminates within T rounds.

use crate::graph::builder::DependencyGraph;
use ahash::{AHashMap, AHashSet};

/// Level assignment for a view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Levels {
    /// Tables per level, each level in view order
    pub levels: Vec<Vec<String>>,
    /// Indices of levels produced by forced placement
    pub forced: Vec<usize>,
    depth: AHashMap<String, usize>,
}

impl Levels {
    /// Assign levels to every table of the graph
    pub fn assign(graph: &DependencyGraph) -> Self {
        let mut levels: Vec<Vec<String>> = Vec::new();
        let mut forced = Vec::new();
        let mut placed: AHashSet<&str> = AHashSet::with_capacity(graph.len());
        let mut remaining: Vec<&str> = graph.order.iter().map(String::as_str).collect();

        while !remaining.is_empty() {
            // Only tables placed in earlier rounds count as resolved
            let (ready, blocked): (Vec<&str>, Vec<&str>) =
                remaining.iter().partition(|table| {
                    graph
                        .dependencies_of(table)
                        .iter()
                        .all(|dep| placed.contains(dep.as_str()))
                });

            let level = if ready.is_empty() {
                tracing::warn!(
                    level = levels.len(),
                    tables = remaining.len(),
                    "dependency cycle: force-placing remaining tables"
                );
                forced.push(levels.len());
                std::mem::take(&mut remaining)
            } else {
                remaining = blocked;
                ready
            };

            placed.extend(level.iter().copied());
            levels.push(level.into_iter().map(str::to_string).collect());
        }

        let depth = levels
            .iter()
            .enumerate()
            .flat_map(|(i, tables)| tables.iter().map(move |t| (t.clone(), i)))
            .collect();

        tracing::debug!(
            levels = levels.len(),
            forced = forced.len(),
            "assigned dependency levels"
        );

        Self {
            levels,
            forced,
            depth,
        }
    }

    /// Level of a table
    pub fn level_of(&self, table: &str) -> Option<usize> {
        self.depth.get(table).copied()
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Check if any level had to be force-placed
    pub fn has_forced_levels(&self) -> bool {
        !self.forced.is_empty()
    }
}
