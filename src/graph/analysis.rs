//! Cycle detection over the dependency graph.

use crate::graph::builder::DependencyGraph;
use ahash::{AHashMap, AHashSet};

/// A cycle in the graph (list of table names forming the cycle)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub tables: Vec<String>,
}

impl Cycle {
    /// Check if this is a self-referencing cycle (single table)
    pub fn is_self_reference(&self) -> bool {
        self.tables.len() == 1
    }

    /// Format the cycle for display
    pub fn display(&self) -> String {
        if self.is_self_reference() {
            format!("{} -> {} (self-reference)", self.tables[0], self.tables[0])
        } else {
            let mut parts = self.tables.clone();
            parts.push(self.tables[0].clone()); // Complete the cycle
            parts.join(" -> ")
        }
    }
}

/// Find all cycles using Tarjan's SCC algorithm.
///
/// Multi-table cycles list their members in view order; cycles are returned in
/// the view order of their first member.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut finder = TarjanScc::new(graph);
    finder.find_sccs();

    let position: AHashMap<&str, usize> = graph
        .order
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut cycles: Vec<Cycle> = finder
        .sccs
        .into_iter()
        .filter(|scc| {
            scc.len() > 1 || graph.self_references.contains_key(scc[0].as_str())
        })
        .map(|mut scc| {
            scc.sort_by_key(|t| position.get(t.as_str()).copied().unwrap_or(usize::MAX));
            Cycle { tables: scc }
        })
        .collect();

    cycles.sort_by_key(|c| position.get(c.tables[0].as_str()).copied().unwrap_or(usize::MAX));
    cycles
}

/// Get all tables that are part of a multi-table cycle
pub fn cyclic_tables(graph: &DependencyGraph) -> AHashSet<String> {
    find_cycles(graph)
        .into_iter()
        .filter(|c| !c.is_self_reference())
        .flat_map(|c| c.tables)
        .collect()
}

/// Tarjan's Strongly Connected Components algorithm
struct TarjanScc<'a> {
    graph: &'a DependencyGraph,
    index_counter: usize,
    stack: Vec<&'a str>,
    on_stack: AHashSet<&'a str>,
    indices: AHashMap<&'a str, usize>,
    lowlinks: AHashMap<&'a str, usize>,
    sccs: Vec<Vec<String>>,
}

impl<'a> TarjanScc<'a> {
    fn new(graph: &'a DependencyGraph) -> Self {
        Self {
            graph,
            index_counter: 0,
            stack: Vec::new(),
            on_stack: AHashSet::new(),
            indices: AHashMap::new(),
            lowlinks: AHashMap::new(),
            sccs: Vec::new(),
        }
    }

    fn find_sccs(&mut self) {
        let graph = self.graph;
        for node in &graph.order {
            if !self.indices.contains_key(node.as_str()) {
                self.strongconnect(node.as_str());
            }
        }
    }

    fn strongconnect(&mut self, v: &'a str) {
        // Set the depth index for v
        self.indices.insert(v, self.index_counter);
        self.lowlinks.insert(v, self.index_counter);
        self.index_counter += 1;
        self.stack.push(v);
        self.on_stack.insert(v);

        // Consider successors of v
        let graph = self.graph;
        for w in graph.dependencies_of(v) {
            let w = w.as_str();
            if !self.indices.contains_key(w) {
                // Successor w has not yet been visited; recurse on it
                self.strongconnect(w);
                let low = self.lowlinks[v].min(self.lowlinks[w]);
                self.lowlinks.insert(v, low);
            } else if self.on_stack.contains(w) {
                // Successor w is in stack S and hence in the current SCC
                let low = self.lowlinks[v].min(self.indices[w]);
                self.lowlinks.insert(v, low);
            }
        }

        // If v is a root node, pop the stack and generate an SCC
        if self.lowlinks[v] == self.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack.remove(w);
                scc.push(w.to_string());
                if w == v {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}
