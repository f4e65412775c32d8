//! Rooted forest for tree layouts.
//!
//! Each table gets a single "primary parent": the target of the first foreign
//! key (model order) leaving it. This reduction is lossy on purpose; a table
//! with several foreign keys only keeps one tree parent.

use crate::graph::view::SchemaView;
use ahash::AHashMap;
use std::collections::VecDeque;
use thiserror::Error;

/// Raised when no tree can be derived from a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("no hierarchy available: the view has no tables")]
    Empty,
    #[error("no hierarchy available: every table references another table")]
    NoRoot,
}

/// What a hierarchy node stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic root joining several trees; has no columns and is never rendered
    Virtual,
    Table(String),
}

/// One node of the forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub kind: NodeKind,
    /// Parent node index; `None` only for the root
    pub parent: Option<usize>,
    /// Child node indices in view order
    pub children: Vec<usize>,
    /// Distance from the root
    pub depth: usize,
}

impl HierarchyNode {
    /// Table name, `None` for the virtual root
    pub fn table(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Table(name) => Some(name),
            NodeKind::Virtual => None,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.kind == NodeKind::Virtual
    }
}

/// A single rooted tree over every table of a view.
///
/// Node `i` is the view's table `i`; a virtual root, when present, is the last
/// node.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub nodes: Vec<HierarchyNode>,
    pub root: usize,
    index: AHashMap<String, usize>,
}

impl Hierarchy {
    /// Build the hierarchy for a view
    pub fn build(view: &SchemaView) -> Result<Self, HierarchyError> {
        let n = view.len();
        if n == 0 {
            return Err(HierarchyError::Empty);
        }

        // First non-self foreign key per source table, over the whole model.
        // Keys to tables the model does not declare are ignored.
        let model = view.model();
        let mut declared: AHashMap<&str, &str> = AHashMap::new();
        for fk in &model.foreign_keys {
            if fk.is_self_reference() || model.table(&fk.target_table).is_none() {
                continue;
            }
            declared
                .entry(fk.source_table.as_str())
                .or_insert(fk.target_table.as_str());
        }

        let tables = view.tables();
        let candidates: Vec<usize> = (0..n)
            .filter(|&i| !declared.contains_key(tables[i].name.as_str()))
            .collect();

        let root = match candidates.len() {
            0 => return Err(HierarchyError::NoRoot),
            1 => candidates[0],
            _ => n,
        };

        let mut parent: Vec<Option<usize>> = (0..n)
            .map(|i| {
                if i == root {
                    return None;
                }
                // Missing or filtered-out parents fall back to the root
                let p = declared
                    .get(tables[i].name.as_str())
                    .and_then(|target| view.position(target))
                    .unwrap_or(root);
                Some(p)
            })
            .collect();
        if root == n {
            parent.push(None);
        }

        // Tables whose parent chain loops never reach the root; attach the
        // first of each loop to the root.
        let mut reached = vec![false; parent.len()];
        let children = children_lists(&parent);
        mark_subtree(&children, root, &mut reached);
        for i in 0..n {
            if !reached[i] {
                parent[i] = Some(root);
                mark_subtree(&children, i, &mut reached);
            }
        }

        let children = children_lists(&parent);
        let mut depth = vec![0usize; parent.len()];
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            for &child in &children[node] {
                depth[child] = depth[node] + 1;
                queue.push_back(child);
            }
        }

        let mut nodes: Vec<HierarchyNode> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| HierarchyNode {
                kind: NodeKind::Table(t.name.clone()),
                parent: parent[i],
                children: children[i].clone(),
                depth: depth[i],
            })
            .collect();
        if root == n {
            nodes.push(HierarchyNode {
                kind: NodeKind::Virtual,
                parent: None,
                children: children[n].clone(),
                depth: 0,
            });
        }

        let index = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        tracing::debug!(
            nodes = nodes.len(),
            virtual_root = root == n,
            "built hierarchy"
        );

        Ok(Self { nodes, root, index })
    }

    /// The root node
    pub fn root_node(&self) -> &HierarchyNode {
        &self.nodes[self.root]
    }

    /// Check if the root is synthetic
    pub fn has_virtual_root(&self) -> bool {
        self.root_node().is_virtual()
    }

    /// Node for a table
    pub fn node(&self, table: &str) -> Option<&HierarchyNode> {
        self.index.get(table).map(|&i| &self.nodes[i])
    }

    /// Parent table name; `None` for the root and for children of the virtual root
    pub fn parent_of(&self, table: &str) -> Option<&str> {
        self.node(table)
            .and_then(|n| n.parent)
            .and_then(|p| self.nodes[p].table())
    }

    /// Child table names in view order
    pub fn children_of(&self, table: &str) -> Vec<&str> {
        self.node(table)
            .map(|n| self.names(&n.children))
            .unwrap_or_default()
    }

    /// Table names directly under the root
    pub fn root_children(&self) -> Vec<&str> {
        self.names(&self.root_node().children)
    }

    /// Depth of a table below the root
    pub fn depth_of(&self, table: &str) -> Option<usize> {
        self.node(table).map(|n| n.depth)
    }

    /// Deepest level of the tree
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Nodes standing for real tables (the virtual root excluded)
    pub fn table_nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter().filter(|n| !n.is_virtual())
    }

    fn names(&self, indices: &[usize]) -> Vec<&str> {
        indices
            .iter()
            .filter_map(|&i| self.nodes[i].table())
            .collect()
    }
}

fn children_lists(parent: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); parent.len()];
    for (child, p) in parent.iter().enumerate() {
        if let Some(p) = *p {
            children[p].push(child);
        }
    }
    children
}

fn mark_subtree(children: &[Vec<usize>], start: usize, reached: &mut [bool]) {
    let mut queue = VecDeque::from([start]);
    reached[start] = true;
    while let Some(node) = queue.pop_front() {
        for &child in &children[node] {
            if !reached[child] {
                reached[child] = true;
                queue.push_back(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::ViewFilter;
    use crate::schema::{ForeignKey, SchemaModel, Table};

    fn model(tables: &[&str], fks: &[(&str, &str)]) -> SchemaModel {
        SchemaModel::new(
            tables.iter().map(|t| Table::new(*t)).collect(),
            fks.iter()
                .map(|(s, t)| ForeignKey::new(*s, format!("{}_id", t), *t, "id"))
                .collect(),
        )
    }

    #[test]
    fn test_single_real_root_chain() {
        let model = model(&["A", "B", "C"], &[("B", "A"), ("C", "B")]);
        let tree = Hierarchy::build(&SchemaView::full(&model)).unwrap();

        assert!(!tree.has_virtual_root());
        assert_eq!(tree.root_node().table(), Some("A"));
        assert_eq!(tree.children_of("A"), vec!["B"]);
        assert_eq!(tree.children_of("B"), vec!["C"]);
        assert_eq!(tree.depth_of("C"), Some(2));
        assert_eq!(tree.nodes.len(), 3);
    }

    #[test]
    fn test_virtual_root_for_multiple_candidates() {
        let model = model(&["A", "B"], &[]);
        let tree = Hierarchy::build(&SchemaView::full(&model)).unwrap();

        assert!(tree.has_virtual_root());
        assert_eq!(tree.root_children(), vec!["A", "B"]);
        assert_eq!(tree.parent_of("A"), None);
        assert_eq!(tree.depth_of("B"), Some(1));
        assert_eq!(tree.table_nodes().count(), 2);
    }

    #[test]
    fn test_first_found_parent_wins() {
        let model = model(
            &["users", "teams", "members"],
            &[("members", "teams"), ("members", "users")],
        );
        let tree = Hierarchy::build(&SchemaView::full(&model)).unwrap();
        assert_eq!(tree.parent_of("members"), Some("teams"));
        assert!(tree.children_of("users").is_empty());
    }

    #[test]
    fn test_filtered_parent_reparented_to_root() {
        let model = model(
            &["users", "orders", "items", "products"],
            &[("orders", "users"), ("items", "orders"), ("items", "products")],
        );
        let filter = ViewFilter {
            exclude: ViewFilter::parse_patterns("orders"),
            ..ViewFilter::default()
        };
        let tree = Hierarchy::build(&SchemaView::new(&model, &filter)).unwrap();

        // users and products are candidates; items lost its parent
        assert!(tree.has_virtual_root());
        assert_eq!(tree.root_children(), vec!["users", "items", "products"]);
    }

    #[test]
    fn test_parent_cycle_attached_to_root() {
        let model = model(&["root", "a", "b"], &[("a", "b"), ("b", "a")]);
        let tree = Hierarchy::build(&SchemaView::full(&model)).unwrap();

        assert_eq!(tree.root_node().table(), Some("root"));
        assert_eq!(tree.children_of("root"), vec!["a"]);
        assert_eq!(tree.children_of("a"), vec!["b"]);
        assert_eq!(tree.depth_of("b"), Some(2));
    }

    #[test]
    fn test_self_reference_is_not_a_parent() {
        let model = model(&["categories"], &[("categories", "categories")]);
        let tree = Hierarchy::build(&SchemaView::full(&model)).unwrap();
        assert_eq!(tree.root_node().table(), Some("categories"));
        assert_eq!(tree.max_depth(), 0);
    }

    #[test]
    fn test_dangling_key_keeps_root_candidate() {
        let model = model(&["a"], &[("a", "ghost")]);
        let tree = Hierarchy::build(&SchemaView::full(&model)).unwrap();
        assert_eq!(tree.root_node().table(), Some("a"));
        assert!(!tree.has_virtual_root());
    }

    #[test]
    fn test_dangling_key_does_not_hide_real_parent() {
        let model = model(&["a", "b", "c"], &[("b", "ghost"), ("b", "a")]);
        let tree = Hierarchy::build(&SchemaView::full(&model)).unwrap();

        assert_eq!(tree.parent_of("b"), Some("a"));
        assert_eq!(tree.root_children(), vec!["a", "c"]);
        assert_eq!(tree.depth_of("b"), Some(2));
    }

    #[test]
    fn test_dangling_and_filtered_parents_differ() {
        let model = model(&["a", "b", "c"], &[("b", "ghost"), ("c", "a")]);
        let filter = ViewFilter {
            exclude: ViewFilter::parse_patterns("a"),
            ..ViewFilter::default()
        };
        let tree = Hierarchy::build(&SchemaView::new(&model, &filter)).unwrap();

        // b is a root candidate; c's parent exists but is filtered out
        assert_eq!(tree.root_node().table(), Some("b"));
        assert_eq!(tree.children_of("b"), vec!["c"]);
    }

    #[test]
    fn test_degenerate_views() {
        let empty = model(&[], &[]);
        assert_eq!(
            Hierarchy::build(&SchemaView::full(&empty)).unwrap_err(),
            HierarchyError::Empty
        );

        let cyclic = model(&["a", "b"], &[("a", "b"), ("b", "a")]);
        assert_eq!(
            Hierarchy::build(&SchemaView::full(&cyclic)).unwrap_err(),
            HierarchyError::NoRoot
        );
    }
}
