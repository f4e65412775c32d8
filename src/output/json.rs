//! JSON documents for `--json` output.

use crate::graph::{
    cyclic_tables, find_cycles, Cluster, Clustering, ConnectionMatrix, DependencyGraph, EdgeDetail, Hierarchy,
    Levels, NamingRule, SchemaView,
};
use crate::layout::{Direction, LayeredLayout, LayoutEdge, NodePosition, NodeSizing};
use crate::schema::ModelWarning;
use schemars::JsonSchema;
use serde::Serialize;

/// Number of tables listed as most connected
const TOP_CONNECTED: usize = 10;

/// Degree statistics for one table
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DegreeEntry {
    pub table: String,
    pub degree: usize,
    pub in_degree: usize,
    pub out_degree: usize,
}

/// Cluster headline in the analysis summary
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ClusterSummary {
    pub id: String,
    pub name: String,
    pub size: usize,
}

/// JSON output for the analyze command
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AnalyzeJsonOutput {
    pub input_file: String,
    pub tables: usize,
    pub columns: usize,
    pub foreign_keys: usize,
    pub self_references: usize,
    pub enums: usize,
    /// Producer-contract warnings
    pub warnings: Vec<String>,
    /// Tables with no outgoing references
    pub root_tables: Vec<String>,
    /// Tables nothing references
    pub leaf_tables: Vec<String>,
    /// Tables with no relationships at all
    pub isolated_tables: Vec<String>,
    pub most_connected: Vec<DegreeEntry>,
    /// Cycles as table lists; one-element lists are self references
    pub cycles: Vec<Vec<String>>,
    /// Cycles rendered as `a -> b -> a`, parallel to `cycles`
    pub cycle_paths: Vec<String>,
    /// Tables inside a multi-table cycle, in view order
    pub cyclic_tables: Vec<String>,
    pub level_count: usize,
    /// Levels produced by forced placement
    pub forced_levels: Vec<usize>,
    pub clusters: Vec<ClusterSummary>,
}

impl AnalyzeJsonOutput {
    pub fn build(
        input_file: &str,
        view: &SchemaView,
        rules: &[NamingRule],
        warnings: &[ModelWarning],
    ) -> Self {
        let graph = DependencyGraph::from_view(view);
        let levels = Levels::assign(&graph);
        let clustering = Clustering::with_rules(view, rules);

        let to_owned = |names: Vec<&str>| names.into_iter().map(String::from).collect::<Vec<_>>();

        let most_connected = graph
            .by_degree()
            .into_iter()
            .take(TOP_CONNECTED)
            .filter(|t| graph.degree(t) > 0)
            .map(|t| DegreeEntry {
                table: t.to_string(),
                degree: graph.degree(t),
                in_degree: graph.in_degree.get(t).copied().unwrap_or(0),
                out_degree: graph.out_degree.get(t).copied().unwrap_or(0),
            })
            .collect();

        let cycles = find_cycles(&graph);
        let in_cycle = cyclic_tables(&graph);

        Self {
            input_file: input_file.to_string(),
            tables: view.len(),
            columns: view.column_count(),
            foreign_keys: view.edge_count(),
            self_references: graph.self_references.values().sum(),
            enums: view.model().enums.len(),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
            root_tables: to_owned(graph.root_tables()),
            leaf_tables: to_owned(graph.leaf_tables()),
            isolated_tables: to_owned(graph.isolated_tables()),
            most_connected,
            cycle_paths: cycles.iter().map(|c| c.display()).collect(),
            cycles: cycles.into_iter().map(|c| c.tables).collect(),
            cyclic_tables: graph
                .order
                .iter()
                .filter(|t| in_cycle.contains(t.as_str()))
                .cloned()
                .collect(),
            level_count: levels.len(),
            forced_levels: levels.forced.clone(),
            clusters: clustering
                .clusters
                .iter()
                .map(|c| ClusterSummary {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    size: c.len(),
                })
                .collect(),
        }
    }
}

/// One dependency level
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LevelEntry {
    pub level: usize,
    /// Placed by forced placement (the tables remaining when a cycle blocked progress)
    pub forced: bool,
    pub tables: Vec<String>,
}

/// JSON output for the levels command
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LevelsJsonOutput {
    pub level_count: usize,
    pub has_forced_levels: bool,
    pub levels: Vec<LevelEntry>,
}

impl From<&Levels> for LevelsJsonOutput {
    fn from(levels: &Levels) -> Self {
        Self {
            level_count: levels.len(),
            has_forced_levels: levels.has_forced_levels(),
            levels: levels
                .levels
                .iter()
                .enumerate()
                .map(|(i, tables)| LevelEntry {
                    level: i,
                    forced: levels.forced.contains(&i),
                    tables: tables.clone(),
                })
                .collect(),
        }
    }
}

/// JSON output for the clusters command
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ClustersJsonOutput {
    pub cluster_count: usize,
    pub clusters: Vec<Cluster>,
}

impl From<&Clustering> for ClustersJsonOutput {
    fn from(clustering: &Clustering) -> Self {
        Self {
            cluster_count: clustering.len(),
            clusters: clustering.clusters.clone(),
        }
    }
}

/// Nested hierarchy node
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TreeNode {
    /// Table name; absent for the virtual root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub depth: usize,
    pub children: Vec<TreeNode>,
}

/// JSON output for the hierarchy command
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct HierarchyJsonOutput {
    pub virtual_root: bool,
    pub max_depth: usize,
    pub root: TreeNode,
}

impl From<&Hierarchy> for HierarchyJsonOutput {
    fn from(hierarchy: &Hierarchy) -> Self {
        Self {
            virtual_root: hierarchy.has_virtual_root(),
            max_depth: hierarchy.max_depth(),
            root: tree_node(hierarchy, hierarchy.root),
        }
    }
}

fn tree_node(hierarchy: &Hierarchy, index: usize) -> TreeNode {
    let node = &hierarchy.nodes[index];
    TreeNode {
        table: node.table().map(String::from),
        is_virtual: node.is_virtual(),
        depth: node.depth,
        children: node
            .children
            .iter()
            .map(|&child| tree_node(hierarchy, child))
            .collect(),
    }
}

/// Per-table relationship total
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RankEntry {
    pub table: String,
    pub total: u32,
}

/// One non-empty matrix cell with its contributing keys
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PairEntry {
    pub a: String,
    pub b: String,
    pub weight: u32,
    pub details: Vec<EdgeDetail>,
}

/// JSON output for the matrix command
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MatrixJsonOutput {
    pub tables: Vec<String>,
    /// Row-major weights, `cells[i][j] == cells[j][i]`
    pub cells: Vec<Vec<u32>>,
    pub max_weight: u32,
    pub total_weight: u32,
    pub ranking: Vec<RankEntry>,
    pub pairs: Vec<PairEntry>,
}

impl From<&ConnectionMatrix> for MatrixJsonOutput {
    fn from(matrix: &ConnectionMatrix) -> Self {
        Self {
            tables: matrix.tables.clone(),
            cells: matrix.rows(),
            max_weight: matrix.max_weight(),
            total_weight: matrix.total_weight(),
            ranking: matrix
                .ranking()
                .into_iter()
                .map(|(table, total)| RankEntry {
                    table: table.to_string(),
                    total,
                })
                .collect(),
            pairs: matrix
                .pairs()
                .into_iter()
                .map(|(a, b, weight)| PairEntry {
                    a: a.to_string(),
                    b: b.to_string(),
                    weight,
                    details: matrix.details(a, b).to_vec(),
                })
                .collect(),
        }
    }
}

/// A table box; `x`/`y` is the top-left corner
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LayoutNode {
    pub table: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Layered engine only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    /// Layered engine only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

/// JSON output for the layout command
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LayoutJsonOutput {
    /// "layered" or "force"
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Force engine only: steps run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl From<&LayeredLayout> for LayoutJsonOutput {
    fn from(layout: &LayeredLayout) -> Self {
        Self {
            engine: "layered".to_string(),
            direction: Some(layout.direction),
            iterations: None,
            width: layout.width,
            height: layout.height,
            nodes: layout
                .nodes
                .iter()
                .map(|n| LayoutNode {
                    table: n.table.clone(),
                    x: n.x,
                    y: n.y,
                    width: n.width,
                    height: n.height,
                    rank: Some(n.rank),
                    order: Some(n.order),
                })
                .collect(),
            edges: layout.edges.clone(),
        }
    }
}

impl LayoutJsonOutput {
    /// Convert simulation centers into boxes translated so the drawing starts at `margin`
    pub fn from_force(
        view: &SchemaView,
        positions: &[NodePosition],
        iterations: usize,
        sizing: &NodeSizing,
        margin: f64,
    ) -> Self {
        let boxes: Vec<(&NodePosition, f64, f64)> = positions
            .iter()
            .map(|p| {
                let (w, h) = view
                    .table(&p.table)
                    .map(|t| sizing.node_size(t))
                    .unwrap_or((sizing.width, sizing.header_height));
                (p, w, h)
            })
            .collect();

        let min_x = boxes
            .iter()
            .map(|(p, w, _)| p.x - w / 2.0)
            .fold(f64::INFINITY, f64::min);
        let min_y = boxes
            .iter()
            .map(|(p, _, h)| p.y - h / 2.0)
            .fold(f64::INFINITY, f64::min);
        let (dx, dy) = if boxes.is_empty() {
            (0.0, 0.0)
        } else {
            (margin - min_x, margin - min_y)
        };

        let nodes: Vec<LayoutNode> = boxes
            .iter()
            .map(|(p, w, h)| LayoutNode {
                table: p.table.clone(),
                x: p.x - w / 2.0 + dx,
                y: p.y - h / 2.0 + dy,
                width: *w,
                height: *h,
                rank: None,
                order: None,
            })
            .collect();

        let width = nodes
            .iter()
            .map(|n| n.x + n.width + margin)
            .fold(0.0, f64::max);
        let height = nodes
            .iter()
            .map(|n| n.y + n.height + margin)
            .fold(0.0, f64::max);

        Self {
            engine: "force".to_string(),
            direction: None,
            iterations: Some(iterations),
            width,
            height,
            nodes,
            edges: layout_edges(view),
        }
    }
}

fn layout_edges(view: &SchemaView) -> Vec<LayoutEdge> {
    view.edges()
        .iter()
        .map(|fk| LayoutEdge {
            source_table: fk.source_table.clone(),
            source_column: fk.source_column.clone(),
            target_table: fk.target_table.clone(),
            target_column: fk.target_column.clone(),
        })
        .collect()
}
