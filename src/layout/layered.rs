//! Layered (rank/position) layout for directed diagram views.
//!
//! Ranks come from the dependency levels, so referenced tables sit in the
//! first rank. Within-rank order is refined by barycenter sweeps, keeping the
//! ordering with the fewest crossings. Node boxes are sized from their column
//! count and packed so no two boxes overlap.

use super::sizing::NodeSizing;
use super::Direction;
use crate::graph::{DependencyGraph, Levels, SchemaView};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Spacing and ordering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredParams {
    pub direction: Direction,
    pub sizing: NodeSizing,
    /// Minimum gap between consecutive ranks
    pub rank_sep: f64,
    /// Minimum gap between siblings of one rank
    pub node_sep: f64,
    /// Outer margin around the drawing
    pub margin: f64,
    /// Barycenter sweep count (each sweep goes down then up)
    pub sweeps: usize,
}

impl Default for LayeredParams {
    fn default() -> Self {
        Self {
            direction: Direction::TB,
            sizing: NodeSizing::default(),
            rank_sep: 80.0,
            node_sep: 50.0,
            margin: 20.0,
            sweeps: 4,
        }
    }
}

/// A placed table box; `x`/`y` is the top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PositionedNode {
    pub table: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rank: usize,
    /// Position within the rank
    pub order: usize,
}

impl PositionedNode {
    /// Check whether two boxes intersect (touching edges do not count)
    pub fn overlaps(&self, other: &PositionedNode) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// A foreign key drawn between two positioned tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct LayoutEdge {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Result of a layered layout pass
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    pub direction: Direction,
    /// Nodes in view order
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: f64,
    pub height: f64,
}

impl LayeredLayout {
    /// Lay out a view; a pure function of the view and parameters
    pub fn compute(view: &SchemaView, params: &LayeredParams) -> Self {
        let graph = DependencyGraph::from_view(view);
        let levels = Levels::assign(&graph);
        let n = view.len();

        let mut rank_of = vec![0usize; n];
        let mut ranks: Vec<Vec<usize>> = levels
            .levels
            .iter()
            .enumerate()
            .map(|(r, tables)| {
                tables
                    .iter()
                    .filter_map(|t| view.position(t))
                    .inspect(|&p| rank_of[p] = r)
                    .collect()
            })
            .collect();

        let neighbors: Vec<Vec<usize>> = view
            .tables()
            .iter()
            .map(|t| {
                graph
                    .adjacency
                    .get(t.name.as_str())
                    .map(|ns| ns.iter().filter_map(|name| view.position(name)).collect())
                    .unwrap_or_default()
            })
            .collect();

        order_ranks(&mut ranks, &neighbors, params.sweeps);

        let sizes: Vec<(f64, f64)> = view
            .tables()
            .iter()
            .map(|t| params.sizing.node_size(t))
            .collect();

        let (nodes, width, height) = place(view, &ranks, &rank_of, &sizes, params);

        let edges = view
            .edges()
            .iter()
            .map(|fk| LayoutEdge {
                source_table: fk.source_table.clone(),
                source_column: fk.source_column.clone(),
                target_table: fk.target_table.clone(),
                target_column: fk.target_column.clone(),
            })
            .collect();

        tracing::debug!(
            nodes = n,
            ranks = ranks.len(),
            direction = %params.direction,
            "computed layered layout"
        );

        Self {
            direction: params.direction,
            nodes,
            edges,
            width,
            height,
        }
    }

    /// Positioned node for a table
    pub fn node(&self, table: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.table == table)
    }

    /// Number of ranks
    pub fn rank_count(&self) -> usize {
        self.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0)
    }

    /// Edge crossings between adjacent ranks
    pub fn crossings(&self) -> usize {
        let mut segments: Vec<(usize, usize, usize)> = Vec::new();
        for edge in &self.edges {
            let (Some(a), Some(b)) = (self.node(&edge.source_table), self.node(&edge.target_table))
            else {
                continue;
            };
            let (upper, lower) = if a.rank < b.rank { (a, b) } else { (b, a) };
            if lower.rank == upper.rank + 1 {
                segments.push((upper.rank, upper.order, lower.order));
            }
        }
        count_crossings(&segments)
    }
}

/// Count pairwise crossings of `(rank, upper_order, lower_order)` segments
fn count_crossings(segments: &[(usize, usize, usize)]) -> usize {
    let mut count = 0;
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            if a.0 == b.0 && ((a.1 < b.1 && a.2 > b.2) || (a.1 > b.1 && a.2 < b.2)) {
                count += 1;
            }
        }
    }
    count
}

fn rank_crossings(ranks: &[Vec<usize>], neighbors: &[Vec<usize>]) -> usize {
    let n = neighbors.len();
    let mut rank_of = vec![usize::MAX; n];
    let mut order = vec![0usize; n];
    for (r, nodes) in ranks.iter().enumerate() {
        for (i, &p) in nodes.iter().enumerate() {
            rank_of[p] = r;
            order[p] = i;
        }
    }

    let mut segments = Vec::new();
    for (p, ns) in neighbors.iter().enumerate() {
        for &q in ns {
            // Each undirected neighbour entry is seen from both ends; keep the downward one
            if rank_of[q] == rank_of[p].wrapping_add(1) {
                segments.push((rank_of[p], order[p], order[q]));
            }
        }
    }
    count_crossings(&segments)
}

fn order_ranks(ranks: &mut [Vec<usize>], neighbors: &[Vec<usize>], sweeps: usize) {
    if ranks.len() < 2 {
        return;
    }

    let mut best = ranks.to_vec();
    let mut best_crossings = rank_crossings(ranks, neighbors);

    for _ in 0..sweeps {
        if best_crossings == 0 {
            break;
        }
        for r in 1..ranks.len() {
            reorder_by_barycenter(ranks, r, r - 1, neighbors);
        }
        for r in (0..ranks.len() - 1).rev() {
            reorder_by_barycenter(ranks, r, r + 1, neighbors);
        }

        let crossings = rank_crossings(ranks, neighbors);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = ranks.to_vec();
        }
    }

    ranks.clone_from_slice(&best);
}

fn reorder_by_barycenter(
    ranks: &mut [Vec<usize>],
    rank: usize,
    fixed: usize,
    neighbors: &[Vec<usize>],
) {
    let mut fixed_order = vec![None; neighbors.len()];
    for (i, &p) in ranks[fixed].iter().enumerate() {
        fixed_order[p] = Some(i);
    }

    let mut keyed: Vec<(f64, usize)> = ranks[rank]
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let orders: Vec<usize> = neighbors[p].iter().filter_map(|&q| fixed_order[q]).collect();
            let barycenter = if orders.is_empty() {
                i as f64
            } else {
                orders.iter().sum::<usize>() as f64 / orders.len() as f64
            };
            (barycenter, p)
        })
        .collect();

    // Stable sort: equal barycenters keep their previous order
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    ranks[rank] = keyed.into_iter().map(|(_, p)| p).collect();
}

fn place(
    view: &SchemaView,
    ranks: &[Vec<usize>],
    rank_of: &[usize],
    sizes: &[(f64, f64)],
    params: &LayeredParams,
) -> (Vec<PositionedNode>, f64, f64) {
    if ranks.is_empty() {
        return (Vec::new(), 0.0, 0.0);
    }

    // (along the rank axis, across the rank axis)
    let extent = |p: usize| -> (f64, f64) {
        let (w, h) = sizes[p];
        match params.direction {
            Direction::TB => (h, w),
            Direction::LR => (w, h),
        }
    };

    let rank_span: Vec<f64> = ranks
        .iter()
        .map(|nodes| {
            let total: f64 = nodes.iter().map(|&p| extent(p).1).sum();
            total + nodes.len().saturating_sub(1) as f64 * params.node_sep
        })
        .collect();
    let max_span = rank_span.iter().copied().fold(0.0, f64::max);

    let mut placed: Vec<Option<PositionedNode>> = vec![None; view.len()];
    let mut main = params.margin;

    for (r, nodes) in ranks.iter().enumerate() {
        let depth = nodes.iter().map(|&p| extent(p).0).fold(0.0, f64::max);
        let mut cross = params.margin + (max_span - rank_span[r]) / 2.0;

        for (order, &p) in nodes.iter().enumerate() {
            let (w, h) = sizes[p];
            let (x, y) = match params.direction {
                Direction::TB => (cross, main),
                Direction::LR => (main, cross),
            };
            placed[p] = Some(PositionedNode {
                table: view.tables()[p].name.clone(),
                x,
                y,
                width: w,
                height: h,
                rank: rank_of[p],
                order,
            });
            cross += extent(p).1 + params.node_sep;
        }

        main += depth + params.rank_sep;
    }

    let main_total = main - params.rank_sep + params.margin;
    let cross_total = max_span + 2.0 * params.margin;
    let (width, height) = match params.direction {
        Direction::TB => (cross_total, main_total),
        Direction::LR => (main_total, cross_total),
    };

    (placed.into_iter().flatten().collect(), width, height)
}
